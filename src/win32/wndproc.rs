//! The native message handler: recovers the owning instance from the window
//! and routes raw messages into the input tracker and keyboard hook.

use tracing::debug;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    TrackMouseEvent, HOVER_DEFAULT, TME_LEAVE, TRACKMOUSEEVENT,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DefWindowProcW, GetWindowLongPtrW, GWLP_USERDATA, WM_ACTIVATEAPP, WM_CAPTURECHANGED,
    WM_CREATE, WM_DESTROY, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP,
    WM_MOUSELEAVE, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_PAINT, WM_RBUTTONDOWN, WM_RBUTTONUP,
};

use crate::input::InputEvent;
use crate::keymap::{FOCUS_MOUSE, MOUSE_LBUTTON, MOUSE_MBUTTON, MOUSE_RBUTTON};
use crate::view::HostView;
use crate::win32::hook;

// Events are buffered out of the tracker before delivery so user callbacks
// see a consistent &mut HostView.
fn route_all(view: &mut HostView, events: Vec<InputEvent>, hwnd: HWND) {
    for event in events {
        if let InputEvent::Focus { state, changed } = event {
            if changed & FOCUS_MOUSE != 0 {
                if state & FOCUS_MOUSE != 0 {
                    // the platform has no continuous enter signal: entry was
                    // inferred from motion, so arm the one-shot leave
                    // notification now and take over the keyboard
                    track_mouse_leave(hwnd);
                    hook::install(view as *mut HostView);
                } else {
                    hook::uninstall(view as *mut HostView);
                }
            }
        }
        view.deliver(event);
    }
}

fn track_mouse_leave(hwnd: HWND) {
    let mut tme = TRACKMOUSEEVENT {
        cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
        dwFlags: TME_LEAVE,
        hwndTrack: hwnd,
        dwHoverTime: HOVER_DEFAULT,
    };
    if let Err(err) = unsafe { TrackMouseEvent(&mut tme) } {
        debug!(?err, "TrackMouseEvent failed");
    }
}

fn loword_i16(v: isize) -> i32 {
    i32::from(v as u16 as i16)
}

fn hiword_i16(v: isize) -> i32 {
    i32::from((v >> 16) as u16 as i16)
}

fn on_motion(view: &mut HostView, hwnd: HWND, lparam: LPARAM) {
    let x = loword_i16(lparam.0);
    let y = hiword_i16(lparam.0);
    let mut cursor = view.cursor();
    let mut events = Vec::new();
    view.tracker
        .on_motion(x, y, &mut cursor, &mut |e| events.push(e));
    route_all(view, events, hwnd);
}

fn on_leave(view: &mut HostView, hwnd: HWND) {
    let mut events = Vec::new();
    view.tracker.on_leave(&mut |e| events.push(e));
    route_all(view, events, hwnd);
}

fn on_button(view: &mut HostView, hwnd: HWND, pressed: bool, button: u32) {
    let mut events = Vec::new();
    view.tracker
        .on_button(pressed, button, &mut |e| events.push(e));
    route_all(view, events, hwnd);
}

fn on_wheel(view: &mut HostView, hwnd: HWND, wparam: WPARAM) {
    let delta = i32::from((wparam.0 >> 16) as u16 as i16);
    let mut events = Vec::new();
    view.tracker.on_wheel(delta, &mut |e| events.push(e));
    route_all(view, events, hwnd);
}

pub(crate) unsafe extern "system" fn wndproc(
    hwnd: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut HostView;

    if !ptr.is_null() {
        let view = unsafe { &mut *ptr };
        match message {
            WM_CREATE => debug!("WM_CREATE"),
            WM_DESTROY => debug!("WM_DESTROY"),
            WM_ACTIVATEAPP => debug!(active = wparam.0, "WM_ACTIVATEAPP"),
            WM_PAINT => debug!("WM_PAINT"),
            // only delivered after TrackMouseEvent armed it
            WM_MOUSELEAVE => on_leave(view, hwnd),
            WM_MOUSEMOVE => on_motion(view, hwnd, lparam),
            WM_LBUTTONDOWN => on_button(view, hwnd, true, MOUSE_LBUTTON),
            WM_LBUTTONUP => on_button(view, hwnd, false, MOUSE_LBUTTON),
            WM_RBUTTONDOWN => on_button(view, hwnd, true, MOUSE_RBUTTON),
            WM_RBUTTONUP => on_button(view, hwnd, false, MOUSE_RBUTTON),
            WM_MBUTTONDOWN => on_button(view, hwnd, true, MOUSE_MBUTTON),
            WM_MBUTTONUP => on_button(view, hwnd, false, MOUSE_MBUTTON),
            WM_MOUSEWHEEL => on_wheel(view, hwnd, wparam),
            // the environment can revoke capture unilaterally (e.g. alt-tab);
            // resynchronize the grab mode without the full ungrab path
            WM_CAPTURECHANGED => {
                debug!("WM_CAPTURECHANGED");
                view.tracker.on_capture_lost();
            }
            _ => {}
        }
    }

    unsafe { DefWindowProcW(hwnd, message, wparam, lparam) }
}
