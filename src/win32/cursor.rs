//! Native cursor backend for the input tracker.

use windows::Win32::Foundation::{HWND, POINT};
use windows::Win32::Graphics::Gdi::ClientToScreen;
use windows::Win32::UI::WindowsAndMessaging::{
    ReleaseCapture, SetCapture, SetCursorPos, ShowCursor,
};

use crate::input::CursorOps;
use crate::view::HostView;

/// Cursor operations bound to the visible window. Holds only the window
/// handle, so it never borrows the instance it was created from.
#[derive(Debug, Clone, Copy)]
pub struct NativeCursor {
    hwnd: Option<HWND>,
}

impl NativeCursor {
    pub(crate) fn for_view(view: &HostView) -> Self {
        Self {
            hwnd: view.native.win.as_ref().map(|win| win.hwnd),
        }
    }
}

impl CursorOps for NativeCursor {
    fn set_capture(&mut self) {
        if let Some(hwnd) = self.hwnd {
            let _ = unsafe { SetCapture(hwnd) };
        }
    }

    fn release_capture(&mut self) {
        let _ = unsafe { ReleaseCapture() };
    }

    fn show_cursor(&mut self, show: bool) {
        unsafe {
            ShowCursor(show);
        }
    }

    fn warp(&mut self, x: i32, y: i32) {
        let Some(hwnd) = self.hwnd else { return };
        let mut p = POINT { x, y };
        if unsafe { ClientToScreen(hwnd, &mut p) }.as_bool() {
            let _ = unsafe { SetCursorPos(p.x, p.y) };
        }
    }
}
