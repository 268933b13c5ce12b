//! Per-instance window classes, the hidden and visible windows and the fixed
//! pixel-format policy backing the instance's one GL context.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, bail, Context, Result};
use raw_window_handle::RawWindowHandle;
use tracing::{debug, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND};
use windows::Win32::Graphics::Gdi::{GetDC, HDC};
use windows::Win32::Graphics::OpenGL::{
    wglCreateContext, wglDeleteContext, ChoosePixelFormat, SetPixelFormat, HGLRC,
    PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW, PFD_MAIN_PLANE, PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA,
    PIXELFORMATDESCRIPTOR,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DestroyWindow, IsWindowVisible, LoadCursorW, RegisterClassW,
    SetWindowLongPtrW, ShowWindow, UnregisterClassW, CS_HREDRAW, CS_OWNDC, CS_VREDRAW,
    GWLP_USERDATA, IDC_ARROW, SW_HIDE, SW_SHOWNORMAL, WINDOW_EX_STYLE, WINDOW_STYLE, WNDCLASSW,
    WS_CHILD, WS_VISIBLE,
};

use crate::view::HostView;
use crate::win32::{hook, wndproc};

// Class names must be unique per registration; a process-wide counter keeps
// repeated open/close cycles and multiple live instances from colliding.
static CLASS_SEQ: AtomicU64 = AtomicU64::new(0);

/// One native window plus the resources tied to it.
pub struct Surface {
    pub hwnd: HWND,
    pub hdc: HDC,
    /// NUL-terminated wide class name, kept alive for UnregisterClassW.
    class_name: Vec<u16>,
}

/// Native state of a [`HostView`].
pub struct Native {
    pub hidden: Surface,
    pub win: Option<Surface>,
    /// The instance's one GL context, created against the hidden window's DC.
    pub hglrc: HGLRC,
    /// Context/device pair saved by `context_push`.
    pub prev: Option<(HDC, HGLRC)>,
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn register_class(prefix: &str, redraw: bool) -> Result<Vec<u16>> {
    let seq = CLASS_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = wide(&format!("{prefix}{seq}"));

    let hinstance = HINSTANCE(unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW")?.0);
    let style = if redraw {
        CS_HREDRAW | CS_VREDRAW | CS_OWNDC
    } else {
        CS_OWNDC
    };
    let wc = WNDCLASSW {
        style,
        lpfnWndProc: Some(wndproc::wndproc),
        hInstance: hinstance,
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
        lpszClassName: PCWSTR(name.as_ptr()),
        ..Default::default()
    };

    if unsafe { RegisterClassW(&wc) } == 0 {
        bail!(
            "window class registration failed: {}",
            windows::core::Error::from_win32()
        );
    }
    Ok(name)
}

fn unregister_class(class_name: &[u16]) {
    let hinstance = match unsafe { GetModuleHandleW(None) } {
        Ok(h) => HINSTANCE(h.0),
        Err(_) => return,
    };
    if let Err(err) = unsafe { UnregisterClassW(PCWSTR(class_name.as_ptr()), hinstance) } {
        warn!(?err, "UnregisterClassW failed");
    }
}

/// The fixed pixel-format policy: 32-bit RGBA, double buffered, 24-bit depth,
/// 8-bit stencil. Deliberately not configurable.
fn set_pixel_format(hdc: HDC) -> Result<()> {
    let pfd = PIXELFORMATDESCRIPTOR {
        nSize: std::mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16,
        nVersion: 1,
        dwFlags: PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL | PFD_DOUBLEBUFFER,
        iPixelType: PFD_TYPE_RGBA,
        cColorBits: 32,
        cDepthBits: 24,
        cStencilBits: 8,
        iLayerType: PFD_MAIN_PLANE.0 as u8,
        ..Default::default()
    };

    let pfmt = unsafe { ChoosePixelFormat(hdc, &pfd) };
    if pfmt == 0 {
        bail!("ChoosePixelFormat found no match");
    }
    debug!(pfmt, "pixel format selected");
    unsafe { SetPixelFormat(hdc, pfmt, &pfd) }.context("SetPixelFormat")?;
    Ok(())
}

/// Create the hidden window and the instance's persistent GL context.
/// All-or-nothing: any failure tears down whatever was already created.
pub fn create_hidden(w: i32, h: i32) -> Result<Native> {
    let hinstance = HINSTANCE(unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW")?.0);
    let class_name = register_class("hostview_hidden_", false)?;

    let create = |class_name: &[u16]| -> Result<Native> {
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(wide("hostview_hidden").as_ptr()),
                WINDOW_STYLE(0),
                0,
                0,
                w,
                h,
                HWND::default(),
                None,
                hinstance,
                None,
            )
        }
        .context("CreateWindowExW (hidden)")?;

        let hdc = unsafe { GetDC(hwnd) };
        if hdc.is_invalid() {
            let _ = unsafe { DestroyWindow(hwnd) };
            return Err(anyhow!("GetDC failed for hidden window"));
        }

        if let Err(err) = set_pixel_format(hdc) {
            let _ = unsafe { DestroyWindow(hwnd) };
            return Err(err);
        }

        let hglrc = match unsafe { wglCreateContext(hdc) } {
            Ok(ctx) => ctx,
            Err(err) => {
                let _ = unsafe { DestroyWindow(hwnd) };
                return Err(anyhow!(err).context("wglCreateContext"));
            }
        };
        debug!(?hwnd, "hidden window and GL context created");

        Ok(Native {
            hidden: Surface {
                hwnd,
                hdc,
                class_name: class_name.to_vec(),
            },
            win: None,
            hglrc,
            prev: None,
        })
    };

    match create(&class_name) {
        Ok(native) => Ok(native),
        Err(err) => {
            unregister_class(&class_name);
            Err(err)
        }
    }
}

/// Release the GL context and the hidden window.
pub fn destroy_hidden(native: &mut Native) {
    if !native.hglrc.is_invalid() {
        if let Err(err) = unsafe { wglDeleteContext(native.hglrc) } {
            warn!(?err, "wglDeleteContext failed");
        }
        native.hglrc = HGLRC::default();
    }
    if let Err(err) = unsafe { DestroyWindow(native.hidden.hwnd) } {
        warn!(?err, "DestroyWindow (hidden) failed");
    }
    unregister_class(&native.hidden.class_name);
}

fn parent_hwnd(parent: Option<RawWindowHandle>) -> Result<Option<HWND>> {
    match parent {
        None => Ok(None),
        Some(RawWindowHandle::Win32(handle)) => {
            Ok(Some(HWND(handle.hwnd.get() as *mut core::ffi::c_void)))
        }
        Some(other) => bail!("unsupported parent window handle: {other:?}"),
    }
}

/// Create the visible window, embedded when a parent is given, and associate
/// the instance pointer with it for event dispatch.
pub fn open_visible(
    view: &mut HostView,
    parent: Option<RawWindowHandle>,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
) -> Result<()> {
    if view.native.win.is_some() {
        bail!("visible window already open");
    }
    let parent = parent_hwnd(parent)?;
    let hinstance = HINSTANCE(unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW")?.0);
    let class_name = register_class("hostview_", true)?;

    let style = if parent.is_some() {
        WS_CHILD | WS_VISIBLE
    } else {
        WS_VISIBLE
    };
    // an embedding host positions the parent; children anchor at the origin
    let (x, y) = if parent.is_some() { (0, 0) } else { (x, y) };

    let hwnd = match unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            PCWSTR(class_name.as_ptr()),
            PCWSTR(wide("hostview").as_ptr()),
            style,
            x,
            y,
            w,
            h,
            parent.unwrap_or_default(),
            None,
            hinstance,
            None,
        )
    } {
        Ok(hwnd) => hwnd,
        Err(err) => {
            unregister_class(&class_name);
            return Err(anyhow!(err).context("CreateWindowExW (visible)"));
        }
    };

    let hdc = unsafe { GetDC(hwnd) };
    if hdc.is_invalid() {
        let _ = unsafe { DestroyWindow(hwnd) };
        unregister_class(&class_name);
        bail!("GetDC failed for visible window");
    }

    if let Err(err) = set_pixel_format(hdc) {
        let _ = unsafe { DestroyWindow(hwnd) };
        unregister_class(&class_name);
        return Err(err);
    }

    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, view as *mut HostView as isize);
    }

    view.native.win = Some(Surface {
        hwnd,
        hdc,
        class_name,
    });
    Ok(())
}

/// Destroy the visible window. The keyboard hook is uninstalled first so it
/// cannot outlive its dispatch target.
pub fn close_visible(view: &mut HostView) {
    hook::uninstall(view as *mut HostView);

    if let Some(win) = view.native.win.take() {
        // drop the instance association before the window dies
        unsafe {
            SetWindowLongPtrW(win.hwnd, GWLP_USERDATA, 0);
        }
        if let Err(err) = unsafe { DestroyWindow(win.hwnd) } {
            warn!(?err, "DestroyWindow (visible) failed");
        }
        unregister_class(&win.class_name);
    }
}

pub fn show_visible(view: &mut HostView, show: bool) {
    if let Some(win) = view.native.win.as_ref() {
        let cmd = if show { SW_SHOWNORMAL } else { SW_HIDE };
        let _ = unsafe { ShowWindow(win.hwnd, cmd) };
    }
}

pub fn is_visible(view: &HostView) -> bool {
    match view.native.win.as_ref() {
        Some(win) => unsafe { IsWindowVisible(win.hwnd) }.as_bool(),
        None => false,
    }
}
