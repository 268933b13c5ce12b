//! wgl context currency: scoped push/pop around the caller's drawing, buffer
//! presentation and best-effort swap-interval negotiation.

use tracing::{debug, warn};
use windows::core::PCSTR;
use windows::Win32::Graphics::OpenGL::{
    wglGetCurrentContext, wglGetCurrentDC, wglGetProcAddress, wglMakeCurrent,
    wglSwapLayerBuffers, WGL_SWAP_MAIN_PLANE,
};

use crate::win32::window::Native;

/// Save whatever context/device pair the host currently has bound, then make
/// the instance's own context current on the visible DC, or on the hidden DC
/// when no window is open. Failure is diagnostic-only; the caller proceeds at
/// its own risk.
pub fn push(native: &mut Native) {
    let prev = (unsafe { wglGetCurrentDC() }, unsafe {
        wglGetCurrentContext()
    });
    native.prev = Some(prev);

    let hdc = match native.win.as_ref() {
        Some(win) => win.hdc,
        None => native.hidden.hdc,
    };
    if let Err(err) = unsafe { wglMakeCurrent(hdc, native.hglrc) } {
        warn!(?err, "context push: wglMakeCurrent failed");
    }
}

/// Restore the pair captured by the matching [`push`].
pub fn pop(native: &mut Native) {
    let Some((hdc, hglrc)) = native.prev.take() else {
        warn!("context pop without matching push");
        return;
    };
    if let Err(err) = unsafe { wglMakeCurrent(hdc, hglrc) } {
        warn!(?err, "context pop: wglMakeCurrent failed");
    }
}

/// Present the visible window's back buffer. No-op while no window is open.
pub fn swap_buffers(native: &Native) {
    if let Some(win) = native.win.as_ref() {
        if let Err(err) = unsafe { wglSwapLayerBuffers(win.hdc, WGL_SWAP_MAIN_PLANE) } {
            warn!(?err, "wglSwapLayerBuffers failed");
        }
    }
}

type SwapIntervalFn = unsafe extern "system" fn(i32) -> i32;

/// Best-effort vsync control through the wglSwapIntervalEXT extension.
/// Silently does nothing when the driver does not expose it. Must be called
/// with the instance's context current (i.e. between push and pop).
pub fn set_swap_interval(interval: i32) {
    let proc = unsafe { wglGetProcAddress(PCSTR(b"wglSwapIntervalEXT\0".as_ptr())) };
    match proc {
        Some(proc) => {
            let swap_interval: SwapIntervalFn = unsafe { std::mem::transmute(proc) };
            unsafe {
                swap_interval(interval);
            }
        }
        None => debug!("wglSwapIntervalEXT unavailable; swap interval unchanged"),
    }
}
