//! Embeddable OpenGL surface for host-provided windows, as used by
//! audio-plugin GUIs whose host owns the message loop and keyboard focus.
//!
//! A [`HostView`] owns one persistent GL context (backed by a hidden window
//! so it survives open/close cycles of the visible surface), tracks mouse
//! focus/button/grab state from raw native events, and intercepts keyboard
//! input process-wide while the surface has mouse focus, delivering
//! normalized press/release callbacks with modifier state.

pub mod input;
pub mod keyboard;
pub mod keymap;
pub mod logging;
pub mod view;

#[cfg(target_os = "windows")]
pub mod win32;

pub use input::{GrabMode, InputEvent};
pub use view::HostView;
