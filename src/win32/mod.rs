//! Win32 backplane: window/class lifecycle, the message-loop dispatcher, the
//! process-wide low-level keyboard hook and the wgl context primitives.

pub mod cursor;
pub mod gl;
pub mod hook;
pub mod window;
pub(crate) mod wndproc;
