//! The embeddable surface instance and its public API.
//!
//! A [`HostView`] owns a hidden window whose device context backs the one GL
//! context created for the instance's whole life, plus an optional visible
//! window embedded into a host-provided parent (or standalone). The instance
//! is heap-pinned behind a `Box` so the native message handler can recover it
//! from the window it is associated with.

use std::any::Any;

use anyhow::Result;
use raw_window_handle::RawWindowHandle;

use crate::input::{GrabMode, InputEvent, InputTracker};
use crate::keyboard::ModState;

/// Hidden-surface size used when the caller passes degenerate dimensions.
pub const DEFAULT_HIDDEN_WIDTH: i32 = 800;
pub const DEFAULT_HIDDEN_HEIGHT: i32 = 600;

/// Dimensions of 16 or less are treated as "unspecified" and replaced by the
/// fallback.
pub fn fallback_size(w: i32, h: i32, fallback: (i32, i32)) -> (i32, i32) {
    (
        if w <= 16 { fallback.0 } else { w },
        if h <= 16 { fallback.1 } else { h },
    )
}

pub type MouseFn = fn(view: &mut HostView, x: i32, y: i32, buttons: u32, changed: u32);
pub type KeyboardFn = fn(view: &mut HostView, key: u32, mods: u32, pressed: bool);
pub type FocusFn = fn(view: &mut HostView, state: u32, changed: u32);

/// Single-slot user callbacks; registering again replaces the previous one.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub mouse: Option<MouseFn>,
    pub keyboard: Option<KeyboardFn>,
    pub focus: Option<FocusFn>,
}

/// Visible-surface bookkeeping for platforms without the native backplane,
/// keeping the state machine exercisable off-platform.
#[cfg(not(target_os = "windows"))]
#[derive(Debug, Default)]
struct StubSurface {
    open: bool,
    visible: bool,
}

pub struct HostView {
    user_data: Option<Box<dyn Any>>,
    pub(crate) tracker: InputTracker,
    pub(crate) mods: ModState,
    pub(crate) callbacks: Callbacks,
    hidden_size: (i32, i32),
    win_size: (i32, i32),
    #[cfg(target_os = "windows")]
    pub(crate) native: crate::win32::window::Native,
    #[cfg(not(target_os = "windows"))]
    stub: StubSurface,
}

impl HostView {
    /// Create an instance. A hidden, never-shown window is created up front
    /// purely to own the device context backing the instance's one persistent
    /// GL context, so the context stays valid across open/close cycles of the
    /// visible window. All-or-nothing: on error nothing stays allocated.
    pub fn init(width: i32, height: i32) -> Result<Box<HostView>> {
        let hidden_size = fallback_size(
            width,
            height,
            (DEFAULT_HIDDEN_WIDTH, DEFAULT_HIDDEN_HEIGHT),
        );

        #[cfg(target_os = "windows")]
        let native = crate::win32::window::create_hidden(hidden_size.0, hidden_size.1)?;

        Ok(Box::new(HostView {
            user_data: None,
            tracker: InputTracker::default(),
            mods: ModState::default(),
            callbacks: Callbacks::default(),
            hidden_size,
            win_size: (0, 0),
            #[cfg(target_os = "windows")]
            native,
            #[cfg(not(target_os = "windows"))]
            stub: StubSurface::default(),
        }))
    }

    // ---- user data ----------------------------------------------------

    pub fn set_user_data(&mut self, data: Box<dyn Any>) {
        self.user_data = Some(data);
    }

    pub fn user_data(&self) -> Option<&dyn Any> {
        self.user_data.as_deref()
    }

    pub fn user_data_mut(&mut self) -> Option<&mut dyn Any> {
        match self.user_data.as_mut() {
            Some(data) => Some(data.as_mut()),
            None => None,
        }
    }

    // ---- callbacks ----------------------------------------------------

    pub fn set_mouse_callback(&mut self, cbk: MouseFn) {
        self.callbacks.mouse = Some(cbk);
    }

    pub fn set_keyboard_callback(&mut self, cbk: KeyboardFn) {
        self.callbacks.keyboard = Some(cbk);
    }

    pub fn set_focus_callback(&mut self, cbk: FocusFn) {
        self.callbacks.focus = Some(cbk);
    }

    /// Route a normalized input event to the matching user callback.
    pub(crate) fn deliver(&mut self, event: InputEvent) {
        match event {
            InputEvent::Focus { state, changed } => {
                if let Some(cbk) = self.callbacks.focus {
                    cbk(self, state, changed);
                }
            }
            InputEvent::Mouse {
                x,
                y,
                buttons,
                changed,
            } => {
                if let Some(cbk) = self.callbacks.mouse {
                    cbk(self, x, y, buttons, changed);
                }
            }
        }
    }

    pub(crate) fn deliver_key(&mut self, key: u32, pressed: bool) {
        if let Some(cbk) = self.callbacks.keyboard {
            let mods = self.mods.bits();
            cbk(self, key, mods, pressed);
        }
    }

    // ---- visible surface ----------------------------------------------

    /// Open the visible window, either embedded as a child of `parent`
    /// (anchored at the origin; the host positions the parent) or standalone
    /// at `(x, y)`. Width/height of 16 or less fall back to the hidden
    /// window's size. A fresh window class is registered per call so multiple
    /// instances never collide; failure leaves the instance otherwise usable.
    pub fn open(
        &mut self,
        parent: Option<RawWindowHandle>,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) -> Result<()> {
        let size = fallback_size(w, h, self.hidden_size);

        #[cfg(target_os = "windows")]
        {
            crate::win32::window::open_visible(self, parent, x, y, size.0, size.1)?;
        }
        #[cfg(not(target_os = "windows"))]
        {
            let _ = (parent, x, y);
            self.stub.open = true;
            self.stub.visible = true;
        }

        self.win_size = size;
        Ok(())
    }

    /// Close the visible window. A keyboard hook owned by this instance is
    /// uninstalled first, since it would otherwise outlive its target.
    pub fn close(&mut self) {
        #[cfg(target_os = "windows")]
        crate::win32::window::close_visible(self);
        #[cfg(not(target_os = "windows"))]
        {
            self.stub.open = false;
            self.stub.visible = false;
        }
    }

    pub fn show(&mut self) {
        #[cfg(target_os = "windows")]
        crate::win32::window::show_visible(self, true);
        #[cfg(not(target_os = "windows"))]
        {
            if self.stub.open {
                self.stub.visible = true;
            }
        }
    }

    pub fn hide(&mut self) {
        #[cfg(target_os = "windows")]
        crate::win32::window::show_visible(self, false);
        #[cfg(not(target_os = "windows"))]
        {
            if self.stub.open {
                self.stub.visible = false;
            }
        }
    }

    pub fn is_visible(&self) -> bool {
        #[cfg(target_os = "windows")]
        {
            crate::win32::window::is_visible(self)
        }
        #[cfg(not(target_os = "windows"))]
        {
            self.stub.open && self.stub.visible
        }
    }

    /// Last known visible-surface size, recorded at `open`. Native resizes
    /// are deliberately not tracked; an embedding host resizes the parent,
    /// not this window.
    pub fn size(&self) -> (i32, i32) {
        self.win_size
    }

    pub fn hidden_size(&self) -> (i32, i32) {
        self.hidden_size
    }

    pub(crate) fn has_window(&self) -> bool {
        #[cfg(target_os = "windows")]
        {
            self.native.win.is_some()
        }
        #[cfg(not(target_os = "windows"))]
        {
            self.stub.open
        }
    }

    // ---- rendering ----------------------------------------------------

    /// Save whatever GL context is current (the host's own state), then make
    /// this instance's context current on the visible window's device
    /// context, or the hidden one when no window is open. A bind failure is
    /// reported as a diagnostic only; pairing every push with a pop is the
    /// caller's responsibility.
    pub fn context_push(&mut self) {
        #[cfg(target_os = "windows")]
        crate::win32::gl::push(&mut self.native);
    }

    /// Restore the context/device pair captured by the matching
    /// [`context_push`](Self::context_push).
    pub fn context_pop(&mut self) {
        #[cfg(target_os = "windows")]
        crate::win32::gl::pop(&mut self.native);
    }

    /// Present the visible window's back buffer.
    pub fn swap_buffers(&mut self) {
        #[cfg(target_os = "windows")]
        crate::win32::gl::swap_buffers(&self.native);
    }

    /// Best-effort swap interval; silently does nothing when the platform
    /// extension is unavailable.
    pub fn set_swap_interval(&mut self, interval: i32) {
        #[cfg(target_os = "windows")]
        crate::win32::gl::set_swap_interval(interval);
        #[cfg(not(target_os = "windows"))]
        let _ = interval;
    }

    // ---- mouse --------------------------------------------------------

    pub fn mouse_buttons(&self) -> u32 {
        self.tracker.buttons()
    }

    pub fn mouse_pos(&self) -> (i32, i32) {
        self.tracker.pos()
    }

    pub fn grab_mode(&self) -> GrabMode {
        self.tracker.grab_mode()
    }

    pub fn grab(&mut self, mode: GrabMode) {
        if !self.has_window() {
            return;
        }
        let mut cursor = self.cursor();
        self.tracker.grab(mode, &mut cursor);
    }

    pub fn ungrab(&mut self) {
        if !self.has_window() {
            return;
        }
        let mut cursor = self.cursor();
        self.tracker.ungrab(&mut cursor);
    }

    /// Move the physical cursor to client coordinates of the visible window.
    pub fn warp(&mut self, x: i32, y: i32) {
        if !self.has_window() {
            return;
        }
        let mut cursor = self.cursor();
        self.tracker.warp_to(x, y, &mut cursor);
    }

    pub fn cursor_show(&mut self, show: bool) {
        if !self.has_window() {
            return;
        }
        let mut cursor = self.cursor();
        use crate::input::CursorOps;
        cursor.show_cursor(show);
    }

    #[cfg(target_os = "windows")]
    pub(crate) fn cursor(&self) -> crate::win32::cursor::NativeCursor {
        crate::win32::cursor::NativeCursor::for_view(self)
    }

    #[cfg(not(target_os = "windows"))]
    pub(crate) fn cursor(&self) -> crate::input::NullCursor {
        crate::input::NullCursor
    }

    // ---- keyboard -----------------------------------------------------

    pub fn modifiers(&self) -> u32 {
        self.mods.bits()
    }

    pub fn focus_state(&self) -> u32 {
        self.tracker.focus()
    }
}

impl Drop for HostView {
    fn drop(&mut self) {
        self.close();
        #[cfg(target_os = "windows")]
        crate::win32::window::destroy_hidden(&mut self.native);
    }
}
