//! Mouse focus, button, and grab/warp state tracking.
//!
//! The tracker turns raw native events into normalized [`InputEvent`]s. It
//! never touches the real cursor directly; capture, visibility and warping go
//! through [`CursorOps`] so the state machine can be driven in tests by a
//! recording fake.

use crate::keymap::{FOCUS_MOUSE, MOUSE_WHEELDOWN, MOUSE_WHEELUP};

/// How pointer events are pinned to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrabMode {
    /// No grab; events follow normal hit testing.
    #[default]
    None,
    /// Pin all pointer events to the surface.
    Capture,
    /// Capture, hide the cursor and continuously re-center it, accumulating
    /// relative motion into a virtual position. Used for unbounded drags.
    Warp,
}

/// Real-cursor side effects the tracker needs.
pub trait CursorOps {
    fn set_capture(&mut self);
    fn release_capture(&mut self);
    fn show_cursor(&mut self, show: bool);
    /// Move the physical cursor to client coordinates.
    fn warp(&mut self, x: i32, y: i32);
}

/// Cursor backend that does nothing. Used when no native surface exists.
#[derive(Debug, Default)]
pub struct NullCursor;

impl CursorOps for NullCursor {
    fn set_capture(&mut self) {}
    fn release_capture(&mut self) {}
    fn show_cursor(&mut self, _show: bool) {}
    fn warp(&mut self, _x: i32, _y: i32) {}
}

/// Normalized event emitted by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Focus bitmask changed; `changed` holds the single bit that flipped.
    Focus { state: u32, changed: u32 },
    /// Pointer motion or button change; `changed` is the single button bit
    /// that flipped, or 0 for pure motion.
    Mouse {
        x: i32,
        y: i32,
        buttons: u32,
        changed: u32,
    },
}

#[derive(Debug, Default)]
pub struct InputTracker {
    pos: (i32, i32),
    buttons: u32,
    focus: u32,
    grab_mode: GrabMode,
    grab_origin: (i32, i32),
}

impl InputTracker {
    pub fn pos(&self) -> (i32, i32) {
        self.pos
    }

    pub fn buttons(&self) -> u32 {
        self.buttons
    }

    pub fn focus(&self) -> u32 {
        self.focus
    }

    pub fn grab_mode(&self) -> GrabMode {
        self.grab_mode
    }

    pub fn has_mouse_focus(&self) -> bool {
        self.focus & FOCUS_MOUSE != 0
    }

    /// Raw pointer motion. In warp mode the physical cursor is re-centered on
    /// the grab origin every event and the delta is accumulated into the
    /// virtual position, so the tracked position is unbounded by the screen.
    /// A motion while unfocused performs the enter transition first.
    pub fn on_motion(
        &mut self,
        x: i32,
        y: i32,
        cursor: &mut dyn CursorOps,
        emit: &mut dyn FnMut(InputEvent),
    ) {
        if self.grab_mode == GrabMode::Warp {
            cursor.warp(self.grab_origin.0, self.grab_origin.1);
            self.pos.0 += x - self.grab_origin.0;
            self.pos.1 += y - self.grab_origin.1;
        } else {
            self.pos = (x, y);
        }

        if !self.has_mouse_focus() {
            self.focus |= FOCUS_MOUSE;
            emit(InputEvent::Focus {
                state: self.focus,
                changed: FOCUS_MOUSE,
            });
        }

        emit(InputEvent::Mouse {
            x: self.pos.0,
            y: self.pos.1,
            buttons: self.buttons,
            changed: 0,
        });
    }

    /// One-shot native leave notification.
    pub fn on_leave(&mut self, emit: &mut dyn FnMut(InputEvent)) {
        if !self.has_mouse_focus() {
            return;
        }
        self.focus &= !FOCUS_MOUSE;
        emit(InputEvent::Focus {
            state: self.focus,
            changed: FOCUS_MOUSE,
        });
    }

    pub fn on_button(&mut self, pressed: bool, button: u32, emit: &mut dyn FnMut(InputEvent)) {
        if pressed {
            self.buttons |= button;
        } else {
            self.buttons &= !button;
        }
        emit(InputEvent::Mouse {
            x: self.pos.0,
            y: self.pos.1,
            buttons: self.buttons,
            changed: button,
        });
    }

    /// Wheel scroll: synthesized press+release pair of the direction
    /// pseudo-button, chosen by the sign of the delta.
    pub fn on_wheel(&mut self, delta: i32, emit: &mut dyn FnMut(InputEvent)) {
        let button = if delta > 0 {
            MOUSE_WHEELUP
        } else {
            MOUSE_WHEELDOWN
        };
        self.on_button(true, button, emit);
        self.on_button(false, button, emit);
    }

    /// Switch grab mode. Switching away from an active mode fully ungrabs it
    /// first, so `grab(X); grab(Y)` behaves like `ungrab(); grab(Y)`.
    pub fn grab(&mut self, mode: GrabMode, cursor: &mut dyn CursorOps) {
        if self.grab_mode != mode {
            self.ungrab(cursor);
        }
        match mode {
            GrabMode::None => {}
            GrabMode::Capture => {
                cursor.set_capture();
                self.grab_mode = mode;
            }
            GrabMode::Warp => {
                cursor.set_capture();
                cursor.show_cursor(false);
                self.grab_origin = self.pos;
                self.grab_mode = mode;
            }
        }
    }

    /// Reverse the active grab. Warp mode additionally returns the physical
    /// cursor to the grab origin and restores its visibility.
    pub fn ungrab(&mut self, cursor: &mut dyn CursorOps) {
        match self.grab_mode {
            GrabMode::None => {}
            GrabMode::Capture => {
                cursor.release_capture();
                self.grab_mode = GrabMode::None;
            }
            GrabMode::Warp => {
                cursor.release_capture();
                self.grab_mode = GrabMode::None;
                cursor.warp(self.grab_origin.0, self.grab_origin.1);
                cursor.show_cursor(true);
            }
        }
    }

    /// The environment revoked capture (e.g. alt-tab). Resynchronize the mode
    /// without the full ungrab path: no warp-back, no cursor-visibility
    /// restore, since the surface state is no longer ours to fix up.
    pub fn on_capture_lost(&mut self) {
        self.grab_mode = GrabMode::None;
    }

    /// Move the physical cursor to client coordinates. Outside warp mode the
    /// tracked position follows the request; in warp mode the virtual
    /// position is left to the accumulation logic.
    pub fn warp_to(&mut self, x: i32, y: i32, cursor: &mut dyn CursorOps) {
        cursor.warp(x, y);
        if self.grab_mode != GrabMode::Warp {
            self.pos = (x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{FOCUS_MOUSE, MOUSE_LBUTTON};

    #[derive(Debug, Default)]
    struct FakeCursor {
        captured: bool,
        visible_delta: i32,
        warps: Vec<(i32, i32)>,
    }

    impl CursorOps for FakeCursor {
        fn set_capture(&mut self) {
            self.captured = true;
        }
        fn release_capture(&mut self) {
            self.captured = false;
        }
        fn show_cursor(&mut self, show: bool) {
            self.visible_delta += if show { 1 } else { -1 };
        }
        fn warp(&mut self, x: i32, y: i32) {
            self.warps.push((x, y));
        }
    }

    fn collect(tracker: &mut InputTracker, f: impl FnOnce(&mut InputTracker, &mut dyn FnMut(InputEvent))) -> Vec<InputEvent> {
        let mut events = Vec::new();
        f(tracker, &mut |e| events.push(e));
        events
    }

    #[test]
    fn first_motion_enters_then_moves() {
        let mut tracker = InputTracker::default();
        let mut cursor = NullCursor;
        let events = collect(&mut tracker, |t, emit| t.on_motion(10, 20, &mut cursor, emit));
        assert_eq!(
            events,
            vec![
                InputEvent::Focus {
                    state: FOCUS_MOUSE,
                    changed: FOCUS_MOUSE
                },
                InputEvent::Mouse {
                    x: 10,
                    y: 20,
                    buttons: 0,
                    changed: 0
                },
            ]
        );

        // second motion: no further enter
        let events = collect(&mut tracker, |t, emit| t.on_motion(11, 21, &mut cursor, emit));
        assert_eq!(
            events,
            vec![InputEvent::Mouse {
                x: 11,
                y: 21,
                buttons: 0,
                changed: 0
            }]
        );
    }

    #[test]
    fn leave_fires_once() {
        let mut tracker = InputTracker::default();
        let mut cursor = NullCursor;
        collect(&mut tracker, |t, emit| t.on_motion(0, 0, &mut cursor, emit));

        let events = collect(&mut tracker, InputTracker::on_leave);
        assert_eq!(
            events,
            vec![InputEvent::Focus {
                state: 0,
                changed: FOCUS_MOUSE
            }]
        );
        assert!(collect(&mut tracker, InputTracker::on_leave).is_empty());
    }

    #[test]
    fn buttons_or_and_mask_out() {
        let mut tracker = InputTracker::default();
        let events = collect(&mut tracker, |t, emit| {
            t.on_button(true, MOUSE_LBUTTON, emit);
            t.on_button(false, MOUSE_LBUTTON, emit);
        });
        assert_eq!(
            events,
            vec![
                InputEvent::Mouse {
                    x: 0,
                    y: 0,
                    buttons: MOUSE_LBUTTON,
                    changed: MOUSE_LBUTTON
                },
                InputEvent::Mouse {
                    x: 0,
                    y: 0,
                    buttons: 0,
                    changed: MOUSE_LBUTTON
                },
            ]
        );
    }

    #[test]
    fn wheel_emits_press_release_pair_and_leaves_mask_clean() {
        let mut tracker = InputTracker::default();
        let up = collect(&mut tracker, |t, emit| t.on_wheel(120, emit));
        assert_eq!(
            up,
            vec![
                InputEvent::Mouse {
                    x: 0,
                    y: 0,
                    buttons: MOUSE_WHEELUP,
                    changed: MOUSE_WHEELUP
                },
                InputEvent::Mouse {
                    x: 0,
                    y: 0,
                    buttons: 0,
                    changed: MOUSE_WHEELUP
                },
            ]
        );
        let down = collect(&mut tracker, |t, emit| t.on_wheel(-120, emit));
        assert_eq!(down.len(), 2);
        assert_eq!(tracker.buttons(), 0);
    }

    #[test]
    fn warp_accumulates_relative_motion() {
        let mut tracker = InputTracker::default();
        let mut cursor = FakeCursor::default();
        collect(&mut tracker, |t, emit| t.on_motion(100, 100, &mut cursor, emit));

        tracker.grab(GrabMode::Warp, &mut cursor);
        assert!(cursor.captured);
        assert_eq!(cursor.visible_delta, -1);

        // three raw events around the origin; the physical cursor is
        // re-centered each time while the virtual position integrates deltas
        let deltas = [(5, 0), (-3, 7), (40, -2)];
        for (dx, dy) in deltas {
            collect(&mut tracker, |t, emit| {
                t.on_motion(100 + dx, 100 + dy, &mut cursor, emit)
            });
        }
        assert_eq!(tracker.pos(), (100 + 5 - 3 + 40, 100 + 7 - 2));
        assert_eq!(cursor.warps, vec![(100, 100); 3]);
    }

    #[test]
    fn regrab_equals_ungrab_then_grab() {
        let mut a = InputTracker::default();
        let mut b = InputTracker::default();
        let mut cur_a = FakeCursor::default();
        let mut cur_b = FakeCursor::default();
        collect(&mut a, |t, emit| t.on_motion(50, 60, &mut cur_a, emit));
        collect(&mut b, |t, emit| t.on_motion(50, 60, &mut cur_b, emit));

        a.grab(GrabMode::Warp, &mut cur_a);
        a.grab(GrabMode::Capture, &mut cur_a);

        b.grab(GrabMode::Warp, &mut cur_b);
        b.ungrab(&mut cur_b);
        b.grab(GrabMode::Capture, &mut cur_b);

        assert_eq!(a.grab_mode(), b.grab_mode());
        assert_eq!(cur_a.visible_delta, cur_b.visible_delta);
        assert_eq!(cur_a.warps, cur_b.warps);
        assert_eq!(cur_a.captured, cur_b.captured);
    }

    #[test]
    fn ungrab_warp_restores_cursor() {
        let mut tracker = InputTracker::default();
        let mut cursor = FakeCursor::default();
        collect(&mut tracker, |t, emit| t.on_motion(30, 40, &mut cursor, emit));

        tracker.grab(GrabMode::Warp, &mut cursor);
        collect(&mut tracker, |t, emit| t.on_motion(90, 90, &mut cursor, emit));
        cursor.warps.clear();

        tracker.ungrab(&mut cursor);
        assert_eq!(tracker.grab_mode(), GrabMode::None);
        assert!(!cursor.captured);
        assert_eq!(cursor.visible_delta, 0);
        assert_eq!(cursor.warps, vec![(30, 40)]); // back to the grab origin
    }

    #[test]
    fn capture_loss_resets_mode_without_side_effects() {
        let mut tracker = InputTracker::default();
        let mut cursor = FakeCursor::default();
        collect(&mut tracker, |t, emit| t.on_motion(10, 10, &mut cursor, emit));

        tracker.grab(GrabMode::Warp, &mut cursor);
        let warps_before = cursor.warps.len();

        tracker.on_capture_lost();
        assert_eq!(tracker.grab_mode(), GrabMode::None);
        // cursor stays hidden and wherever it was: no warp-back, no re-show
        assert_eq!(cursor.visible_delta, -1);
        assert_eq!(cursor.warps.len(), warps_before);
    }

    #[test]
    fn warp_to_updates_position_outside_warp_mode() {
        let mut tracker = InputTracker::default();
        let mut cursor = FakeCursor::default();
        tracker.warp_to(7, 9, &mut cursor);
        assert_eq!(tracker.pos(), (7, 9));
        assert_eq!(cursor.warps, vec![(7, 9)]);

        collect(&mut tracker, |t, emit| t.on_motion(7, 9, &mut cursor, emit));
        tracker.grab(GrabMode::Warp, &mut cursor);
        tracker.warp_to(1, 1, &mut cursor);
        assert_eq!(tracker.pos(), (7, 9)); // virtual position untouched
    }
}
