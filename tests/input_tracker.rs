use hostview::input::{CursorOps, InputEvent, InputTracker};
use hostview::keymap::{FOCUS_MOUSE, MOUSE_WHEELDOWN, MOUSE_WHEELUP};
use hostview::GrabMode;

#[derive(Debug, Default)]
struct RecordingCursor {
    captured: bool,
    hidden: bool,
    warps: Vec<(i32, i32)>,
}

impl CursorOps for RecordingCursor {
    fn set_capture(&mut self) {
        self.captured = true;
    }
    fn release_capture(&mut self) {
        self.captured = false;
    }
    fn show_cursor(&mut self, show: bool) {
        self.hidden = !show;
    }
    fn warp(&mut self, x: i32, y: i32) {
        self.warps.push((x, y));
    }
}

fn motion(tracker: &mut InputTracker, cursor: &mut RecordingCursor, x: i32, y: i32) -> Vec<InputEvent> {
    let mut events = Vec::new();
    tracker.on_motion(x, y, cursor, &mut |e| events.push(e));
    events
}

#[test]
fn warp_accumulation_is_independent_of_recentering_count() {
    let mut tracker = InputTracker::default();
    let mut cursor = RecordingCursor::default();
    motion(&mut tracker, &mut cursor, 200, 200);
    let pre_grab = tracker.pos();

    tracker.grab(GrabMode::Warp, &mut cursor);
    assert!(cursor.hidden);

    let deltas = [(1, -1), (17, 3), (-30, 12), (250, -80), (0, 0)];
    for (dx, dy) in deltas {
        motion(&mut tracker, &mut cursor, 200 + dx, 200 + dy);
    }

    let sum: (i32, i32) = deltas
        .iter()
        .fold((0, 0), |acc, d| (acc.0 + d.0, acc.1 + d.1));
    assert_eq!(tracker.pos(), (pre_grab.0 + sum.0, pre_grab.1 + sum.1));
    // the physical cursor was pinned to the grab origin the whole time
    assert!(cursor.warps.iter().all(|&w| w == (200, 200)));
}

#[test]
fn motion_while_unfocused_enters_exactly_once_before_motion() {
    let mut tracker = InputTracker::default();
    let mut cursor = RecordingCursor::default();

    let events = motion(&mut tracker, &mut cursor, 5, 5);
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        InputEvent::Focus { state, changed } if state & FOCUS_MOUSE != 0 && changed == FOCUS_MOUSE
    ));
    assert!(matches!(events[1], InputEvent::Mouse { changed: 0, .. }));

    let events = motion(&mut tracker, &mut cursor, 6, 6);
    assert_eq!(events.len(), 1);
}

#[test]
fn leave_then_motion_reenters() {
    let mut tracker = InputTracker::default();
    let mut cursor = RecordingCursor::default();
    motion(&mut tracker, &mut cursor, 5, 5);

    let mut left = Vec::new();
    tracker.on_leave(&mut |e| left.push(e));
    assert_eq!(
        left,
        vec![InputEvent::Focus {
            state: 0,
            changed: FOCUS_MOUSE
        }]
    );

    let events = motion(&mut tracker, &mut cursor, 7, 7);
    assert_eq!(events.len(), 2, "re-entry must fire a fresh focus event");
}

#[test]
fn wheel_scroll_leaves_button_mask_unchanged() {
    let mut tracker = InputTracker::default();

    let mut events = Vec::new();
    tracker.on_wheel(120, &mut |e| events.push(e));
    tracker.on_wheel(-120, &mut |e| events.push(e));

    let changed: Vec<u32> = events
        .iter()
        .map(|e| match e {
            InputEvent::Mouse { changed, .. } => *changed,
            InputEvent::Focus { .. } => panic!("unexpected focus event"),
        })
        .collect();
    assert_eq!(
        changed,
        vec![MOUSE_WHEELUP, MOUSE_WHEELUP, MOUSE_WHEELDOWN, MOUSE_WHEELDOWN]
    );
    assert_eq!(tracker.buttons(), 0);
}

#[test]
fn switching_grab_modes_cleans_up_like_an_explicit_ungrab() {
    let mut direct = InputTracker::default();
    let mut explicit = InputTracker::default();
    let mut cur_direct = RecordingCursor::default();
    let mut cur_explicit = RecordingCursor::default();

    motion(&mut direct, &mut cur_direct, 40, 40);
    motion(&mut explicit, &mut cur_explicit, 40, 40);

    direct.grab(GrabMode::Capture, &mut cur_direct);
    direct.grab(GrabMode::Warp, &mut cur_direct);

    explicit.grab(GrabMode::Capture, &mut cur_explicit);
    explicit.ungrab(&mut cur_explicit);
    explicit.grab(GrabMode::Warp, &mut cur_explicit);

    assert_eq!(direct.grab_mode(), explicit.grab_mode());
    assert_eq!(cur_direct.captured, cur_explicit.captured);
    assert_eq!(cur_direct.hidden, cur_explicit.hidden);
    assert_eq!(cur_direct.warps, cur_explicit.warps);
}

#[test]
fn capture_loss_during_warp_leaves_cursor_hidden_and_unmoved() {
    let mut tracker = InputTracker::default();
    let mut cursor = RecordingCursor::default();
    motion(&mut tracker, &mut cursor, 10, 10);

    tracker.grab(GrabMode::Warp, &mut cursor);
    motion(&mut tracker, &mut cursor, 25, 25);
    let warps_before = cursor.warps.clone();

    tracker.on_capture_lost();

    assert_eq!(tracker.grab_mode(), GrabMode::None);
    assert!(cursor.hidden, "cursor must stay hidden after forced reset");
    assert_eq!(cursor.warps, warps_before, "no warp-back on forced reset");
}
