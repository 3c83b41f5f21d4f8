//! Book view logic: gestures, page stacking, and the evasive "No" button.
//!
//! The Book owns [`BookState`] and turns raw pointer input into
//! [`Intent`]s for the root controller. Everything here is pure; the
//! randomness source is passed in.

use rand::Rng;

use super::state::{BookState, Gesture, Nudge, Position, Size};

/// Horizontal travel, in pixels, a drag must exceed to turn a page.
pub const SWIPE_THRESHOLD_PX: f32 = 50.0;

/// Largest bend, in degrees, a drag can put on the turning page.
pub const MAX_BEND_DEG: f32 = 18.0;

/// Pixels of drag per degree of bend.
const PX_PER_DEGREE: f32 = 8.0;

/// Margin, in cells, the evasive button keeps from the zone's far edges.
pub const EVASIVE_PADDING: u16 = 1;

pub const WAITING_RESPONSE: &str = "I will wait for the perfect yes.";

/// What the Book asks the root controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Next,
    Prev,
    Respond(String),
    Yes,
}

// ============================================================================
// GESTURES
// ============================================================================

/// Pointer pressed on the book. Ignored while locked.
pub fn pointer_down(book: &mut BookState, x: f32, locked: bool) {
    if locked {
        return;
    }
    book.gesture = Gesture {
        start_x: Some(x),
        drag_delta: 0.0,
    };
}

/// Pointer moved. Only tracked while a drag is in progress.
pub fn pointer_move(book: &mut BookState, x: f32, locked: bool) {
    if locked {
        return;
    }
    if let Some(start) = book.gesture.start_x {
        book.gesture.drag_delta = x - start;
    }
}

/// Pointer released at `x`. The gesture is always cleared.
pub fn pointer_up(book: &mut BookState, x: f32) -> Option<Intent> {
    let delta = book.gesture.start_x.map(|start| x - start);
    book.gesture = Gesture::default();
    delta.and_then(swipe_intent)
}

/// Pointer left the book: the drag ends at its last known offset.
pub fn pointer_leave(book: &mut BookState) -> Option<Intent> {
    let delta = book.gesture.start_x.map(|_| book.gesture.drag_delta);
    book.gesture = Gesture::default();
    delta.and_then(swipe_intent)
}

fn swipe_intent(delta: f32) -> Option<Intent> {
    if delta > SWIPE_THRESHOLD_PX {
        Some(Intent::Next)
    } else if delta < -SWIPE_THRESHOLD_PX {
        Some(Intent::Prev)
    } else {
        None
    }
}

// ============================================================================
// STACKING
// ============================================================================

/// Index of the page currently mid-turn.
pub fn turning_index(current: usize) -> usize {
    current.saturating_sub(1)
}

/// A page is flipped out of view once the book has moved past it.
pub fn is_flipped(index: usize, current: usize) -> bool {
    index < turning_index(current)
}

/// Earlier pages sit on top while unflipped.
pub fn z_order(index: usize, page_count: usize) -> usize {
    page_count.saturating_sub(index)
}

/// Page whose back faces up on the left, or `None` for the inside cover.
///
/// Flipped pages land face down in reverse order, so the lowest of them in
/// the unflipped order ends up on top.
pub fn top_flipped(current: usize, page_count: usize) -> Option<usize> {
    (0..page_count)
        .filter(|&i| is_flipped(i, current))
        .min_by_key(|&i| z_order(i, page_count))
}

/// Page whose front faces up on the right.
pub fn top_unflipped(current: usize, page_count: usize) -> Option<usize> {
    (0..page_count)
        .filter(|&i| !is_flipped(i, current))
        .max_by_key(|&i| z_order(i, page_count))
}

/// Bend of page `index` in degrees.
///
/// Only the turning page bends: by the live drag if one is in progress,
/// otherwise by the transient nudge.
pub fn bend_angle(index: usize, current: usize, nudge: Nudge, gesture: &Gesture) -> f32 {
    if index != turning_index(current) {
        return 0.0;
    }
    if gesture.drag_delta == 0.0 {
        nudge.angle()
    } else {
        (gesture.drag_delta / PX_PER_DEGREE).clamp(-MAX_BEND_DEG, MAX_BEND_DEG)
    }
}

// ============================================================================
// EVASIVE BUTTON
// ============================================================================

/// Pick a random spot for a button of `button` size so that it stays within
/// `zone`, keeping `padding` cells clear of the far edges.
///
/// Always returns a position in `0..=max(0, zone - button - padding)` on
/// each axis.
pub fn compute_evasive_position<R: Rng + ?Sized>(
    zone: Size,
    button: Size,
    padding: u16,
    rng: &mut R,
) -> Position {
    let max_x = zone.width.saturating_sub(button.width).saturating_sub(padding);
    let max_y = zone.height.saturating_sub(button.height).saturating_sub(padding);
    Position {
        x: rng.gen_range(0..=max_x),
        y: rng.gen_range(0..=max_y),
    }
}

/// Pointer entered the "No" button. Ignored while locked.
pub fn hover_no<R: Rng + ?Sized>(
    book: &mut BookState,
    zone: Size,
    button: Size,
    locked: bool,
    rng: &mut R,
) {
    if locked {
        return;
    }
    book.no_position = Some(compute_evasive_position(zone, button, EVASIVE_PADDING, rng));
}

/// Pointer pressed on the "No" button: it jumps away before it can be
/// released on, and the card records that it is still waiting.
pub fn press_no<R: Rng + ?Sized>(
    book: &mut BookState,
    zone: Size,
    button: Size,
    locked: bool,
    rng: &mut R,
) -> Option<Intent> {
    if locked {
        return None;
    }
    hover_no(book, zone, button, locked, rng);
    Some(Intent::Respond(WAITING_RESPONSE.to_string()))
}

/// The "Yes" button is disabled while locked.
pub fn press_yes(locked: bool) -> Option<Intent> {
    (!locked).then_some(Intent::Yes)
}

/// Put the "No" button back whenever the book is not on the question.
pub fn sync_to_page(book: &mut BookState, on_terminal_page: bool) {
    if !on_terminal_page {
        book.no_position = None;
    }
}

// ============================================================================
// TESTS
// ============================================================================
