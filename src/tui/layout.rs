//! Pure screen geometry shared by rendering and hit-testing.
//!
//! The view draws into these rectangles and the event loop resolves mouse
//! clicks against the very same ones, so what you see is what you click.

use ratatui::layout::{Constraint, Layout, Rect};

use super::book::{bend_angle, turning_index};
use super::state::{Card, Size};

pub const YES_LABEL: &str = "[ Yes ]";
pub const NO_LABEL: &str = "[ No ]";
pub const PREV_LABEL: &str = "[ ◀ ]";
pub const NEXT_LABEL: &str = "[ ▶ ]";
pub const START_LABEL: &str = "♥  A Love Story  ♥";

const MAX_BOOK_WIDTH: u16 = 100;
const MAX_BOOK_HEIGHT: u16 = 30;
const PAGER_WIDTH: u16 = 9;
const CONTROL_GAP: u16 = 2;

/// Degrees of bend per column a leaf curls in by.
const DEGREES_PER_COLUMN: f32 = 3.0;

/// Every region the card draws or reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regions {
    pub title: Rect,
    pub book: Rect,
    /// Left leaf of the open spread. None while the cover is closed.
    pub left: Option<Rect>,
    /// Right leaf (the turning page), or the cover when closed.
    pub right: Rect,
    /// Present only on the question page.
    pub prompt: Option<Prompt>,
    pub prev: Rect,
    pub pager: Rect,
    pub next: Rect,
    pub help: Rect,
    /// Present only while the manual start overlay shows.
    pub start: Option<Rect>,
}

/// The question face's interactive area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    /// Area the "No" button may escape within.
    pub zone: Rect,
    pub yes: Rect,
    pub no: Rect,
    pub response: Rect,
}

impl Prompt {
    pub fn zone_size(&self) -> Size {
        size_of(self.zone)
    }

    /// Nominal button size, independent of any clipping at the zone edge.
    pub fn no_size(&self) -> Size {
        Size {
            width: label_width(NO_LABEL),
            height: 1,
        }
    }
}

/// What a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Start,
    Prev,
    Next,
    Yes,
    No,
    Book,
}

// ============================================================================
// COMPUTATION
// ============================================================================

/// Lay out the whole screen for the given card.
pub fn regions(area: Rect, card: &Card) -> Regions {
    let [title, middle, controls, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let book = centered(
        middle,
        MAX_BOOK_WIDTH.min(middle.width),
        MAX_BOOK_HEIGHT.min(middle.height),
    );
    let half = book.width / 2;
    let left_leaf = Rect::new(book.x, book.y, half, book.height);
    let right_leaf = Rect::new(book.x + half, book.y, book.width - half, book.height);

    let (left, right) = if card.current == 0 {
        (None, right_leaf)
    } else {
        let turning = turning_index(card.current);
        let bend = bend_angle(turning, card.current, card.nudge, &card.book.gesture);
        (Some(left_leaf), curl(right_leaf, bend))
    };

    let prompt = card.on_terminal_page().then(|| prompt_for(right, card));

    let (prev, pager, next) = controls_row(controls);

    let start = card.show_start_overlay().then(|| {
        centered(area, (label_width(START_LABEL) + 4).min(area.width), 3u16.min(area.height))
    });

    Regions {
        title,
        book,
        left,
        right,
        prompt,
        prev,
        pager,
        next,
        help,
        start,
    }
}

/// Narrow a leaf toward the side it curls to.
fn curl(leaf: Rect, bend: f32) -> Rect {
    let cols = ((bend.abs() / DEGREES_PER_COLUMN).round() as u16).min(leaf.width / 4);
    if bend > 0.0 {
        Rect::new(leaf.x + cols, leaf.y, leaf.width - cols, leaf.height)
    } else {
        Rect::new(leaf.x, leaf.y, leaf.width - cols, leaf.height)
    }
}

fn prompt_for(leaf: Rect, card: &Card) -> Prompt {
    let zone = inner(leaf);
    let bottom = zone.y + zone.height;
    let answer_row = bottom.saturating_sub(3).max(zone.y);
    let response_row = bottom.saturating_sub(1).max(zone.y);

    let yes_w = label_width(YES_LABEL);
    let no_w = label_width(NO_LABEL);
    let row_w = yes_w + CONTROL_GAP * 2 + no_w;
    let row_x = zone.x + zone.width.saturating_sub(row_w) / 2;

    let yes = clip(Rect::new(row_x, answer_row, yes_w, 1), zone);
    let no = match card.book.no_position {
        Some(pos) => Rect::new(zone.x + pos.x, zone.y + pos.y, no_w, 1),
        None => Rect::new(row_x + yes_w + CONTROL_GAP * 2, answer_row, no_w, 1),
    };

    Prompt {
        zone,
        yes,
        no: clip(no, zone),
        response: Rect::new(zone.x, response_row, zone.width, 1u16.min(zone.height)),
    }
}

fn controls_row(row: Rect) -> (Rect, Rect, Rect) {
    let prev_w = label_width(PREV_LABEL);
    let next_w = label_width(NEXT_LABEL);
    let total = prev_w + PAGER_WIDTH + next_w + CONTROL_GAP * 2;
    let x = row.x + row.width.saturating_sub(total) / 2;

    let prev = clip(Rect::new(x, row.y, prev_w, row.height), row);
    let pager = clip(Rect::new(x + prev_w + CONTROL_GAP, row.y, PAGER_WIDTH, row.height), row);
    let next = clip(
        Rect::new(x + prev_w + CONTROL_GAP * 2 + PAGER_WIDTH, row.y, next_w, row.height),
        row,
    );
    (prev, pager, next)
}

// ============================================================================
// HIT TESTING
// ============================================================================

/// Resolve a cell to the control under it.
///
/// The start overlay swallows every click while it shows.
pub fn hit(regions: &Regions, col: u16, row: u16) -> Option<Target> {
    if let Some(start) = regions.start {
        return contains(start, col, row).then_some(Target::Start);
    }
    if contains(regions.prev, col, row) {
        return Some(Target::Prev);
    }
    if contains(regions.next, col, row) {
        return Some(Target::Next);
    }
    if let Some(prompt) = &regions.prompt {
        if contains(prompt.no, col, row) {
            return Some(Target::No);
        }
        if contains(prompt.yes, col, row) {
            return Some(Target::Yes);
        }
    }
    contains(regions.book, col, row).then_some(Target::Book)
}

// ============================================================================
// HELPERS
// ============================================================================

pub fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Inside a bordered leaf, with one column of breathing room.
pub fn inner(leaf: Rect) -> Rect {
    if leaf.width < 4 || leaf.height < 2 {
        return Rect::new(leaf.x, leaf.y, 0, 0);
    }
    Rect::new(leaf.x + 2, leaf.y + 1, leaf.width - 4, leaf.height - 2)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn clip(rect: Rect, within: Rect) -> Rect {
    rect.intersection(within)
}

fn size_of(rect: Rect) -> Size {
    Size {
        width: rect.width,
        height: rect.height,
    }
}

pub fn label_width(label: &str) -> u16 {
    u16::try_from(label.chars().count()).unwrap_or(u16::MAX)
}

// ============================================================================
// TESTS
// ============================================================================
