//! Card state algebra: pure types, zero effects.
//!
//! These types define the whole state space of the card. The transition
//! function (`update`), the Book view logic (`book`) and the rendering layer
//! (`layout`, `view`) all program against them.
//!
//! Design principle: [`Card`] is the root controller's state. The only
//! Book-local pieces (gesture coordinates, the evasive button's position)
//! live in [`BookState`], which the root carries but never inspects.

use crossterm::event::Event;

use crate::content::{question_index, Page};
use crate::hearts::Heart;
use crate::timer::TimerKind;

// ============================================================================
// APP EVENTS
// ============================================================================

/// Everything the event loop can receive from its channel.
///
/// A terminal reader thread is the only producer; timers are polled by the
/// loop itself.
#[derive(Debug)]
pub enum AppEvent {
    /// A raw terminal event (key, mouse, focus, resize).
    Terminal(Event),
    /// The reader thread hit an I/O error and stopped.
    ReaderFailed(String),
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Top-level model: the static book plus the live card state.
#[derive(Debug)]
pub struct App {
    pub pages: Vec<Page>,
    pub card: Card,
    /// Set to true when the app should exit on the next tick.
    pub should_quit: bool,
}

/// The root controller's state.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Number of pages in the book. Fixed for the session.
    pub page_count: usize,
    /// Whether the last page's front holds the question.
    pub has_question: bool,
    /// 0 is the closed cover, `page_count` is the terminal page.
    pub current: usize,
    pub nudge: Nudge,
    /// The book is stepping shut after a yes.
    pub closing: bool,
    /// Hearts are falling. Terminal for the session.
    pub celebrating: bool,
    /// Status line under the prompt. Persists until overwritten.
    pub response: String,
    pub audio: AudioState,
    /// Particles for the running celebration; empty otherwise.
    pub hearts: Vec<Heart>,
    /// Animation frames elapsed since the celebration began.
    pub celebration_frames: u32,
    pub book: BookState,
}

/// Transient bend after a discrete page turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Nudge {
    #[default]
    None,
    Forward,
    Back,
}

impl Nudge {
    /// Bend angle in degrees.
    pub fn angle(self) -> f32 {
        match self {
            Nudge::None => 0.0,
            Nudge::Forward => 8.0,
            Nudge::Back => -8.0,
        }
    }
}

/// Where the ambient track stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioState {
    /// Not attempted yet.
    #[default]
    Unstarted,
    Playing,
    /// Start was refused; the manual start overlay is showing.
    NeedsStart,
}

// ============================================================================
// BOOK-LOCAL STATE
// ============================================================================

/// State owned by the Book view. Never read by the root controller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookState {
    pub gesture: Gesture,
    /// Relocated "No" button, relative to the prompt zone. None means the
    /// button sits in its default spot.
    pub no_position: Option<Position>,
}

/// A horizontal drag in progress. Coordinates are pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gesture {
    pub start_x: Option<f32>,
    pub drag_delta: f32,
}

/// Offset in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

/// Extent in terminal cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Semantic input, decoupled from raw terminal events.
///
/// The effects layer maps keys, mouse events and timers to Actions. Pixel
/// coordinates are already converted from columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Controls bar "next" (or arrow key).
    Forward,
    /// Controls bar "previous" (or arrow key).
    Back,
    /// Pointer pressed on the book.
    PointerDown { x: f32 },
    /// Pointer moved while over the book.
    PointerMove { x: f32 },
    /// Pointer released.
    PointerUp { x: f32 },
    /// Pointer left the book; the gesture ends where it last was.
    PointerLeave,
    /// Pointer entered the "No" button.
    HoverNo { zone: Size, button: Size },
    /// Pointer pressed on the "No" button.
    PressNo { zone: Size, button: Size },
    /// "Yes" activated.
    PressYes,
    /// Manual start overlay activated.
    StartAudio,
    /// The card was mounted; attempt autoplay.
    Mounted,
    /// The card became visible again after being suspended.
    Resumed,
    /// Outcome of a playback attempt.
    AudioStarted,
    AudioBlocked,
    /// A timer fell due.
    Timer(TimerKind),
    Quit,
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of a pure state transition: the next card and the effects the
/// boundary must carry out, in order.
#[derive(Debug, PartialEq)]
pub struct Transition {
    pub card: Card,
    pub effects: Vec<Effect>,
}

/// Side effect requested by a pure transition.
///
/// Pure code never executes these; the effects boundary interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// (Re)arm the one-shot nudge clear, superseding any pending one.
    ArmNudgeClear,
    /// Start the repeating closing step.
    StartClosing,
    /// Cancel the closing step.
    StopClosing,
    /// Start the celebration frame timer.
    StartFrames,
    /// Rewind and play the track; report back AudioStarted/AudioBlocked.
    RestartAudio,
    /// Check whether the track ended and needs looping.
    PollAudio,
    Quit,
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl Card {
    /// A closed book with nothing happening.
    pub fn new(page_count: usize, has_question: bool) -> Self {
        Card {
            page_count,
            has_question,
            current: 0,
            nudge: Nudge::None,
            closing: false,
            celebrating: false,
            response: String::new(),
            audio: AudioState::Unstarted,
            hearts: Vec::new(),
            celebration_frames: 0,
            book: BookState::default(),
        }
    }

    /// All navigation and response input is ignored while locked.
    pub fn is_locked(&self) -> bool {
        self.closing || self.celebrating
    }

    /// Open on the question face.
    pub fn on_terminal_page(&self) -> bool {
        self.has_question && self.current == self.page_count
    }

    /// Pages shown by the counter, the cover included.
    pub fn total_pages(&self) -> usize {
        self.page_count + 1
    }

    pub fn show_start_overlay(&self) -> bool {
        self.audio == AudioState::NeedsStart
    }
}

/// Placeholder used while a Card is moved through `update`.
impl Default for Card {
    fn default() -> Self {
        Card::new(0, false)
    }
}

impl App {
    pub fn new(pages: Vec<Page>) -> Self {
        let card = Card::new(pages.len(), question_index(&pages).is_some());
        App {
            pages,
            card,
            should_quit: false,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
