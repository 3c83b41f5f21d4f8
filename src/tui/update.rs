//! Pure state transitions: (Card, Action) → Transition.
//!
//! This is the root controller. Fully testable without a terminal.
//! Pointer and button input goes through the Book first, which answers
//! with an [`Intent`]; the controller applies intents, timers and audio
//! outcomes. The only impurity is the random source, which is injected.

use rand::Rng;

use crate::hearts;
use crate::timer::TimerKind;

use super::book::{self, Intent};
use super::state::{Action, AudioState, Card, Effect, Nudge, Transition};

/// Shown once the reader says yes.
pub const YES_RESPONSE: &str = "You just made this the best day ever.";

/// Pure state transition function.
pub fn update<R: Rng + ?Sized>(card: Card, action: &Action, rng: &mut R) -> Transition {
    let mut card = card;
    let mut effects = Vec::new();
    let locked = card.is_locked();

    let intent = match action {
        Action::Forward => Some(Intent::Next),
        Action::Back => Some(Intent::Prev),
        Action::PointerDown { x } => {
            book::pointer_down(&mut card.book, *x, locked);
            None
        }
        Action::PointerMove { x } => {
            book::pointer_move(&mut card.book, *x, locked);
            None
        }
        Action::PointerUp { x } => book::pointer_up(&mut card.book, *x),
        Action::PointerLeave => book::pointer_leave(&mut card.book),
        Action::HoverNo { zone, button } => {
            if card.on_terminal_page() {
                book::hover_no(&mut card.book, *zone, *button, locked, rng);
            }
            None
        }
        Action::PressNo { zone, button } => {
            if card.on_terminal_page() {
                book::press_no(&mut card.book, *zone, *button, locked, rng)
            } else {
                None
            }
        }
        Action::PressYes => {
            if card.on_terminal_page() {
                book::press_yes(locked)
            } else {
                None
            }
        }
        Action::Mounted => {
            effects.push(Effect::RestartAudio);
            None
        }
        Action::Resumed => {
            if card.audio != AudioState::Playing {
                effects.push(Effect::RestartAudio);
            }
            None
        }
        Action::StartAudio => {
            if card.audio == AudioState::NeedsStart {
                effects.push(Effect::RestartAudio);
            }
            None
        }
        Action::AudioStarted => {
            card.audio = AudioState::Playing;
            None
        }
        Action::AudioBlocked => {
            card.audio = AudioState::NeedsStart;
            None
        }
        Action::Timer(kind) => {
            on_timer(&mut card, *kind, &mut effects, rng);
            None
        }
        Action::Quit => {
            effects.push(Effect::Quit);
            None
        }
    };

    if let Some(intent) = intent {
        apply_intent(&mut card, intent, &mut effects);
    }

    let on_terminal_page = card.on_terminal_page();
    book::sync_to_page(&mut card.book, on_terminal_page);

    Transition { card, effects }
}

fn apply_intent(card: &mut Card, intent: Intent, effects: &mut Vec<Effect>) {
    match intent {
        Intent::Next => flip_forward(card, effects),
        Intent::Prev => flip_back(card, effects),
        Intent::Respond(text) => respond_no(card, text),
        Intent::Yes => respond_yes(card, effects),
    }
}

// ============================================================================
// CONTROLLER OPERATIONS
// ============================================================================

/// Turn one page forward, stopping at the terminal page.
pub fn flip_forward(card: &mut Card, effects: &mut Vec<Effect>) {
    if card.is_locked() {
        return;
    }
    card.current = (card.current + 1).min(card.page_count);
    card.nudge = Nudge::Forward;
    effects.push(Effect::ArmNudgeClear);
}

/// Turn one page back, stopping at the cover.
pub fn flip_back(card: &mut Card, effects: &mut Vec<Effect>) {
    if card.is_locked() {
        return;
    }
    card.current = card.current.saturating_sub(1);
    card.nudge = Nudge::Back;
    effects.push(Effect::ArmNudgeClear);
}

/// Record a response without locking anything.
pub fn respond_no(card: &mut Card, text: String) {
    card.response = text;
}

/// Accept: start closing the book. Celebration follows once it is shut.
pub fn respond_yes(card: &mut Card, effects: &mut Vec<Effect>) {
    if card.is_locked() {
        return;
    }
    card.response = YES_RESPONSE.to_string();
    card.closing = true;
    effects.push(Effect::StartClosing);
}

fn on_timer<R: Rng + ?Sized>(
    card: &mut Card,
    kind: TimerKind,
    effects: &mut Vec<Effect>,
    rng: &mut R,
) {
    match kind {
        TimerKind::NudgeClear => card.nudge = Nudge::None,
        TimerKind::Closing => close_step(card, effects, rng),
        TimerKind::Frame => {
            if card.celebrating {
                card.celebration_frames = card.celebration_frames.saturating_add(1);
            }
        }
        TimerKind::AudioWatch => {
            if card.audio == AudioState::Playing {
                effects.push(Effect::PollAudio);
            }
        }
    }
}

/// One step of the closing sequence.
fn close_step<R: Rng + ?Sized>(card: &mut Card, effects: &mut Vec<Effect>, rng: &mut R) {
    if !card.closing {
        effects.push(Effect::StopClosing);
        return;
    }
    card.current = card.current.saturating_sub(1);
    if card.current == 0 {
        card.closing = false;
        card.celebrating = true;
        card.hearts = hearts::generate(rng);
        card.celebration_frames = 0;
        effects.push(Effect::StopClosing);
        effects.push(Effect::StartFrames);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hearts::HEART_COUNT;
    use crate::tui::book::WAITING_RESPONSE;
    use crate::tui::state::{Position, Size};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const ZONE: Size = Size { width: 30, height: 6 };
    const BUTTON: Size = Size { width: 6, height: 1 };

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    /// Apply actions in order, returning the final card and every effect.
    fn run(card: Card, actions: &[Action]) -> (Card, Vec<Effect>) {
        let mut rng = rng();
        let mut card = card;
        let mut all = Vec::new();
        for action in actions {
            let t = update(card, action, &mut rng);
            card = t.card;
            all.extend(t.effects);
        }
        (card, all)
    }

    fn at(index: usize) -> Card {
        let mut card = Card::new(4, true);
        card.current = index;
        card
    }

    #[test]
    fn back_from_cover_stays_at_zero() {
        let (card, _) = run(at(0), &[Action::Back; 10]);
        assert_eq!(card.current, 0);
    }

    #[test]
    fn forward_stops_at_page_count() {
        let (card, _) = run(at(0), &[Action::Forward; 10]);
        assert_eq!(card.current, 4);
    }

    #[test]
    fn turning_sets_nudge_and_arms_clear() {
        let (card, effects) = run(at(1), &[Action::Forward]);
        assert_eq!(card.nudge, Nudge::Forward);
        assert_eq!(effects, vec![Effect::ArmNudgeClear]);

        let (card, _) = run(card, &[Action::Back]);
        assert_eq!(card.nudge, Nudge::Back);

        let (card, _) = run(card, &[Action::Timer(TimerKind::NudgeClear)]);
        assert_eq!(card.nudge, Nudge::None);
    }

    #[test]
    fn locked_card_ignores_navigation_and_answers() {
        for lock in ["closing", "celebrating"] {
            let mut card = at(4);
            card.response = "before".into();
            match lock {
                "closing" => card.closing = true,
                _ => card.celebrating = true,
            }
            let before = card.clone();
            let (after, effects) = run(
                card,
                &[
                    Action::Forward,
                    Action::Back,
                    Action::PressYes,
                    Action::PressNo { zone: ZONE, button: BUTTON },
                    Action::HoverNo { zone: ZONE, button: BUTTON },
                ],
            );
            assert_eq!(after, before, "{} lock should freeze the card", lock);
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn yes_closes_the_book_then_celebrates() {
        let (mut card, effects) = run(at(4), &[Action::PressYes]);
        assert_eq!(card.response, YES_RESPONSE);
        assert!(card.closing);
        assert!(!card.celebrating);
        assert_eq!(effects, vec![Effect::StartClosing]);

        let mut rng = rng();
        for expected in [3, 2, 1] {
            let t = update(card, &Action::Timer(TimerKind::Closing), &mut rng);
            card = t.card;
            assert_eq!(card.current, expected);
            assert!(card.closing);
            assert!(t.effects.is_empty());
        }

        let t = update(card, &Action::Timer(TimerKind::Closing), &mut rng);
        card = t.card;
        assert_eq!(card.current, 0);
        assert!(!card.closing);
        assert!(card.celebrating);
        assert_eq!(card.hearts.len(), HEART_COUNT);
        assert_eq!(t.effects, vec![Effect::StopClosing, Effect::StartFrames]);
    }

    #[test]
    fn second_yes_while_closing_is_noop() {
        let (card, _) = run(at(4), &[Action::PressYes]);
        let before = card.clone();
        let (after, effects) = run(card, &[Action::PressYes]);
        assert_eq!(after, before);
        assert!(effects.is_empty());
    }

    #[test]
    fn respond_yes_directly_is_noop_while_closing() {
        let mut card = at(2);
        card.closing = true;
        let mut effects = Vec::new();
        respond_yes(&mut card, &mut effects);
        assert!(effects.is_empty());
        assert_eq!(card.response, "");
    }

    #[test]
    fn celebration_is_terminal() {
        let (card, _) = run(
            at(4),
            &[
                Action::PressYes,
                Action::Timer(TimerKind::Closing),
                Action::Timer(TimerKind::Closing),
                Action::Timer(TimerKind::Closing),
                Action::Timer(TimerKind::Closing),
            ],
        );
        assert!(card.celebrating);
        let (card, _) = run(card, &[Action::Timer(TimerKind::Closing), Action::Forward]);
        assert!(card.celebrating);
        assert_eq!(card.current, 0);
    }

    #[test]
    fn stale_closing_tick_cancels_itself() {
        let (card, effects) = run(at(2), &[Action::Timer(TimerKind::Closing)]);
        assert_eq!(card.current, 2);
        assert_eq!(effects, vec![Effect::StopClosing]);
    }

    #[test]
    fn yes_only_answers_on_question_page() {
        let (card, effects) = run(at(2), &[Action::PressYes]);
        assert!(!card.closing);
        assert!(effects.is_empty());
    }

    #[test]
    fn no_moves_away_and_records_waiting() {
        let (card, effects) = run(at(4), &[Action::PressNo { zone: ZONE, button: BUTTON }]);
        assert_eq!(card.response, WAITING_RESPONSE);
        assert!(card.book.no_position.is_some());
        assert!(!card.is_locked());
        assert!(effects.is_empty());
    }

    #[test]
    fn leaving_question_resets_no_button() {
        let (card, _) = run(at(4), &[Action::HoverNo { zone: ZONE, button: BUTTON }]);
        assert!(card.book.no_position.is_some());

        let (card, _) = run(card, &[Action::Back, Action::Forward]);
        assert_eq!(card.current, 4);
        assert_eq!(card.book.no_position, None);
    }

    #[test]
    fn swipes_drive_navigation() {
        let (card, _) = run(
            at(1),
            &[
                Action::PointerDown { x: 100.0 },
                Action::PointerMove { x: 160.0 },
                Action::PointerUp { x: 160.0 },
            ],
        );
        assert_eq!(card.current, 2);

        let (card, _) = run(
            card,
            &[Action::PointerDown { x: 100.0 }, Action::PointerUp { x: 40.0 }],
        );
        assert_eq!(card.current, 1);

        let (card, _) = run(
            card,
            &[Action::PointerDown { x: 100.0 }, Action::PointerUp { x: 130.0 }],
        );
        assert_eq!(card.current, 1);
        let (card, _) = run(
            card,
            &[Action::PointerDown { x: 100.0 }, Action::PointerUp { x: 70.0 }],
        );
        assert_eq!(card.current, 1);
    }

    #[test]
    fn release_while_locked_clears_gesture_without_turning() {
        let mut card = at(3);
        card.book.gesture.start_x = Some(0.0);
        card.closing = true;
        let (card, _) = run(card, &[Action::PointerUp { x: 200.0 }]);
        assert_eq!(card.current, 3);
        assert_eq!(card.book.gesture.start_x, None);
    }

    #[test]
    fn audio_lifecycle() {
        let (card, effects) = run(at(0), &[Action::Mounted]);
        assert_eq!(effects, vec![Effect::RestartAudio]);

        let (card, _) = run(card, &[Action::AudioBlocked]);
        assert!(card.show_start_overlay());

        // No automatic retry: only the overlay restarts playback.
        let (card, effects) = run(card, &[Action::Timer(TimerKind::AudioWatch)]);
        assert!(effects.is_empty());
        let (card, effects) = run(card, &[Action::StartAudio]);
        assert_eq!(effects, vec![Effect::RestartAudio]);

        let (card, _) = run(card, &[Action::AudioStarted]);
        assert!(!card.show_start_overlay());
        assert_eq!(card.audio, AudioState::Playing);

        let (_, effects) = run(card, &[Action::Resumed, Action::Timer(TimerKind::AudioWatch)]);
        assert_eq!(effects, vec![Effect::PollAudio]);
    }

    #[test]
    fn resume_restarts_audio_that_is_not_playing() {
        let (_, effects) = run(at(0), &[Action::Resumed]);
        assert_eq!(effects, vec![Effect::RestartAudio]);

        let mut card = at(2);
        card.audio = AudioState::NeedsStart;
        let (card, effects) = run(card, &[Action::Resumed]);
        assert_eq!(effects, vec![Effect::RestartAudio]);
        assert_eq!(card.current, 2);
    }

    #[test]
    fn yes_while_celebrating_keeps_the_celebration() {
        let mut card = at(4);
        card.celebrating = true;
        card.response = "earlier".to_string();
        let (card, effects) = run(card, &[Action::PressYes]);
        assert!(card.celebrating);
        assert!(!card.closing);
        assert_eq!(card.response, "earlier");
        assert!(effects.is_empty());
    }

    #[test]
    fn start_overlay_does_nothing_while_playing() {
        let mut card = at(0);
        card.audio = AudioState::Playing;
        let (_, effects) = run(card, &[Action::StartAudio]);
        assert!(effects.is_empty());
    }

    #[test]
    fn frames_advance_only_while_celebrating() {
        let (card, _) = run(at(1), &[Action::Timer(TimerKind::Frame)]);
        assert_eq!(card.celebration_frames, 0);

        let mut card = at(0);
        card.celebrating = true;
        let (card, _) = run(card, &[Action::Timer(TimerKind::Frame); 3]);
        assert_eq!(card.celebration_frames, 3);
    }

    #[test]
    fn quit_requests_quit() {
        let (_, effects) = run(at(2), &[Action::Quit]);
        assert_eq!(effects, vec![Effect::Quit]);
    }

    #[test]
    fn evasive_position_survives_staying_on_question() {
        let mut card = at(4);
        card.book.no_position = Some(Position { x: 1, y: 1 });
        let (card, _) = run(card, &[Action::Forward]);
        assert_eq!(card.book.no_position, Some(Position { x: 1, y: 1 }));
    }
}
