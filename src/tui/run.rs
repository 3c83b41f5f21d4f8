//! TUI effects boundary: event loop, terminal lifecycle, input mapping.
//!
//! This is the only module with side effects. It wires the pure layers
//! (state, update, layout, view) to the real terminal via crossterm and
//! ratatui, owns every timer, and drives the audio player.
//!
//! Architecture: one reader thread forwards terminal events into an mpsc
//! channel. The loop blocks on that channel until the next timer deadline,
//! then feeds input and due timers through the pure transition function,
//! one at a time.

use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use crate::audio::Playback;
use crate::content::Page;
use crate::timer::{Scheduler, TimerKind};

use super::layout::{self, contains, hit, Regions, Target};
use super::state::{Action, App, AppEvent, Card, Effect};
use super::update::update;
use super::view::render;

/// Settings for an interactive session.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// Pixels per terminal column, for gesture thresholds.
    pub cell_width: f32,
    /// Fixed seed for the random source; entropy when None.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cell_width: 8.0,
            seed: None,
        }
    }
}

// ============================================================================
// INPUT MAPPING
// ============================================================================

/// Map a terminal event to a semantic Action, given what is on screen.
pub fn map_event(event: Event, regions: &Regions, card: &Card, cell_width: f32) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key, regions, card),
        Event::Mouse(mouse) => map_mouse(mouse, regions, cell_width),
        Event::FocusGained => Some(Action::Resumed),
        Event::FocusLost => Some(Action::PointerLeave),
        _ => None,
    }
}

/// Map a key press to a semantic Action.
///
/// While the start overlay shows, only starting and quitting get through.
pub fn map_key(key: KeyEvent, regions: &Regions, card: &Card) -> Option<Action> {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Quit),
        KeyCode::Enter => return Some(Action::StartAudio),
        _ => {}
    }

    if card.show_start_overlay() {
        return None;
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Back),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => Some(Action::Forward),
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::PressYes),
        KeyCode::Char('n') | KeyCode::Char('N') => regions.prompt.map(|p| Action::PressNo {
            zone: p.zone_size(),
            button: p.no_size(),
        }),
        _ => None,
    }
}

/// Map a mouse event to a semantic Action.
///
/// Left button down/drag/up are the pointer gesture; bare movement onto the
/// "No" button counts as hovering it.
pub fn map_mouse(mouse: MouseEvent, regions: &Regions, cell_width: f32) -> Option<Action> {
    let (col, row) = (mouse.column, mouse.row);
    let x = f32::from(col) * cell_width;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match hit(regions, col, row)? {
            Target::Start => Some(Action::StartAudio),
            Target::Prev => Some(Action::Back),
            Target::Next => Some(Action::Forward),
            Target::Yes => Some(Action::PressYes),
            Target::No => regions.prompt.map(|p| Action::PressNo {
                zone: p.zone_size(),
                button: p.no_size(),
            }),
            Target::Book => Some(Action::PointerDown { x }),
        },
        MouseEventKind::Drag(MouseButton::Left) => {
            if regions.start.is_some() {
                None
            } else if contains(regions.book, col, row) {
                Some(Action::PointerMove { x })
            } else {
                Some(Action::PointerLeave)
            }
        }
        MouseEventKind::Up(MouseButton::Left) => Some(Action::PointerUp { x }),
        MouseEventKind::Moved => match hit(regions, col, row) {
            Some(Target::No) => regions.prompt.map(|p| Action::HoverNo {
                zone: p.zone_size(),
                button: p.no_size(),
            }),
            _ => None,
        },
        _ => None,
    }
}

// ============================================================================
// RUNTIME
// ============================================================================

/// The card plus everything its effects touch.
///
/// Owns the timers: dropping the runtime cancels all of them and stops the
/// music, so nothing can touch the card after it is gone.
pub struct Runtime<P: Playback> {
    pub app: App,
    pub scheduler: Scheduler,
    playback: P,
    rng: StdRng,
}

impl<P: Playback> Runtime<P> {
    pub fn new(pages: Vec<Page>, playback: P, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Runtime {
            app: App::new(pages),
            scheduler: Scheduler::new(),
            playback,
            rng,
        }
    }

    /// Mount the card: start the audio watch and attempt autoplay.
    pub fn mount(&mut self, now: Instant) {
        self.scheduler
            .every(TimerKind::AudioWatch, TimerKind::AudioWatch.interval(), now);
        self.dispatch(Action::Mounted, now);
    }

    /// Run an action, and every action its effects produce, to completion.
    pub fn dispatch(&mut self, action: Action, now: Instant) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let card = std::mem::take(&mut self.app.card);
            let transition = update(card, &action, &mut self.rng);
            self.app.card = transition.card;

            for effect in transition.effects {
                if let Some(next) = self.handle_effect(effect, now) {
                    queue.push_back(next);
                }
            }
        }
    }

    /// Feed every timer due at `now` through the card.
    pub fn fire_due(&mut self, now: Instant) {
        for kind in self.scheduler.take_due(now) {
            self.dispatch(Action::Timer(kind), now);
        }
    }

    /// Carry out one effect. Playback effects report their outcome back as
    /// a follow-up action.
    fn handle_effect(&mut self, effect: Effect, now: Instant) -> Option<Action> {
        match effect {
            Effect::ArmNudgeClear => {
                self.scheduler
                    .once(TimerKind::NudgeClear, TimerKind::NudgeClear.interval(), now);
                None
            }
            Effect::StartClosing => {
                tracing::info!(from = self.app.card.current, "closing the book");
                self.scheduler
                    .every(TimerKind::Closing, TimerKind::Closing.interval(), now);
                None
            }
            Effect::StopClosing => {
                self.scheduler.cancel(TimerKind::Closing);
                None
            }
            Effect::StartFrames => {
                tracing::info!(hearts = self.app.card.hearts.len(), "celebrating");
                self.scheduler
                    .every(TimerKind::Frame, TimerKind::Frame.interval(), now);
                None
            }
            Effect::RestartAudio => match self.playback.restart() {
                Ok(()) => {
                    tracing::info!("audio playing");
                    Some(Action::AudioStarted)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "audio did not start; offering manual start");
                    Some(Action::AudioBlocked)
                }
            },
            Effect::PollAudio => match self.playback.keep_looping() {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "audio loop failed");
                    Some(Action::AudioBlocked)
                }
            },
            Effect::Quit => {
                self.app.should_quit = true;
                None
            }
        }
    }

    /// Cancel every timer and stop the music.
    pub fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.playback.stop();
    }
}

impl<P: Playback> Drop for Runtime<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Set up the terminal for TUI mode.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(
        io::stdout(),
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(io::stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Spawn a thread that forwards every terminal event to the channel.
fn spawn_event_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(AppEvent::Terminal(ev)).is_err() {
                    break; // receiver dropped, TUI is shutting down
                }
            }
            Err(e) => {
                let _ = tx.send(AppEvent::ReaderFailed(e.to_string()));
                break;
            }
        }
    });
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Run the card until the reader quits.
pub fn run<P: Playback>(pages: Vec<Page>, playback: P, config: RunConfig) -> io::Result<()> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, Runtime::new(pages, playback, config.seed), config);
    restore_terminal()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut runtime: Runtime<impl Playback>,
    config: RunConfig,
) -> io::Result<()> {
    let (tx, rx) = mpsc::channel::<AppEvent>();
    spawn_event_reader(tx);

    runtime.mount(Instant::now());

    loop {
        let area: Rect = terminal.draw(|frame| render(&runtime.app, frame))?.area;

        if runtime.app.should_quit {
            break;
        }

        // Block until input arrives or the next timer falls due
        let received = match runtime.scheduler.timeout(Instant::now()) {
            Some(timeout) => match rx.recv_timeout(timeout) {
                Ok(ev) => Some(ev),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(ev) => Some(ev),
                Err(_) => break, // all senders dropped
            },
        };

        match received {
            Some(AppEvent::Terminal(ev)) => {
                let regions = layout::regions(area, &runtime.app.card);
                if let Some(action) = map_event(ev, &regions, &runtime.app.card, config.cell_width) {
                    runtime.dispatch(action, Instant::now());
                }
            }
            Some(AppEvent::ReaderFailed(message)) => {
                tracing::error!(%message, "terminal reader stopped");
                break;
            }
            None => {}
        }

        runtime.fire_due(Instant::now());
    }

    runtime.teardown();
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PlaybackError;
    use crate::content::default_pages;
    use crate::tui::state::AudioState;
    use crossterm::event::KeyModifiers;
    use std::path::PathBuf;
    use std::time::Duration;

    const SCREEN: Rect = Rect { x: 0, y: 0, width: 120, height: 40 };

    /// Playback that refuses to start until `allow` is set.
    #[derive(Default)]
    struct FakePlayer {
        allow: bool,
        restarts: usize,
        stopped: bool,
        died: bool,
    }

    impl Playback for FakePlayer {
        fn restart(&mut self) -> Result<(), PlaybackError> {
            self.restarts += 1;
            if self.allow {
                Ok(())
            } else {
                Err(PlaybackError::MissingTrack(PathBuf::from("x.m4a")))
            }
        }

        fn stop(&mut self) {
            self.stopped = true;
        }

        fn keep_looping(&mut self) -> Result<(), PlaybackError> {
            if self.died {
                Err(PlaybackError::Spawn {
                    player: "fake".to_string(),
                    source: std::io::Error::other("player died"),
                })
            } else {
                Ok(())
            }
        }
    }

    fn runtime() -> Runtime<FakePlayer> {
        Runtime::new(default_pages(), FakePlayer::default(), Some(9))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn card_at(index: usize) -> Card {
        let mut card = Card::new(4, true);
        card.current = index;
        card
    }

    #[test]
    fn ctrl_c_maps_to_quit() {
        let card = card_at(1);
        let r = layout::regions(SCREEN, &card);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c, &r, &card), Some(Action::Quit));
        assert_eq!(map_key(key(KeyCode::Esc), &r, &card), Some(Action::Quit));
    }

    #[test]
    fn arrows_and_vim_keys_turn_pages() {
        let card = card_at(1);
        let r = layout::regions(SCREEN, &card);
        assert_eq!(map_key(key(KeyCode::Left), &r, &card), Some(Action::Back));
        assert_eq!(map_key(key(KeyCode::Char('h')), &r, &card), Some(Action::Back));
        assert_eq!(map_key(key(KeyCode::Right), &r, &card), Some(Action::Forward));
        assert_eq!(map_key(key(KeyCode::Char('l')), &r, &card), Some(Action::Forward));
    }

    #[test]
    fn n_key_needs_the_prompt() {
        let card = card_at(2);
        let r = layout::regions(SCREEN, &card);
        assert_eq!(map_key(key(KeyCode::Char('n')), &r, &card), None);

        let card = card_at(4);
        let r = layout::regions(SCREEN, &card);
        assert!(matches!(
            map_key(key(KeyCode::Char('n')), &r, &card),
            Some(Action::PressNo { .. })
        ));
    }

    #[test]
    fn overlay_blocks_navigation_keys() {
        let mut card = card_at(2);
        card.audio = AudioState::NeedsStart;
        let r = layout::regions(SCREEN, &card);
        assert_eq!(map_key(key(KeyCode::Right), &r, &card), None);
        assert_eq!(map_key(key(KeyCode::Enter), &r, &card), Some(Action::StartAudio));
    }

    #[test]
    fn mouse_press_on_controls_and_book() {
        let card = card_at(4);
        let r = layout::regions(SCREEN, &card);
        let press = |col, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: col,
            row,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(map_mouse(press(r.prev.x, r.prev.y), &r, 8.0), Some(Action::Back));
        assert_eq!(map_mouse(press(r.next.x, r.next.y), &r, 8.0), Some(Action::Forward));
        let prompt = r.prompt.unwrap();
        assert_eq!(map_mouse(press(prompt.yes.x, prompt.yes.y), &r, 8.0), Some(Action::PressYes));
        assert!(matches!(
            map_mouse(press(prompt.no.x, prompt.no.y), &r, 8.0),
            Some(Action::PressNo { .. })
        ));
        assert_eq!(
            map_mouse(press(r.book.x + 3, r.book.y + 2), &r, 8.0),
            Some(Action::PointerDown { x: f32::from(r.book.x + 3) * 8.0 })
        );
    }

    #[test]
    fn hovering_no_button() {
        let card = card_at(4);
        let r = layout::regions(SCREEN, &card);
        let prompt = r.prompt.unwrap();
        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            column: prompt.no.x,
            row: prompt.no.y,
            modifiers: KeyModifiers::NONE,
        };
        assert!(matches!(map_mouse(moved, &r, 8.0), Some(Action::HoverNo { .. })));
    }

    #[test]
    fn focus_events_resume_and_leave() {
        let card = card_at(1);
        let r = layout::regions(SCREEN, &card);
        assert_eq!(map_event(Event::FocusGained, &r, &card, 8.0), Some(Action::Resumed));
        assert_eq!(map_event(Event::FocusLost, &r, &card, 8.0), Some(Action::PointerLeave));
    }

    #[test]
    fn blocked_autoplay_waits_for_manual_start() {
        let t0 = Instant::now();
        let mut rt = runtime();
        rt.mount(t0);
        assert_eq!(rt.app.card.audio, AudioState::NeedsStart);
        assert_eq!(rt.playback.restarts, 1);

        // The audio watch does not retry on its own
        rt.fire_due(t0 + Duration::from_secs(5));
        assert_eq!(rt.playback.restarts, 1);

        rt.playback.allow = true;
        rt.dispatch(Action::StartAudio, t0);
        assert_eq!(rt.app.card.audio, AudioState::Playing);
        assert_eq!(rt.playback.restarts, 2);
    }

    #[test]
    fn resume_leaves_a_playing_track_alone() {
        let t0 = Instant::now();
        let mut rt = runtime();
        rt.playback.allow = true;
        rt.mount(t0);
        rt.dispatch(Action::Resumed, t0);
        assert_eq!(rt.playback.restarts, 1);
        assert!(!rt.app.card.show_start_overlay());
    }

    #[test]
    fn player_dying_mid_song_offers_manual_start() {
        let t0 = Instant::now();
        let mut rt = runtime();
        rt.playback.allow = true;
        rt.mount(t0);
        assert_eq!(rt.app.card.audio, AudioState::Playing);

        rt.playback.died = true;
        rt.fire_due(t0 + TimerKind::AudioWatch.interval());
        assert!(rt.app.card.show_start_overlay());
        assert_eq!(rt.playback.restarts, 1);

        rt.playback.died = false;
        rt.dispatch(Action::StartAudio, t0);
        assert_eq!(rt.app.card.audio, AudioState::Playing);
        assert_eq!(rt.playback.restarts, 2);
    }

    #[test]
    fn page_turn_arms_nudge_clear() {
        let t0 = Instant::now();
        let mut rt = runtime();
        rt.dispatch(Action::Forward, t0);
        assert!(rt.scheduler.is_armed(TimerKind::NudgeClear));

        rt.fire_due(t0 + Duration::from_millis(220));
        assert_eq!(rt.app.card.nudge, crate::tui::state::Nudge::None);
        assert!(!rt.scheduler.is_armed(TimerKind::NudgeClear));
    }

    #[test]
    fn yes_runs_the_closing_sequence_on_timers() {
        let t0 = Instant::now();
        let mut rt = runtime();
        for _ in 0..4 {
            rt.dispatch(Action::Forward, t0);
        }
        rt.dispatch(Action::PressYes, t0);
        assert!(rt.app.card.closing);
        assert!(rt.scheduler.is_armed(TimerKind::Closing));

        let step = TimerKind::Closing.interval();
        for n in 1..=4u32 {
            rt.fire_due(t0 + step * n);
        }
        assert_eq!(rt.app.card.current, 0);
        assert!(rt.app.card.celebrating);
        assert!(!rt.scheduler.is_armed(TimerKind::Closing));
        assert!(rt.scheduler.is_armed(TimerKind::Frame));
    }

    #[test]
    fn teardown_cancels_timers_and_stops_audio() {
        let t0 = Instant::now();
        let mut rt = runtime();
        rt.mount(t0);
        rt.dispatch(Action::Forward, t0);
        rt.teardown();
        assert_eq!(rt.scheduler.next_deadline(), None);
        assert!(rt.playback.stopped);
    }

    #[test]
    fn quit_sets_flag() {
        let mut rt = runtime();
        rt.dispatch(Action::Quit, Instant::now());
        assert!(rt.app.should_quit);
    }
}
