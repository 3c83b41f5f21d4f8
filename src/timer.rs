//! Keyed timers for a single-threaded event loop.
//!
//! The scheduler never sleeps or spawns anything. The event loop asks it how
//! long to wait ([`Scheduler::next_deadline`]), then collects whatever fell
//! due ([`Scheduler::take_due`]). Each key has at most one live timer, so
//! re-arming a key cancels its previous instance. Dropping the scheduler
//! drops every pending timer with it.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Every timer the card uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKind {
    /// One-shot: clears the nudge bend after a discrete page turn.
    NudgeClear,
    /// Repeating: steps the book closed after a yes.
    Closing,
    /// Repeating: animation frames during the celebration.
    Frame,
    /// Repeating: checks whether the audio track needs restarting.
    AudioWatch,
}

impl TimerKind {
    /// Delay (one-shot) or period (repeating) the card uses for this timer.
    pub fn interval(self) -> Duration {
        match self {
            TimerKind::NudgeClear => Duration::from_millis(220),
            TimerKind::Closing => Duration::from_millis(520),
            TimerKind::Frame => Duration::from_millis(60),
            TimerKind::AudioWatch => Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    due: Instant,
    repeat: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    slots: BTreeMap<TimerKind, Slot>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `kind` once, `delay` after `now`. Replaces any pending instance.
    pub fn once(&mut self, kind: TimerKind, delay: Duration, now: Instant) {
        self.slots.insert(kind, Slot { due: now + delay, repeat: None });
    }

    /// Fire `kind` every `period`, first at `now + period`. Replaces any
    /// pending instance.
    pub fn every(&mut self, kind: TimerKind, period: Duration, now: Instant) {
        self.slots.insert(kind, Slot { due: now + period, repeat: Some(period) });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.slots.remove(&kind);
    }

    pub fn cancel_all(&mut self) {
        self.slots.clear();
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().map(|s| s.due).min()
    }

    /// How long the loop may block before the next timer is due.
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        self.next_deadline().map(|due| due.saturating_duration_since(now))
    }

    /// Remove and return every timer due at `now`, in deadline order.
    ///
    /// Repeating timers are re-armed one period after their previous
    /// deadline. A repeating timer fires at most once per call even if the
    /// loop fell behind by several periods.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<(Instant, TimerKind)> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.due <= now)
            .map(|(kind, slot)| (slot.due, *kind))
            .collect();
        due.sort();

        for (_, kind) in &due {
            let Some(slot) = self.slots.get_mut(kind) else {
                continue;
            };
            match slot.repeat {
                Some(period) => {
                    slot.due += period;
                    if slot.due <= now {
                        slot.due = now + period;
                    }
                }
                None => {
                    self.slots.remove(kind);
                }
            }
        }

        due.into_iter().map(|(_, kind)| kind).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn one_shot_fires_once() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.once(TimerKind::NudgeClear, 220 * MS, t0);

        assert!(s.take_due(t0 + 100 * MS).is_empty());
        assert_eq!(s.take_due(t0 + 220 * MS), vec![TimerKind::NudgeClear]);
        assert!(s.take_due(t0 + 1000 * MS).is_empty());
        assert!(!s.is_armed(TimerKind::NudgeClear));
    }

    #[test]
    fn rearming_supersedes_previous_deadline() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.once(TimerKind::NudgeClear, 220 * MS, t0);
        s.once(TimerKind::NudgeClear, 220 * MS, t0 + 200 * MS);

        assert!(s.take_due(t0 + 300 * MS).is_empty());
        assert_eq!(s.take_due(t0 + 420 * MS), vec![TimerKind::NudgeClear]);
    }

    #[test]
    fn repeating_timer_keeps_firing_until_cancelled() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every(TimerKind::Closing, 520 * MS, t0);

        assert_eq!(s.take_due(t0 + 520 * MS), vec![TimerKind::Closing]);
        assert!(s.take_due(t0 + 600 * MS).is_empty());
        assert_eq!(s.take_due(t0 + 1040 * MS), vec![TimerKind::Closing]);

        s.cancel(TimerKind::Closing);
        assert!(s.take_due(t0 + 5000 * MS).is_empty());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn late_loop_does_not_burst_repeats() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every(TimerKind::Frame, 60 * MS, t0);

        assert_eq!(s.take_due(t0 + 1000 * MS), vec![TimerKind::Frame]);
        assert_eq!(s.next_deadline(), Some(t0 + 1060 * MS));
    }

    #[test]
    fn due_timers_come_out_in_deadline_order() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every(TimerKind::Closing, 50 * MS, t0);
        s.once(TimerKind::NudgeClear, 10 * MS, t0);

        assert_eq!(
            s.take_due(t0 + 60 * MS),
            vec![TimerKind::NudgeClear, TimerKind::Closing]
        );
    }

    #[test]
    fn timeout_tracks_earliest_deadline() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        assert_eq!(s.timeout(t0), None);

        s.every(TimerKind::AudioWatch, 1000 * MS, t0);
        s.once(TimerKind::NudgeClear, 220 * MS, t0);
        assert_eq!(s.timeout(t0), Some(220 * MS));
        assert_eq!(s.timeout(t0 + 500 * MS), Some(Duration::ZERO));
    }

    #[test]
    fn cancel_all_releases_everything() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every(TimerKind::Closing, 520 * MS, t0);
        s.once(TimerKind::NudgeClear, 220 * MS, t0);
        s.cancel_all();
        assert!(s.take_due(t0 + 10_000 * MS).is_empty());
    }
}
