//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads - one `tick()` is one elapsed second, delivered by the
//! ticker (or by a test) from outside.
//!
//! ## State Transitions
//!
//! ```text
//! Work(running) --expiry--> Break(paused) --start--> Break(running)
//!      ^                                                  |
//!      +------------- Work(paused) <------expiry----------+
//! ```
//!
//! Every expiry pauses the timer; the next phase needs an explicit `start()`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Durations::default());
//! engine.start();
//! // Once per second:
//! if let Some(event) = engine.tick() { /* phase changed */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{Durations, SessionPhase};
use crate::events::Event;
use crate::presenter;

/// Mutable timer state, owned by exactly one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: SessionPhase,
    pub remaining_secs: u64,
    pub running: bool,
    /// Work intervals completed since this engine was created. Not persisted.
    pub completed_work_count: u64,
}

impl TimerState {
    /// Fresh, paused work phase.
    pub fn initial(durations: &Durations) -> Self {
        Self {
            phase: SessionPhase::Work,
            remaining_secs: durations.work_secs,
            running: false,
            completed_work_count: 0,
        }
    }
}

/// Core timer engine.
///
/// Total over its inputs: no command fails, commands that make no sense in
/// the current state are no-ops that return `None`.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    durations: Durations,
    state: TimerState,
}

impl TimerEngine {
    /// Create a new engine in a paused work phase.
    pub fn new(durations: Durations) -> Self {
        Self {
            durations,
            state: TimerState::initial(&durations),
        }
    }

    /// Create an engine resuming from an explicit state.
    pub fn with_state(durations: Durations, state: TimerState) -> Self {
        Self { durations, state }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn completed_work_count(&self) -> u64 {
        self.state.completed_work_count
    }

    pub fn durations(&self) -> &Durations {
        &self.durations
    }

    /// 0.0 .. 1.0 progress within current phase.
    pub fn progress_ratio(&self) -> f64 {
        presenter::progress_ratio(self.state.phase, self.state.remaining_secs, &self.durations)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.state.phase,
            phase_label: self.state.phase.label().to_string(),
            remaining_secs: self.state.remaining_secs,
            running: self.state.running,
            completed_work_count: self.state.completed_work_count,
            formatted_remaining: presenter::formatted_remaining(self.state.remaining_secs),
            progress_ratio: self.progress_ratio(),
            work_total: presenter::daily_work(
                self.state.completed_work_count,
                self.durations.work_secs,
            )
            .to_string(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.running {
            return None;
        }
        self.state.running = true;
        Some(Event::TimerStarted {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.state.running = false;
        Some(Event::TimerPaused {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Back to a paused, full-length work phase. Keeps the completed count.
    pub fn reset(&mut self) -> Option<Event> {
        self.state.phase = SessionPhase::Work;
        self.state.remaining_secs = self.durations.work_secs;
        self.state.running = false;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// One elapsed second. Returns the transition event when a phase expires.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    /// Like [`tick`](Self::tick), stamping any transition with `now`.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        if self.state.remaining_secs > 0 {
            self.state.remaining_secs -= 1;
        }
        if self.state.remaining_secs == 0 {
            return Some(self.expire(now));
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire(&mut self, now: DateTime<Utc>) -> Event {
        let finished = self.state.phase;
        let next = finished.next();
        self.state.phase = next;
        self.state.remaining_secs = self.durations.nominal(next);
        self.state.running = false;

        match finished {
            SessionPhase::Work => {
                self.state.completed_work_count += 1;
                Event::WorkCompleted {
                    completed_work_count: self.state.completed_work_count,
                    duration_secs: self.durations.work_secs,
                    at: now,
                }
            }
            SessionPhase::Break => Event::BreakCompleted { at: now },
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run_ticks(engine: &mut TimerEngine, n: u64) -> Vec<Event> {
        (0..n).filter_map(|_| engine.tick()).collect()
    }

    fn work_records(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::WorkCompleted { .. }))
            .count()
    }

    #[test]
    fn start_pause_start() {
        let mut engine = TimerEngine::default();
        assert!(!engine.is_running());

        assert!(engine.start().is_some());
        assert!(engine.is_running());
        assert!(engine.start().is_none(), "second start is a no-op");

        assert!(engine.pause().is_some());
        assert!(!engine.is_running());
        assert!(engine.pause().is_none(), "second pause is a no-op");

        assert!(engine.start().is_some());
        assert!(engine.is_running());
    }

    #[test]
    fn full_work_interval_moves_to_paused_break() {
        let mut engine = TimerEngine::default();
        engine.start();

        let events = run_ticks(&mut engine, 1500);

        assert_eq!(work_records(&events), 1);
        assert_eq!(
            engine.state(),
            TimerState {
                phase: SessionPhase::Break,
                remaining_secs: 300,
                running: false,
                completed_work_count: 1,
            }
        );
    }

    #[test]
    fn full_break_returns_to_work_without_record() {
        let mut engine = TimerEngine::default();
        engine.start();
        run_ticks(&mut engine, 1500);

        engine.start();
        let events = run_ticks(&mut engine, 300);

        assert_eq!(work_records(&events), 0);
        assert!(matches!(events.as_slice(), [Event::BreakCompleted { .. }]));
        assert_eq!(engine.phase(), SessionPhase::Work);
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_work_count(), 1);
    }

    #[test]
    fn ticks_after_pause_do_not_count() {
        let mut engine = TimerEngine::default();
        engine.start();
        run_ticks(&mut engine, 10);
        engine.pause();
        run_ticks(&mut engine, 5);
        assert_eq!(engine.remaining_secs(), 1500 - 10);
    }

    #[test]
    fn ticks_after_expiry_are_ignored_until_started() {
        let mut engine = TimerEngine::default();
        engine.start();
        run_ticks(&mut engine, 1500);
        let events = run_ticks(&mut engine, 50);
        assert!(events.is_empty());
        assert_eq!(engine.remaining_secs(), 300);
    }

    #[test]
    fn work_completed_carries_transition_time_and_duration() {
        let mut engine = TimerEngine::with_state(
            Durations::default(),
            TimerState {
                phase: SessionPhase::Work,
                remaining_secs: 1,
                running: true,
                completed_work_count: 4,
            },
        );
        let at = Utc::now();
        match engine.tick_at(at) {
            Some(Event::WorkCompleted {
                completed_work_count,
                duration_secs,
                at: occurred,
            }) => {
                assert_eq!(completed_work_count, 5);
                assert_eq!(duration_secs, 1500);
                assert_eq!(occurred, at);
            }
            other => panic!("Expected WorkCompleted, got {other:?}"),
        }
    }

    #[test]
    fn zero_remaining_expires_on_next_running_tick() {
        let mut engine = TimerEngine::with_state(
            Durations::default(),
            TimerState {
                phase: SessionPhase::Break,
                remaining_secs: 0,
                running: true,
                completed_work_count: 0,
            },
        );
        assert!(matches!(engine.tick(), Some(Event::BreakCompleted { .. })));
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn reset_keeps_completed_count() {
        let mut engine = TimerEngine::default();
        engine.start();
        run_ticks(&mut engine, 1500);
        engine.start();
        run_ticks(&mut engine, 42);
        engine.reset();
        assert_eq!(
            engine.state(),
            TimerState {
                phase: SessionPhase::Work,
                remaining_secs: 1500,
                running: false,
                completed_work_count: 1,
            }
        );
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::default();
        match engine.snapshot() {
            Event::StateSnapshot {
                phase,
                remaining_secs,
                running,
                formatted_remaining,
                progress_ratio,
                work_total,
                ..
            } => {
                assert_eq!(phase, SessionPhase::Work);
                assert_eq!(remaining_secs, 1500);
                assert!(!running);
                assert_eq!(formatted_remaining, "25:00");
                assert_eq!(progress_ratio, 0.0);
                assert_eq!(work_total, "0h 0min");
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    fn any_state() -> impl Strategy<Value = TimerState> {
        (any::<bool>(), 0u64..=1500, any::<bool>(), 0u64..100).prop_map(
            |(is_break, remaining, running, count)| TimerState {
                phase: if is_break {
                    SessionPhase::Break
                } else {
                    SessionPhase::Work
                },
                remaining_secs: remaining,
                running,
                completed_work_count: count,
            },
        )
    }

    proptest! {
        #[test]
        fn n_ticks_from_n_remaining_transition_exactly_once(
            n in 1u64..=1500,
            is_break in any::<bool>(),
        ) {
            let phase = if is_break { SessionPhase::Break } else { SessionPhase::Work };
            let durations = Durations::default();
            let mut engine = TimerEngine::with_state(
                durations,
                TimerState { phase, remaining_secs: n, running: true, completed_work_count: 0 },
            );

            let events = run_ticks(&mut engine, n);

            prop_assert_eq!(events.iter().filter(|e| e.is_transition()).count(), 1);
            prop_assert_eq!(engine.phase(), phase.next());
            prop_assert_eq!(engine.remaining_secs(), durations.nominal(phase.next()));
            prop_assert!(!engine.is_running());
            prop_assert_eq!(work_records(&events), usize::from(phase == SessionPhase::Work));
        }

        #[test]
        fn reset_from_any_state(state in any_state()) {
            let mut engine = TimerEngine::with_state(Durations::default(), state);
            engine.reset();
            let after = engine.state();
            prop_assert_eq!(after.phase, SessionPhase::Work);
            prop_assert_eq!(after.remaining_secs, 1500);
            prop_assert!(!after.running);
            prop_assert_eq!(after.completed_work_count, state.completed_work_count);
        }

        #[test]
        fn tick_while_paused_changes_nothing(state in any_state(), ticks in 0u64..50) {
            let paused = TimerState { running: false, ..state };
            let mut engine = TimerEngine::with_state(Durations::default(), paused);
            let events = run_ticks(&mut engine, ticks);
            prop_assert!(events.is_empty());
            prop_assert_eq!(engine.state(), paused);
        }

        #[test]
        fn progress_is_monotonic_until_transition(ticks in 1u64..2000) {
            let mut engine = TimerEngine::default();
            engine.start();
            let mut last = engine.progress_ratio();
            for _ in 0..ticks {
                if engine.tick().is_some() {
                    prop_assert_eq!(engine.progress_ratio(), 0.0);
                    break;
                }
                let now = engine.progress_ratio();
                prop_assert!(now >= last);
                prop_assert!((0.0..=1.0).contains(&now));
                last = now;
            }
        }
    }
}
