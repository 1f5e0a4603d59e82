use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::OwnerId;
use crate::timer::SessionPhase;

/// Every state change in a timer instance produces an Event.
/// Hosts receive them over the session channel and render from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: SessionPhase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: SessionPhase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A work interval ran out. Triggers exactly one record attempt.
    WorkCompleted {
        completed_work_count: u64,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A break ran out. Never recorded.
    BreakCompleted {
        at: DateTime<Utc>,
    },
    /// The recorder persisted a completed work interval.
    SessionRecorded {
        owner_id: OwnerId,
        occurred_at: DateTime<Utc>,
    },
    /// The recorder dropped a completed work interval; it will not be retried.
    RecordDropped {
        occurred_at: DateTime<Utc>,
        reason: String,
    },
    StateSnapshot {
        phase: SessionPhase,
        phase_label: String,
        remaining_secs: u64,
        running: bool,
        completed_work_count: u64,
        formatted_remaining: String,
        progress_ratio: f64,
        work_total: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this event ends a phase.
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            Event::WorkCompleted { .. } | Event::BreakCompleted { .. }
        )
    }
}
