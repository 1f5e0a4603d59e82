//! Display values derived from timer state.
//!
//! Everything here is a pure function of what the engine exposes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timer::{Durations, SessionPhase};

/// Render seconds as `MM:SS`.
///
/// Minutes are zero-padded to two digits and keep growing past 99
/// instead of wrapping into hours.
pub fn formatted_remaining(remaining_secs: u64) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

/// 0.0 .. 1.0 progress within the current phase.
pub fn progress_ratio(phase: SessionPhase, remaining_secs: u64, durations: &Durations) -> f64 {
    let nominal = durations.nominal(phase);
    if nominal == 0 {
        return 0.0;
    }
    let elapsed = nominal.saturating_sub(remaining_secs);
    (elapsed as f64 / nominal as f64).clamp(0.0, 1.0)
}

/// Accumulated focus time, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkTotal {
    pub hours: u64,
    pub minutes: u64,
}

impl WorkTotal {
    pub fn from_minutes(total_minutes: u64) -> Self {
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }

    pub fn total_minutes(&self) -> u64 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for WorkTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}min", self.hours, self.minutes)
    }
}

/// Focus time for `completed_work_count` work intervals of `work_secs` each.
pub fn daily_work(completed_work_count: u64, work_secs: u64) -> WorkTotal {
    let minutes = completed_work_count.saturating_mul(work_secs) / 60;
    WorkTotal::from_minutes(minutes)
}
