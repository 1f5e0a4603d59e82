use serde::{Deserialize, Serialize};

/// Nominal length of a work interval, in seconds.
pub const WORK_SECS: u64 = 25 * 60;
/// Nominal length of a break interval, in seconds.
pub const BREAK_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Work,
    Break,
}

impl SessionPhase {
    /// The phase entered when this one expires.
    pub fn next(self) -> Self {
        match self {
            SessionPhase::Work => SessionPhase::Break,
            SessionPhase::Break => SessionPhase::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionPhase::Work => "Work Session",
            SessionPhase::Break => "Break",
        }
    }
}

/// Phase lengths used by a timer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub work_secs: u64,
    pub break_secs: u64,
}

impl Durations {
    /// Build from whole minutes.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn from_minutes(work_min: u64, break_min: u64) -> Self {
        Self {
            work_secs: work_min.saturating_mul(60),
            break_secs: break_min.saturating_mul(60),
        }
    }

    pub fn nominal(&self, phase: SessionPhase) -> u64 {
        match phase {
            SessionPhase::Work => self.work_secs,
            SessionPhase::Break => self.break_secs,
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work_secs: WORK_SECS,
            break_secs: BREAK_SECS,
        }
    }
}
