mod engine;
mod phase;
mod ticker;

pub use engine::{TimerEngine, TimerState};
pub use phase::{Durations, SessionPhase, BREAK_SECS, WORK_SECS};
pub use ticker::FocusSession;
