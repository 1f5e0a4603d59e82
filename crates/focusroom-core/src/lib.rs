//! # Focusroom Core Library
//!
//! This library provides the core logic for the Focusroom study timer:
//! a Pomodoro-style focus timer whose completed work intervals become
//! durable session records. The `focusroom-cli` binary is a thin terminal
//! host over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven Work/Break state machine. One tick is
//!   one second; every expiry pauses the timer.
//! - **Ticker**: A cancellable tokio task owned by a [`FocusSession`] that
//!   delivers ticks while the timer runs
//! - **Recorder**: Writes one immutable [`SessionRecord`] per completed work
//!   interval to a [`SessionStore`] (SQLite or Firestore), without blocking
//!   the timer
//! - **Presenter**: Pure display helpers (`MM:SS`, progress, focus totals)
//! - **Storage**: SQLite session history and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`FocusSession`]: A running timer instance with its tick source
//! - [`SessionRecorder`]: Completed-work persistence
//! - [`Database`]: Session history and statistics
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod identity;
pub mod presenter;
pub mod recorder;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, RecorderError, UnavailableCause};
pub use events::Event;
pub use identity::{IdentityProvider, OwnerId, SignedOut, StaticIdentity};
pub use presenter::WorkTotal;
pub use recorder::{
    FirestoreSessionStore, MemorySessionStore, SessionKind, SessionRecord, SessionRecorder,
    SessionStore, SqliteSessionStore,
};
pub use storage::{Config, Database, Stats, StoreBackend};
pub use timer::{Durations, FocusSession, SessionPhase, TimerEngine, TimerState};
