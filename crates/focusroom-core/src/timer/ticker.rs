//! A running timer instance: engine + clock + recorder.
//!
//! [`FocusSession`] owns the engine and the tokio task that delivers one
//! tick per interval. The ticker exists only while the engine is running:
//! `start()` spawns it, `pause()`/`reset()` abort it, and it exits on its
//! own after a phase expires. Dropping the session aborts it;
//! [`FocusSession::shutdown`] additionally waits for it and, up to a grace
//! period, for any record writes still in flight.
//!
//! Ticks and transitions happen under a single engine lock, so no tick can
//! observe a half-finished transition.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::engine::{TimerEngine, TimerState};
use super::phase::Durations;
use crate::events::Event;
use crate::identity::IdentityProvider;
use crate::recorder::SessionRecorder;
use crate::storage::TimerConfig;

/// How long `shutdown()` waits for record writes before dropping them.
pub const DEFAULT_WRITE_GRACE: Duration = Duration::from_secs(5);

/// A record write that has been handed to the store but not yet answered.
struct PendingWrite {
    occurred_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

type PendingWrites = Arc<std::sync::Mutex<Vec<PendingWrite>>>;

/// Everything a tick needs besides the engine itself.
#[derive(Clone)]
struct Effects {
    recorder: SessionRecorder,
    identity: Arc<dyn IdentityProvider>,
    events: mpsc::UnboundedSender<Event>,
    pending: PendingWrites,
}

impl Effects {
    fn emit(&self, event: Event) {
        // Nobody listening is fine; the host may only poll snapshots.
        let _ = self.events.send(event);
    }

    /// Publish a tick result and fire the record write for finished work.
    fn dispatch(&self, event: Event) {
        self.emit(event.clone());
        if let Event::WorkCompleted {
            completed_work_count,
            duration_secs,
            at,
        } = event
        {
            tracing::info!(completed_work_count, "work interval completed");
            let owner = self.identity.current_owner();
            let recorder = self.recorder.clone();
            let events = self.events.clone();
            let handle = tokio::spawn(async move {
                let notice = match recorder.record(owner, at, duration_secs).await {
                    Ok(record) => Event::SessionRecorded {
                        owner_id: record.owner_id,
                        occurred_at: record.occurred_at,
                    },
                    Err(e) => {
                        tracing::warn!(
                            store = recorder.store_name(),
                            occurred_at = %at,
                            error = %e,
                            "dropping work session record"
                        );
                        Event::RecordDropped {
                            occurred_at: at,
                            reason: e.to_string(),
                        }
                    }
                };
                let _ = events.send(notice);
            });
            if let Ok(mut pending) = self.pending.lock() {
                pending.retain(|w| !w.handle.is_finished());
                pending.push(PendingWrite {
                    occurred_at: at,
                    handle,
                });
            }
        } else if event.is_transition() {
            tracing::info!("break completed");
        }
    }
}

/// One open timer view.
pub struct FocusSession {
    engine: Arc<Mutex<TimerEngine>>,
    ticker: Option<JoinHandle<()>>,
    tick_interval: Duration,
    write_grace: Duration,
    effects: Effects,
}

impl FocusSession {
    /// Open a fresh, paused work phase. Events are delivered on the returned channel.
    pub fn new(
        durations: Durations,
        tick_interval: Duration,
        recorder: SessionRecorder,
        identity: Arc<dyn IdentityProvider>,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            engine: Arc::new(Mutex::new(TimerEngine::new(durations))),
            ticker: None,
            tick_interval,
            write_grace: DEFAULT_WRITE_GRACE,
            effects: Effects {
                recorder,
                identity,
                events: tx,
                pending: Arc::new(std::sync::Mutex::new(Vec::new())),
            },
        };
        (session, rx)
    }

    /// Open a session using the `[timer]` config section.
    pub fn from_config(
        config: &TimerConfig,
        recorder: SessionRecorder,
        identity: Arc<dyn IdentityProvider>,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let tick_interval = Duration::from_millis(config.tick_interval_ms.max(1));
        Self::new(config.durations(), tick_interval, recorder, identity)
    }

    /// Bound the time `shutdown()` spends waiting on record writes.
    pub fn with_write_grace(mut self, grace: Duration) -> Self {
        self.write_grace = grace;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub async fn state(&self) -> TimerState {
        self.engine.lock().await.state()
    }

    pub async fn snapshot(&self) -> Event {
        self.engine.lock().await.snapshot()
    }

    /// Whether a tick source is currently alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. A second `start()` while running changes nothing and
    /// never creates a second tick source.
    pub async fn start(&mut self) -> Option<Event> {
        let event = self.engine.lock().await.start()?;
        self.spawn_ticker();
        self.effects.emit(event.clone());
        Some(event)
    }

    pub async fn pause(&mut self) -> Option<Event> {
        let event = self.engine.lock().await.pause();
        self.cancel_ticker();
        if let Some(ref e) = event {
            self.effects.emit(e.clone());
        }
        event
    }

    /// Start if paused, pause if running.
    pub async fn toggle(&mut self) -> Option<Event> {
        let running = self.engine.lock().await.is_running();
        if running {
            self.pause().await
        } else {
            self.start().await
        }
    }

    pub async fn reset(&mut self) -> Option<Event> {
        let event = self.engine.lock().await.reset();
        self.cancel_ticker();
        if let Some(ref e) = event {
            self.effects.emit(e.clone());
        }
        event
    }

    /// Tear the view down: stop ticking and wait for record writes in flight.
    ///
    /// No tick is delivered after this returns. Writes still unanswered when
    /// the grace period runs out are aborted and reported as `RecordDropped`.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            let _ = handle.await;
        }
        let pending = match self.effects.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => Vec::new(),
        };

        let deadline = Instant::now() + self.write_grace;
        for PendingWrite {
            occurred_at,
            mut handle,
        } in pending
        {
            if time::timeout_at(deadline, &mut handle).await.is_err() {
                handle.abort();
                tracing::warn!(
                    store = self.effects.recorder.store_name(),
                    occurred_at = %occurred_at,
                    grace_ms = self.write_grace.as_millis() as u64,
                    "dropping work session record still pending at shutdown"
                );
                self.effects.emit(Event::RecordDropped {
                    occurred_at,
                    reason: format!(
                        "store did not answer within {}ms of shutdown",
                        self.write_grace.as_millis()
                    ),
                });
            }
        }
        tracing::debug!("focus session shut down");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_ticker(&mut self) {
        self.cancel_ticker();

        let engine = self.engine.clone();
        let effects = self.effects.clone();
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;

                let mut guard = engine.lock().await;
                if !guard.is_running() {
                    break;
                }
                if let Some(event) = guard.tick_at(Utc::now()) {
                    effects.dispatch(event);
                }
                if !guard.is_running() {
                    break;
                }
            }
            tracing::debug!("ticker stopped");
        });

        tracing::debug!(period_ms = period.as_millis() as u64, "ticker started");
        self.ticker = Some(handle);
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for FocusSession {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
