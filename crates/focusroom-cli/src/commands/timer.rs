use std::str::FromStr;
use std::sync::Arc;

use clap::Subcommand;
use focusroom_core::identity::IdentityProvider;
use focusroom_core::recorder::store_from_config;
use focusroom_core::{Config, FocusSession, SessionRecorder, StaticIdentity, TimerEngine};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::print_json;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Open a timer and drive it from stdin
    /// (start, pause, toggle, reset, status, quit)
    Run {
        /// Work interval length in minutes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        work_minutes: Option<u64>,
        /// Break interval length in minutes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        break_minutes: Option<u64>,
        /// Real milliseconds per tick
        #[arg(long)]
        tick_ms: Option<u64>,
    },
    /// Print the initial timer state as JSON
    Preview,
}

/// A line typed into a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionCommand {
    Start,
    Pause,
    Toggle,
    Reset,
    Status,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "resume" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "toggle" | "t" => Ok(Self::Toggle),
            "reset" => Ok(Self::Reset),
            "status" | "s" => Ok(Self::Status),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!(
                "unknown command: {other} (start, pause, toggle, reset, status, quit)"
            )),
        }
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    match action {
        TimerAction::Run {
            work_minutes,
            break_minutes,
            tick_ms,
        } => {
            if let Some(m) = work_minutes {
                config.timer.work_minutes = m;
            }
            if let Some(m) = break_minutes {
                config.timer.break_minutes = m;
            }
            if let Some(ms) = tick_ms {
                config.timer.tick_interval_ms = ms;
            }
            config.validate()?;
            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(run_session(&config));
            // A stdin read may still be parked on the blocking pool.
            runtime.shutdown_background();
            result
        }
        TimerAction::Preview => {
            let engine = TimerEngine::new(config.timer.durations());
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            Ok(())
        }
    }
}

async fn run_session(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = SessionRecorder::new(store_from_config(config)?);
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(StaticIdentity::from_user_id(config.user_id()));
    if identity.current_owner().is_none() {
        tracing::warn!("identity.user_id is not set; completed sessions will not be recorded");
    }

    let (mut session, mut events) = FocusSession::from_config(&config.timer, recorder, identity);
    print_json(&session.snapshot().await)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<SessionCommand>() {
                    Ok(SessionCommand::Start) => { session.start().await; }
                    Ok(SessionCommand::Pause) => { session.pause().await; }
                    Ok(SessionCommand::Toggle) => { session.toggle().await; }
                    Ok(SessionCommand::Reset) => { session.reset().await; }
                    Ok(SessionCommand::Status) => print_json(&session.snapshot().await)?,
                    Ok(SessionCommand::Quit) => break,
                    Err(e) => eprintln!("{e}"),
                }
            }
            Some(event) = events.recv() => print_json(&event)?,
        }
    }

    let final_snapshot = session.snapshot().await;
    session.shutdown().await;
    while let Ok(event) = events.try_recv() {
        print_json(&event)?;
    }
    print_json(&final_snapshot)?;
    Ok(())
}
