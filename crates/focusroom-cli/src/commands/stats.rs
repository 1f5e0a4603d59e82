use chrono::Utc;
use clap::Subcommand;
use focusroom_core::presenter::WorkTotal;
use focusroom_core::storage::Database;
use focusroom_core::{Config, OwnerId, StoreBackend};
use serde::Serialize;

use super::print_json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's recorded work sessions
    Today {
        /// Owner to report on (defaults to identity.user_id; all owners if unset)
        #[arg(long)]
        owner: Option<String>,
    },
    /// All-time recorded work sessions
    All {
        #[arg(long)]
        owner: Option<String>,
    },
    /// Most recent recorded sessions
    Recent {
        #[arg(long)]
        owner: Option<String>,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Serialize)]
struct DayReport {
    owner: Option<OwnerId>,
    sessions: u64,
    focus_minutes: u64,
    focus_total: String,
}

#[derive(Serialize)]
struct AllTimeReport {
    owner: Option<OwnerId>,
    today_sessions: u64,
    today_focus_total: String,
    total_sessions: u64,
    total_focus_minutes: u64,
    total_focus_total: String,
}

fn resolve_owner(
    config: &Config,
    flag: Option<String>,
) -> Result<Option<OwnerId>, Box<dyn std::error::Error>> {
    match flag {
        Some(id) => Ok(Some(
            OwnerId::new(id).ok_or("--owner must not be blank")?,
        )),
        None => Ok(config.user_id().and_then(OwnerId::new)),
    }
}

/// Stats only read the local SQLite history.
pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    if config.store.backend != StoreBackend::Local {
        tracing::warn!(
            backend = ?config.store.backend,
            "stats cover the local store only; sessions written to the configured backend are not counted"
        );
    }
    let db = Database::open()?;
    let now = Utc::now();

    match action {
        StatsAction::Today { owner } => {
            let owner = resolve_owner(&config, owner)?;
            let stats = db.stats(owner.as_ref(), now)?;
            print_json(&DayReport {
                sessions: stats.today_sessions,
                focus_minutes: stats.today_focus_min,
                focus_total: WorkTotal::from_minutes(stats.today_focus_min).to_string(),
                owner,
            })?;
        }
        StatsAction::All { owner } => {
            let owner = resolve_owner(&config, owner)?;
            let stats = db.stats(owner.as_ref(), now)?;
            print_json(&AllTimeReport {
                today_sessions: stats.today_sessions,
                today_focus_total: WorkTotal::from_minutes(stats.today_focus_min).to_string(),
                total_sessions: stats.total_sessions,
                total_focus_minutes: stats.total_focus_min,
                total_focus_total: WorkTotal::from_minutes(stats.total_focus_min).to_string(),
                owner,
            })?;
        }
        StatsAction::Recent { owner, limit } => {
            let owner = resolve_owner(&config, owner)?;
            let sessions = db.recent_sessions(owner.as_ref(), limit)?;
            print_json(&sessions)?;
        }
    }
    Ok(())
}
