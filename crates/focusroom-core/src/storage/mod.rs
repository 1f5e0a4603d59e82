mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, FirestoreConfig, IdentityConfig, StoreBackend, StoreConfig, TimerConfig};
pub use database::{Database, Stats, StoredSession};

use std::path::PathBuf;

/// Returns the data directory.
///
/// `FOCUSROOM_DATA_DIR` wins when set. Otherwise `~/.config/focusroom[-dev]/`
/// based on FOCUSROOM_ENV; set FOCUSROOM_ENV=dev to use the development
/// directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("FOCUSROOM_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FOCUSROOM_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("focusroom-dev")
            } else {
                base_dir.join("focusroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
