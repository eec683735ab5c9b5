use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "tapspeed";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/tapspeed`, or the platform data dir without a HOME
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.config_dir().join("config.json"))
    }

    pub fn personal_best_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("personal_best.json"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir()
    }
}
