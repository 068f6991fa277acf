use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the base directory.
pub const HOME_ENV: &str = "CLOSING_INTAKE_HOME";

/// Deployment settings. Missing keys fall back to their defaults, so older
/// files keep loading as fields are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Days ahead of today a signature may be dated.
    pub signature_window_days: u32,
    /// Host of the cover-sheet and email endpoints.
    pub api_base_url: String,
    pub airtable_api_url: String,
    pub airtable_base_id: String,
    pub airtable_table_id: String,
    pub notification_recipients: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            signature_window_days: Self::default_signature_window_days(),
            api_base_url: "http://localhost:3000".into(),
            airtable_api_url: "https://api.airtable.com/v0".into(),
            airtable_base_id: String::new(),
            airtable_table_id: String::new(),
            notification_recipients: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn default_signature_window_days() -> u32 {
        90
    }

    /// `$CLOSING_INTAKE_HOME`, else `<config dir>/closing-intake`.
    pub fn resolve_base_dir() -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return PathBuf::from(home);
        }

        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("closing-intake")
    }

    /// Whether record creation has somewhere to go.
    pub fn has_airtable_target(&self) -> bool {
        !self.airtable_base_id.trim().is_empty() && !self.airtable_table_id.trim().is_empty()
    }
}
