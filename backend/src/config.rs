//! Application configuration.
//!
//! Everything is an in-code constant. [`Settings::from_env`] lets the
//! command-line tool override a few of them from the environment or a
//! `.env` file; the library itself never reads the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Spreadsheet holding the directory.
pub const SHEET_ID: &str = "12aodSbtnxiDmiSwcCrVEP0NFBbWYDJtQpa7ILXQ5fZg";

/// CSV export URL of a spreadsheet (visualization endpoint, `tqx=out:csv`).
pub fn export_url(sheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv", sheet_id)
}

/// Relay script receiving contact and report submissions.
pub const RELAY_URL: &str = "https://script.google.com/macros/s/AKfycbwskvlFfMB2wSzBdL5f2NmsR4SCPUpY_gVqnaJZkONVb3BSbSdr1C-jrk6o6mg4BgQlJw/exec";

/// Messages allowed per window.
pub const DAILY_LIMIT: u32 = 10;

/// Length of a rate window.
pub const RATE_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Key of the persisted rate window.
pub const STORAGE_KEY: &str = "adalc_daily_email_stats";

/// Directory for persisted state (relative to current dir).
pub const DEFAULT_STATE_DIR: &str = ".annuaire";

/// Timeout for the dataset fetch and the relay call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime settings, defaulting to the constants above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub csv_url: String,
    pub relay_url: String,
    pub daily_limit: u32,
    pub rate_window: Duration,
    pub storage_key: String,
    pub state_dir: PathBuf,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv_url: export_url(SHEET_ID),
            relay_url: RELAY_URL.to_string(),
            daily_limit: DAILY_LIMIT,
            rate_window: RATE_WINDOW,
            storage_key: STORAGE_KEY.to_string(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Settings {
    /// Defaults overridden by `ANNUAIRE_*` variables.
    ///
    /// Recognized: `ANNUAIRE_CSV_URL`, `ANNUAIRE_RELAY_URL`,
    /// `ANNUAIRE_DAILY_LIMIT`, `ANNUAIRE_STATE_DIR`. Unparsable values keep
    /// the default.
    pub fn from_env() -> Self {
        // Try loading .env file
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(url) = lookup("ANNUAIRE_CSV_URL").filter(|v| !v.trim().is_empty()) {
            settings.csv_url = url.trim().to_string();
        }
        if let Some(url) = lookup("ANNUAIRE_RELAY_URL").filter(|v| !v.trim().is_empty()) {
            settings.relay_url = url.trim().to_string();
        }
        if let Some(limit) = lookup("ANNUAIRE_DAILY_LIMIT").and_then(|v| v.trim().parse().ok()) {
            settings.daily_limit = limit;
        }
        if let Some(dir) = lookup("ANNUAIRE_STATE_DIR").filter(|v| !v.trim().is_empty()) {
            settings.state_dir = PathBuf::from(dir.trim());
        }

        settings
    }

    /// Rate window length in milliseconds.
    pub fn rate_window_ms(&self) -> i64 {
        self.rate_window.as_millis() as i64
    }
}
