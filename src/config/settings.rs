//! User settings for Tally
//!
//! Display preferences: currency symbol, date format, how many categories a
//! month ranking shows, and the window `list` applies when none is given.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::TallyPaths;
use crate::error::TallyError;
use crate::reports::{DurationWindow, TOP_CATEGORY_LIMIT};
use crate::storage::write_json_atomic;

/// Keys accepted by [`Settings::set`]
pub const SETTING_KEYS: [&str; 4] = [
    "currency_symbol",
    "date_format",
    "top_categories",
    "default_window",
];

/// User settings for Tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol shown before amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Number of categories shown in month rankings
    #[serde(default = "default_top_categories")]
    pub top_categories: usize,

    /// Window applied by `list` when no filter is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_window: Option<DurationWindow>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_date_format() -> String {
    "%d %b %Y".to_string()
}

fn default_top_categories() -> usize {
    TOP_CATEGORY_LIMIT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            top_categories: default_top_categories(),
            default_window: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &TallyPaths) -> Result<Self, TallyError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| TallyError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TallyError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TallyPaths) -> Result<(), TallyError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), TallyError> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(TallyError::Config(format!(
                "Invalid date format '{}'",
                self.date_format
            )));
        }
        if self.top_categories == 0 {
            return Err(TallyError::Config(
                "top_categories must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Update one setting from its textual form
    ///
    /// `default_window` accepts a window name or `none`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), TallyError> {
        let mut updated = self.clone();
        let value = value.trim();

        match key {
            "currency_symbol" => updated.currency_symbol = value.to_string(),
            "date_format" => {
                if value.is_empty() {
                    return Err(TallyError::Config("date_format cannot be empty".into()));
                }
                updated.date_format = value.to_string();
            }
            "top_categories" => {
                updated.top_categories = value.parse().map_err(|_| {
                    TallyError::Config(format!("top_categories must be a number, got '{}'", value))
                })?;
            }
            "default_window" => {
                updated.default_window = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.parse().map_err(TallyError::Config)?)
                };
            }
            other => {
                return Err(TallyError::Config(format!(
                    "Unknown setting '{}' (expected one of: {})",
                    other,
                    SETTING_KEYS.join(", ")
                )))
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every setting as a (key, value) pair, in display order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("currency_symbol", self.currency_symbol.clone()),
            ("date_format", self.date_format.clone()),
            ("top_categories", self.top_categories.to_string()),
            (
                "default_window",
                self.default_window
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ),
        ]
    }
}
