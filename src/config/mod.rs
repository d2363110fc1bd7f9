use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    domain::{OTHER_CATEGORY, UNCATEGORIZED},
    errors::LedgerError,
};

pub const DEFAULT_RECORDS_KEY: &str = "records";
pub const DEFAULT_CATEGORIES_KEY: &str = "categories";
pub const DEFAULT_TOP_N: usize = 6;
pub const DEFAULT_BACKUP_RETENTION: usize = 5;

/// Runtime settings. Every field is optional on disk; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub records_key: String,
    pub categories_key: String,
    pub top_n: usize,
    /// Offset used to turn timestamps into calendar dates. `None` means the
    /// host's local offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    pub other_label: String,
    pub uncategorized_label: String,
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            records_key: DEFAULT_RECORDS_KEY.into(),
            categories_key: DEFAULT_CATEGORIES_KEY.into(),
            top_n: DEFAULT_TOP_N,
            utc_offset_minutes: None,
            other_label: OTHER_CATEGORY.into(),
            uncategorized_label: UNCATEGORIZED.into(),
            backup_retention: DEFAULT_BACKUP_RETENTION,
        }
    }
}

impl Config {
    pub fn offset(&self) -> FixedOffset {
        match self.utc_offset_minutes {
            Some(minutes) => FixedOffset::east_opt(minutes.saturating_mul(60))
                .unwrap_or_else(|| {
                    tracing::warn!(minutes, "utc offset out of range; using local offset");
                    local_offset()
                }),
            None => local_offset(),
        }
    }

    pub fn with_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = Some(minutes);
        self
    }
}

fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
