//! Host configuration.
//!
//! # Responsibility
//! - Describe store location, logging and dispatch tunables in one place.
//! - Load them from a JSON file where every field is optional.
//!
//! # Invariants
//! - A loaded config has passed `validate()`.
//! - `log_dir` is absolute.

use crate::model::tag::TagMatchMode;
use crate::service::reminder_service::{ReminderSettings, DEFAULT_SUBJECT_PREFIX};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_FILE: &str = "roster.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "roster-logs";
const DEFAULT_REMINDER_HOUR: u32 = 7;

/// Configuration errors surfaced to the host.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Runtime configuration for a directory host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub tag_match: TagMatchMode,
    pub reminder_subject_prefix: String,
    /// Local hour (0-23) at which the host's daily trigger runs reminders.
    pub reminder_hour: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
            log_level: crate::logging::default_log_level().to_string(),
            tag_match: TagMatchMode::default(),
            reminder_subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            reminder_hour: DEFAULT_REMINDER_HOUR,
        }
    }
}

impl RosterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path must not be empty".to_string(),
            ));
        }
        if !self.log_dir.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "log_dir must be an absolute path, got `{}`",
                self.log_dir.display()
            )));
        }
        if self.reminder_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "reminder_hour must be within 0..=23, got {}",
                self.reminder_hour
            )));
        }
        Ok(())
    }

    /// Reminder settings derived from this config.
    pub fn reminder_settings(&self) -> ReminderSettings {
        ReminderSettings {
            match_mode: self.tag_match,
            subject_prefix: self.reminder_subject_prefix.clone(),
        }
    }

    /// Crontab line that runs the reminder due check once a day.
    pub fn reminder_cron_line(&self, command: &str) -> String {
        format!("0 {} * * * {command}", self.reminder_hour)
    }
}

/// Loads and validates a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<RosterConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RosterConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError, RosterConfig};
    use crate::model::tag::TagMatchMode;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        RosterConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tag_match": "exact", "reminder_hour": 6}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.tag_match, TagMatchMode::Exact);
        assert_eq!(config.reminder_hour, 6);
        assert_eq!(config.reminder_subject_prefix, "Reminder: ");
        assert_eq!(
            config.reminder_cron_line("roster reminders run"),
            "0 6 * * * roster reminders run"
        );
    }

    #[test]
    fn rejects_out_of_range_hour_and_unknown_fields() {
        let mut bad_hour = tempfile::NamedTempFile::new().unwrap();
        write!(bad_hour, r#"{{"reminder_hour": 24}}"#).unwrap();
        assert!(matches!(
            load_config(bad_hour.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut unknown = tempfile::NamedTempFile::new().unwrap();
        write!(unknown, r#"{{"smtp_host": "mail"}}"#).unwrap();
        assert!(matches!(
            load_config(unknown.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
