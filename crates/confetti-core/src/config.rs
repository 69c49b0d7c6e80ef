//! Deployment configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields a
//! working local setup backed by `confetti.db` in the current directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::SchedulerSettings;
use crate::app::template::{DEFAULT_DEBUG_MESSAGE, DEFAULT_MESSAGE, MessageTemplate};
use crate::domain::{ChannelId, CommunityId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One entry of the console roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub id: u64,
    /// Text used when greeting this member. Falls back to the stored name.
    #[serde(default)]
    pub mention: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    pub community_id: u64,
    pub developer_ids: Vec<u64>,
    pub cycle_period_secs: u64,
    pub message_template: String,
    pub debug_message_template: String,
    /// Used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub default_channel_id: Option<u64>,
    pub members: Vec<MemberEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("confetti.db"),
            community_id: 1,
            developer_ids: Vec::new(),
            cycle_period_secs: 24 * 60 * 60,
            message_template: DEFAULT_MESSAGE.to_owned(),
            debug_message_template: DEFAULT_DEBUG_MESSAGE.to_owned(),
            log_filter: "confetti=info,confetti_core=info".to_owned(),
            default_channel_id: None,
            members: Vec::new(),
        }
    }
}

impl Config {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_period_secs == 0 {
            return Err(ConfigError::Invalid(
                "cycle_period_secs must be greater than zero".to_owned(),
            ));
        }
        self.templates().map(|_| ())?;

        let mut seen = HashSet::new();
        if let Some(dup) = self.members.iter().find(|m| !seen.insert(m.id)) {
            return Err(ConfigError::Invalid(format!(
                "member {} is listed more than once",
                dup.id
            )));
        }
        Ok(())
    }

    pub fn community(&self) -> CommunityId {
        CommunityId::new(self.community_id)
    }

    pub fn default_channel(&self) -> Option<ChannelId> {
        self.default_channel_id.map(ChannelId::new)
    }

    pub fn is_developer(&self, user: UserId) -> bool {
        self.developer_ids.contains(&user.get())
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(self.cycle_period_secs)
    }

    pub fn scheduler_settings(&self) -> Result<SchedulerSettings, ConfigError> {
        let (template, debug_template) = self.templates()?;
        Ok(SchedulerSettings {
            community: self.community(),
            template,
            debug_template,
        })
    }

    fn templates(&self) -> Result<(MessageTemplate, MessageTemplate), ConfigError> {
        let parse = |field: &str, raw: &str| {
            MessageTemplate::new(raw).ok_or_else(|| {
                ConfigError::Invalid(format!("{field} must contain the {{name}} placeholder"))
            })
        };
        Ok((
            parse("message_template", &self.message_template)?,
            parse("debug_message_template", &self.debug_message_template)?,
        ))
    }
}
