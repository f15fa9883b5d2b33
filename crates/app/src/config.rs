//! Runtime configuration from environment variables.
//!
//! A `.env` file in the working directory is loaded first when present;
//! variables already set in the environment win.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use cashguard_core::UserId;
use cashguard_custody::SeedData;
use cashguard_observability::{LogFormat, UnknownLogFormat};

pub const ENV_LOG_FORMAT: &str = "CASHGUARD_LOG_FORMAT";
pub const ENV_STRICT_REFERENCES: &str = "CASHGUARD_STRICT_REFERENCES";
pub const ENV_SEED: &str = "CASHGUARD_SEED";
pub const ENV_LOGIN_USER: &str = "CASHGUARD_LOGIN_USER";

/// User logged in by the binary when none is configured.
pub const DEFAULT_LOGIN_USER: &str = "u1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CASHGUARD_LOG_FORMAT: {0}")]
    LogFormat(#[from] UnknownLogFormat),

    #[error("{key}: expected a boolean, got '{value}'")]
    InvalidBool { key: &'static str, value: String },

    #[error("CASHGUARD_SEED: unknown seed profile '{0}' (expected demo or users)")]
    UnknownSeed(String),

    #[error("CASHGUARD_LOGIN_USER: {0}")]
    InvalidUser(String),
}

/// Which data set the ledger starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedProfile {
    /// Users, custodians, invoices and transactions.
    #[default]
    Demo,
    /// The three role users and nothing else.
    UsersOnly,
}

impl SeedProfile {
    pub fn data(self) -> SeedData {
        match self {
            SeedProfile::Demo => SeedData::demo(),
            SeedProfile::UsersOnly => SeedData::users_only(),
        }
    }
}

impl fmt::Display for SeedProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeedProfile::Demo => "demo",
            SeedProfile::UsersOnly => "users",
        })
    }
}

impl FromStr for SeedProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(SeedProfile::Demo),
            "users" | "users-only" | "empty" => Ok(SeedProfile::UsersOnly),
            other => Err(ConfigError::UnknownSeed(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_format: LogFormat,
    /// Surface missing references instead of ignoring them.
    pub strict_references: bool,
    pub seed: SeedProfile,
    pub login_user: UserId,
    /// Variables that were unset and fell back to a default.
    pub defaulted: Vec<&'static str>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            strict_references: false,
            seed: SeedProfile::default(),
            login_user: UserId::new(DEFAULT_LOGIN_USER),
            defaulted: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any), then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Missing .env is fine; variables can be set externally.
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();
        let get = |key: &'static str, defaulted: &mut Vec<&'static str>| {
            let value = lookup(key).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                defaulted.push(key);
            }
            value
        };

        if let Some(raw) = get(ENV_LOG_FORMAT, &mut config.defaulted) {
            config.log_format = raw.parse()?;
        }
        if let Some(raw) = get(ENV_STRICT_REFERENCES, &mut config.defaulted) {
            config.strict_references = parse_bool(ENV_STRICT_REFERENCES, &raw)?;
        }
        if let Some(raw) = get(ENV_SEED, &mut config.defaulted) {
            config.seed = raw.parse()?;
        }
        if let Some(raw) = get(ENV_LOGIN_USER, &mut config.defaulted) {
            config.login_user = raw
                .parse()
                .map_err(|e: cashguard_core::DomainError| ConfigError::InvalidUser(e.to_string()))?;
        }

        Ok(config)
    }

    /// Report which settings fell back to defaults. Call after tracing is up.
    pub fn log_defaults(&self) {
        for key in &self.defaulted {
            match *key {
                ENV_LOG_FORMAT => tracing::info!("{key} not set; using {}", self.log_format),
                ENV_STRICT_REFERENCES => {
                    tracing::info!("{key} not set; using {}", self.strict_references)
                }
                ENV_SEED => tracing::info!("{key} not set; using {}", self.seed),
                ENV_LOGIN_USER => {
                    tracing::warn!("{key} not set; logging in as {}", self.login_user)
                }
                _ => {}
            }
        }
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
}
