use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::screening::pipeline::{BatchConfig, DuplicatePolicy};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub max_batch_size: usize,
    pub shortlist_threshold: u8,
    pub fallback_on_empty_skills: bool,
    pub processing_concurrency: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub batch_deadline: Option<Duration>,
    pub skill_vocabulary_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_batch_size: env_or("MAX_BATCH_SIZE", 100)?,
            shortlist_threshold: env_or("SHORTLIST_THRESHOLD", 60)?,
            fallback_on_empty_skills: env_or("FALLBACK_ON_EMPTY_SKILLS", false)?,
            processing_concurrency: env_or("PROCESSING_CONCURRENCY", 4)?,
            duplicate_policy: env_or("DUPLICATE_FILE_POLICY", DuplicatePolicy::Reject)?,
            batch_deadline: optional_env::<u64>("BATCH_DEADLINE_SECS")?.map(Duration::from_secs),
            skill_vocabulary_path: std::env::var("SKILL_VOCABULARY_PATH").ok().map(PathBuf::from),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            bail!("MAX_BATCH_SIZE must be at least 1");
        }
        if self.shortlist_threshold > 100 {
            bail!("SHORTLIST_THRESHOLD must be between 0 and 100");
        }
        if self.processing_concurrency == 0 {
            bail!("PROCESSING_CONCURRENCY must be at least 1");
        }
        Ok(())
    }

    /// Orchestrator settings derived from this config.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            max_batch_size: self.max_batch_size,
            shortlist_threshold: self.shortlist_threshold,
            fallback_on_empty_skills: self.fallback_on_empty_skills,
            concurrency: self.processing_concurrency,
            duplicate_policy: self.duplicate_policy,
            deadline: self.batch_deadline,
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/screening".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            max_batch_size: 100,
            shortlist_threshold: 60,
            fallback_on_empty_skills: false,
            processing_concurrency: 4,
            duplicate_policy: DuplicatePolicy::Reject,
            batch_deadline: None,
            skill_vocabulary_path: None,
            max_upload_bytes: 1024 * 1024,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(optional_env(key)?.unwrap_or(default))
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config::for_tests()
    }

    #[test]
    fn test_defaults_validate() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_threshold_above_100_rejected() {
        let config = Config {
            shortlist_threshold: 101,
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = Config {
            processing_concurrency: 0,
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_batch_config_carries_settings() {
        let config = Config {
            fallback_on_empty_skills: true,
            batch_deadline: Some(Duration::from_secs(30)),
            ..base()
        };
        let batch = config.batch_config();
        assert_eq!(batch.max_batch_size, 100);
        assert_eq!(batch.shortlist_threshold, 60);
        assert!(batch.fallback_on_empty_skills);
        assert_eq!(batch.deadline, Some(Duration::from_secs(30)));
    }
}
