//! Dispatch configuration: pool capacity and scheduler budgets.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::AppResult;
use crate::core::scheduler::{LOITER_SECONDS, MAX_RETRIES};
use crate::core::workers::triage::DEFAULT_MAX_EXPLORE_STEPS;

/// Default number of execution resources.
pub const DEFAULT_POOL_CAPACITY: usize = 2;

/// Tunable constants for one scheduler process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Number of execution resources in the pool.
    pub pool_capacity: usize,
    /// Total idle budget in seconds.
    pub loiter_secs: u64,
    /// Consecutive empty polls tolerated before exiting.
    pub max_retries: u32,
    /// Cap on exploration steps per crash.
    pub max_explore_steps: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            loiter_secs: LOITER_SECONDS,
            max_retries: MAX_RETRIES,
            max_explore_steps: DEFAULT_MAX_EXPLORE_STEPS,
        }
    }
}

impl DispatchConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_capacity == 0 {
            return Err("pool_capacity must be greater than 0".into());
        }
        if self.loiter_secs == 0 {
            return Err("loiter_secs must be greater than 0".into());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".into());
        }
        if self.max_explore_steps == 0 {
            return Err("max_explore_steps must be greater than 0".into());
        }
        Ok(())
    }

    /// Total idle budget.
    pub const fn loiter(&self) -> Duration {
        Duration::from_secs(self.loiter_secs)
    }

    /// Sleep taken after each empty poll: `loiter / max_retries`.
    pub fn idle_interval(&self) -> Duration {
        self.loiter() / self.max_retries.max(1)
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment, reading a `.env` file first
    /// if one is present.
    ///
    /// Recognized variables (all optional, defaults otherwise):
    /// - `DISPATCH_POOL_CAPACITY`
    /// - `DISPATCH_LOITER_SECS`
    /// - `DISPATCH_MAX_RETRIES`
    /// - `DISPATCH_MAX_EXPLORE_STEPS`
    ///
    /// # Errors
    ///
    /// Fails if a variable is set but does not parse, or the result is invalid.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Fails if a value is present but does not parse, or the result is invalid.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Self {
            pool_capacity: parse_var(&lookup, "DISPATCH_POOL_CAPACITY", defaults.pool_capacity)?,
            loiter_secs: parse_var(&lookup, "DISPATCH_LOITER_SECS", defaults.loiter_secs)?,
            max_retries: parse_var(&lookup, "DISPATCH_MAX_RETRIES", defaults.max_retries)?,
            max_explore_steps: parse_var(
                &lookup,
                "DISPATCH_MAX_EXPLORE_STEPS",
                defaults.max_explore_steps,
            )?,
        };
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        None => Ok(default),
    }
}
