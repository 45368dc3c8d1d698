//! Loader configuration structures.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Prefix for environment overrides read by [`LoaderConfig::from_env`].
pub const ENV_PREFIX: &str = "LOAD_STAGGER_";

/// Admission policy parameters. A zero threshold disables that rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Master switch. When off every item is admitted and the cap is unbounded.
    pub enabled: bool,
    /// Lower bound on the concurrency cap.
    pub min_simultaneous_loads: u32,
    /// Upper bound on the concurrency cap (0 = none).
    pub max_simultaneous_loads: u32,
    /// Cores consumed by one concurrent slot (0 = cores do not limit).
    pub cores_per_simultaneous_load: u32,
    /// Items admitted regardless of any other signal.
    pub min_items_to_load: u32,
    /// Maximum items started per scheduler (0 = none).
    pub max_items_to_load: u32,
    /// Free memory required per item, in MiB.
    pub free_memory_mib_per_item: u32,
    /// Maximum idle age of an item, in seconds.
    pub max_idle_secs: u64,
    /// Minimum priority score of an item.
    pub min_priority_score: u32,
}

impl AdmissionConfig {
    /// Policy switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Policy on, with every per-item threshold and the cap bounds cleared.
    pub fn permissive() -> Self {
        Self {
            enabled: true,
            min_simultaneous_loads: 1,
            max_simultaneous_loads: 0,
            cores_per_simultaneous_load: 0,
            min_items_to_load: 0,
            max_items_to_load: 0,
            free_memory_mib_per_item: 0,
            max_idle_secs: 0,
            min_priority_score: 0,
        }
    }

    /// Idle-age threshold, if configured.
    pub const fn max_idle(&self) -> Option<Duration> {
        if self.max_idle_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.max_idle_secs))
        }
    }

    /// Validate parameter relationships.
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if self.min_simultaneous_loads == 0 {
            return Err("min_simultaneous_loads must be greater than 0".into());
        }
        if self.max_simultaneous_loads != 0
            && self.min_simultaneous_loads > self.max_simultaneous_loads
        {
            return Err("min_simultaneous_loads must not exceed max_simultaneous_loads".into());
        }
        if self.max_items_to_load != 0 && self.min_items_to_load > self.max_items_to_load {
            return Err("min_items_to_load must not exceed max_items_to_load".into());
        }
        Ok(())
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_simultaneous_loads: 1,
            max_simultaneous_loads: 4,
            cores_per_simultaneous_load: 2,
            min_items_to_load: 4,
            max_items_to_load: 20,
            free_memory_mib_per_item: 150,
            max_idle_secs: 6 * 60 * 60,
            min_priority_score: 15,
        }
    }
}

/// Liveness timer periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Base period between forced loads once an item completed, in milliseconds.
    pub timeout_ms: u64,
    /// Period allowed for the very first item, in milliseconds.
    pub first_item_timeout_ms: u64,
}

impl TimeoutConfig {
    /// Base period as a duration.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// First-item period as a duration.
    pub const fn first_item_timeout(&self) -> Duration {
        Duration::from_millis(self.first_item_timeout_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            first_item_timeout_ms: 60_000,
        }
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Platform cap reported by the delegate (0 = let the policy decide).
    pub max_simultaneous_loads: u32,
    /// Stop once this many items were scheduled (0 = unlimited).
    pub scheduled_load_limit: u32,
    /// Liveness timer periods.
    pub timeouts: TimeoutConfig,
    /// Admission policy parameters.
    pub admission: AdmissionConfig,
}

impl LoaderConfig {
    /// Validate all values.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeouts.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".into());
        }
        if self.timeouts.first_item_timeout_ms == 0 {
            return Err("first_item_timeout_ms must be greater than 0".into());
        }
        self.admission
            .validate()
            .map_err(|e| format!("admission invalid: {e}"))
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from defaults plus `LOAD_STAGGER_*` environment
    /// variables, loading a `.env` file first when one exists.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Apply overrides from a key lookup. Split from [`Self::from_env`] so the
    /// parsing can be exercised without touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = read("MAX_SIMULTANEOUS_LOADS") {
            self.max_simultaneous_loads = v.parse().context("MAX_SIMULTANEOUS_LOADS")?;
        }
        if let Some(v) = read("SCHEDULED_LOAD_LIMIT") {
            self.scheduled_load_limit = v.parse().context("SCHEDULED_LOAD_LIMIT")?;
        }
        if let Some(v) = read("TIMEOUT_MS") {
            self.timeouts.timeout_ms = v.parse().context("TIMEOUT_MS")?;
        }
        if let Some(v) = read("FIRST_ITEM_TIMEOUT_MS") {
            self.timeouts.first_item_timeout_ms = v.parse().context("FIRST_ITEM_TIMEOUT_MS")?;
        }
        if let Some(v) = read("POLICY_ENABLED") {
            self.admission.enabled = v.parse().context("POLICY_ENABLED")?;
        }
        if let Some(v) = read("MIN_ITEMS_TO_LOAD") {
            self.admission.min_items_to_load = v.parse().context("MIN_ITEMS_TO_LOAD")?;
        }
        if let Some(v) = read("MAX_ITEMS_TO_LOAD") {
            self.admission.max_items_to_load = v.parse().context("MAX_ITEMS_TO_LOAD")?;
        }
        if let Some(v) = read("FREE_MEMORY_MIB_PER_ITEM") {
            self.admission.free_memory_mib_per_item =
                v.parse().context("FREE_MEMORY_MIB_PER_ITEM")?;
        }
        Ok(())
    }
}
