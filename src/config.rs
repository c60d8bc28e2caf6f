//! Run configuration, loaded from an optional JSON file and then overridden
//! by command-line flags.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::schedule::search::{SearchSettings, DEFAULT_MAX_CANDIDATES, DEFAULT_TIME_BUDGET};
use crate::schedule::slot_utils::{SlotCatalog, DEFAULT_DAY_NAMES, DEFAULT_INTERVAL_BOUNDS};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Day names, in order
    pub days: Vec<String>,

    /// Interval boundaries within a day; consecutive pairs form the slots
    pub interval_bounds: Vec<String>,

    /// Roster column names and marker values
    pub columns: RosterColumns,

    /// Leader search limits
    pub search: SearchConfig,
}

/// Where the roster loader finds each field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RosterColumns {
    pub id: String,
    pub name: String,
    pub email: String,
    pub leader_flag: String,

    /// Value of the leader column marking a group leader
    pub leader_value: String,

    /// Value of a slot column marking the person as available
    pub available_value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget for the leader search (seconds)
    pub time_budget_secs: u64,

    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,

    pub max_restarts: Option<u64>,
    pub max_candidates: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            days: DEFAULT_DAY_NAMES.iter().map(|d| d.to_string()).collect(),
            interval_bounds: DEFAULT_INTERVAL_BOUNDS.iter().map(|b| b.to_string()).collect(),
            columns: RosterColumns::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for RosterColumns {
    fn default() -> Self {
        RosterColumns {
            id: "RUID".to_string(),
            name: "Name".to_string(),
            email: "Email".to_string(),
            leader_flag: "Group leader?".to_string(),
            leader_value: "Yes".to_string(),
            available_value: "Available".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            time_budget_secs: DEFAULT_TIME_BUDGET.as_secs(),
            seed: None,
            max_restarts: None,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl SchedulerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn catalog(&self) -> Result<SlotCatalog> {
        SlotCatalog::new(self.days.clone(), self.interval_bounds.clone())
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            time_budget: Duration::from_secs(self.search.time_budget_secs),
            max_restarts: self.search.max_restarts,
            max_candidates: self.search.max_candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_week() {
        let config = SchedulerConfig::default();
        assert_eq!(config.catalog().unwrap().len(), 40);
        assert_eq!(config.search_settings().time_budget, Duration::from_secs(60));
        assert_eq!(config.columns.id, "RUID");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SchedulerConfig::from_json_str(
            r#"{ "days": ["Sat", "Sun"], "search": { "seed": 7, "time_budget_secs": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.catalog().unwrap().len(), 16);
        assert_eq!(config.search.seed, Some(7));
        assert_eq!(config.search.max_candidates, DEFAULT_MAX_CANDIDATES);
        assert_eq!(config.columns, RosterColumns::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SchedulerConfig::from_json_str("{ days: ").is_err());
    }
}
