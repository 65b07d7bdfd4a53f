//! Append-only price history ledger types and storage contract.

use crate::core::catalog::EntryKey;
use crate::core::error::Result;
use crate::core::settings::MarketSettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// What caused a price transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Manual,
    Automatic,
    Import,
}

impl Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ChangeType::Manual => "manual",
                ChangeType::Automatic => "automatic",
                ChangeType::Import => "import",
            }
        )
    }
}

impl FromStr for ChangeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(ChangeType::Manual),
            "automatic" => Ok(ChangeType::Automatic),
            "import" => Ok(ChangeType::Import),
            _ => Err(anyhow::anyhow!("Invalid change type: {}", s)),
        }
    }
}

/// Immutable record of one material price transition.
///
/// Carries a full snapshot of the market settings in force at the time,
/// so a ledger row can be explained without consulting mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub key: EntryKey,
    pub old_price: f64,
    pub new_price: f64,
    pub change_type: ChangeType,
    pub reason: String,
    pub settings: MarketSettings,
    pub recorded_at: DateTime<Utc>,
}

/// Filters for paginated ledger retrieval. All filters are conjunctive;
/// an empty query matches everything.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub model: Option<String>,
    pub market: Option<String>,
    pub change_type: Option<ChangeType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn matches(&self, entry: &PriceHistoryEntry) -> bool {
        if let Some(model) = &self.model {
            if &entry.key.model != model {
                return false;
            }
        }
        if let Some(market) = &self.market {
            if &entry.key.market != market {
                return false;
            }
        }
        if let Some(change_type) = self.change_type {
            if entry.change_type != change_type {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.recorded_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.recorded_at > to {
                return false;
            }
        }
        true
    }
}

/// Storage contract for the ledger. Append is the only mutation; rows
/// are never edited or deleted.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: &PriceHistoryEntry) -> Result<()>;
    /// Returns matching entries newest first, honoring offset/limit.
    async fn query(&self, query: &HistoryQuery) -> Result<Vec<PriceHistoryEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(model: &str, market: &str, change_type: ChangeType) -> PriceHistoryEntry {
        PriceHistoryEntry {
            key: EntryKey {
                model: model.to_string(),
                grade: "A".to_string(),
                capacity: "64GB".to_string(),
                color: "white".to_string(),
                market: market.to_string(),
            },
            old_price: 100.0,
            new_price: 120.0,
            change_type,
            reason: "test".to_string(),
            settings: MarketSettings::default(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = HistoryQuery::default();
        assert!(query.matches(&entry("PX-12", "US", ChangeType::Automatic)));
        assert!(query.matches(&entry("PX-13", "VE", ChangeType::Manual)));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let query = HistoryQuery {
            model: Some("PX-12".to_string()),
            change_type: Some(ChangeType::Import),
            ..HistoryQuery::default()
        };
        assert!(query.matches(&entry("PX-12", "US", ChangeType::Import)));
        assert!(!query.matches(&entry("PX-12", "US", ChangeType::Automatic)));
        assert!(!query.matches(&entry("PX-13", "US", ChangeType::Import)));
    }

    #[test]
    fn test_date_range_filter() {
        let e = entry("PX-12", "US", ChangeType::Automatic);
        let earlier = e.recorded_at - chrono::Duration::hours(1);
        let later = e.recorded_at + chrono::Duration::hours(1);

        let inside = HistoryQuery {
            from: Some(earlier),
            to: Some(later),
            ..HistoryQuery::default()
        };
        assert!(inside.matches(&e));

        let past = HistoryQuery {
            to: Some(earlier),
            ..HistoryQuery::default()
        };
        assert!(!past.matches(&e));
    }

    #[test]
    fn test_change_type_from_str() {
        assert_eq!("import".parse::<ChangeType>().unwrap(), ChangeType::Import);
        assert_eq!("Manual".parse::<ChangeType>().unwrap(), ChangeType::Manual);
        assert!("bulk".parse::<ChangeType>().is_err());
    }
}
