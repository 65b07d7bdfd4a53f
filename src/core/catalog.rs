//! Catalog entries and the catalog storage contract.

use crate::core::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identity of a catalog entry: one sellable variant in one market.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub model: String,
    pub grade: String,
    pub capacity: String,
    pub color: String,
    pub market: String,
}

impl Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.model, self.grade, self.capacity, self.color, self.market
        )
    }
}

/// One priced catalog entry.
///
/// `sell_price` excludes commission; the customer-facing price is
/// [`CatalogEntry::customer_price`]. Derived fields are refreshed on
/// every recalculation sweep even when the sell price is unchanged, so
/// `priced_at` always reflects the last sweep, not the last change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: EntryKey,
    /// Raw upstream cost before add-ons.
    pub base_price: f64,
    pub total_cost: f64,
    pub sell_price: f64,
    pub margin_pct: f64,
    pub profit: f64,
    pub commission: f64,
    /// Manual pin that supersedes the calculated customer price.
    pub is_override: bool,
    pub override_price: Option<f64>,
    pub stocked_at: Option<DateTime<Utc>>,
    pub priced_at: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    pub fn new(key: EntryKey, base_price: f64) -> Self {
        CatalogEntry {
            key,
            base_price,
            total_cost: 0.0,
            sell_price: 0.0,
            margin_pct: 0.0,
            profit: 0.0,
            commission: 0.0,
            is_override: false,
            override_price: None,
            stocked_at: None,
            priced_at: None,
        }
    }

    /// The price shown to buyers: the manual override when pinned,
    /// otherwise sell price plus commission. Calculated fields keep
    /// reflecting the engine's output either way.
    pub fn customer_price(&self) -> f64 {
        if self.is_override {
            if let Some(price) = self.override_price {
                return price;
            }
        }
        self.sell_price + self.commission
    }
}

/// One row of an inventory import batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRow {
    pub model: String,
    pub grade: String,
    pub capacity: String,
    pub color: String,
    pub market: String,
    pub base_price: f64,
}

impl ImportRow {
    pub fn key(&self) -> EntryKey {
        EntryKey {
            model: self.model.clone(),
            grade: self.grade.clone(),
            capacity: self.capacity.clone(),
            color: self.color.clone(),
            market: self.market.clone(),
        }
    }
}

/// Persistence contract for the catalog.
///
/// `load_all` is unfiltered by design: the recalculation sweep must see
/// every entry to keep its audit trail complete.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<CatalogEntry>>;
    async fn get(&self, key: &EntryKey) -> Result<Option<CatalogEntry>>;
    async fn save(&self, entry: &CatalogEntry) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> EntryKey {
        EntryKey {
            model: "PX-12".to_string(),
            grade: "A".to_string(),
            capacity: "128GB".to_string(),
            color: "black".to_string(),
            market: "US".to_string(),
        }
    }

    #[test]
    fn test_customer_price_without_override() {
        let mut entry = CatalogEntry::new(key(), 400.0);
        entry.sell_price = 550.0;
        entry.commission = 44.0;
        assert_eq!(entry.customer_price(), 594.0);
    }

    #[test]
    fn test_customer_price_with_override() {
        let mut entry = CatalogEntry::new(key(), 400.0);
        entry.sell_price = 550.0;
        entry.commission = 44.0;
        entry.is_override = true;
        entry.override_price = Some(499.0);
        assert_eq!(entry.customer_price(), 499.0);

        // A pin without a price falls back to the calculated value
        entry.override_price = None;
        assert_eq!(entry.customer_price(), 594.0);
    }

    #[test]
    fn test_entry_key_display() {
        assert_eq!(key().to_string(), "PX-12/A/128GB/black/US");
    }
}
