//! Wires stores, cache, calculator and sweep into one engine.

use crate::cache::SettingsCache;
use crate::core::catalog::{CatalogEntry, CatalogStore, EntryKey, ImportRow};
use crate::core::error::{EngineError, Result};
use crate::core::history::{ChangeType, HistoryQuery, HistoryStore, PriceHistoryEntry};
use crate::core::pricing::{self, PRICE_EPSILON, Quote};
use crate::core::settings::MarketSettings;
use crate::store::disk::DiskStores;
use crate::store::memory::{MemoryCatalogStore, MemoryHistoryStore, MemorySettingsStore};
use crate::sweep::{RecalculationSweep, SweepSummary, SweepTrigger};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// The assembled pricing engine.
///
/// Collaborators (CLI commands, tests) go through this facade: single
/// quotes, settings reads/saves, imports, sweeps and ledger queries.
pub struct Engine {
    settings: Arc<SettingsCache>,
    catalog: Arc<dyn CatalogStore>,
    history: Arc<dyn HistoryStore>,
    sweep: RecalculationSweep,
}

impl Engine {
    pub fn new(
        settings_cache: Arc<SettingsCache>,
        catalog: Arc<dyn CatalogStore>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let sweep =
            RecalculationSweep::new(catalog.clone(), history.clone(), settings_cache.clone());
        Engine {
            settings: settings_cache,
            catalog,
            history,
            sweep,
        }
    }

    /// Engine over fjall partitions under `data_path`.
    pub fn open(data_path: &Path, ttl: Duration) -> Result<Self> {
        let stores = DiskStores::open(data_path)?;
        let cache = Arc::new(SettingsCache::new(stores.settings.clone(), ttl));
        Ok(Engine::new(cache, stores.catalog.clone(), stores.history.clone()))
    }

    /// Engine over in-memory stores; nothing survives the process.
    pub fn in_memory(ttl: Duration) -> Self {
        let store = Arc::new(MemorySettingsStore::new());
        let cache = Arc::new(SettingsCache::new(store, ttl));
        Engine::new(
            cache,
            Arc::new(MemoryCatalogStore::new()),
            Arc::new(MemoryHistoryStore::new()),
        )
    }

    pub fn sweep(&self) -> &RecalculationSweep {
        &self.sweep
    }

    pub fn settings_cache(&self) -> &SettingsCache {
        &self.settings
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    /// Single-item price lookup against the market's current settings.
    pub async fn quote(&self, market: &str, base_price: f64) -> Result<Quote> {
        let settings = self.settings.get(market).await?;
        Ok(pricing::price(base_price, &settings))
    }

    /// Resolved settings for a market (defaults when none are stored).
    pub async fn settings(&self, market: &str) -> Result<MarketSettings> {
        self.settings.get(market).await
    }

    /// Saves settings, then sweeps the catalog so every entry reflects
    /// them. This is the save -> sweep contract of the settings
    /// endpoint; invalidation happens inside the save.
    pub async fn apply_settings(
        &self,
        market: &str,
        settings: &MarketSettings,
    ) -> Result<SweepSummary> {
        self.settings.save(market, settings).await?;
        self.sweep.run(SweepTrigger::Automatic).await
    }

    /// Upserts a batch of imported rows, then reprices the whole
    /// catalog with ledger rows tagged as imports. Existing entries keep
    /// their previous derived fields until the sweep diffs them.
    pub async fn import(&self, rows: &[ImportRow]) -> Result<SweepSummary> {
        for row in rows {
            let key = row.key();
            let mut entry = match self.catalog.get(&key).await? {
                Some(existing) => existing,
                None => CatalogEntry::new(key, row.base_price),
            };
            entry.base_price = row.base_price;
            entry.stocked_at = Some(Utc::now());
            self.catalog.save(&entry).await?;
        }
        self.sweep.run(SweepTrigger::Import).await
    }

    /// Pins (or clears) a manual customer price on one entry. Records a
    /// manual ledger row when the customer-facing price actually moves.
    pub async fn set_override(&self, key: &EntryKey, price: Option<f64>) -> Result<CatalogEntry> {
        let mut entry = self
            .catalog
            .get(key)
            .await?
            .ok_or_else(|| EngineError::NotFound(key.to_string()))?;
        let settings = self.settings.get(&key.market).await?;

        let old_price = entry.customer_price();
        entry.is_override = price.is_some();
        entry.override_price = price;
        let new_price = entry.customer_price();

        if (new_price - old_price).abs() > PRICE_EPSILON {
            self.history
                .append(&PriceHistoryEntry {
                    key: key.clone(),
                    old_price,
                    new_price,
                    change_type: ChangeType::Manual,
                    reason: "manual override".to_string(),
                    settings,
                    recorded_at: Utc::now(),
                })
                .await?;
        }

        self.catalog.save(&entry).await?;
        Ok(entry)
    }

    pub async fn history(&self, query: &HistoryQuery) -> Result<Vec<PriceHistoryEntry>> {
        self.history.query(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TTL;

    fn row(model: &str, market: &str, base_price: f64) -> ImportRow {
        ImportRow {
            model: model.to_string(),
            grade: "A".to_string(),
            capacity: "128GB".to_string(),
            color: "black".to_string(),
            market: market.to_string(),
            base_price,
        }
    }

    #[tokio::test]
    async fn test_import_prices_new_rows_and_tags_them() {
        let engine = Engine::in_memory(DEFAULT_TTL);
        let summary = engine
            .import(&[row("PX-12", "US", 500.0), row("PX-12", "VE", 500.0)])
            .await
            .unwrap();
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.recorded, 2);

        let rows = engine
            .history(&HistoryQuery {
                change_type: Some(ChangeType::Import),
                ..HistoryQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_reimport_with_same_cost_records_nothing() {
        let engine = Engine::in_memory(DEFAULT_TTL);
        engine.import(&[row("PX-12", "US", 500.0)]).await.unwrap();
        let second = engine.import(&[row("PX-12", "US", 500.0)]).await.unwrap();
        assert_eq!(second.recorded, 0);
    }

    #[tokio::test]
    async fn test_apply_settings_reprices_catalog() {
        let engine = Engine::in_memory(DEFAULT_TTL);
        engine.import(&[row("PX-12", "US", 500.0)]).await.unwrap();

        let richer = MarketSettings {
            high_margin_pct: 80.0,
            low_margin_pct: 70.0,
            ..MarketSettings::default()
        };
        let summary = engine.apply_settings("US", &richer).await.unwrap();
        assert_eq!(summary.recorded, 1);

        let quote = engine.quote("US", 500.0).await.unwrap();
        assert_eq!(quote.sell_price, 900.0);
    }

    #[tokio::test]
    async fn test_override_pins_customer_price_and_records_manual_change() {
        let engine = Engine::in_memory(DEFAULT_TTL);
        engine.import(&[row("PX-12", "US", 500.0)]).await.unwrap();

        let key = row("PX-12", "US", 500.0).key();
        let pinned = engine.set_override(&key, Some(999.0)).await.unwrap();
        assert_eq!(pinned.customer_price(), 999.0);
        // Calculated bookkeeping is untouched by the pin
        assert!(pinned.sell_price > 0.0 && pinned.sell_price != 999.0);

        let manual = engine
            .history(&HistoryQuery {
                change_type: Some(ChangeType::Manual),
                ..HistoryQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(manual.len(), 1);
        assert_eq!(manual[0].new_price, 999.0);
    }

    #[tokio::test]
    async fn test_override_on_unknown_entry_is_not_found() {
        let engine = Engine::in_memory(DEFAULT_TTL);
        let key = row("PX-99", "US", 0.0).key();
        let err = engine.set_override(&key, Some(100.0)).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
