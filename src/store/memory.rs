//! In-memory store implementations, used by tests and ephemeral runs.

use crate::core::catalog::{CatalogEntry, CatalogStore, EntryKey};
use crate::core::error::Result;
use crate::core::history::{HistoryQuery, HistoryStore, PriceHistoryEntry};
use crate::core::settings::{MarketSettings, SettingsStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

pub struct MemorySettingsStore {
    inner: Mutex<HashMap<String, MarketSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        MemorySettingsStore {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self, market: &str) -> Result<Option<MarketSettings>> {
        Ok(self.inner.lock().await.get(market).cloned())
    }

    async fn save(&self, market: &str, settings: &MarketSettings) -> Result<()> {
        self.inner
            .lock()
            .await
            .insert(market.to_string(), settings.clone());
        Ok(())
    }
}

pub struct MemoryCatalogStore {
    inner: Mutex<HashMap<String, CatalogEntry>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        MemoryCatalogStore {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn load_all(&self) -> Result<Vec<CatalogEntry>> {
        let map = self.inner.lock().await;
        let mut entries: Vec<CatalogEntry> = map.values().cloned().collect();
        // Stable order keeps sweeps and their logs deterministic
        entries.sort_by_key(|e| e.key.to_string());
        Ok(entries)
    }

    async fn get(&self, key: &EntryKey) -> Result<Option<CatalogEntry>> {
        Ok(self.inner.lock().await.get(&key.to_string()).cloned())
    }

    async fn save(&self, entry: &CatalogEntry) -> Result<()> {
        self.inner
            .lock()
            .await
            .insert(entry.key.to_string(), entry.clone());
        Ok(())
    }
}

pub struct MemoryHistoryStore {
    inner: Mutex<Vec<PriceHistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        MemoryHistoryStore {
            inner: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: &PriceHistoryEntry) -> Result<()> {
        self.inner.lock().await.push(entry.clone());
        Ok(())
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<PriceHistoryEntry>> {
        let rows = self.inner.lock().await;
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows
            .iter()
            .rev()
            .filter(|e| query.matches(e))
            .skip(query.offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
