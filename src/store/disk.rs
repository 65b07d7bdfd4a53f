//! fjall-backed persistent stores.
//!
//! One keyspace holds three partitions (`settings`, `catalog`,
//! `history`); values are serde_json blobs. History keys are
//! zero-padded `millis-seq` strings so lexicographic order is append
//! order and reverse iteration yields newest first.

use crate::core::catalog::{CatalogEntry, CatalogStore, EntryKey};
use crate::core::error::{EngineError, Result};
use crate::core::history::{HistoryQuery, HistoryStore, PriceHistoryEntry};
use crate::core::settings::{MarketSettings, SettingsStore};
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// All persistent stores backed by a single keyspace.
pub struct DiskStores {
    _keyspace: Keyspace,
    pub settings: Arc<DiskSettingsStore>,
    pub catalog: Arc<DiskCatalogStore>,
    pub history: Arc<DiskHistoryStore>,
}

impl DiskStores {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(EngineError::store)?;
        let keyspace = fjall::Config::new(path)
            .open()
            .map_err(EngineError::store)?;

        let settings = keyspace
            .open_partition("settings", PartitionCreateOptions::default())
            .map_err(EngineError::store)?;
        let catalog = keyspace
            .open_partition("catalog", PartitionCreateOptions::default())
            .map_err(EngineError::store)?;
        let history = keyspace
            .open_partition("history", PartitionCreateOptions::default())
            .map_err(EngineError::store)?;

        Ok(DiskStores {
            _keyspace: keyspace,
            settings: Arc::new(DiskSettingsStore { partition: settings }),
            catalog: Arc::new(DiskCatalogStore { partition: catalog }),
            history: Arc::new(DiskHistoryStore {
                partition: history,
                seq: AtomicU64::new(0),
            }),
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| EngineError::corrupt(key, e))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(EngineError::store)
}

pub struct DiskSettingsStore {
    partition: PartitionHandle,
}

#[async_trait]
impl SettingsStore for DiskSettingsStore {
    async fn load(&self, market: &str) -> Result<Option<MarketSettings>> {
        match self.partition.get(market).map_err(EngineError::store)? {
            Some(bytes) => Ok(Some(decode(market, &bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, market: &str, settings: &MarketSettings) -> Result<()> {
        self.partition
            .insert(market, encode(settings)?)
            .map_err(EngineError::store)
    }
}

pub struct DiskCatalogStore {
    partition: PartitionHandle,
}

#[async_trait]
impl CatalogStore for DiskCatalogStore {
    async fn load_all(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        for pair in self.partition.iter() {
            let (key, value) = pair.map_err(EngineError::store)?;
            let key_str = String::from_utf8_lossy(&key).into_owned();
            match decode::<CatalogEntry>(&key_str, &value) {
                Ok(entry) => entries.push(entry),
                // A corrupt row must not hide the rest of the catalog
                Err(err) => warn!(key = %key_str, %err, "skipping undecodable catalog entry"),
            }
        }
        Ok(entries)
    }

    async fn get(&self, key: &EntryKey) -> Result<Option<CatalogEntry>> {
        let storage_key = key.to_string();
        match self
            .partition
            .get(&storage_key)
            .map_err(EngineError::store)?
        {
            Some(bytes) => Ok(Some(decode(&storage_key, &bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, entry: &CatalogEntry) -> Result<()> {
        self.partition
            .insert(entry.key.to_string(), encode(entry)?)
            .map_err(EngineError::store)
    }
}

pub struct DiskHistoryStore {
    partition: PartitionHandle,
    seq: AtomicU64,
}

#[async_trait]
impl HistoryStore for DiskHistoryStore {
    async fn append(&self, entry: &PriceHistoryEntry) -> Result<()> {
        // Millis dominate the ordering; the sequence counter only
        // disambiguates appends within the same millisecond.
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let key = format!("{:020}-{:010}", Utc::now().timestamp_millis(), seq);
        self.partition
            .insert(key, encode(entry)?)
            .map_err(EngineError::store)
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<PriceHistoryEntry>> {
        let limit = query.limit.unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        let mut seen = 0usize;
        for pair in self.partition.iter().rev() {
            let (key, value) = pair.map_err(EngineError::store)?;
            let key_str = String::from_utf8_lossy(&key).into_owned();
            let entry = match decode::<PriceHistoryEntry>(&key_str, &value) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(key = %key_str, %err, "skipping undecodable history entry");
                    continue;
                }
            };
            if !query.matches(&entry) {
                continue;
            }
            if seen < query.offset {
                seen += 1;
                continue;
            }
            rows.push(entry);
            if rows.len() >= limit {
                break;
            }
        }
        Ok(rows)
    }
}
