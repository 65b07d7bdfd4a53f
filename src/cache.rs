//! Time-bounded in-memory view over the settings store.

use crate::core::error::Result;
use crate::core::settings::{MarketSettings, SettingsStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// How long a cached configuration is served before the store is
/// consulted again.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CachedSettings {
    settings: MarketSettings,
    loaded_at: Instant,
}

/// Read-through cache for market settings.
///
/// Every market resolves to *some* valid configuration: unknown markets
/// get the built-in defaults, which are best-effort persisted on first
/// use. Saving through [`SettingsCache::save`] invalidates the whole
/// cache before returning, so a read after a successful save can never
/// observe the pre-save value.
pub struct SettingsCache {
    store: Arc<dyn SettingsStore>,
    ttl: Duration,
    inner: RwLock<HashMap<String, CachedSettings>>,
}

impl SettingsCache {
    pub fn new(store: Arc<dyn SettingsStore>, ttl: Duration) -> Self {
        SettingsCache {
            store,
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, market: &str) -> Result<MarketSettings> {
        {
            let cache = self.inner.read().await;
            if let Some(entry) = cache.get(market) {
                if entry.loaded_at.elapsed() < self.ttl {
                    debug!(market, "settings cache HIT");
                    return Ok(entry.settings.clone());
                }
                debug!(market, "settings cache entry expired");
            }
        }

        let mut cache = self.inner.write().await;
        // Another task may have refreshed the entry while we waited for
        // the write lock.
        if let Some(entry) = cache.get(market) {
            if entry.loaded_at.elapsed() < self.ttl {
                return Ok(entry.settings.clone());
            }
        }

        debug!(market, "settings cache MISS");
        let settings = match self.store.load(market).await {
            Ok(Some(settings)) => settings,
            Ok(None) => self.synthesize_defaults(market).await,
            Err(err) if err.is_corrupt() => {
                warn!(market, %err, "stored settings are corrupt, falling back to defaults");
                self.synthesize_defaults(market).await
            }
            Err(err) => return Err(err),
        };

        cache.insert(
            market.to_string(),
            CachedSettings {
                settings: settings.clone(),
                loaded_at: Instant::now(),
            },
        );
        Ok(settings)
    }

    /// Persists the settings and drops the entire cache before
    /// returning. Invalidation is wholesale rather than per-market.
    pub async fn save(&self, market: &str, settings: &MarketSettings) -> Result<()> {
        self.store.save(market, settings).await?;
        self.invalidate().await;
        Ok(())
    }

    pub async fn invalidate(&self) {
        let mut cache = self.inner.write().await;
        cache.clear();
        debug!("settings cache cleared");
    }

    async fn synthesize_defaults(&self, market: &str) -> MarketSettings {
        let settings = MarketSettings::default();
        if let Err(err) = self.store.save(market, &settings).await {
            warn!(market, %err, "could not persist default settings, serving them in-memory");
        }
        settings
    }
}
