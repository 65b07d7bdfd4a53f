//! Catalog-wide price recalculation.

use crate::cache::SettingsCache;
use crate::core::catalog::{CatalogEntry, CatalogStore};
use crate::core::history::{ChangeType, HistoryStore, PriceHistoryEntry};
use crate::core::pricing::{self, PRICE_EPSILON};
use crate::core::error::Result;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// What kicked the sweep off; determines how resulting ledger rows are
/// tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTrigger {
    Automatic,
    Import,
}

impl SweepTrigger {
    fn change_type(self) -> ChangeType {
        match self {
            SweepTrigger::Automatic => ChangeType::Automatic,
            SweepTrigger::Import => ChangeType::Import,
        }
    }

    fn reason(self) -> &'static str {
        match self {
            SweepTrigger::Automatic => "automatic recalculation",
            SweepTrigger::Import => "inventory import",
        }
    }
}

/// Cooperative cancellation for a running sweep, checked between
/// entries. Cancelling yields a partial summary, never an error.
#[derive(Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Entries whose derived fields were persisted.
    pub updated: usize,
    /// Ledger rows written for material price changes.
    pub recorded: usize,
    /// Entries skipped after a per-entry failure.
    pub skipped: usize,
}

/// Recomputes every catalog entry against the latest saved settings.
///
/// At most one sweep runs at a time; concurrent callers queue on the
/// internal mutex, which is held for the full duration of a run so two
/// sweeps can never interleave reads and writes of the same entry.
pub struct RecalculationSweep {
    catalog: Arc<dyn CatalogStore>,
    history: Arc<dyn HistoryStore>,
    settings: Arc<SettingsCache>,
    guard: Mutex<()>,
}

impl RecalculationSweep {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        history: Arc<dyn HistoryStore>,
        settings: Arc<SettingsCache>,
    ) -> Self {
        RecalculationSweep {
            catalog,
            history,
            settings,
            guard: Mutex::new(()),
        }
    }

    pub async fn run(&self, trigger: SweepTrigger) -> Result<SweepSummary> {
        self.run_with(trigger, &CancellationFlag::default(), &|_, _| {})
            .await
    }

    /// Full-control variant: `on_progress` is called as
    /// `(processed, total)` after each entry.
    pub async fn run_with(
        &self,
        trigger: SweepTrigger,
        cancel: &CancellationFlag,
        on_progress: &(dyn Fn(usize, usize) + Sync),
    ) -> Result<SweepSummary> {
        let _guard = self.guard.lock().await;
        info!(?trigger, "starting catalog recalculation sweep");

        // Drop any cached settings so the sweep prices against the
        // latest saved configuration.
        self.settings.invalidate().await;

        let entries = self.catalog.load_all().await?;
        let total = entries.len();
        let mut summary = SweepSummary::default();

        for (processed, mut entry) in entries.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!(processed, total, "sweep cancelled, returning partial summary");
                break;
            }

            match self.recalculate(&mut entry, trigger).await {
                Ok(recorded) => {
                    summary.updated += 1;
                    if recorded {
                        summary.recorded += 1;
                    }
                }
                Err(err) => {
                    warn!(key = %entry.key, %err, "skipping entry after recalculation failure");
                    summary.skipped += 1;
                }
            }
            on_progress(processed + 1, total);
        }

        info!(
            updated = summary.updated,
            recorded = summary.recorded,
            skipped = summary.skipped,
            "sweep complete"
        );
        Ok(summary)
    }

    /// Reprices one entry. Returns whether a ledger row was written.
    /// Derived fields and `priced_at` are persisted unconditionally so
    /// downstream consumers always see fresh values.
    async fn recalculate(&self, entry: &mut CatalogEntry, trigger: SweepTrigger) -> Result<bool> {
        let settings = self.settings.get(&entry.key.market).await?;
        let quote = pricing::price(entry.base_price, &settings);

        let old_price = entry.sell_price;
        let recorded = (quote.sell_price - old_price).abs() > PRICE_EPSILON;
        if recorded {
            self.history
                .append(&PriceHistoryEntry {
                    key: entry.key.clone(),
                    old_price,
                    new_price: quote.sell_price,
                    change_type: trigger.change_type(),
                    reason: trigger.reason().to_string(),
                    settings: settings.clone(),
                    recorded_at: Utc::now(),
                })
                .await?;
        }

        entry.total_cost = quote.total_cost;
        entry.sell_price = quote.sell_price;
        entry.profit = quote.profit;
        entry.margin_pct = quote.margin_pct;
        entry.commission = quote.commission;
        entry.priced_at = Some(Utc::now());
        self.catalog.save(entry).await?;
        Ok(recorded)
    }
}
