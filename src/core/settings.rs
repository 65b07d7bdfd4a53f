//! Per-market pricing configuration and its storage contract.

use crate::core::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How the sales channel commission is computed on top of the sell price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Commission {
    /// Percentage of the sell price.
    Percentage(f64),
    /// Fixed amount per unit, independent of the sell price.
    Flat(f64),
}

/// Cost, margin and commission rules for one sales market.
///
/// Margins are percentages; everything else is in currency units. The
/// authoring convention is `curve_start_margin >= curve_end_margin`
/// (margins shrink as cost rises), but the engine interpolates between
/// whatever endpoints are given and never rejects a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    /// Lower bound for per-unit profit, also the floor price for
    /// zero-cost entries.
    pub min_profit: f64,
    /// Upper bound for per-unit profit.
    pub max_profit: f64,

    /// Margin below `curve_start_price` when the curve is disabled.
    pub high_margin_pct: f64,
    /// Margin above `curve_start_price` when the curve is disabled.
    pub low_margin_pct: f64,

    pub curve_enabled: bool,
    pub curve_start_price: f64,
    pub curve_end_price: f64,
    pub curve_start_margin: f64,
    pub curve_end_margin: f64,
    /// Positive steepness factor; higher values sharpen the transition
    /// in the middle of the curve range.
    pub curve_steepness: f64,

    pub shipping_cost: f64,
    pub packaging_cost: f64,
    pub cable_cost: f64,
    pub charger_cost: f64,

    pub commission: Commission,
}

impl Default for MarketSettings {
    fn default() -> Self {
        MarketSettings {
            min_profit: 30.0,
            max_profit: 400.0,
            high_margin_pct: 35.0,
            low_margin_pct: 20.0,
            curve_enabled: false,
            curve_start_price: 600.0,
            curve_end_price: 2000.0,
            curve_start_margin: 40.0,
            curve_end_margin: 20.0,
            curve_steepness: 1.0,
            shipping_cost: 0.0,
            packaging_cost: 0.0,
            cable_cost: 0.0,
            charger_cost: 0.0,
            commission: Commission::Percentage(0.0),
        }
    }
}

impl MarketSettings {
    /// Sum of the per-unit add-on costs layered onto a raw base price.
    /// Negative or non-finite amounts count as zero.
    pub fn addon_costs(&self) -> f64 {
        [
            self.shipping_cost,
            self.packaging_cost,
            self.cable_cost,
            self.charger_cost,
        ]
        .iter()
        .map(|c| if c.is_finite() && *c > 0.0 { *c } else { 0.0 })
        .sum()
    }
}

/// Persistence contract for market settings, one record per market key.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self, market: &str) -> Result<Option<MarketSettings>>;
    async fn save(&self, market: &str, settings: &MarketSettings) -> Result<()>;
}
