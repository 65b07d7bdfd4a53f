//! Price calculation: cost aggregation, margin, capping, commission.

use crate::core::margin;
use crate::core::settings::{Commission, MarketSettings};
use serde::Serialize;
use tracing::warn;

/// Price differences at or below this threshold are treated as no-ops
/// and produce no history entry.
pub const PRICE_EPSILON: f64 = 0.01;

/// Full pricing result for one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    /// Base price plus all per-unit add-on costs.
    pub total_cost: f64,
    /// Rounded price excluding commission.
    pub sell_price: f64,
    /// Profit after clamping to the market's caps.
    pub profit: f64,
    /// Actual margin implied by the clamped profit, not the raw curve
    /// output.
    pub margin_pct: f64,
    pub commission: f64,
    /// Sell price plus commission, the price shown to buyers.
    pub customer_price: f64,
}

/// Prices one item under the given market settings.
///
/// This never fails: negative or non-finite inputs count as zero, a
/// non-finite margin falls back to the minimum profit cap taken as an
/// absolute amount, and a zero total cost degenerates to
/// `sell_price == round(min_profit)`.
pub fn price(base_price: f64, settings: &MarketSettings) -> Quote {
    let base = if base_price.is_finite() && base_price > 0.0 {
        base_price
    } else {
        0.0
    };
    let total_cost = base + settings.addon_costs();

    let raw_margin = margin::margin_percent(settings, total_cost);
    let mut profit = if raw_margin.is_finite() {
        total_cost * raw_margin / 100.0
    } else {
        warn!(
            total_cost,
            raw_margin, "margin curve produced a non-finite value, using the minimum profit cap"
        );
        settings.min_profit
    };

    // f64::clamp panics on inverted bounds, so order them first.
    let (lo, hi) = if settings.min_profit <= settings.max_profit {
        (settings.min_profit, settings.max_profit)
    } else {
        (settings.max_profit, settings.min_profit)
    };
    profit = profit.clamp(lo, hi);

    let sell_price = (total_cost + profit).round();
    let commission = match settings.commission {
        Commission::Percentage(pct) => sell_price * pct / 100.0,
        Commission::Flat(amount) => amount,
    };

    let margin_pct = if total_cost > 0.0 {
        profit / total_cost * 100.0
    } else {
        0.0
    };

    Quote {
        total_cost,
        sell_price,
        profit,
        margin_pct,
        commission,
        customer_price: sell_price + commission,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MarketSettings {
        MarketSettings {
            min_profit: 30.0,
            max_profit: 400.0,
            curve_enabled: true,
            curve_start_price: 600.0,
            curve_end_price: 2000.0,
            curve_start_margin: 40.0,
            curve_end_margin: 20.0,
            curve_steepness: 1.8,
            shipping_cost: 25.0,
            packaging_cost: 5.0,
            ..MarketSettings::default()
        }
    }

    #[test]
    fn test_total_cost_includes_addons() {
        let quote = price(500.0, &settings());
        assert_eq!(quote.total_cost, 530.0);
    }

    #[test]
    fn test_profit_stays_within_caps() {
        let s = settings();
        for base in [0.0, 10.0, 75.0, 600.0, 1300.0, 2000.0, 10_000.0] {
            let quote = price(base, &s);
            assert!(
                quote.profit >= s.min_profit && quote.profit <= s.max_profit,
                "profit {} out of caps for base {base}",
                quote.profit
            );
        }
    }

    #[test]
    fn test_reported_margin_reflects_clamped_profit() {
        // At base 2500 the curve yields 20%, i.e. profit 506 before the
        // 400 cap kicks in; the reported margin must shrink accordingly.
        let quote = price(2500.0, &settings());
        assert_eq!(quote.profit, 400.0);
        assert!((quote.margin_pct - 400.0 / 2530.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cost_floors_at_min_profit() {
        let s = MarketSettings {
            shipping_cost: 0.0,
            packaging_cost: 0.0,
            ..settings()
        };
        let quote = price(0.0, &s);
        assert_eq!(quote.total_cost, 0.0);
        assert_eq!(quote.profit, 30.0);
        assert_eq!(quote.sell_price, 30.0);
        assert_eq!(quote.margin_pct, 0.0);
    }

    #[test]
    fn test_negative_and_nan_base_treated_as_zero() {
        let s = MarketSettings {
            shipping_cost: 0.0,
            packaging_cost: 0.0,
            ..settings()
        };
        assert_eq!(price(-120.0, &s), price(0.0, &s));
        assert_eq!(price(f64::NAN, &s), price(0.0, &s));
    }

    #[test]
    fn test_percentage_commission() {
        let s = MarketSettings {
            commission: Commission::Percentage(10.0),
            ..settings()
        };
        let quote = price(500.0, &s);
        assert!((quote.commission - quote.sell_price * 0.1).abs() < 1e-9);
        assert_eq!(quote.customer_price, quote.sell_price + quote.commission);
    }

    #[test]
    fn test_flat_commission_is_independent_of_sell_price() {
        let s = MarketSettings {
            commission: Commission::Flat(8.0),
            ..settings()
        };
        for base in [50.0, 500.0, 5000.0] {
            let quote = price(base, &s);
            assert_eq!(quote.commission, 8.0);
            assert_eq!(quote.customer_price, quote.sell_price + 8.0);
        }
    }

    #[test]
    fn test_sell_price_is_whole_currency_units() {
        let quote = price(333.33, &settings());
        assert_eq!(quote.sell_price, quote.sell_price.round());
    }

    #[test]
    fn test_inverted_profit_caps_do_not_panic() {
        let s = MarketSettings {
            min_profit: 400.0,
            max_profit: 30.0,
            ..settings()
        };
        let quote = price(500.0, &s);
        assert!(quote.profit >= 30.0 && quote.profit <= 400.0);
    }

    #[test]
    fn test_no_nan_reaches_the_quote() {
        let s = MarketSettings {
            curve_steepness: f64::NAN,
            ..settings()
        };
        let quote = price(1300.0, &s);
        assert!(quote.sell_price.is_finite());
        assert!(quote.profit.is_finite());
        assert!(quote.margin_pct.is_finite());
        assert_eq!(quote.profit, 30.0);
    }
}
