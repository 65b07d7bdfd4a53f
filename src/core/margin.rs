//! Margin curve: maps total cost to a margin percentage.

use crate::core::settings::MarketSettings;

/// Margin percentage for a given total cost.
///
/// With the curve disabled this is a two-tier step at
/// `curve_start_price`. With the curve enabled, costs inside
/// `(curve_start_price, curve_end_price)` are mapped onto a logistic
/// curve between the two endpoint margins, so the margin glides down as
/// cost rises instead of cliffing at an arbitrary threshold.
pub fn margin_percent(settings: &MarketSettings, total_cost: f64) -> f64 {
    if !settings.curve_enabled {
        return if total_cost <= settings.curve_start_price {
            settings.high_margin_pct
        } else {
            settings.low_margin_pct
        };
    }

    if total_cost <= settings.curve_start_price {
        return settings.curve_start_margin;
    }
    if total_cost >= settings.curve_end_price {
        return settings.curve_end_margin;
    }

    // The guards above leave start < total_cost < end, so the span is
    // positive and the division is safe. A degenerate range where
    // end <= start never reaches this point and degrades to the step.
    let span = settings.curve_end_price - settings.curve_start_price;
    let x = (total_cost - settings.curve_start_price) / span;
    let s = (x - 0.5) * 12.0 * settings.curve_steepness;
    let sigmoid = 1.0 / (1.0 + (-s).exp());

    settings.curve_start_margin - (settings.curve_start_margin - settings.curve_end_margin) * sigmoid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_settings() -> MarketSettings {
        MarketSettings {
            curve_enabled: true,
            curve_start_price: 600.0,
            curve_end_price: 2000.0,
            curve_start_margin: 40.0,
            curve_end_margin: 20.0,
            curve_steepness: 1.8,
            ..MarketSettings::default()
        }
    }

    #[test]
    fn test_step_function_when_curve_disabled() {
        let settings = MarketSettings {
            curve_enabled: false,
            high_margin_pct: 35.0,
            low_margin_pct: 20.0,
            curve_start_price: 600.0,
            ..MarketSettings::default()
        };
        assert_eq!(margin_percent(&settings, 100.0), 35.0);
        assert_eq!(margin_percent(&settings, 600.0), 35.0);
        assert_eq!(margin_percent(&settings, 600.01), 20.0);
        assert_eq!(margin_percent(&settings, 5000.0), 20.0);
    }

    #[test]
    fn test_curve_endpoints_are_exact() {
        let settings = curve_settings();
        assert_eq!(margin_percent(&settings, 0.0), 40.0);
        assert_eq!(margin_percent(&settings, 600.0), 40.0);
        assert_eq!(margin_percent(&settings, 2000.0), 20.0);
        assert_eq!(margin_percent(&settings, 9999.0), 20.0);
    }

    #[test]
    fn test_curve_midpoint_sits_between_endpoints() {
        let settings = curve_settings();
        let mid = margin_percent(&settings, 1300.0);
        assert!(mid > 20.0 && mid < 40.0, "midpoint margin was {mid}");
        // The sigmoid is centered on the midpoint of the range
        assert!((mid - 30.0).abs() < 0.5, "midpoint margin was {mid}");
    }

    #[test]
    fn test_curve_is_monotonically_non_increasing() {
        let settings = curve_settings();
        let mut previous = f64::INFINITY;
        for cost in (0..2500).step_by(10) {
            let margin = margin_percent(&settings, cost as f64);
            assert!(
                margin <= previous + 1e-9,
                "margin rose from {previous} to {margin} at cost {cost}"
            );
            previous = margin;
        }
    }

    #[test]
    fn test_steeper_curves_transition_faster() {
        let gentle = MarketSettings {
            curve_steepness: 0.5,
            ..curve_settings()
        };
        let steep = MarketSettings {
            curve_steepness: 4.0,
            ..curve_settings()
        };
        // A steep sigmoid hugs the endpoints longer and crosses faster
        // in the middle, so it sits above the gentle curve early in the
        // range and below it late in the range.
        let early_gentle = margin_percent(&gentle, 800.0);
        let early_steep = margin_percent(&steep, 800.0);
        assert!(early_steep > early_gentle);
        let late_gentle = margin_percent(&gentle, 1800.0);
        let late_steep = margin_percent(&steep, 1800.0);
        assert!(late_steep < late_gentle);
    }

    #[test]
    fn test_equal_curve_bounds_do_not_divide_by_zero() {
        let settings = MarketSettings {
            curve_end_price: 600.0,
            ..curve_settings()
        };
        assert_eq!(margin_percent(&settings, 600.0), 40.0);
        assert_eq!(margin_percent(&settings, 600.01), 20.0);
    }

    #[test]
    fn test_inverted_endpoint_margins_interpolate_upwards() {
        // Violates the authoring convention; must not panic and must
        // still land between the endpoints.
        let settings = MarketSettings {
            curve_start_margin: 15.0,
            curve_end_margin: 30.0,
            ..curve_settings()
        };
        let mid = margin_percent(&settings, 1300.0);
        assert!(mid > 15.0 && mid < 30.0, "midpoint margin was {mid}");
    }
}
