use super::{sweep, ui};
use crate::config::AppConfig;
use crate::core::settings::{Commission, MarketSettings};
use crate::engine::Engine;
use crate::sweep::SweepTrigger;
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::collections::BTreeMap;

fn commission_text(commission: Commission) -> String {
    match commission {
        Commission::Percentage(pct) => format!("{pct:.2}% of sell price"),
        Commission::Flat(amount) => format!("{amount:.2} flat"),
    }
}

fn settings_table(market: &str, settings: &MarketSettings) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Setting"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Profit caps"),
        Cell::new(format!(
            "{:.2} - {:.2}",
            settings.min_profit, settings.max_profit
        )),
    ]);
    table.add_row(vec![
        Cell::new("Two-tier margins"),
        Cell::new(format!(
            "{:.1}% / {:.1}%",
            settings.high_margin_pct, settings.low_margin_pct
        )),
    ]);
    table.add_row(vec![
        Cell::new("Curve"),
        Cell::new(if settings.curve_enabled {
            format!(
                "{:.1}% @ {:.0} -> {:.1}% @ {:.0}, steepness {:.2}",
                settings.curve_start_margin,
                settings.curve_start_price,
                settings.curve_end_margin,
                settings.curve_end_price,
                settings.curve_steepness
            )
        } else {
            "disabled".to_string()
        }),
    ]);
    table.add_row(vec![
        Cell::new("Add-on costs"),
        Cell::new(format!(
            "shipping {:.2}, packaging {:.2}, cable {:.2}, charger {:.2}",
            settings.shipping_cost,
            settings.packaging_cost,
            settings.cable_cost,
            settings.charger_cost
        )),
    ]);
    table.add_row(vec![
        Cell::new("Commission"),
        Cell::new(commission_text(settings.commission)),
    ]);

    format!(
        "Market: {}\n\n{table}",
        ui::style_text(market, ui::StyleType::Title)
    )
}

/// Shows the resolved settings for one market, or for every configured
/// market. Markets without a stored record display (and persist) the
/// built-in defaults.
pub async fn show(engine: &Engine, config: &AppConfig, market: Option<&str>) -> Result<()> {
    let markets: Vec<String> = match market {
        Some(market) => vec![market.to_string()],
        None => config.markets.clone(),
    };

    for (i, market) in markets.iter().enumerate() {
        let settings = engine.settings(market).await?;
        if i > 0 {
            println!();
        }
        println!("{}", settings_table(market, &settings));
    }
    Ok(())
}

/// Applies a settings file (YAML map of market -> settings), then
/// reprices the whole catalog: the save -> sweep contract. Prints the
/// resulting sweep counts.
pub async fn apply(engine: &Engine, file: &str) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read settings file: {file}"))?;
    // BTreeMap keeps the save order deterministic
    let updates: BTreeMap<String, MarketSettings> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file: {file}"))?;

    if updates.is_empty() {
        println!("Settings file contains no markets.");
        return Ok(());
    }

    for (market, settings) in &updates {
        engine.settings_cache().save(market, settings).await?;
        println!("Saved settings for market {market}");
    }

    let summary = engine.sweep().run(SweepTrigger::Automatic).await?;
    sweep::print_summary(&summary);
    Ok(())
}
