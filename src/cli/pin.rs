use super::ui;
use crate::core::catalog::EntryKey;
use crate::engine::Engine;
use anyhow::Result;

/// Pins a manual customer price on one catalog entry, or clears the pin
/// when no price is given.
pub async fn run(engine: &Engine, key: &EntryKey, price: Option<f64>) -> Result<()> {
    let entry = engine.set_override(key, price).await?;

    match price {
        Some(price) => println!(
            "Pinned {key} at {}",
            ui::style_text(&format!("{price:.2}"), ui::StyleType::TotalValue)
        ),
        None => println!(
            "Cleared pin on {key}; customer price is {}",
            ui::style_text(
                &format!("{:.2}", entry.customer_price()),
                ui::StyleType::TotalValue
            )
        ),
    }
    Ok(())
}
