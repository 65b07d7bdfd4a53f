use super::{sweep, ui};
use crate::core::catalog::ImportRow;
use crate::engine::Engine;
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Loads an inventory batch from a YAML file, previews the projected
/// prices, upserts the rows, and reprices the catalog with the ledger
/// tagged as an import.
pub async fn run(engine: &Engine, file: &str) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {file}"))?;
    let rows: Vec<ImportRow> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse import file: {file}"))?;

    if rows.is_empty() {
        println!("Import file contains no rows.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Item"),
        ui::header_cell("Market"),
        ui::header_cell("Base"),
        ui::header_cell("Projected sell"),
        ui::header_cell("Projected customer"),
    ]);
    for row in &rows {
        let quote = engine.quote(&row.market, row.base_price).await?;
        table.add_row(vec![
            Cell::new(format!(
                "{} {} {} {}",
                row.model, row.grade, row.capacity, row.color
            )),
            Cell::new(&row.market),
            ui::money_cell(row.base_price),
            ui::money_cell(quote.sell_price),
            ui::money_cell(quote.customer_price),
        ]);
    }
    println!("Importing {} rows:\n\n{table}\n", rows.len());

    let summary = engine.import(&rows).await?;
    sweep::print_summary(&summary);
    Ok(())
}
