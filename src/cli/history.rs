use super::ui;
use crate::core::history::{ChangeType, HistoryQuery};
use crate::engine::Engine;
use anyhow::Result;
use comfy_table::Cell;

/// Queries the price history ledger and prints a page of transitions,
/// newest first.
pub async fn run(
    engine: &Engine,
    market: Option<String>,
    model: Option<String>,
    change_type: Option<String>,
    limit: usize,
    offset: usize,
) -> Result<()> {
    let change_type = change_type
        .as_deref()
        .map(str::parse::<ChangeType>)
        .transpose()?;

    let query = HistoryQuery {
        market,
        model,
        change_type,
        from: None,
        to: None,
        offset,
        limit: Some(limit),
    };
    let rows = engine.history(&query).await?;

    if rows.is_empty() {
        println!("No price changes match the given filters.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("When"),
        ui::header_cell("Item"),
        ui::header_cell("Market"),
        ui::header_cell("Old"),
        ui::header_cell("New"),
        ui::header_cell("Change"),
        ui::header_cell("Type"),
        ui::header_cell("Reason"),
    ]);

    for row in &rows {
        let item = format!(
            "{} {} {} {}",
            row.key.model, row.key.grade, row.key.capacity, row.key.color
        );
        table.add_row(vec![
            Cell::new(row.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(item),
            Cell::new(&row.key.market),
            ui::money_cell(row.old_price),
            ui::money_cell(row.new_price),
            ui::delta_cell(row.new_price - row.old_price),
            Cell::new(row.change_type.to_string()),
            Cell::new(&row.reason),
        ]);
    }
    println!("{table}");

    println!(
        "\n{}",
        ui::style_text(
            &format!("{} entries (offset {offset})", rows.len()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
