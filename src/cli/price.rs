use super::ui;
use crate::engine::Engine;
use anyhow::Result;
use comfy_table::Cell;

/// Prices a single item and prints the full quote breakdown.
pub async fn run(engine: &Engine, market: &str, base_price: f64) -> Result<()> {
    let quote = engine.quote(market, base_price).await?;

    println!(
        "Quote for market {} at base price {base_price:.2}\n",
        ui::style_text(market, ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);
    table.add_row(vec![Cell::new("Total cost"), ui::money_cell(quote.total_cost)]);
    table.add_row(vec![
        Cell::new("Margin"),
        Cell::new(format!("{:.2}%", quote.margin_pct)),
    ]);
    table.add_row(vec![Cell::new("Profit"), ui::money_cell(quote.profit)]);
    table.add_row(vec![Cell::new("Sell price"), ui::money_cell(quote.sell_price)]);
    table.add_row(vec![Cell::new("Commission"), ui::money_cell(quote.commission)]);
    table.add_row(vec![
        Cell::new("Customer price"),
        ui::money_cell(quote.customer_price),
    ]);
    println!("{table}");

    println!(
        "\nCustomer price ({market}): {}",
        ui::style_text(
            &format!("{:.2}", quote.customer_price),
            ui::StyleType::TotalValue
        )
    );
    Ok(())
}
