use super::ui;
use crate::engine::Engine;
use crate::sweep::{CancellationFlag, SweepSummary, SweepTrigger};
use anyhow::Result;

pub fn print_summary(summary: &SweepSummary) {
    println!(
        "Sweep complete: {} updated, {} price changes recorded, {} skipped",
        ui::style_text(&summary.updated.to_string(), ui::StyleType::TotalValue),
        summary.recorded,
        summary.skipped
    );
}

/// Runs a full catalog recalculation with a progress bar.
pub async fn run(engine: &Engine, import: bool) -> Result<()> {
    let trigger = if import {
        SweepTrigger::Import
    } else {
        SweepTrigger::Automatic
    };

    let pb = ui::new_progress_bar(0, true);
    pb.set_message("Recalculating prices...");
    let on_progress = |processed: usize, total: usize| {
        pb.set_length(total as u64);
        pb.set_position(processed as u64);
    };

    let summary = engine
        .sweep()
        .run_with(trigger, &CancellationFlag::new(), &on_progress)
        .await?;
    pb.finish_and_clear();

    print_summary(&summary);
    Ok(())
}
