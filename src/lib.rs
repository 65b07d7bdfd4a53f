pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod log;
pub mod store;
pub mod sweep;

use crate::config::AppConfig;
use crate::engine::Engine;
use anyhow::Result;
use tracing::{debug, info};

/// Commands the application layer can run against the engine.
pub enum AppCommand {
    Price {
        market: String,
        base_price: f64,
    },
    Sweep {
        import: bool,
    },
    Import {
        file: String,
    },
    History {
        market: Option<String>,
        model: Option<String>,
        change_type: Option<String>,
        limit: usize,
        offset: usize,
    },
    SettingsShow {
        market: Option<String>,
    },
    SettingsApply {
        file: String,
    },
    Pin {
        model: String,
        grade: String,
        capacity: String,
        color: String,
        market: String,
        price: Option<f64>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Repricer starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.default_data_path()?;
    let engine = Engine::open(&data_path, config.cache_ttl())?;

    match command {
        AppCommand::Price { market, base_price } => {
            cli::price::run(&engine, &market, base_price).await
        }
        AppCommand::Sweep { import } => cli::sweep::run(&engine, import).await,
        AppCommand::Import { file } => cli::import::run(&engine, &file).await,
        AppCommand::History {
            market,
            model,
            change_type,
            limit,
            offset,
        } => cli::history::run(&engine, market, model, change_type, limit, offset).await,
        AppCommand::SettingsShow { market } => {
            cli::settings::show(&engine, &config, market.as_deref()).await
        }
        AppCommand::SettingsApply { file } => cli::settings::apply(&engine, &file).await,
        AppCommand::Pin {
            model,
            grade,
            capacity,
            color,
            market,
            price,
        } => {
            let key = crate::core::EntryKey {
                model,
                grade,
                capacity,
                color,
                market,
            };
            cli::pin::run(&engine, &key, price).await
        }
    }
}
