use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use repricer::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Price a single item against a market's settings
    Price {
        /// Market key, e.g. US
        #[arg(long)]
        market: String,
        /// Raw base price before add-on costs
        #[arg(long)]
        base: f64,
    },
    /// Recalculate the whole catalog
    Sweep {
        /// Tag resulting history entries as an inventory import
        #[arg(long)]
        import: bool,
    },
    /// Import an inventory batch from a YAML file and reprice
    Import {
        #[arg(long)]
        file: String,
    },
    /// Show the price change ledger
    History {
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        model: Option<String>,
        /// manual, automatic or import
        #[arg(long)]
        change_type: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Show or apply market settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Pin or clear a manual customer price on one entry
    Pin {
        #[arg(long)]
        model: String,
        #[arg(long)]
        grade: String,
        #[arg(long)]
        capacity: String,
        #[arg(long)]
        color: String,
        #[arg(long)]
        market: String,
        /// Pin at this price; omit to clear an existing pin
        #[arg(long)]
        price: Option<f64>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Display resolved settings for one or all configured markets
    Show {
        #[arg(long)]
        market: Option<String>,
    },
    /// Save settings from a YAML file, then reprice the catalog
    Apply {
        #[arg(long)]
        file: String,
    },
}

impl From<Commands> for repricer::AppCommand {
    fn from(cmd: Commands) -> repricer::AppCommand {
        match cmd {
            Commands::Price { market, base } => repricer::AppCommand::Price {
                market,
                base_price: base,
            },
            Commands::Sweep { import } => repricer::AppCommand::Sweep { import },
            Commands::Import { file } => repricer::AppCommand::Import { file },
            Commands::History {
                market,
                model,
                change_type,
                limit,
                offset,
            } => repricer::AppCommand::History {
                market,
                model,
                change_type,
                limit,
                offset,
            },
            Commands::Settings { action } => match action {
                SettingsAction::Show { market } => repricer::AppCommand::SettingsShow { market },
                SettingsAction::Apply { file } => repricer::AppCommand::SettingsApply { file },
            },
            Commands::Pin {
                model,
                grade,
                capacity,
                color,
                market,
                price,
            } => repricer::AppCommand::Pin {
                model,
                grade,
                capacity,
                color,
                market,
                price,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => repricer::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = repricer::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
markets:
  - "US"

# Seconds a cached market configuration is served before reloading
cache_ttl_secs: 300

# Defaults to the platform data directory when omitted
# data_path: "/var/lib/repricer"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
