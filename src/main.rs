use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lendscope::{
    balances::BatchedBalanceCache,
    catalog::Catalog,
    config::{get_config_clone, load_config_from_path, CONFIG_FILE_PATH},
    dashboard::CollateralDashboard,
    display,
    logger::{self, LogLevel, LogTag, LoggerConfig},
    rpc::RpcClient,
    wallet::SessionWallet,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lendscope")]
#[command(about = "Collateral balances of a lending pool account", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = CONFIG_FILE_PATH)]
    config: String,

    /// Print everything, including per-call RPC details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug output for a module (cache, rpc, config, wallet, dashboard, system)
    #[arg(long = "debug", global = true, value_name = "MODULE")]
    debug: Vec<String>,

    /// Override the log threshold (error, warning, info, debug, verbose)
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    log_level: Option<LogLevel>,

    /// Only print messages from these modules
    #[arg(long, global = true, value_name = "MODULE")]
    only: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every collateral balance of an account
    Balances {
        #[arg(long)]
        account: String,

        /// Keep refreshing every SECS seconds until Ctrl+C
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// Show a single collateral balance
    Balance {
        #[arg(long)]
        account: String,

        #[arg(long)]
        token: String,
    },
    /// List the configured catalog
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LoggerConfig::from_flags(cli.verbose, cli.quiet, &cli.debug);
    if let Some(level) = cli.log_level {
        log_config.min_level = level;
    }
    log_config.enabled_tags = cli.only.iter().map(|m| m.trim().to_lowercase()).collect();
    logger::init(log_config);
    logger::debug(LogTag::System, "lendscope starting");

    load_config_from_path(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config))?;
    let config = get_config_clone()?;

    match cli.command {
        Command::Catalog => {
            let catalog = Catalog::from_config(&config.catalog)?;
            println!("{}", display::catalog_table(&catalog));
        }
        Command::Balance { account, token } => {
            let reader = Arc::new(RpcClient::from_config(&config)?);
            let cache = BatchedBalanceCache::from_config(&config, reader)?;
            let entry = cache.fetch_item(&account, &token).await?;
            match (entry.display_amount(), &entry.error) {
                (Some(amount), _) => println!("{} {}", amount, entry.item.symbol),
                (None, Some(error)) => bail!("{} balance unavailable: {}", entry.item.symbol, error),
                (None, None) => bail!("{} balance unavailable", entry.item.symbol),
            }
        }
        Command::Balances { account, watch } => {
            let reader = Arc::new(RpcClient::from_config(&config)?);
            let cache = BatchedBalanceCache::from_config(&config, reader.clone())?;
            let dashboard = CollateralDashboard::new(cache, SessionWallet::connected(&account));

            match watch {
                None => {
                    let view = dashboard.view().await?;
                    print!("{}", display::render_view(&view));
                    if view.snapshot.is_none() {
                        if let Some(error) = view.warning {
                            return Err(error.into());
                        }
                    }
                }
                Some(secs) => {
                    watch_balances(&dashboard, Duration::from_secs(secs.max(1))).await;
                    let stats = reader.stats();
                    logger::info(
                        LogTag::Rpc,
                        &format!(
                            "{} requests, {:.0}% success",
                            stats.total_requests,
                            stats.success_rate() * 100.0
                        ),
                    );
                }
            }
            dashboard.teardown();
        }
    }

    Ok(())
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{}'", value))
}

async fn watch_balances(dashboard: &CollateralDashboard<SessionWallet>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                logger::info(LogTag::System, "Stopping watch");
                break;
            }
            _ = interval.tick() => {
                match dashboard.view().await {
                    Ok(view) => print!("{}", display::render_view(&view)),
                    Err(e) => logger::error(LogTag::Dashboard, &format!("Cannot show balances: {}", e)),
                }
            }
        }
    }

    logger::info(LogTag::Cache, &display::metrics_line(&dashboard.cache().metrics()));
}
