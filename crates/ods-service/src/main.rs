//! Main entry point for the order & delivery service.
//!
//! Loads the configuration, builds the engine over the configured storage
//! backend, applies the seed data and serves the HTTP API until interrupted.

use clap::Parser;
use ods_config::Config;
use ods_core::{seed, ShopBuilder, ShopEngine, ShopFactories};
use std::collections::HashMap;
use std::path::PathBuf;

mod apis;
mod events;
mod server;

/// Command-line arguments for the service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let engine = build_engine(config.clone())?;

	let report = seed::apply(&engine, &config.seed).await?;
	if report.users > 0 || report.products > 0 {
		tracing::info!(
			users = report.users,
			products = report.products,
			"Applied seed data"
		);
	}

	let _event_logger = events::spawn_event_logger(engine.event_bus().subscribe());

	match config.enabled_api().cloned() {
		Some(api_config) => {
			tokio::select! {
				result = server::start_server(api_config, engine) => {
					tracing::info!("API server finished");
					result?;
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Received shutdown signal");
				}
			}
		},
		None => {
			tracing::warn!("API disabled, idling until interrupted");
			tokio::signal::ctrl_c().await?;
		},
	}

	tracing::info!("Stopped service");
	Ok(())
}

/// Builds the engine with every storage backend this binary ships.
fn build_engine(config: Config) -> Result<ShopEngine, Box<dyn std::error::Error>> {
	let storage_factories: HashMap<_, _> = ods_storage::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect();

	Ok(ShopBuilder::new(config).build(ShopFactories { storage_factories })?)
}
