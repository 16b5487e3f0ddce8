mod app;
mod cache;
mod catalog;
mod commands;
mod config;
mod db;
mod http;
mod logging;
mod session;
mod telemetry;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-admin")]
#[command(about = "Admin client for the catalog API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/catalog-admin/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Catalog API base URL, overriding config and environment
  #[arg(long)]
  api_base: Option<String>,

  #[command(subcommand)]
  command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(api_base) = args.api_base {
    config.api.base_url = Some(api_base);
  }

  let guard = logging::init(&config.log)?;

  let app = app::App::new(&config)?;
  let outcome = app.run(args.command).await;
  app.shutdown().await;
  let succeeded = outcome?;

  if !succeeded {
    // exit skips destructors, so flush logs first
    drop(guard);
    std::process::exit(1);
  }

  Ok(())
}
