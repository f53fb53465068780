//! afriai-dashboard: data service for the African AI innovation dashboard
//!
//! - `serve`: local API for the dashboard (completeness, homepage, chat proxy)
//! - `report`: one-shot data-completeness report
//! - `health`: probe the backend completeness endpoints

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use afriai_dashboard_lib::fixtures;
use afriai_dashboard_lib::report::{build_report, render_text};
use afriai_dashboard_lib::server::create_router;
use afriai_dashboard_lib::state::{load_config, resolve_api_base, AppState, API_URL_ENV};

#[derive(Parser)]
#[command(name = "afriai-dashboard")]
#[command(about = "Data-completeness and statistics service for the AfriAI dashboard")]
struct Cli {
    /// Path to configuration file (default: ~/.afriai/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hostname the dashboard is served under; selects the production API when recognized
    #[arg(long, global = true, env = "AFRIAI_PUBLIC_HOST")]
    public_host: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the local dashboard API
    Serve {
        /// Listen address (overrides bindAddr)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Fetch and print the data-completeness report
    Report {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check availability of the completeness endpoints
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    let env_override = std::env::var(API_URL_ENV).ok();
    let api = resolve_api_base(env_override.as_deref(), &config, cli.public_host.as_deref())
        .map_err(anyhow::Error::msg)
        .context("Failed to resolve backend API URL")?;
    log::info!("Backend API: {} ({:?})", api.endpoint_base(), api.source);

    match cli.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            let state = Arc::new(AppState::new(config, api, true).map_err(anyhow::Error::msg)?);
            let app = create_router(state.clone());

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            log::info!("Dashboard API listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    log::info!("Shutting down");
                })
                .await?;

            state.monitor.unmount();
        }
        Command::Report { json } => {
            let state = AppState::new(config, api, false).map_err(anyhow::Error::msg)?;
            let snapshot = state.monitor.fetch_all().await;

            let (map, cached) = match snapshot.missing_data_map {
                Some(map) => (map, false),
                None => (fixtures::missing_data_map(), true),
            };
            let report = build_report(&map, snapshot.enrichment_gaps.as_ref());

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                if let Some(err) = snapshot.error {
                    eprintln!("Backend unavailable: {}", err);
                }
                if cached {
                    eprintln!("Showing cached sample data.\n");
                }
                print!("{}", render_text(&report));
            }
        }
        Command::Health => {
            let state = AppState::new(config, api, false).map_err(anyhow::Error::msg)?;
            let health = state.completeness.health_check().await;
            println!("{}", serde_json::to_string_pretty(&health)?);
            if !(health.missing_data_map_available && health.enrichment_gaps_available) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
