use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::time::Duration;

use hostlens::api::routes;
use hostlens::models::config::{AppConfig, DEFAULT_API_BASE_URL, DEFAULT_SEARCH_LIMIT};
use hostlens::session::manager::SessionManager;
use hostlens::utils::logging;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Dashboard backend for searching internet-connected hosts")]
struct Args {
    /// Address to bind the dashboard server to
    #[clap(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port for the dashboard server
    #[clap(short, long, default_value = "3000")]
    port: u16,

    /// Base URL of the external host search API
    #[clap(long, env = "HOSTLENS_API_URL", default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Number of hosts requested per dashboard search
    #[clap(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    search_limit: usize,

    /// Seconds an idle dashboard session is kept
    #[clap(long, default_value = "1800")]
    session_ttl: u64,

    /// Log level (trace, debug, info, warn, error, off)
    #[clap(long, default_value = "info")]
    log_level: String,
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger with specified level
    logging::init_logger(logging::get_log_level(&args.log_level));

    info!("Starting hostlens v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig {
        bind: args.bind,
        port: args.port,
        api_base_url: args.api_url,
        search_limit: args.search_limit.max(1),
        session_ttl_secs: args.session_ttl,
    };

    let manager = SessionManager::new(config.clone())
        .with_context(|| format!("invalid API base URL '{}'", config.api_base_url))?;
    info!("Using search API at {}", manager.client().base_url());

    let app_state = web::Data::new(manager);

    // Sweep idle sessions
    let sweeper_state = app_state.clone();
    let ttl = Duration::from_secs(config.session_ttl_secs);
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            sweeper_state.evict_idle(ttl);
        }
    });

    info!("Starting dashboard server on {}:{}", config.bind, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.bind.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
