mod api;
mod config;
mod errors;
mod pricing;
mod routes;
mod session;
mod shell;
mod token;

use crate::api::client::ApiClient;
use crate::pricing::pipeline::CalculationPipeline;
use crate::session::SessionStore;
use crate::token::FileTokenStore;
use std::sync::Arc;

fn main() {
    // Structured logging on stderr so the shell owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("option desk starting");

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    // One current-thread runtime; the shell block_ons each operation in
    // turn, matching the client's cooperative single-threaded model
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("runtime error: {e}");
            std::process::exit(1);
        }
    };

    let tokens = Arc::new(FileTokenStore::new(cfg.token_path.clone()));
    let api = ApiClient::new(&cfg.api_base_url, cfg.request_timeout_secs, tokens);
    let session = SessionStore::new(api.clone());
    let pipeline = CalculationPipeline::new(api.clone());

    // Startup identity probe: fail-closed, any failure starts anonymous
    rt.block_on(session.initialize());

    if let Err(e) = shell::run(&rt, &session, &pipeline, &api) {
        tracing::error!("shell error: {e}");
        std::process::exit(1);
    }

    tracing::info!("option desk exiting");
}
