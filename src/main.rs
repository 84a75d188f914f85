use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let cfg = freshstart::config::Config::from_env();
    info!(
        target: "freshstart",
        "freshstart starting: RUST_LOG='{}', http_port={}, data_dir='{}', database={}, auth={}, bucket='{}'",
        rust_log,
        freshstart::config::http_port(),
        freshstart::config::data_dir().display(),
        if cfg.has_database() { "remote" } else { "local fallback" },
        if cfg.has_auth() { "configured" } else { "unconfigured" },
        cfg.storage_bucket
    );

    freshstart::server::run().await
}
