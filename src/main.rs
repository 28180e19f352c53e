#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! VDF proof archive service entrypoint (systemd-friendly).
//! Loads config, wires the upstream clients and serves HTTP until SIGINT.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vdf_proof_archive::{
    api::{router, AppState},
    core::config::ServiceConfig,
    monitoring::metrics::Metrics,
    proofs::ProofHistory,
    upstream::{node_rpc::NodeRpcClient, permission_tree::PermissionTreeClient},
};

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    // LOG_FORMAT=json for log shippers, compact otherwise.
    let _ = if env("LOG_FORMAT", "compact") == "json" {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        git_dirty = option_env!("VERGEN_GIT_DIRTY").unwrap_or("unknown"),
        built = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
        target = option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown"),
        "vdf proof archive starting"
    );

    let config_path = std::env::var("VDF_ARCHIVE_CONFIG").ok();
    let cfg = ServiceConfig::load(config_path.as_deref()).context("load config")?;

    let metrics = Arc::new(Metrics::new().context("metrics init")?);
    let node = NodeRpcClient::new(&cfg.node).context("node rpc client")?;
    let tree = PermissionTreeClient::new(&cfg.permission_tree).context("permission tree client")?;
    info!(
        node = node.endpoint(),
        permission_tree = %cfg.permission_tree.base_url,
        page_size = cfg.proofs.page_size,
        "upstreams configured"
    );

    let history = Arc::new(ProofHistory::new(
        Arc::new(node),
        Arc::new(tree),
        cfg.proofs.clone(),
        metrics.clone(),
    ));
    let app = router(AppState { history, metrics });

    let listener = TcpListener::bind(&cfg.http.listen_addr)
        .await
        .with_context(|| format!("bind {}", cfg.http.listen_addr))?;
    info!(addr = %cfg.http.listen_addr, "http listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;
    Ok(())
}
