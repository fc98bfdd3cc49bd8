use component_verifier_server::{
    Config,
    VerifierServer,
};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // RUST_LOG, when set, takes precedence over the configured level
    let filter = EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();
    // No metrics recorder is installed here; counters and histograms are
    // only exported when embedded alongside a `metrics` exporter.

    let server = config.build().await?;
    let cancellation_token = CancellationToken::new();
    run_server(server, cancellation_token).await;

    Ok(())
}

async fn run_server(server: VerifierServer, cancellation_token: CancellationToken) {
    let mut boxed_server_future = Box::pin(server.run(cancellation_token.clone()));

    tokio::select! {
        result = &mut boxed_server_future => {
           handle_server_result(result);
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C signal, initiating graceful shutdown");
            cancellation_token.cancel();
            handle_server_result(boxed_server_future.await);
        }
    }
}

/// Handle the result of the server
fn handle_server_result(result: Result<()>) {
    match result {
        Ok(()) => tracing::info!("Server shutdown gracefully"),
        Err(e) => {
            tracing::error!("Server encountered an error: {}", e);
        }
    }
}
