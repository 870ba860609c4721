use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use bird_inference_api::config::ConfigSet;
use bird_inference_api::pipeline::ClassificationPipeline;
use bird_inference_api::telemetry::init_tracing;
use bird_inference_api::transport::server::{run_with_listener, ConnectionHandler};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match ConfigSet::load_from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = ?err, "failed to load configuration");
            std::process::exit(1);
        }
    };
    info!(root = ?config.root(), "configuration loaded");

    // ラベル表とバックエンドは起動時に一度だけ読み込み、全接続で共有する
    let pipeline = match ClassificationPipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!(error = %err, "failed to initialize classification pipeline");
            std::process::exit(1);
        }
    };
    let handler = ConnectionHandler::new(Arc::new(pipeline), config.server.clone());

    let bind_addr = config.server.bind_addr.clone();
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(addr = %bind_addr, error = %err, "failed to bind");
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    if let Err(err) = run_with_listener(listener, handler, shutdown).await {
        error!(error = %err, "server error");
        std::process::exit(1);
    }
}
