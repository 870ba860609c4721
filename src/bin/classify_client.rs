//! 音声ファイルを1つ推論サーバへ送り、結果の JSON を表示する
use anyhow::{bail, Context, Result};

use bird_inference_api::config::ConfigSet;
use bird_inference_api::telemetry::init_tracing;
use bird_inference_api::transport::ClassifyClient;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: classify_client <audio file>");
    };

    let config = ConfigSet::load_from_env().context("failed to load configuration")?;
    let client = ClassifyClient::from_config(&config);
    let result = client
        .classify_file(&path)
        .await
        .with_context(|| format!("classification of {path} failed"))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
