// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use inference_api::{api::start_server, AppState, ModelRegistry, ServerConfig};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚀 Starting Inference API...\n");
    println!("📦 {}", inference_api::version::get_version_string());
    println!("📦 BUILD VERSION: {}", inference_api::version::VERSION);
    println!("📅 Build Date: {}", inference_api::version::BUILD_DATE);
    println!();

    let config = ServerConfig::parse();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    println!("🧠 Loading models...");
    println!("   Detector: {}", config.detector_model.display());
    println!("   Whisper:  {}", config.whisper_model.display());

    let load_config = config.clone();
    let models = tokio::task::spawn_blocking(move || ModelRegistry::load(&load_config))
        .await
        .context("Model loading task failed")??;
    println!("✅ Models loaded");

    if config.save_debug_images {
        println!(
            "🖼️  Annotated images: {}",
            config.results_dir.join("exp").display()
        );
    }

    println!("🌐 API server: http://{}:{}", config.host, config.port);
    println!("📖 Docs: http://{}:{}/docs\n", config.host, config.port);

    let state = AppState::new(models, config);
    start_server(state).await
}
