/// ferrite-digits prediction server
///
/// Serves the digit-recognition pipeline over HTTP with a synchronous
/// tiny_http server, one thread per request.
///
/// Run with:
///   cargo run --bin digit-server --release -- --model models/mnist.json
///
/// Routes:
///   POST /api/predict         {"imageData": [784 floats in 0..1]} → real model
///   POST /api/predict-test    same body → mock prediction, no model needed
///   POST /api/predict-image   raw PNG/JPEG/BMP/GIF body → full raster pipeline
///   GET  /health              liveness and the configured model path
mod state;
mod routes;
mod handlers;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tiny_http::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ferrite_digits::RecognizerConfig;
use state::ServerState;

#[derive(Parser, Debug)]
#[command(name = "digit-server", about = "Handwritten digit recognition over HTTP")]
struct Args {
    /// JSON config file; missing fields fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model artifact (.json dense network or .onnx). Overrides config and env.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Listen address. Overrides config and env.
    #[arg(long)]
    addr: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Config precedence: file, then environment, then command line.
fn resolve_config(args: Args) -> ferrite_digits::Result<RecognizerConfig> {
    let mut config = match &args.config {
        Some(path) => RecognizerConfig::load_json(path)?,
        None => RecognizerConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    init_tracing();

    let config = match resolve_config(Args::parse()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "could not resolve configuration");
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::http(config.server.addr.as_str()) {
        Ok(s) => s,
        Err(e) => {
            error!(addr = %config.server.addr, error = %e, "failed to bind HTTP server");
            return ExitCode::FAILURE;
        }
    };

    info!(
        addr = %config.server.addr,
        model = %config.model_path.display(),
        "digit server listening; model loads on first prediction"
    );

    let shared_state = Arc::new(ServerState::new(config));

    // Each request runs on its own thread; the inference session is shared
    // and read-only once the first prediction has loaded it.
    for request in server.incoming_requests() {
        let state_clone = Arc::clone(&shared_state);
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    ExitCode::SUCCESS
}
