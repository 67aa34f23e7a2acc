//! HTTP server for pdf2word.
//!
//! Exposes the conversion handler over REST:
//!
//! - `POST /convert` (multipart upload, DOCX attachment back)
//! - `POST /convert-base64` (JSON in, JSON out)
//! - `POST /api/pdf2word` (either, by `Content-Type`)
//! - `GET /health`
//!
//! The server keeps no state between requests. Every conversion gets its
//! own scratch directory, removed when the request finishes.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pdf2word::scratch::sweep_stale;
use pdf2word::{CommandConverter, Handler, ServiceConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Scratch directories older than this are left over from a crashed run.
const STALE_SCRATCH_AGE: Duration = Duration::from_secs(60 * 60);

/// Command-line arguments for the pdf2word server
#[derive(Parser, Debug)]
#[command(name = "pdf2word-server", version)]
#[command(about = "HTTP service converting PDF documents to Word (DOCX)")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "PDF2WORD_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Converter program
    #[arg(long, env = "PDF2WORD_CONVERTER", default_value = "pdf2docx")]
    converter: String,

    /// Converter argument template, repeat for each (`{input}`, `{output}`)
    #[arg(
        long = "converter-arg",
        env = "PDF2WORD_CONVERTER_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    converter_args: Vec<String>,

    /// Converter deadline in seconds (0 disables it)
    #[arg(long, env = "PDF2WORD_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Largest accepted PDF, in MiB
    #[arg(long, env = "PDF2WORD_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Directory for scratch files (default: system temp dir)
    #[arg(long, env = "PDF2WORD_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG, when set, wins over --verbose
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut builder = ServiceConfig::builder()
        .timeout_secs(args.timeout)
        .max_upload_bytes(args.max_upload_mb.saturating_mul(1024 * 1024));
    if let Some(ref dir) = args.scratch_dir {
        builder = builder.scratch_root(dir);
    }
    let config = builder.build().context("Invalid server configuration")?;

    let scratch_root = config.scratch_root();
    match sweep_stale(&scratch_root, STALE_SCRATCH_AGE) {
        Ok(0) => {}
        Ok(n) => info!("Cleaned up {} stale scratch directories", n),
        Err(e) => warn!("Could not sweep {}: {}", scratch_root.display(), e),
    }

    let converter = CommandConverter::new(&args.converter);
    let converter = if args.converter_args.is_empty() {
        converter.args(CommandConverter::default().template().iter().cloned())
    } else {
        converter.args(args.converter_args.iter().cloned())
    };
    let converter_line = format!("{} {}", converter.program(), converter.template().join(" "));

    let handler = Handler::new(Arc::new(converter), config);
    let timeout = handler.config().timeout();
    let max_upload = handler.config().max_upload_bytes;
    let app = pdf2word::server::router(handler);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);
    info!("Converter: {}", converter_line);
    match timeout {
        Some(t) => info!("Conversion timeout: {}s", t.as_secs()),
        None => info!("Conversion timeout: disabled"),
    }
    info!("Upload limit: {} bytes", max_upload);
    info!("Scratch root: {}", scratch_root.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining in-flight conversions");
}
