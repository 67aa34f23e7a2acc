//! # pdf2word
//!
//! Convert PDF documents to Word (DOCX) by delegating the actual layout work
//! to an external converter (by default the `pdf2docx` command-line tool).
//!
//! The crate owns the request/response boundary around that converter:
//! accepting a document in one of three encodings, staging it to scratch
//! storage, running the converter once over the whole document, checking the
//! output, and always cleaning up afterwards.
//!
//! ## Request Flow
//!
//! ```text
//! multipart upload ─┐
//! JSON / base64 ────┼─▶ ConversionRequest ─▶ Handler ─▶ DocumentConverter
//! CLI file path ────┘                           │          (pdf2docx)
//!                                               ▼
//!                             ConvertedDocument | ConvertError
//!                                               │
//!          attachment / base64 JSON / JSON line ◀┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2word::{CommandConverter, ConversionRequest, Handler, ServiceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = Handler::new(
//!         Arc::new(CommandConverter::default()),
//!         ServiceConfig::default(),
//!     );
//!     let request = ConversionRequest::from_path("report.pdf").await?;
//!     let document = handler.convert(request).await?;
//!     std::fs::write(&document.output_name, &document.output_bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | The `pdf2word` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `server` | on      | The [`server`] module and the `pdf2word-server` binary (axum + tower-http) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod output;
pub mod request;
pub mod scratch;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder, DEFAULT_SOURCE_NAME, DOCX_MIME};
pub use engine::{CommandConverter, DocumentConverter};
pub use error::{ConfigError, ConvertError, EngineError, ErrorKind};
pub use handler::Handler;
pub use output::{Base64Response, CliReport, ConvertedDocument, ErrorBody};
pub use request::{output_name, ConversionRequest, Encoding};
