//! Error types for the pdf2word library.
//!
//! Three error types cover three different moments:
//!
//! * [`ConvertError`]: a single request failed. Every transport (HTTP
//!   multipart, HTTP JSON, CLI) turns it into its own envelope; the
//!   [`ErrorKind`] decides whether the caller or the server is at fault.
//!
//! * [`EngineError`]: the external converter itself misbehaved (could not
//!   start, exited non-zero, ran past its deadline). Always wrapped in
//!   [`ConvertError::Engine`] before it reaches a transport.
//!
//! * [`ConfigError`]: the service was configured wrongly. Raised once at
//!   startup, never per request.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification used by the transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, empty, or non-PDF payload; missing source file. Client error.
    InvalidInput,
    /// The request envelope itself is malformed. Client error.
    Transport,
    /// The converter failed or produced nothing usable. Server error.
    Conversion,
}

impl ErrorKind {
    /// HTTP status code the kind maps to.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::Transport => 400,
            ErrorKind::Conversion => 500,
        }
    }
}

/// All request-level failures.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Multipart request without a `file` field.
    #[error("No file provided")]
    NoFileProvided,

    /// Multipart `file` field present but the browser sent no filename.
    #[error("No file selected")]
    NoFileSelected,

    /// JSON request without a `fileData` member.
    #[error("No fileData in JSON")]
    NoFileData,

    /// Payload decoded fine but holds zero bytes.
    #[error("{0}")]
    EmptyPayload(&'static str),

    /// Path-mode source does not exist.
    #[error("Input file {} does not exist", path.display())]
    SourceNotFound { path: PathBuf },

    /// Path-mode source exists but cannot be read.
    #[error("Cannot read input file {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload does not start with the `%PDF` magic.
    #[error("File is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// Decoded payload exceeds the configured upload limit.
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    // ── Transport errors ──────────────────────────────────────────────────
    /// Body could not be parsed as the expected JSON document.
    #[error("Invalid JSON: {0}")]
    MalformedJson(String),

    /// `fileData` is not valid base64.
    #[error("Invalid JSON: fileData is not valid base64 ({0})")]
    MalformedBase64(String),

    /// Multipart stream could not be read.
    #[error("Failed to read multipart body: {0}")]
    MalformedMultipart(String),

    /// Request body could not be read (too large, connection dropped).
    #[error("Failed to read request body: {0}")]
    UnreadableBody(String),

    /// Neither multipart/form-data nor application/json.
    #[error("Unsupported content type. Use multipart/form-data or application/json")]
    UnsupportedContentType(String),

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The external converter failed.
    #[error("Conversion failed: {0}")]
    Engine(#[from] EngineError),

    /// Converter reported success but wrote no output file.
    #[error("Conversion failed: converter produced no output file")]
    MissingOutput,

    /// Converter wrote a zero-byte output file.
    #[error("Conversion failed: Conversion produced empty output")]
    EmptyOutput,

    /// Staging to or reading from the scratch directory failed.
    #[error("Request processing failed: {context}: {source}")]
    Scratch {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Classify this error for the transports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::NoFileProvided
            | ConvertError::NoFileSelected
            | ConvertError::NoFileData
            | ConvertError::EmptyPayload(_)
            | ConvertError::SourceNotFound { .. }
            | ConvertError::SourceUnreadable { .. }
            | ConvertError::NotAPdf { .. }
            | ConvertError::PayloadTooLarge { .. } => ErrorKind::InvalidInput,

            ConvertError::MalformedJson(_)
            | ConvertError::MalformedBase64(_)
            | ConvertError::MalformedMultipart(_)
            | ConvertError::UnreadableBody(_)
            | ConvertError::UnsupportedContentType(_) => ErrorKind::Transport,

            ConvertError::Engine(_)
            | ConvertError::MissingOutput
            | ConvertError::EmptyOutput
            | ConvertError::Scratch { .. } => ErrorKind::Conversion,
        }
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::Conversion
    }

    pub(crate) fn scratch(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| ConvertError::Scratch { context, source }
    }
}

/// Failures of the external converter.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The converter program could not be started.
    #[error("could not start converter '{program}': {source}\nIs it installed and on PATH?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran and reported failure.
    #[error("{message}")]
    Failed {
        exit_code: Option<i32>,
        message: String,
    },

    /// The converter did not finish within the configured deadline.
    #[error("converter timed out after {secs}s")]
    TimedOut { secs: u64 },

    /// In-process converters report whatever they like.
    #[error("{0}")]
    Other(String),
}

/// Invalid service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Scratch directory '{}' is not usable: {source}", path.display())]
    ScratchRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
