//! The conversion request handler.
//!
//! One function, [`Handler::convert`], serves every transport. The
//! transports only differ in how they build a [`ConversionRequest`] and how
//! they wrap the returned [`ConvertedDocument`].
//!
//! ```text
//! request ─▶ validate ─▶ stage ─▶ converter ─▶ read back ─▶ document
//!                          │                                   │
//!                          └──── scratch dropped on every path ┘
//! ```

use crate::config::ServiceConfig;
use crate::engine::DocumentConverter;
use crate::error::{ConvertError, EngineError};
use crate::output::ConvertedDocument;
use crate::request::{ConversionRequest, Encoding};
use crate::scratch::ScratchSpace;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Stateless conversion handler, cheap to clone and share across tasks.
#[derive(Clone)]
pub struct Handler {
    converter: Arc<dyn DocumentConverter>,
    config: Arc<ServiceConfig>,
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("converter", &self.converter.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Handler {
    pub fn new(converter: Arc<dyn DocumentConverter>, config: ServiceConfig) -> Self {
        Self {
            converter,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Convert one document.
    ///
    /// # Errors
    /// - [`crate::ErrorKind::InvalidInput`] for an empty or non-PDF payload;
    ///   the converter is not invoked and no scratch is created.
    /// - [`crate::ErrorKind::Conversion`] when the converter fails, times out,
    ///   or leaves a missing or empty output.
    ///
    /// No retries are made: a converter failure is returned immediately.
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConvertedDocument, ConvertError> {
        let started = Instant::now();

        // ── Step 1: Validate ─────────────────────────────────────────────
        request.validate(self.config.require_pdf_magic)?;
        let original_size = request.source_bytes.len();
        // Local files are not uploads; only transported bodies are capped.
        if request.encoding != Encoding::FilesystemPath
            && original_size > self.config.max_upload_bytes
        {
            return Err(ConvertError::PayloadTooLarge {
                size: original_size,
                limit: self.config.max_upload_bytes,
            });
        }
        let output_name = request.output_name(&self.config.target_extension);

        // ── Step 2: Stage into scratch ───────────────────────────────────
        let scratch = ScratchSpace::create(
            &self.config.scratch_root(),
            &self.config.target_extension,
        )?;
        scratch.stage_input(&request.source_bytes).await?;
        drop(request);

        info!(
            "Converting PDF ({} bytes, via {}) to {}",
            original_size,
            self.converter.name(),
            self.config.target_extension.to_uppercase()
        );

        // ── Step 3: Run the converter ────────────────────────────────────
        if let Err(e) = self
            .run_converter(scratch.input_path(), scratch.output_path())
            .await
        {
            error!("Conversion failed: {}", e);
            return Err(e.into());
        }

        // ── Step 4: Read back and verify ─────────────────────────────────
        let output_bytes = scratch.read_output().await.inspect_err(|e| {
            error!("{}", e);
        })?;
        let converted_size = output_bytes.len();
        let duration_ms = started.elapsed().as_millis() as u64;

        info!(
            "Conversion successful. Output size: {} bytes ({}ms)",
            converted_size, duration_ms
        );
        debug!("Releasing scratch {}", scratch.path().display());

        Ok(ConvertedDocument {
            output_bytes,
            output_name,
            original_size,
            converted_size,
            duration_ms,
        })
    }

    /// Convert a local file and write the result to `output_path`.
    ///
    /// Uses an atomic write (temp file + rename) so a failed run never leaves
    /// a partial document behind.
    pub async fn convert_file(
        &self,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<ConvertedDocument, ConvertError> {
        let request = ConversionRequest::from_path(input_path).await?;
        let document = self.convert(request).await?;
        write_atomic(output_path.as_ref(), &document.output_bytes).await?;
        Ok(document)
    }

    async fn run_converter(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        let call = self.converter.convert(input, output);
        match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| EngineError::TimedOut {
                    secs: limit.as_secs(),
                })?,
            None => call.await,
        }
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(ConvertError::scratch("creating output directory"))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, bytes)
        .await
        .map_err(ConvertError::scratch("writing output file"))?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(ConvertError::scratch("moving output file into place")(e));
    }
    Ok(())
}
