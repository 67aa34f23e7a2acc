//! Configuration for the conversion handler.
//!
//! Every knob the handler reads lives in [`ServiceConfig`], built through
//! [`ServiceConfigBuilder`]. The binaries map their `clap` arguments onto the
//! builder; library users set only what they need and keep the defaults for
//! the rest.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// MIME type of the produced document.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Name used when the client supplies none.
pub const DEFAULT_SOURCE_NAME: &str = "document.pdf";

/// Configuration for a [`crate::handler::Handler`].
///
/// # Example
/// ```rust
/// use pdf2word::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .timeout_secs(60)
///     .max_upload_bytes(10 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout().unwrap().as_secs(), 60);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory in which per-request scratch directories are created.
    /// `None` uses the system temp directory.
    pub scratch_root: Option<PathBuf>,

    /// Deadline for one converter call in seconds. `0` disables it. Default: 120.
    pub timeout_secs: u64,

    /// Largest accepted request body in bytes. Default: 50 MiB.
    pub max_upload_bytes: usize,

    /// Reject payloads that do not start with `%PDF`. Default: true.
    pub require_pdf_magic: bool,

    /// Extension of the produced document, without the dot. Default: `docx`.
    pub target_extension: String,

    /// Content type of the produced document.
    pub target_mime: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            scratch_root: None,
            timeout_secs: 120,
            max_upload_bytes: 50 * 1024 * 1024,
            require_pdf_magic: true,
            target_extension: "docx".to_string(),
            target_mime: DOCX_MIME.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Converter deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Directory scratch directories are created in.
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(dir.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn require_pdf_magic(mut self, v: bool) -> Self {
        self.config.require_pdf_magic = v;
        self
    }

    pub fn target_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.target_extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    pub fn target_mime(mut self, mime: impl Into<String>) -> Self {
        self.config.target_mime = mime.into();
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A configured scratch root is created if missing so the first request
    /// does not fail on it.
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max upload size must be at least 1 byte".into(),
            ));
        }
        if c.target_extension.is_empty()
            || c.target_extension.contains(['/', '\\', '.'])
        {
            return Err(ConfigError::Invalid(format!(
                "target extension '{}' is not a plain extension",
                c.target_extension
            )));
        }
        if let Some(ref root) = c.scratch_root {
            ensure_dir(root)?;
        }
        Ok(self.config)
    }
}

fn ensure_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::ScratchRoot {
        path: path.to_path_buf(),
        source,
    })
}
