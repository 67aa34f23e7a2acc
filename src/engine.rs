//! The external converter boundary.
//!
//! Layout analysis and DOCX generation are not done here. A
//! [`DocumentConverter`] receives a staged input path and an output path and
//! must leave the converted document at the output path. The handler only
//! trusts the result if that file exists and is non-empty.
//!
//! [`CommandConverter`] runs a command-line converter (by default
//! `pdf2docx convert <input> <output>`, which converts the whole document).
//! The child is spawned with `kill_on_drop`, so when the handler's deadline
//! fires, or the request is abandoned, the process does not outlive it.

use crate::error::EngineError;
use futures::future::BoxFuture;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Placeholder replaced by the staged input path.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the expected output path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Converts the whole document at `input` into `output`.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// in-flight request.
pub trait DocumentConverter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Convert `input` into `output`.
    fn convert<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
    ) -> BoxFuture<'a, Result<(), EngineError>>;
}

/// Runs an external program once per conversion.
///
/// # Example
/// ```rust
/// use pdf2word::CommandConverter;
///
/// let converter = CommandConverter::new("pdf2docx")
///     .args(["convert", "{input}", "{output}"]);
/// assert_eq!(converter.program(), "pdf2docx");
/// ```
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl Default for CommandConverter {
    fn default() -> Self {
        Self::new("pdf2docx").args(["convert", INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER])
    }
}

impl CommandConverter {
    /// A converter invoking `program` with no arguments yet.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Replace the argument template. `{input}` and `{output}` are
    /// substituted inside each argument.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument template, placeholders unsubstituted.
    pub fn template(&self) -> &[String] {
        &self.args
    }

    /// Arguments for one call, placeholders substituted.
    pub fn render_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        let args = self.render_args(input, output);
        debug!("Running converter: {} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        if !stdout.trim().is_empty() {
            debug!("{} stdout: {}", self.program, stdout.trim());
        }

        if result.status.success() {
            info!("{} finished", self.program);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        let message = failure_message(stderr.trim(), result.status.code());
        warn!("{} failed: {}", self.program, message);
        Err(EngineError::Failed {
            exit_code: result.status.code(),
            message,
        })
    }
}

impl DocumentConverter for CommandConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert<'a>(
        &'a self,
        input: &'a Path,
        output: &'a Path,
    ) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(self.run(input, output))
    }
}

/// Pick the most useful line of a failed converter's stderr.
///
/// Python-based converters end their traceback with the exception line,
/// which is the part worth showing to a client.
fn failure_message(stderr: &str, code: Option<i32>) -> String {
    match stderr.lines().rev().find(|l| !l.trim().is_empty()) {
        Some(line) => line.trim().to_string(),
        None => match code {
            Some(c) => format!("converter exited with status {c}"),
            None => "converter was terminated by a signal".to_string(),
        },
    }
}
