//! CLI binary for pdf2word.
//!
//! A thin shim over the library crate: `pdf2word <input.pdf> <output.docx>`.
//! Prints exactly one JSON line to stdout and exits non-zero on failure, so
//! other programs can drive it without parsing human-readable output.

use anyhow::Result;
use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2word::{CliReport, CommandConverter, ConvertedDocument, Handler, ServiceConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: pdf2word <input.pdf> <output.docx>";

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert with the default converter (pdf2docx must be on PATH)
  pdf2word report.pdf report.docx

  # Use a different converter command
  pdf2word --converter soffice \
    --converter-arg=--headless --converter-arg=--convert-to \
    --converter-arg=docx --converter-arg={input} in.pdf out.docx

OUTPUT:
  One JSON line on stdout:
    {"success":true,"message":"Conversion completed successfully"}
    {"success":false,"error":"Input file in.pdf does not exist"}
  Exit status is 1 on failure.

ENVIRONMENT VARIABLES:
  PDF2WORD_CONVERTER       Converter program (default: pdf2docx)
  PDF2WORD_CONVERTER_ARGS  Comma-separated argument template
  PDF2WORD_TIMEOUT         Converter deadline in seconds, 0 = none
  PDF2WORD_SCRATCH_DIR     Where per-run scratch directories are created
  RUST_LOG                 Overrides the log filter (logs go to stderr)
"#;

/// Convert a PDF file to a Word document.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2word",
    version,
    about = "Convert a PDF file to a Word (DOCX) document",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Where to write the DOCX file.
    output: PathBuf,

    /// Converter program.
    #[arg(long, env = "PDF2WORD_CONVERTER", default_value = "pdf2docx")]
    converter: String,

    /// Converter argument; repeat for each. `{input}` and `{output}` are
    /// substituted. Default: `convert {input} {output}`.
    #[arg(
        long = "converter-arg",
        env = "PDF2WORD_CONVERTER_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    converter_args: Vec<String>,

    /// Converter deadline in seconds (0 disables it).
    #[arg(long, env = "PDF2WORD_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Directory for scratch files (default: system temp dir).
    #[arg(long, env = "PDF2WORD_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Disable the spinner on stderr.
    #[arg(long, env = "PDF2WORD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs on stderr.
    #[arg(short, long, env = "PDF2WORD_VERBOSE")]
    verbose: bool,

    /// Suppress everything on stderr except errors.
    #[arg(short, long, env = "PDF2WORD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
            ) =>
        {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return finish(&CliReport::failed(USAGE));
        }
    };

    // ── Logging setup ────────────────────────────────────────────────────
    // stdout carries the JSON report only; logs always go to stderr.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let spinner = spinner(&cli);
    let result = run(&cli).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(document) => {
            tracing::info!(
                "{} → {} ({} → {} bytes)",
                cli.input.display(),
                cli.output.display(),
                document.original_size,
                document.converted_size
            );
            CliReport::ok()
        }
        Err(e) => CliReport::failed(e),
    };
    finish(&report)
}

async fn run(cli: &Cli) -> Result<ConvertedDocument> {
    let mut builder = ServiceConfig::builder().timeout_secs(cli.timeout);
    if let Some(ref dir) = cli.scratch_dir {
        builder = builder.scratch_root(dir);
    }
    let config = builder.build()?;

    let converter = CommandConverter::new(&cli.converter);
    let converter = if cli.converter_args.is_empty() {
        converter.args(CommandConverter::default().template().iter().cloned())
    } else {
        converter.args(cli.converter_args.iter().cloned())
    };

    let handler = Handler::new(Arc::new(converter), config);
    // The conversion error already reads as a complete sentence.
    Ok(handler.convert_file(&cli.input, &cli.output).await?)
}

fn spinner(cli: &Cli) -> ProgressBar {
    if cli.quiet || cli.no_progress || cli.verbose {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(format!("Converting {}", cli.input.display()));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Print the report line and map it to an exit status.
fn finish(report: &CliReport) -> ExitCode {
    let line = serde_json::to_string(report)
        .unwrap_or_else(|_| r#"{"success":false,"error":"failed to encode report"}"#.to_string());
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{line}");
    let _ = handle.flush();

    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
