//! # repograph
//!
//! Command-line harness around the `repograph` analysis core.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze a local checkout
//! repograph --root . --pretty
//!
//! # Analyze a JSON bundle {files, manifests} from another tool
//! fetch-repo owner/name | repograph --input - --summary
//!
//! # Gate CI on risk
//! repograph --root . --summary --fail-on high
//! ```
//!
//! Stdout carries the report; logs go to stderr.

mod collect;
mod digest;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use tracing::{debug, info};

use repograph::{AnalysisInput, Analyzer, AnalyzerConfig, RiskLevel};

/// Exit status when the risk level reaches `--fail-on`.
const RISK_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "repograph")]
#[command(about = "Dependency graph, cycle and manifest analysis for a source tree")]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "root"])))]
struct Args {
    /// JSON input bundle `{files, manifests}`; `-` reads stdin
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Local checkout to walk
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Analyzer config (TOML). Defaults to <root>/.repograph/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,

    /// Print a human-readable digest instead of JSON
    #[arg(long)]
    summary: bool,

    /// Exit with status 2 when risk is at or above this level
    #[arg(long, value_name = "LEVEL")]
    fail_on: Option<RiskLevel>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn load_config(args: &Args) -> Result<AnalyzerConfig> {
    let config = match (&args.config, &args.root) {
        (Some(path), _) => AnalyzerConfig::load_from_path(path)?,
        (None, Some(root)) => AnalyzerConfig::load(root)?,
        (None, None) => AnalyzerConfig::default(),
    };
    debug!(?config, "analyzer config");
    Ok(config)
}

fn read_input(path: &Path) -> Result<AnalysisInput> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read input from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).context("input is not a valid {files, manifests} bundle")
}

fn write_output(path: Option<&Path>, body: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            if !body.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;
    let input = match (&args.input, &args.root) {
        (Some(path), _) => read_input(path)?,
        (None, Some(root)) => collect::collect_root(root)?,
        (None, None) => bail!("one of --input or --root is required"),
    };
    info!(
        files = input.files.len(),
        manifests = input.manifests.len(),
        "analyzing"
    );

    let report = Analyzer::new(config).analyze(&input);

    let body = if args.summary {
        digest::render(&report)
    } else {
        report
            .to_json(args.pretty)
            .context("failed to serialize report")?
    };
    write_output(args.output.as_deref(), &body)?;

    if let Some(threshold) = args.fail_on
        && report.risk.level >= threshold
    {
        info!(level = %report.risk.level, %threshold, "risk threshold reached");
        return Ok(ExitCode::from(RISK_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();

    // stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[repograph] Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
