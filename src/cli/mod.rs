//! CLI module for repomap

mod args;

pub use args::{Args, Command};

use crate::acquire::identifier::sanitize;
use crate::acquire::{GithubClient, Materialization, RepoIdentifier};
use crate::analysis::{AnalysisReport, Analyzer, LlmSummarizer};
use crate::config::{Config, OutputFormat};
use crate::error::{Error, Result};
use crate::output;
use crate::service::RepoMap;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "repomap.toml";

/// Run the CLI application
pub async fn run() -> ExitCode {
    let args = Args::parse_args();
    init_tracing(args.verbose);

    match execute(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        // An explicit path must exist
        Some(path) => Config::load(path),
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG)),
    }
}

fn check_format(format: &Option<String>) -> Result<()> {
    match format {
        Some(f) if OutputFormat::parse(f).is_none() => {
            Err(Error::invalid_input(format!("Unknown format: {}", f)))
        }
        _ => Ok(()),
    }
}

async fn execute(args: Args) -> Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    let interactive = std::io::stderr().is_terminal();

    match args.command {
        Command::Analyze {
            repo,
            cache_dir,
            timeout,
            format,
            output,
        } => {
            check_format(&format)?;
            cfg.merge_cli(cache_dir, timeout, format, output);
            cfg.validate()?;

            let repo = RepoIdentifier::parse(&repo)?;
            let service = RepoMap::from_config(&cfg)
                .with_analyzer(Analyzer::new().with_progress(interactive));

            let root = match service.acquirer().materialize(&repo)? {
                Materialization::Ready(path) => path,
                Materialization::Accepted(handle) => {
                    eprintln!("Accepted {}, cloning...", repo);
                    let spinner = interactive.then(|| spinner(format!("Cloning {}", repo)));
                    let result = handle.wait().await;
                    if let Some(pb) = spinner {
                        pb.finish_and_clear();
                    }
                    result?
                }
            };

            let report = service.scan(root, repo.name()).await?;
            emit(&report, &cfg)
        }

        Command::Scan {
            path,
            label,
            format,
            output,
        } => {
            check_format(&format)?;
            cfg.merge_cli(None, None, format, output);
            cfg.validate()?;

            if !path.exists() {
                return Err(Error::PathNotFound(path));
            }

            let label = label.unwrap_or_else(|| directory_label(&path));
            let service = RepoMap::from_config(&cfg)
                .with_analyzer(Analyzer::new().with_progress(interactive));
            let report = service.scan(path, &label).await?;
            emit(&report, &cfg)
        }

        Command::File {
            repo,
            path,
            cache_dir,
        } => {
            cfg.merge_cli(cache_dir, None, None, None);
            cfg.validate()?;

            let content = RepoMap::from_config(&cfg).read_file(&repo, &path)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }

        Command::Summarize {
            repo,
            path,
            cache_dir,
        } => {
            cfg.merge_cli(cache_dir, None, None, None);
            cfg.validate()?;

            let summarizer = LlmSummarizer::new(cfg.summarizer.clone());
            let summary = RepoMap::from_config(&cfg)
                .summarize_file(&summarizer, &repo, &path)
                .await?;
            println!("{}", summary);
            Ok(())
        }

        Command::Info { repo } => {
            let repo = RepoIdentifier::parse(&repo)?;
            let info = GithubClient::new().repository(&repo).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }

        Command::Version => {
            println!("repomap {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Print the report to stdout, or write it under the configured output directory
fn emit(report: &AnalysisReport, cfg: &Config) -> Result<()> {
    let rendered = output::render(report, cfg.output.format, &cfg.diagrams)?;

    match &cfg.output.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = report_path(dir, &report.repo_name, cfg.output.format);
            std::fs::write(&path, rendered)?;
            println!("Report written to: {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Report file under `dir`; the label never escapes it
fn report_path(dir: &Path, repo_name: &str, format: OutputFormat) -> PathBuf {
    let stem = match sanitize(repo_name) {
        s if s.is_empty() => "report".to_string(),
        s => s,
    };
    dir.join(format!("{}.{}", stem, format.extension()))
}

fn directory_label(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repository")
        .to_string()
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
