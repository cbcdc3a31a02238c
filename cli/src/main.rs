//! CLI entrypoint for consilium
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use consilium_application::{
    CacheStore, DiagnoseUseCase, NoCache, NoProgress, ProgressNotifier, ResilienceState,
    ResilientClient,
};
use consilium_domain::{CaseRequest, PanelConfig, Specialist};
use consilium_infrastructure::{
    ChatCompletionsEndpoint, ConfigLoader, FileConfig, MemoryCacheStore, PrometheusMetrics,
};
use consilium_presentation::{
    Cli, ConsoleFormatter, OutputFormat, OutputFormatter, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; the guard must live until exit when logging to a file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("--log-file must name a file: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    let issues = config.validate();
    if !issues.is_empty() {
        let details: Vec<String> = issues.iter().map(|i| format!("  - {}", i)).collect();
        bail!("Invalid configuration:\n{}", details.join("\n"));
    }
    Ok(config)
}

fn resolve_panel(config: &FileConfig, requested: &[String]) -> Result<PanelConfig> {
    let panel = config.to_panel_config()?;
    if requested.is_empty() {
        return Ok(panel);
    }

    let mut keep = requested
        .iter()
        .map(|s| s.parse::<Specialist>())
        .collect::<Result<Vec<_>, _>>()?;
    keep.sort();
    keep.dedup();
    let restricted = panel.restricted_to(&keep)?;

    // restricted_to silently drops names the configured panel does not seat
    if restricted.specialists().len() < keep.len() {
        bail!(
            "Requested specialists are not all seated on the configured panel (seated: {})",
            panel
                .specialists()
                .iter()
                .map(|seat| seat.specialist.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(restricted)
}

fn save_synthesis(path: &Path, synthesis: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, synthesis)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn print_metrics(metrics: &PrometheusMetrics) {
    match metrics.render() {
        Ok(text) => println!("{}", text),
        Err(e) => warn!("Failed to render metrics: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting consilium");

    let config = load_config(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("{}", ConfigLoader::render(&config)?);
        return Ok(());
    }

    let history_file = cli
        .history_file
        .as_deref()
        .context("A clinical history file is required")?;
    let history = tokio::fs::read_to_string(history_file)
        .await
        .with_context(|| format!("Failed to read {}", history_file.display()))?;
    let case_id = cli
        .case_id
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("case-%Y%m%d-%H%M%S").to_string());
    let case = CaseRequest::try_new(case_id, history)?;

    let panel = resolve_panel(&config, &cli.specialist)?;

    // === Dependency Injection ===
    let cache: Arc<dyn CacheStore> = if cli.no_cache || !config.cache.enabled {
        info!("Response cache disabled");
        Arc::new(NoCache)
    } else {
        Arc::new(MemoryCacheStore::new(config.cache.capacity))
    };

    let api_key = config.remote.api_key();
    if api_key.is_none() {
        warn!(
            "{} is not set; calling endpoints without authentication",
            config.remote.api_key_env
        );
    }
    let remote = Arc::new(ChatCompletionsEndpoint::new(
        api_key,
        config.remote.connect_timeout(),
        config.remote.call_timeout(),
    )?);

    let params = config.to_resilience_params();
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let state = Arc::new(ResilienceState::new(params.circuit, cache));
    let client = ResilientClient::new(remote, state, params).with_metrics(metrics.clone());
    let use_case = DiagnoseUseCase::new(client, panel);

    // Ctrl-C stops new attempts; calls already in flight finish
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; no further attempts will be started");
                cancel.cancel();
            }
        });
    }

    // Print header
    let show_banner = !cli.quiet && cli.output != OutputFormat::Json;
    if show_banner {
        println!();
        println!("+============================================================+");
        println!("|           Consilium - Specialist Panel                     |");
        println!("+============================================================+");
        println!();
        println!("Case: {}", case.id());
        println!(
            "Specialists: {}",
            use_case
                .panel()
                .specialists()
                .iter()
                .map(|seat| seat.specialist.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    }

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let result = use_case
        .execute_with(&case, progress.as_ref(), &cancel)
        .await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if cli.metrics {
                print_metrics(&metrics);
            }
            return Err(e).with_context(|| format!("Diagnosis {} failed", case.id()));
        }
    };

    // Output results
    let formatter: &dyn OutputFormatter = &ConsoleFormatter;
    let output = match cli.output {
        OutputFormat::Full => formatter.format(&report),
        OutputFormat::Synthesis => formatter.format_synthesis_only(&report),
        OutputFormat::Json => formatter
            .format_json(&report)
            .context("Failed to serialize the report as JSON")?,
    };

    println!("{}", output);

    if let Some(path) = &cli.save {
        save_synthesis(path, report.synthesis())?;
        if show_banner {
            println!("Synthesis saved to {}", path.display());
        }
    }

    if cli.metrics {
        print_metrics(&metrics);
    }

    Ok(())
}
