//! CLI entrypoint for playbook-arbiter
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use arbiter_application::{
    DecisionLogStore, EventStore, MakeDecisionInput, ReplayDecisionUseCase,
    UnifiedDecisionCoordinator,
};
use arbiter_domain::{DecisionContext, DecisionId};
use arbiter_infrastructure::{
    AvailabilityNodeGovernance, BudgetCostGovernance, ConfigLoader, DenylistPolicy, FileConfig,
    FileDecisionLog, InMemoryDecisionLog, InMemoryEventStore, JsonlEventStore,
    KeywordIntentPipeline, RulePreflight, Severity, UuidDecisionIdGenerator,
};
use arbiter_presentation::{Cli, Command, ConsoleFormatter, OutputFormat};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first; the log file location lives there
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        match ConfigLoader::load(cli.config.as_ref()) {
            Ok(config) => config,
            Err(e) => bail!("Failed to load configuration: {}", e),
        }
    };

    let _log_guard = init_logging(cli.verbose, &config)?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting playbook-arbiter");

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Error => eprintln!("config error: {}", issue.message),
            Severity::Warning => warn!("{}", issue),
        }
    }
    if issues.iter().any(|i| i.severity == Severity::Error) {
        bail!("Configuration has errors; fix them before continuing");
    }

    match cli.command {
        Command::Config => {
            ConfigLoader::print_config_sources(cli.config.as_ref());
            println!();
            println!("{}", ConsoleFormatter::format_json(&config));
        }
        Command::Show { decision_id } => {
            let decision_id = DecisionId::new(decision_id)?;
            let store = stored_decision_log(&config).await?;
            let Some(entry) = store.get(&decision_id).await? else {
                bail!("Decision {} not found", decision_id);
            };
            let output = match cli.output {
                OutputFormat::Json => ConsoleFormatter::format_json(&entry),
                OutputFormat::Summary | OutputFormat::Full => ConsoleFormatter::format_entry(&entry),
            };
            println!("{}", output);
        }
        Command::Replay { decision_id } => {
            let decision_id = DecisionId::new(decision_id)?;
            let use_case = ReplayDecisionUseCase::new(stored_decision_log(&config).await?);
            let report = use_case.execute(&decision_id).await?;
            let output = match cli.output {
                OutputFormat::Json => ConsoleFormatter::format_json(&report),
                OutputFormat::Summary | OutputFormat::Full => {
                    ConsoleFormatter::format_replay(&report)
                }
            };
            println!("{}", output);
        }
        Command::Decide {
            input,
            workspace,
            project,
            user,
            context,
        } => {
            if input.trim().is_empty() {
                bail!("Input is required");
            }

            // === Dependency Injection ===
            let coordinator = build_coordinator(&config).await?;

            let mut request = MakeDecisionInput::new(input, workspace)
                .with_context(context.into_iter().collect::<DecisionContext>());
            if let Some(project) = project {
                request = request.with_project(project);
            }
            if let Some(user) = user {
                request = request.with_user(user);
            }

            let output = coordinator.execute(request).await?;
            let text = match cli.output {
                OutputFormat::Summary => ConsoleFormatter::format_summary(&output),
                OutputFormat::Full => ConsoleFormatter::format_full(&output),
                OutputFormat::Json => ConsoleFormatter::format_json(&output.result),
            };
            println!("{}", text);
        }
    }

    Ok(())
}

/// Console logging from the verbosity flag, plus an optional log file
fn init_logging(verbose: u8, config: &FileConfig) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(level));

    let Some(path) = &config.logging.file else {
        tracing_subscriber::registry().with(console).init();
        return Ok(None);
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    let Some(file_name) = path.file_name() else {
        bail!("Invalid log file path: {}", path.display());
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, file_name));
    let file = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(EnvFilter::new(if verbose == 0 { "info" } else { level }));

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(Some(guard))
}

async fn decision_log(config: &FileConfig) -> Result<Arc<dyn DecisionLogStore>> {
    let store: Arc<dyn DecisionLogStore> = match &config.storage.decision_log_dir {
        Some(dir) => Arc::new(FileDecisionLog::open(dir).await?),
        None => {
            warn!("No decision_log_dir configured; decisions are kept in memory only");
            Arc::new(InMemoryDecisionLog::new())
        }
    };
    Ok(store)
}

/// The persistent decision log; reading from a fresh in-memory log is pointless
async fn stored_decision_log(config: &FileConfig) -> Result<Arc<dyn DecisionLogStore>> {
    if config.storage.decision_log_dir.is_none() {
        bail!(
            "No decision log configured; set [storage] decision_log_dir \
             (or ARBITER_STORAGE__DECISION_LOG_DIR) to look up past decisions"
        );
    }
    decision_log(config).await
}

fn event_store(config: &FileConfig) -> Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match &config.storage.event_log_path {
        Some(path) => Arc::new(JsonlEventStore::open(path)?),
        None => Arc::new(InMemoryEventStore::new()),
    };
    Ok(store)
}

async fn build_coordinator(
    config: &FileConfig,
) -> Result<UnifiedDecisionCoordinator<KeywordIntentPipeline>> {
    // Validation already reported any fallback
    let (coordinator_config, _) = config.coordinator.to_coordinator_config();

    let mut coordinator = UnifiedDecisionCoordinator::new(
        Arc::new(KeywordIntentPipeline::from_config(&config.intent)),
        decision_log(config).await?,
        event_store(config)?,
        Arc::new(UuidDecisionIdGenerator::new()),
        coordinator_config,
    );

    let governance = &config.governance;
    if governance.has_preflight() {
        coordinator = coordinator.with_preflight(Arc::new(RulePreflight::from_config(governance)));
    }
    if governance.has_node() {
        coordinator = coordinator
            .with_node_governance(Arc::new(AvailabilityNodeGovernance::from_config(governance)));
    }
    if let Some(cost) = BudgetCostGovernance::from_config(governance) {
        coordinator = coordinator.with_cost_governance(Arc::new(cost));
    }
    if governance.has_policy() {
        coordinator = coordinator.with_policy(Arc::new(DenylistPolicy::from_config(governance)));
    }

    Ok(coordinator)
}
