mod cli;

use refreshsparse::{
    catalog::{Catalog, SqliteCatalog},
    config,
    jellyfin::JellyfinClient,
    scheduler,
    sparse::{self, Policy, RefreshTask},
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, TaskSelector};
use refreshsparse_common::Error;
use std::path::Path;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "refreshsparse=trace,refreshsparse_db=debug,refreshsparse_common=debug".to_string()
        } else {
            "refreshsparse=info,refreshsparse_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { task, dry_run } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_tasks(task, dry_run, cli.config.as_deref()))
        }
        Commands::List { task, snapshot } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_candidates(
                task,
                snapshot.as_deref(),
                cli.config.as_deref(),
            ))
        }
        Commands::Snapshot { output } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(take_snapshot(&output, cli.config.as_deref()))
        }
        Commands::Daemon => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_daemon(cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("refreshsparse {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_tasks(
    task: TaskSelector,
    dry_run: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let cancel = CancellationToken::new();
    tokio::spawn(scheduler::shutdown_signal(cancel.clone()));

    match scheduler::run_once(&config, &task.kinds(), dry_run, &cancel).await {
        Ok(summaries) => {
            for summary in summaries {
                let verb = if summary.pretend {
                    "would refresh"
                } else {
                    "refreshed"
                };
                println!(
                    "{}: {} {} of {} sparse items ({} still sparse)",
                    summary.kind,
                    verb,
                    if summary.pretend {
                        summary.candidates
                    } else {
                        summary.refreshed
                    },
                    summary.candidates,
                    summary.still_sparse
                );
            }
            Ok(())
        }
        Err(e) if e.downcast_ref::<Error>().is_some_and(Error::is_cancelled) => {
            println!("Cancelled");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn list_candidates(
    task: TaskSelector,
    snapshot: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let policy = Policy::prepare(&config.policy);

    let catalog: Box<dyn Catalog> = match snapshot {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Snapshot does not exist: {:?}", path);
            }
            Box::new(
                SqliteCatalog::open(&path.to_string_lossy())
                    .with_context(|| format!("Failed to open snapshot: {:?}", path))?,
            )
        }
        None => Box::new(JellyfinClient::new(&config.jellyfin)?),
    };

    let now = Utc::now();
    for kind in task.kinds() {
        let task = RefreshTask::for_kind(kind);
        let candidates = sparse::select_candidates(task, catalog.as_ref(), &policy, now).await?;

        println!("{} {} need a refresh", candidates.len(), task.label);
        for candidate in &candidates {
            println!("  {}", task.display_name(&candidate.item));
            for reason in &candidate.classification.reasons {
                println!("    {}", reason);
            }
        }
    }

    Ok(())
}

async fn take_snapshot(output: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let client = JellyfinClient::new(&config.jellyfin)?;

    let snapshot = SqliteCatalog::open(&output.to_string_lossy())
        .with_context(|| format!("Failed to open snapshot: {:?}", output))?;

    tracing::info!("Writing snapshot to {:?}", output);
    let count = snapshot.import_from(&client).await?;
    println!("Stored {} items in {}", count, output.display());

    Ok(())
}

async fn run_daemon(config_path: Option<&Path>) -> Result<()> {
    // Fail early on a broken config; later reloads only log errors.
    config::load_config_or_default(config_path)?;

    let cancel = CancellationToken::new();
    tokio::spawn(scheduler::shutdown_signal(cancel.clone()));

    scheduler::run_daemon(scheduler::daemon_config_path(config_path), cancel).await
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => match config::find_default_config() {
            Some(path) => path,
            None => {
                println!("No config file found; built-in defaults are valid");
                return Ok(());
            }
        },
    };

    let config = config::load_config(&path)?;
    println!("Configuration is valid: {}", path.display());
    println!(
        "  Jellyfin: {}",
        if config.jellyfin.url.is_empty() {
            "not configured"
        } else {
            config.jellyfin.url.as_str()
        }
    );
    println!(
        "  Schedule: every {} minutes ({})",
        config.schedule.interval_minutes,
        config
            .schedule
            .kinds
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  Mode: {}",
        if config.policy.pretend {
            "pretend"
        } else {
            "refresh"
        }
    );

    Ok(())
}
