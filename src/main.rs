use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use conductor::approval::ApprovalGate;
use conductor::config::Config;
use conductor::core::{Task, TaskStore};
use conductor::dispatch::{CollaboratorRegistry, Dispatcher, SimulatedCollaborator};
use conductor::executor::{plans, SequentialExecutor};
use conductor::run_loop::RunLoop;
use conductor::sync::{InMemoryRemote, SyncBridge};
use conductor::{clog, Result};

/// Conductor - dependency-aware task orchestration and execution
#[derive(Parser, Debug)]
#[command(name = "conductor")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    CONDUCTOR_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.conductor/conductor.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the built-in demonstration scenario against simulated
    /// collaborators and an in-memory remote
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    conductor::log::init_with_debug(cli.debug);

    match cli.command {
        Some(Command::Demo) | None => run_demo().await,
    }
}

/// Plan two dependent tasks, approve them, and drive the run loop to
/// quiescence while the sync puller mirrors state from the remote.
async fn run_demo() -> Result<()> {
    let config = Config::load()?;
    clog!("Demo starting");

    let sim = Arc::new(
        SimulatedCollaborator::new()
            .respond_with("read-file", json!({ "collaborators": ["web-search"] })),
    );
    let mut registry = CollaboratorRegistry::new();
    for action in [
        "web-search",
        "image-generation",
        "video-generation",
        "code-generation",
        "generic-completion",
        "read-file",
        "merge-config",
        "write-file",
        "remove-config",
    ] {
        registry.bind(action, sim.clone());
    }
    let registry = Arc::new(registry);

    let store = Arc::new(RwLock::new(TaskStore::new()));
    let remote = InMemoryRemote::shared();
    let bridge = Arc::new(SyncBridge::new(
        remote.clone(),
        store.clone(),
        config.sync_interval(),
        config.mirror_writes,
    ));

    // Phase 1: plan, then wait for approval before anything runs.
    let tasks = vec![
        Task::with_id("t1", "Search for rust async runtimes", ""),
        Task::with_id("t2", "Generate an image of a crab conductor", "")
            .depends_on(&["t1"]),
    ];
    let mut gate = ApprovalGate::new();
    {
        let mut guard = store.write().await;
        gate.submit_plan(&mut guard, tasks.clone())?;
    }
    bridge.mirror_write(tasks).await;
    println!("Plan submitted, awaiting approval...");

    // The demo approves its own plan.
    gate.approve()?;
    println!("Plan approved.");

    let cancel = CancellationToken::new();
    let puller = bridge.clone().spawn_puller(cancel.clone());

    let run_loop = RunLoop::new(
        store.clone(),
        bridge.clone(),
        Dispatcher::new(registry.clone()).with_timeout(config.dispatch_timeout()),
        Duration::from_millis(config.loop_delay_ms.min(100)),
        cancel.clone(),
    );
    let outcome = run_loop.run(&gate).await?;

    println!(
        "Run finished: {} completed, {} failed, {} blocked ({}% done)",
        outcome.completed, outcome.failed, outcome.blocked, outcome.stats.progress
    );

    // A multi-step configuration change through the sequential executor.
    let plan = plans::register_collaborator(
        "web-search",
        json!({ "endpoint": "sim://web-search" }),
        "collaborators.json",
    );
    let mut executor = SequentialExecutor::new();
    let report = executor.execute_plan(&plan, registry.as_ref()).await;
    println!(
        "Plan '{}' {} ({} steps recorded)",
        plan.name,
        if report.success { "succeeded" } else { "failed" },
        executor.execution_log().len()
    );

    cancel.cancel();
    if let Err(e) = puller.await {
        clog!("Sync puller task ended abnormally: {}", e);
    }

    let guard = store.read().await;
    println!("Final local state: {} tasks", guard.len());
    for task in guard.all_tasks() {
        println!("  [{}] {} - {}", task.status, task.id, task.title);
    }
    Ok(())
}
