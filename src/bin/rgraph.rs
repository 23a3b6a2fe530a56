//! rgraph CLI: operator interface for inspecting and executing action plans.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rgraph_exec::config::Config;
use rgraph_exec::engine::{ErrorStrategy, ExecResult, Executor};
use rgraph_exec::plan::Plan;
use rgraph_exec::telemetry::{TelemetryConfig, init_telemetry};
use rgraph_exec::trace::GraphvizTracer;
use rgraph_exec::{EventList, RunContext};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rgraph", about = "Execute event-driven cloud action graphs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the actions in a plan and the events they wait for
    Show {
        /// Plan file (TOML)
        plan: PathBuf,
    },
    /// Execute a plan
    Run {
        /// Plan file (TOML)
        plan: PathBuf,
        /// Compute produced events without running actions
        #[arg(long)]
        dry_run: bool,
        /// Maximum actions in flight (overrides RGRAPH_MAX_CONCURRENT)
        #[arg(long)]
        max_concurrent: Option<usize>,
        /// Keep running independent actions after a failure
        #[arg(long)]
        continue_on_error: bool,
        /// Deadline for the whole execution
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Write the executed graph as Graphviz DOT
        #[arg(long)]
        graphviz: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "rgraph".to_string(),
        log_level: config.log_level.clone(),
    })?;

    match cli.command {
        Command::Show { plan } => cmd_show(plan),
        Command::Run {
            plan,
            dry_run,
            max_concurrent,
            continue_on_error,
            timeout_secs,
            graphviz,
            json,
        } => {
            let mut exec_config = config.executor_config();
            exec_config.dry_run |= dry_run;
            if let Some(n) = max_concurrent {
                anyhow::ensure!(n > 0, "--max-concurrent must be at least 1");
                exec_config.max_concurrent = n;
            }
            if continue_on_error {
                exec_config.error_strategy = ErrorStrategy::ContinueOnError;
            }
            if let Some(secs) = timeout_secs {
                exec_config.timeout = Some(Duration::from_secs(secs));
            }

            let actions = Plan::load(&plan)?.into_actions();
            let tracer = Arc::new(GraphvizTracer::new());
            let executor = Executor::new(actions, exec_config).with_tracer(tracer.clone());

            let (ctx, cancel) = RunContext::with_cancel();
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                cancel.cancel();
            });

            let outcome = executor.run(&ctx, None).await;

            if let Some(path) = graphviz {
                std::fs::write(&path, tracer.render())
                    .with_context(|| format!("writing {}", path.display()))?;
            }

            let (result, err) = match outcome {
                Ok(result) => (Some(result), None),
                Err(e) => (e.exec_result().cloned(), Some(e)),
            };
            if let Some(result) = &result {
                if json {
                    println!("{}", serde_json::to_string_pretty(result)?);
                } else {
                    print_result(result);
                }
            }
            match err {
                Some(e) => Err(e.into()),
                None => Ok(()),
            }
        }
    }
}

fn cmd_show(plan: PathBuf) -> anyhow::Result<()> {
    let actions = Plan::load(&plan)?.into_actions();

    if actions.is_empty() {
        println!("No actions in plan.");
        return Ok(());
    }

    println!("{:<32}  {:<8}  {:<40}  SUMMARY", "NAME", "TYPE", "WANTS");
    println!("{}", "-".repeat(110));

    for action in &actions {
        let meta = action.metadata();
        let wants = EventList(&action.base().want()).to_string();
        println!(
            "{:<32}  {:<8}  {:<40}  {}",
            meta.name, meta.action_type, wants, meta.summary
        );
    }

    println!("\n{} action(s)", actions.len());
    Ok(())
}

fn print_result(result: &ExecResult) {
    println!(
        "Run {}{}",
        result.run_id,
        if result.dry_run { " (dry run)" } else { "" }
    );

    for done in &result.completed {
        println!(
            "  ok       {:<32}  {:>6}ms  -> {}",
            done.metadata.name,
            done.duration_ms,
            EventList(&done.events)
        );
    }
    for failed in &result.failed {
        println!(
            "  FAILED   {:<32}  {:>6}ms  {}",
            failed.metadata.name, failed.duration_ms, failed.error
        );
    }
    for pending in &result.pending {
        println!(
            "  {:<8} {:<32}  waiting for {}",
            pending.state,
            pending.metadata.name,
            EventList(&pending.pending_events)
        );
    }

    println!(
        "\n{} completed, {} failed, {} pending",
        result.completed.len(),
        result.failed.len(),
        result.pending.len()
    );
}
