use anyhow::{Context, Result};
use bincode_ci::{hosted_jobs, local_stages, BuiltinStage, Gate, Pipeline, StageConfig};
use bincode_telemetry::{LogWriter, TelemetryConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bincode-ci")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the hosted CI stages locally", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON log lines and print the run report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI stages and evaluate the gate
    Run {
        /// Workspace path (default: current directory)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Stages to run (comma-separated: fmt,check,test); all hosted stages by default
        #[arg(short, long)]
        stages: Option<String>,

        /// Per-stage timeout in seconds (0 disables)
        #[arg(long, default_value = "1800")]
        timeout: u64,
    },

    /// List the hosted jobs and the local stage each maps to
    Jobs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the report
    TelemetryConfig::verbose(cli.verbose)
        .with_json(cli.json)
        .with_writer(LogWriter::Stderr)
        .init();

    match cli.command {
        Commands::Run {
            workspace,
            stages,
            timeout,
        } => {
            let selected = match stages {
                Some(list) => BuiltinStage::parse_list(&list)?,
                None => local_stages(),
            };
            let configs: Vec<StageConfig> = selected
                .into_iter()
                .map(|stage| StageConfig::from_builtin(stage, timeout))
                .collect();

            let workspace = workspace
                .canonicalize()
                .with_context(|| format!("Workspace {} not found", workspace.display()))?;
            let result = Pipeline::run(&workspace, configs).await;
            let verdict = Gate::evaluate(&result);

            if cli.json {
                let report = serde_json::json!({ "result": result, "verdict": verdict });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for stage in &result.stages {
                    let status = if stage.passed() { "PASS" } else { "FAIL" };
                    println!("{:>4}  {} ({} ms)", status, stage.stage_name, stage.duration_ms);
                }
                for violation in &verdict.violations {
                    println!("  - {}", violation);
                }
                println!("{}", verdict.message);
            }

            if !verdict.passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Jobs => {
            for job in hosted_jobs() {
                println!(
                    "{:<16} {:<12} [{}] {} -> {}",
                    job.platform.config_path(),
                    job.name,
                    job.images.join(", "),
                    job.toolchain,
                    job.command_line()
                );
            }
            Ok(())
        }
    }
}
