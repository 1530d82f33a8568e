//! Stepexec - job runner entry point
//!
//! `run`   executes a job descriptor locally (optionally after a setup script)
//! `track` follows a task on a remote task execution service until it finishes
//! `probe` reports container runtime capabilities

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use stepexec_core::application::constants::{DEFAULT_PROBE_IMAGE, DEFAULT_PROBE_RUNTIME, PROBE_TIMEOUT};
use stepexec_core::application::{cancel_channel, CapabilityCache, LocalRunService, TaskPoller};
use stepexec_core::domain::{JobDescriptor, Operation};
use stepexec_core::port::time_provider::SystemTimeProvider;
use stepexec_infra_system::{
    DockerVmIdProbe, EnvironmentCapture, LocalProcessExecutor, ProbeConfig, SingularityUsernsProbe,
};
use stepexec_infra_tes::{TesClient, TesTaskBackend};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stepexec")]
#[command(about = "Workflow step execution backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log format: json or pretty
    #[arg(long, env = "STEPEXEC_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job descriptor as a local process and exit with its code
    Run {
        /// JSON job descriptor (commands, cwd, env, stdin_path, stdout_path, stderr_path)
        job: PathBuf,

        /// Setup script whose exported variables are merged into the job environment
        env_script: Option<PathBuf>,
    },

    /// Poll a remote task until it reaches a terminal state
    Track {
        /// Task service address
        #[arg(long, env = "STEPEXEC_TES_URL")]
        url: String,

        /// Task identifier
        task_id: String,

        /// Delay between polls in milliseconds
        #[arg(long, env = "STEPEXEC_POLL_INTERVAL_MS", default_value_t = 1000)]
        interval_ms: u64,
    },

    /// Report container runtime capabilities
    Probe {
        /// Runtime binary to probe
        #[arg(long, default_value = DEFAULT_PROBE_RUNTIME)]
        runtime: String,

        /// Minimal image used for the trial run
        #[arg(long, env = "STEPEXEC_PROBE_IMAGE", default_value = DEFAULT_PROBE_IMAGE)]
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_format)?;

    info!("Stepexec v{} starting...", VERSION);

    let code = match cli.command {
        Commands::Run { job, env_script } => run_job(job, env_script).await?,
        Commands::Track {
            url,
            task_id,
            interval_ms,
        } => track_task(&url, &task_id, Duration::from_millis(interval_ms)).await?,
        Commands::Probe { runtime, image } => probe(runtime, image).await,
    };

    std::process::exit(code);
}

async fn run_job(job_path: PathBuf, env_script: Option<PathBuf>) -> Result<i32> {
    let job = JobDescriptor::from_json_file(&job_path)
        .with_context(|| format!("Loading job descriptor {}", job_path.display()))?;

    let work_dir = std::env::current_dir().context("Resolving working directory")?;
    let service = LocalRunService::new(
        Arc::new(LocalProcessExecutor::new(Arc::new(SystemTimeProvider))),
        Arc::new(EnvironmentCapture::new(work_dir)),
    );

    let code = service
        .run(&job, env_script.as_deref())
        .await
        .context("Running job")?;

    info!(exit_code = code, "Job finished");
    Ok(code)
}

async fn track_task(url: &str, task_id: &str, interval: Duration) -> Result<i32> {
    let client = Arc::new(TesClient::new(url));
    let initial = client
        .get_task(task_id)
        .await
        .with_context(|| format!("Fetching task {} from {}", task_id, client.address()))?;

    let backend = TesTaskBackend::new(
        Arc::clone(&client),
        Box::new(|operation: Operation| match serde_json::to_string_pretty(&operation) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "Cannot render finished task"),
        }),
    );

    let (cancel_tx, cancel_rx) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping poller");
            cancel_tx.cancel();
        }
    });

    let terminal = TaskPoller::new(initial, Arc::new(backend))
        .with_interval(interval)
        .with_cancel(cancel_rx)
        .spawn()
        .await
        .context("Poller task failed")??;

    Ok(if terminal.state.is_success() { 0 } else { 1 })
}

async fn probe(runtime: String, image: PathBuf) -> i32 {
    let userns = CapabilityCache::new(SingularityUsernsProbe::new(ProbeConfig {
        runtime: runtime.clone(),
        image,
        timeout: PROBE_TIMEOUT,
    }));
    let vm_identity = CapabilityCache::new(DockerVmIdProbe::default());

    let (supports_userns, identity) = tokio::join!(userns.get(), vm_identity.get());

    println!("{} --userns: {}", runtime, if supports_userns { "supported" } else { "unsupported" });
    match (identity.uid, identity.gid) {
        (Some(uid), Some(gid)) => println!("docker VM user: {}:{}", uid, gid),
        _ => println!("docker VM user: none"),
    }

    0
}
