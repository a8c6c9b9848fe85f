//! Run command - the polling loop

use crate::style::*;
use anyhow::{Context, Result};
use tracing::info;
use velonode_worker::{HttpBackend, Worker, WorkerConfig};

pub async fn run(config: WorkerConfig) -> Result<()> {
    let identity = config.identity();
    let schedule = config.schedule();

    print_banner();
    print_key_value("Worker", identity.as_str());
    print_key_value("Backend", &config.backend_url);
    print_key_value(
        "Schedule",
        &format!(
            "poll every {}s, {}s simulated work",
            schedule.poll_interval.as_secs(),
            schedule.work_duration.as_secs()
        ),
    );
    println!();

    let backend = HttpBackend::with_timeout(&config.backend_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let worker = Worker::new(identity, schedule, backend);

    tokio::select! {
        _ = worker.run() => {}
        _ = tokio::signal::ctrl_c() => {
            println!();
            info!("Received shutdown signal, stopping worker {}", worker.identity());
        }
    }

    Ok(())
}
