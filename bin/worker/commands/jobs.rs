//! Jobs command - list jobs on the backend

use crate::style::*;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use velonode_worker::{HttpBackend, Job, JobBackend, JobStatus, WorkerConfig};

pub async fn run(config: &WorkerConfig, all: bool) -> Result<()> {
    let backend = HttpBackend::with_timeout(&config.backend_url, config.request_timeout())?;
    let filter = if all { None } else { Some(JobStatus::Open) };

    let jobs = backend
        .list_jobs(filter)
        .await
        .with_context(|| format!("Failed to list jobs from {}", config.backend_url))?;

    print_header(if all { "Jobs" } else { "Open Jobs" });

    if jobs.is_empty() {
        print_warning("No jobs found");
        println!();
        return Ok(());
    }

    println!(
        "  {:<38} {:<10} {:>8}  {:<18} {}",
        style("ID").bold(),
        style("Status").bold(),
        style("Bounty").bold(),
        style("Worker").bold(),
        style("Created").bold()
    );
    println!("  {}", style("─".repeat(96)).dim());

    for job in &jobs {
        print_job_row(job);
    }

    println!();
    print_key_value("Total", &jobs.len().to_string());
    println!();
    Ok(())
}

fn print_job_row(job: &Job) {
    let bounty = job
        .bounty
        .map(|b| format!("{}", b))
        .unwrap_or_else(|| "-".to_string());
    let worker = job.worker.as_deref().unwrap_or("-");

    println!(
        "  {:<38} {} {:>8}  {:<18} {}",
        job.id,
        styled_status(job.status, 10),
        bounty,
        worker,
        style(format_millis(job.created_at)).dim()
    );
}

fn format_millis(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
