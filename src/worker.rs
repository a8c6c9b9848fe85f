//! Worker Loop - polls for open jobs and works them one at a time
//!
//! Each cycle:
//! 1. Fetch open jobs (`GET /jobs?status=OPEN`)
//! 2. Claim the first job the backend will give us, in the order returned
//! 3. Simulate work, submit a result hash, then report the account balance
//! 4. If nothing was claimed, emit a progress dot
//! 5. Sleep for the poll interval and start over
//!
//! Nothing in the loop is fatal. Every backend failure is logged and the
//! next cycle simply tries again.

use crate::client::JobBackend;
use crate::clock::{Sleeper, TokioSleeper};
use crate::config::SchedulePolicy;
use crate::error::BackendError;
use crate::identity::WorkerIdentity;
use crate::types::{find_account, generate_result_hash, Job, JobStatus};
use parking_lot::RwLock;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, warn};

/// What the worker is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Idle,
    Polling,
    Claiming,
    Executing,
    Submitting,
}

/// Result of a single poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The open-jobs request failed (transport, status or body)
    BackendUnavailable,
    /// The backend answered with an empty list
    NoOpenJobs,
    /// Jobs were listed but every claim was refused
    NoneClaimed { attempted: usize },
    /// A job was claimed, worked and its result accepted
    Completed { job_id: String, result_hash: String },
    /// A job was claimed and worked but the result was not accepted
    SubmitFailed { job_id: String },
}

impl CycleOutcome {
    /// Whether a job was claimed during the cycle
    pub fn claimed(&self) -> bool {
        matches!(
            self,
            CycleOutcome::Completed { .. } | CycleOutcome::SubmitFailed { .. }
        )
    }
}

pub struct Worker<B, S = TokioSleeper> {
    identity: WorkerIdentity,
    schedule: SchedulePolicy,
    backend: B,
    sleeper: S,
    phase: RwLock<WorkerPhase>,
    progress_ticks: AtomicU64,
}

impl<B: JobBackend> Worker<B, TokioSleeper> {
    pub fn new(identity: WorkerIdentity, schedule: SchedulePolicy, backend: B) -> Self {
        Self::with_sleeper(identity, schedule, backend, TokioSleeper)
    }
}

impl<B: JobBackend, S: Sleeper> Worker<B, S> {
    pub fn with_sleeper(
        identity: WorkerIdentity,
        schedule: SchedulePolicy,
        backend: B,
        sleeper: S,
    ) -> Self {
        Self {
            identity,
            schedule,
            backend,
            sleeper,
            phase: RwLock::new(WorkerPhase::Idle),
            progress_ticks: AtomicU64::new(0),
        }
    }

    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    pub fn schedule(&self) -> SchedulePolicy {
        self.schedule
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn phase(&self) -> WorkerPhase {
        *self.phase.read()
    }

    /// Number of progress dots emitted so far
    pub fn progress_ticks(&self) -> u64 {
        self.progress_ticks.load(Ordering::Relaxed)
    }

    fn set_phase(&self, phase: WorkerPhase) {
        let mut current = self.phase.write();
        if *current != phase {
            debug!("Worker phase: {:?} -> {:?}", *current, phase);
            *current = phase;
        }
    }

    /// Main entry point - runs forever
    pub async fn run(&self) {
        info!("Worker {} starting...", self.identity);
        self.register().await;

        loop {
            self.step().await;
        }
    }

    /// One cycle followed by the poll-interval sleep
    pub async fn step(&self) -> CycleOutcome {
        let outcome = self.run_cycle().await;
        self.sleeper.sleep(self.schedule.poll_interval).await;
        outcome
    }

    /// Best-effort account registration. Failure is logged and ignored.
    pub async fn register(&self) {
        match self.backend.register_worker(self.identity.as_str()).await {
            Ok(()) => info!("Registered worker {}", self.identity),
            Err(e) => warn!("Failed to register worker {}: {}", self.identity, e),
        }
    }

    async fn fetch_open_jobs(&self) -> Result<Vec<Job>, BackendError> {
        let result = self.backend.list_jobs(Some(JobStatus::Open)).await;
        if let Err(e) = &result {
            if e.is_unreachable() {
                error!("Connection error: {}", e);
            } else {
                error!("Failed to list open jobs: {}", e);
            }
        }
        result
    }

    /// Open jobs, or an empty list if the request failed.
    ///
    /// A failed request and an empty backend look the same here; use
    /// [`Worker::run_cycle`] to tell them apart.
    pub async fn list_open_jobs(&self) -> Vec<Job> {
        self.fetch_open_jobs().await.unwrap_or_default()
    }

    /// Try to claim `job_id`. Returns true only if the backend accepted.
    pub async fn claim_job(&self, job_id: &str) -> bool {
        match self
            .backend
            .claim_job(job_id, self.identity.as_str())
            .await
        {
            Ok(()) => {
                info!("Claimed job {}", job_id);
                true
            }
            Err(e @ BackendError::Status { .. }) => {
                warn!("Claim failed for job {}: {}", job_id, e.reason());
                false
            }
            Err(e) => {
                error!("Error claiming job {}: {}", job_id, e);
                false
            }
        }
    }

    /// Simulate work on a claimed job and submit a placeholder result.
    ///
    /// Returns the submitted hash if the backend accepted it.
    pub async fn complete_job(&self, job_id: &str) -> Option<String> {
        self.set_phase(WorkerPhase::Executing);
        info!(
            "Executing job {} ({:?} simulated work)...",
            job_id, self.schedule.work_duration
        );
        self.sleeper.sleep(self.schedule.work_duration).await;

        let result_hash = generate_result_hash();

        self.set_phase(WorkerPhase::Submitting);
        match self.backend.submit_result(job_id, &result_hash).await {
            Ok(()) => {
                info!("Job {} completed! Hash: {}", job_id, result_hash);
                self.report_balance().await;
                Some(result_hash)
            }
            Err(e) => {
                error!("Error submitting result for job {}: {}", job_id, e);
                None
            }
        }
    }

    /// Current credits of this worker's account.
    ///
    /// `Ok(None)` when the ledger has no usable balance for this worker,
    /// `Err` when the ledger itself could not be fetched.
    pub async fn fetch_balance(&self) -> Result<Option<f64>, BackendError> {
        let users = self.backend.list_users().await?;
        Ok(find_account(&users, self.identity.as_str()).and_then(|u| u.credits))
    }

    async fn report_balance(&self) {
        match self.fetch_balance().await {
            Ok(Some(credits)) => info!("Worker balance: {} VELO", credits),
            Ok(None) => debug!("No account found for {}", self.identity),
            Err(e) => warn!("Failed to fetch balance: {}", e),
        }
    }

    /// Poll, claim at most one job and work it.
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.set_phase(WorkerPhase::Polling);

        let outcome = match self.fetch_open_jobs().await {
            Err(_) => CycleOutcome::BackendUnavailable,
            Ok(jobs) if jobs.is_empty() => CycleOutcome::NoOpenJobs,
            Ok(jobs) => self.work_first_claimable(&jobs).await,
        };

        if !outcome.claimed() {
            self.emit_progress();
        }

        self.set_phase(WorkerPhase::Idle);
        outcome
    }

    async fn work_first_claimable(&self, jobs: &[Job]) -> CycleOutcome {
        info!("Found {} open jobs", jobs.len());
        self.set_phase(WorkerPhase::Claiming);

        for job in jobs {
            if let Some(bounty) = job.bounty {
                debug!("Trying job {} (bounty {})", job.id, bounty);
            }

            if !self.claim_job(&job.id).await {
                continue;
            }

            // One job per cycle
            return match self.complete_job(&job.id).await {
                Some(result_hash) => CycleOutcome::Completed {
                    job_id: job.id.clone(),
                    result_hash,
                },
                None => CycleOutcome::SubmitFailed {
                    job_id: job.id.clone(),
                },
            };
        }

        CycleOutcome::NoneClaimed {
            attempted: jobs.len(),
        }
    }

    fn emit_progress(&self) {
        self.progress_ticks.fetch_add(1, Ordering::Relaxed);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = write!(stdout, ".").and_then(|_| stdout.flush()) {
            debug!("Failed to write progress indicator: {}", e);
        }
    }
}
