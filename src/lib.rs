//! VeloNode Polling Worker
//!
//! Polls the VeloNode job backend for open jobs, claims one at a time,
//! simulates the work and reports a placeholder result.
//!
//! ## Module Structure
//!
//! - `types`: Wire records (jobs, accounts, request bodies)
//! - `identity`: Worker name generation
//! - `error`: Typed backend failures
//! - `config`: Configuration and scheduling policy
//! - `client`: `JobBackend` trait and its HTTP implementation
//! - `clock`: Sleep abstraction
//! - `worker`: The poll / claim / work / submit loop

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod types;
pub mod worker;

pub use client::{HttpBackend, JobBackend};
pub use clock::{Sleeper, TokioSleeper};
pub use config::{SchedulePolicy, WorkerConfig, DEFAULT_BACKEND_URL};
pub use error::BackendError;
pub use identity::WorkerIdentity;
pub use types::{Job, JobStatus, UserAccount};
pub use worker::{CycleOutcome, Worker, WorkerPhase};
