//! Job Backend Client
//!
//! The worker talks to the backend through the [`JobBackend`] trait so the
//! control loop can be driven against an in-memory backend in tests.
//! [`HttpBackend`] is the production implementation.
//!
//! Endpoints:
//! ```text
//! POST /user              {username}                  register worker
//! GET  /jobs?status=OPEN                              list open jobs
//! POST /job/claim         {jobId, workerUsername}     claim a job
//! POST /job/result        {jobId, resultHash}         submit result
//! GET  /users                                         public credit ledger
//! ```
//!
//! Every call returns `Result<_, BackendError>`; nothing here logs or
//! swallows failures, that is left to the caller.

use crate::error::{BackendError, Result};
use crate::types::{
    ClaimRequest, ErrorBody, Job, JobStatus, RegisterRequest, ResultSubmission, UserAccount,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Ensure an account exists for `username`
    async fn register_worker(&self, username: &str) -> Result<()>;

    /// List jobs, optionally filtered by status
    async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<Job>>;

    /// Ask for exclusive assignment of `job_id`
    async fn claim_job(&self, job_id: &str, worker_username: &str) -> Result<()>;

    /// Mark `job_id` complete with `result_hash`
    async fn submit_result(&self, job_id: &str, result_hash: &str) -> Result<()>;

    /// Read the public account ledger
    async fn list_users(&self) -> Result<Vec<UserAccount>>;
}

/// HTTP client for the job backend
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Same as [`HttpBackend::new`] with an optional per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build().map_err(BackendError::Transport)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into `BackendError::Status`, keeping the
    /// `{error}` body field when the backend sent one
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.error);
        debug!("Backend returned {}: {}", status, text);

        Err(BackendError::Status { status, message })
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let resp = Self::check(resp).await?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl JobBackend for HttpBackend {
    async fn register_worker(&self, username: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/user"))
            .json(&RegisterRequest {
                username: username.to_string(),
            })
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }

    async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<Job>> {
        let mut request = self.client.get(self.url("/jobs"));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_query())]);
        }

        let resp = request.send().await?;
        Self::decode(resp).await
    }

    async fn claim_job(&self, job_id: &str, worker_username: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/job/claim"))
            .json(&ClaimRequest {
                job_id: job_id.to_string(),
                worker_username: worker_username.to_string(),
            })
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }

    async fn submit_result(&self, job_id: &str, result_hash: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/job/result"))
            .json(&ResultSubmission {
                job_id: job_id.to_string(),
                result_hash: result_hash.to_string(),
            })
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>> {
        let resp = self.client.get(self.url("/users")).send().await?;
        Self::decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_base_url_trimmed() {
        let backend = HttpBackend::new("http://localhost:4000/");
        assert_eq!(backend.base_url(), "http://localhost:4000");
        assert_eq!(backend.url("/jobs"), "http://localhost:4000/jobs");
    }

    #[tokio::test]
    async fn test_register_worker() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/user")
                .json_body(json!({"username": "worker-1"}));
            then.status(200)
                .json_body(json!({"message": "User created successfully"}));
        });

        let backend = HttpBackend::new(&server.base_url());
        backend.register_worker("worker-1").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_list_open_jobs() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/jobs").query_param("status", "OPEN");
            then.status(200).json_body(json!([
                {"id": "job-1", "status": "OPEN", "bounty": 50},
                {"id": "job-2", "status": "OPEN"}
            ]));
        });

        let backend = HttpBackend::new(&server.base_url());
        let jobs = backend.list_jobs(Some(JobStatus::Open)).await.unwrap();
        mock.assert();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, "job-1");
        assert_eq!(jobs[0].bounty, Some(50.0));
        assert_eq!(jobs[1].status, JobStatus::Open);
    }

    #[tokio::test]
    async fn test_list_all_jobs_has_no_filter() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/jobs");
            then.status(200)
                .json_body(json!([{"id": "job-9", "status": "COMPLETED"}]));
        });

        let backend = HttpBackend::new(&server.base_url());
        let jobs = backend.list_jobs(None).await.unwrap();
        mock.assert();
        assert_eq!(jobs[0].status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_list_jobs_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/jobs");
            then.status(500);
        });

        let backend = HttpBackend::new(&server.base_url());
        let err = backend.list_jobs(Some(JobStatus::Open)).await.unwrap_err();
        match err {
            BackendError::Status { status, message } => {
                assert_eq!(status.as_u16(), 500);
                assert!(message.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_jobs_invalid_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/jobs");
            then.status(200)
                .header("content-type", "application/json")
                .body("not valid json");
        });

        let backend = HttpBackend::new(&server.base_url());
        let err = backend.list_jobs(Some(JobStatus::Open)).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_error() {
        let backend = HttpBackend::new("http://127.0.0.1:65534");
        let err = backend.list_users().await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_claim_job_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/job/claim")
                .json_body(json!({"jobId": "job-1", "workerUsername": "worker-1"}));
            then.status(200).json_body(json!({"message": "Job claimed"}));
        });

        let backend = HttpBackend::new(&server.base_url());
        backend.claim_job("job-1", "worker-1").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_claim_job_error_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/job/claim");
            then.status(400)
                .json_body(json!({"error": "Job not available"}));
        });

        let backend = HttpBackend::new(&server.base_url());
        let err = backend.claim_job("job-1", "worker-1").await.unwrap_err();
        assert_eq!(err.reason(), "Job not available");
    }

    #[tokio::test]
    async fn test_submit_result_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/job/result")
                .json_body(json!({"jobId": "job-1", "resultHash": "QmResult-abc"}));
            then.status(200)
                .json_body(json!({"message": "Job completed and rewarded"}));
        });

        let backend = HttpBackend::new(&server.base_url());
        backend.submit_result("job-1", "QmResult-abc").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_list_users() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users");
            then.status(200).json_body(json!([
                {"username": "alice", "credits": 950, "created_at": 1700000000000i64},
                {"username": "worker-1", "credits": 1050}
            ]));
        });

        let backend = HttpBackend::new(&server.base_url());
        let users = backend.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].username, "worker-1");
        assert_eq!(users[1].credits, Some(1050.0));
    }

    #[tokio::test]
    async fn test_timeout_client_builds() {
        let backend =
            HttpBackend::with_timeout("http://localhost:4000", Some(Duration::from_secs(2)))
                .unwrap();
        assert_eq!(backend.base_url(), "http://localhost:4000");
    }
}
