//! Wire records exchanged with the VeloNode job backend.
//!
//! The backend owns every record here. The worker only decodes what it
//! reads and encodes the small request bodies it sends; it never mutates
//! a job except by asking the backend for a state transition.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix of every generated result hash (content-identifier style)
pub const RESULT_HASH_PREFIX: &str = "QmResult-";

// ============================================================================
// JOBS
// ============================================================================

/// Lifecycle status of a job as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Open,
    Assigned,
    Completed,
    /// Any status this worker does not know about
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Value used in the `status` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            JobStatus::Open => "OPEN",
            JobStatus::Assigned => "ASSIGNED",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Hardware requirements attached to a job by its researcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(rename = "VRAM", default)]
    pub vram: Option<serde_json::Value>,
}

/// Decode an informational field, treating `null` or a value of the wrong
/// type the same as an absent field
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A job record. Only `id` and `status` are required; everything else is
/// informational and may be absent or malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub researcher: Option<String>,
    #[serde(rename = "dockerURI", default, deserialize_with = "lenient")]
    pub docker_uri: Option<String>,
    #[serde(rename = "inputHash", default, deserialize_with = "lenient")]
    pub input_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub requirements: Option<JobRequirements>,
    #[serde(default, deserialize_with = "lenient")]
    pub bounty: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub worker: Option<String>,
    #[serde(rename = "resultHash", default, deserialize_with = "lenient")]
    pub result_hash: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub started_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub completed_at: Option<i64>,
}

impl Job {
    /// Minimal job with just an id and a status
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            researcher: None,
            docker_uri: None,
            input_hash: None,
            requirements: None,
            bounty: None,
            worker: None,
            result_hash: None,
            created_at: None,
            started_at: None,
            completed_at: None,
        }
    }
}

// ============================================================================
// REQUEST BODIES
// ============================================================================

/// `POST /user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
}

/// `POST /job/claim`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "workerUsername")]
    pub worker_username: String,
}

/// `POST /job/result`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSubmission {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "resultHash")]
    pub result_hash: String,
}

// ============================================================================
// ACCOUNTS
// ============================================================================

/// Entry of the public `/users` ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    #[serde(default, deserialize_with = "lenient")]
    pub credits: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<i64>,
}

/// Find the account belonging to `username` in a ledger listing
pub fn find_account<'a>(users: &'a [UserAccount], username: &str) -> Option<&'a UserAccount> {
    users.iter().find(|u| u.username == username)
}

/// Structured error body returned with non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

/// Placeholder result identifier for simulated work.
///
/// Random, never derived from the job itself.
pub fn generate_result_hash() -> String {
    format!("{}{}", RESULT_HASH_PREFIX, Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_minimal_deserialization() {
        let json = r#"{"id": "job-1", "status": "OPEN"}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, "job-1");
        assert_eq!(job.status, JobStatus::Open);
        assert!(job.bounty.is_none());
        assert!(job.worker.is_none());
    }

    #[test]
    fn test_job_full_backend_record() {
        let json = r#"{
            "id": "3f1c",
            "researcher": "alice",
            "dockerURI": "docker.io/lab/model:v1",
            "inputHash": "QmInput",
            "requirements": {"VRAM": "24GB"},
            "bounty": 50,
            "status": "ASSIGNED",
            "worker": "worker-abcd1234",
            "resultHash": null,
            "created_at": 1700000000000,
            "started_at": 1700000005000
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.status, JobStatus::Assigned);
        assert_eq!(job.docker_uri.as_deref(), Some("docker.io/lab/model:v1"));
        assert_eq!(job.bounty, Some(50.0));
        assert_eq!(job.worker.as_deref(), Some("worker-abcd1234"));
        assert_eq!(
            job.requirements.unwrap().vram,
            Some(serde_json::json!("24GB"))
        );
        assert!(job.result_hash.is_none());
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let json = r#"{"id": "x", "status": "CANCELLED"}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.status, JobStatus::Unknown);
    }

    #[test]
    fn test_malformed_informational_fields_do_not_reject_job() {
        let json = r#"{
            "id": "job-1",
            "status": "OPEN",
            "bounty": "50",
            "researcher": 7,
            "requirements": "none",
            "created_at": "yesterday"
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, "job-1");
        assert_eq!(job.status, JobStatus::Open);
        assert!(job.bounty.is_none());
        assert!(job.researcher.is_none());
        assert!(job.requirements.is_none());
        assert!(job.created_at.is_none());
    }

    #[test]
    fn test_account_with_null_or_odd_credits_still_decodes() {
        let json = r#"[
            {"username": "other", "credits": null},
            {"username": "legacy", "credits": "lots", "created_at": null},
            {"username": "worker-1", "credits": 1050}
        ]"#;
        let users: Vec<UserAccount> = serde_json::from_str(json).unwrap();
        assert_eq!(users.len(), 3);
        assert!(users[0].credits.is_none());
        assert!(users[1].credits.is_none());
        assert_eq!(
            find_account(&users, "worker-1").unwrap().credits,
            Some(1050.0)
        );
    }

    #[test]
    fn test_claim_request_wire_names() {
        let req = ClaimRequest {
            job_id: "job-1".to_string(),
            worker_username: "worker-1".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"jobId": "job-1", "workerUsername": "worker-1"})
        );
    }

    #[test]
    fn test_result_submission_wire_names() {
        let req = ResultSubmission {
            job_id: "job-1".to_string(),
            result_hash: "QmResult-x".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"jobId": "job-1", "resultHash": "QmResult-x"})
        );
    }

    #[test]
    fn test_result_hash_shape() {
        let hash = generate_result_hash();
        let suffix = hash.strip_prefix(RESULT_HASH_PREFIX).unwrap();
        assert!(Uuid::parse_str(suffix).is_ok());
        assert_ne!(hash, generate_result_hash());
    }

    #[test]
    fn test_find_account() {
        let users = vec![
            UserAccount {
                username: "alice".to_string(),
                credits: Some(950.0),
                created_at: None,
            },
            UserAccount {
                username: "worker-1".to_string(),
                credits: Some(1050.0),
                created_at: Some(1),
            },
        ];
        assert_eq!(
            find_account(&users, "worker-1").unwrap().credits,
            Some(1050.0)
        );
        assert!(find_account(&users, "bob").is_none());
    }

    #[test]
    fn test_status_query_values() {
        assert_eq!(JobStatus::Open.as_query(), "OPEN");
        assert_eq!(JobStatus::Completed.to_string(), "COMPLETED");
    }
}
