//! Worker identity.

use std::fmt;
use uuid::Uuid;

/// Default prefix of generated worker names
pub const DEFAULT_WORKER_PREFIX: &str = "worker";

/// Length of the random suffix appended to the prefix
const SUFFIX_LEN: usize = 8;

/// Name this process uses with the backend. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerIdentity(String);

impl WorkerIdentity {
    /// Generate `<prefix>-<8 hex chars>`
    pub fn generate(prefix: &str) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", prefix, &token[..SUFFIX_LEN]))
    }

    /// Use an explicit name (e.g. to keep earning into an existing account)
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
