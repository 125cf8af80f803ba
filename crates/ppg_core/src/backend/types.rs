//! Wire types for the remote job backend.
//!
//! All bodies are JSON. Field names and status strings are part of the
//! backend contract and must not be renamed.

use serde::{Deserialize, Serialize};

/// Response from a `{stage}_start` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStarted {
    /// Opaque backend-assigned job identifier.
    pub job_id: String,
}

/// Backend-reported state of a job.
///
/// Monotonic: once `Finished` or `Error` is observed, polling stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Finished,
    Error,
}

impl JobStatus {
    /// Whether this status ends the poll loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One `{stage}_status` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusSnapshot {
    pub status: JobStatus,
    /// Output artifact name; present when `status` is `finished`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Backend error message; present when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JobStatusSnapshot {
    /// A pending snapshot.
    pub fn pending() -> Self {
        Self {
            status: JobStatus::Pending,
            file: None,
            message: None,
        }
    }

    /// A finished snapshot carrying the output artifact name.
    pub fn finished(file: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Finished,
            file: Some(file.into()),
            message: None,
        }
    }

    /// An errored snapshot carrying the backend message.
    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Error,
            file: None,
            message: Some(message.into()),
        }
    }
}

/// Response from the FASTA creation and merge endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct FileCreated {
    /// Name of the created artifact on the backend.
    pub file: String,
}
