//! Submit / poll-until-terminal policy over a job backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ApiSettings;
use crate::models::{ArtifactOrigin, ArtifactRef, StageKind};
use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::CancelHandle;

use super::types::{JobStatus, JobStatusSnapshot};
use super::JobBackend;

/// Polling behavior for `await_completion`.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before every status poll, the first one included.
    pub interval: Duration,
    /// Optional deadline for the whole poll loop. `None` polls until
    /// the backend reports a terminal status, however long that takes.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: None,
        }
    }
}

impl PollConfig {
    /// Build from API settings.
    pub fn from_settings(api: &ApiSettings) -> Self {
        Self {
            interval: Duration::from_secs(api.poll_interval_secs),
            timeout: api.stage_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Client for one unit of remote work: submit a job, then poll it to a
/// terminal state.
///
/// The client is stateless between calls; a job belongs to exactly one
/// submission and is discarded once terminal.
pub struct JobClient {
    backend: Arc<dyn JobBackend>,
    poll: PollConfig,
}

impl JobClient {
    /// Create a client over the given backend.
    pub fn new(backend: Arc<dyn JobBackend>, poll: PollConfig) -> Self {
        Self { backend, poll }
    }

    /// Submit a stage job and return its backend id.
    ///
    /// The input must be a previously produced, non-empty reference.
    pub async fn submit(&self, stage: StageKind, input: &ArtifactRef) -> StageResult<String> {
        if input.is_empty() {
            return Err(StageError::invalid_input(stage, "empty input artifact name"));
        }
        self.backend
            .start_stage(stage, input)
            .await
            .map_err(|source| StageError::submission(stage, source))
    }

    /// Read the job status once. No side effects beyond the network
    /// read; polling a terminal job returns the same snapshot again.
    pub async fn poll_once(
        &self,
        stage: StageKind,
        job_id: &str,
    ) -> StageResult<JobStatusSnapshot> {
        self.backend
            .stage_status(stage, job_id)
            .await
            .map_err(|source| StageError::poll(stage, source))
    }

    /// Poll the job until it reaches a terminal state.
    ///
    /// Returns the output artifact on `finished`; fails immediately
    /// with the backend-provided message on `error` (no further polls).
    /// Cancellation is checked before every delay and every poll so a
    /// superseded run stops issuing requests at the next boundary.
    pub async fn await_completion(
        &self,
        stage: StageKind,
        job_id: &str,
        cancel: &CancelHandle,
    ) -> StageResult<ArtifactRef> {
        let started = Instant::now();

        loop {
            if cancel.is_cancelled() {
                return Err(StageError::cancelled(stage));
            }
            if let Some(limit) = self.poll.timeout {
                if started.elapsed() >= limit {
                    return Err(StageError::timeout(stage, started.elapsed()));
                }
            }

            tokio::time::sleep(self.poll.interval).await;
            if cancel.is_cancelled() {
                return Err(StageError::cancelled(stage));
            }

            let snapshot = self.poll_once(stage, job_id).await?;
            match snapshot.status {
                JobStatus::Pending => continue,
                JobStatus::Finished => {
                    let name = snapshot
                        .file
                        .ok_or_else(|| StageError::missing_artifact(stage))?;
                    return Ok(ArtifactRef::new(name, ArtifactOrigin::Stage(stage)));
                }
                JobStatus::Error => {
                    return Err(StageError::job_failed(
                        stage,
                        snapshot.message.unwrap_or_default(),
                    ));
                }
            }
        }
    }
}
