//! Stage runner - one complete stage execution.

use crate::backend::JobClient;
use crate::models::{ArtifactRef, StageKind};

use super::errors::{StageError, StageResult};
use super::pipeline::CancelHandle;
use super::types::RunContext;

/// Runs one stage to a terminal state: submit, poll until done, return
/// the new artifact.
///
/// Stateless with respect to the run - it receives an input artifact
/// and returns a result; the orchestrator owns all run state. A failed
/// job is never retried here: stage failures are fatal to the run.
/// Transient transport errors are retried inside the backend client
/// before they ever reach this layer.
pub struct StageRunner<'a> {
    client: &'a JobClient,
}

impl<'a> StageRunner<'a> {
    pub fn new(client: &'a JobClient) -> Self {
        Self { client }
    }

    /// Execute the stage for the given input.
    pub async fn run(
        &self,
        ctx: &RunContext,
        stage: StageKind,
        input: &ArtifactRef,
        cancel: &CancelHandle,
    ) -> StageResult<ArtifactRef> {
        if input.is_empty() {
            return Err(StageError::invalid_input(stage, "empty input artifact name"));
        }

        ctx.logger
            .info(&format!("{} input: {}", stage, input.name()));

        let job_id = self.client.submit(stage, input).await?;
        ctx.logger
            .debug(&format!("{} job accepted: id={}", stage, job_id));

        let artifact = self.client.await_completion(stage, &job_id, cancel).await?;
        ctx.logger
            .info(&format!("{} output: {}", stage, artifact.name()));

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::tempdir;

    use crate::backend::testing::ScriptedBackend;
    use crate::backend::PollConfig;
    use crate::config::Settings;
    use crate::logging::{LogConfig, RunLogger};
    use crate::models::ArtifactOrigin;

    fn test_ctx(dir: &std::path::Path) -> RunContext {
        let logger = Arc::new(RunLogger::new("stage_test", dir, LogConfig::default(), None).unwrap());
        RunContext::new("stage_test", Settings::default(), logger)
    }

    #[tokio::test]
    async fn stage_runs_to_completion() {
        let dir = tempdir().unwrap();
        let backend = ScriptedBackend::new();
        backend.script_stage_success(StageKind::Alignment, 2, "aligned_mafft.fasta");
        let client = JobClient::new(
            backend.clone(),
            PollConfig {
                interval: Duration::from_millis(1),
                timeout: None,
            },
        );

        let ctx = test_ctx(dir.path());
        let input = ArtifactRef::new("input.fasta", ArtifactOrigin::Merged);
        let runner = StageRunner::new(&client);
        let cancel = CancelHandle::new();

        let artifact = runner
            .run(&ctx, StageKind::Alignment, &input, &cancel)
            .await
            .unwrap();

        assert_eq!(artifact.name(), "aligned_mafft.fasta");
        assert_eq!(backend.start_calls(StageKind::Alignment), 1);
    }

    #[tokio::test]
    async fn failed_job_is_not_retried() {
        let dir = tempdir().unwrap();
        let backend = ScriptedBackend::new();
        backend.script_stage_error(StageKind::Filtering, 0, "empty alignment");
        let client = JobClient::new(
            backend.clone(),
            PollConfig {
                interval: Duration::from_millis(1),
                timeout: None,
            },
        );

        let ctx = test_ctx(dir.path());
        let input = ArtifactRef::new("aligned.fasta", ArtifactOrigin::Stage(StageKind::Alignment));
        let runner = StageRunner::new(&client);
        let cancel = CancelHandle::new();

        let err = runner
            .run(&ctx, StageKind::Filtering, &input, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::JobFailed { .. }));
        assert_eq!(backend.start_calls(StageKind::Filtering), 1);
    }
}
