//! Pipeline session - owns the run lifecycle for one front-end session.
//!
//! A session runs at most one pipeline at a time. Starting a new run
//! cancels any in-flight one first, so a late poll result from the old
//! run can never overwrite the new run's state. The caller gets back a
//! `RunHandle` it can await, query, or cancel - orchestration is not
//! tied to any particular presentation layer.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::backend::{JobBackend, JobClient, PollConfig};
use crate::config::Settings;
use crate::dataset::{DatasetInput, DatasetPreparer};
use crate::logging::{GuiLogCallback, LogConfig, RunLogger};
use crate::models::PipelineVariant;

use super::errors::PipelineError;
use super::pipeline::{CancelHandle, Pipeline};
use super::types::{PipelineRun, ProgressCallback, RunContext};

/// Request to start a pipeline run.
pub struct RunRequest {
    /// Display name; also names the run log file.
    pub run_name: String,
    /// Which stage sequence to run.
    pub variant: PipelineVariant,
    /// Where the stage-0 artifact comes from.
    pub input: DatasetInput,
}

/// Final report of a run.
#[derive(Debug)]
pub struct RunSummary {
    /// Run identifier.
    pub run_id: String,
    /// Whether the run succeeded.
    pub success: bool,
    /// True when the run was superseded by a newer one. Not a
    /// user-visible failure; callers discard the run silently.
    pub cancelled: bool,
    /// Final run record (artifacts per stage, outcome, error). `None`
    /// only if the task died before producing one.
    pub run: Option<PipelineRun>,
    /// Error message (if failed).
    pub error: Option<String>,
}

impl RunSummary {
    /// Create a successful summary.
    fn succeeded(run: PipelineRun) -> Self {
        Self {
            run_id: run.run_id.clone(),
            success: true,
            cancelled: false,
            run: Some(run),
            error: None,
        }
    }

    /// Create a failed summary.
    fn failed(run: PipelineRun, error: impl Into<String>) -> Self {
        Self {
            run_id: run.run_id.clone(),
            success: false,
            cancelled: false,
            run: Some(run),
            error: Some(error.into()),
        }
    }

    /// Create a superseded summary.
    fn superseded(run_id: String, run: Option<PipelineRun>) -> Self {
        Self {
            run_id,
            success: false,
            cancelled: true,
            run,
            error: None,
        }
    }
}

/// Handle to an in-flight (or finished) run.
pub struct RunHandle {
    run_id: String,
    cancel: CancelHandle,
    task: JoinHandle<RunSummary>,
}

impl RunHandle {
    /// The run identifier.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Request cancellation; the run stops at its next boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the run to finish and return its summary.
    pub async fn wait(self) -> RunSummary {
        let run_id = self.run_id;
        match self.task.await {
            Ok(summary) => summary,
            Err(e) if e.is_cancelled() => RunSummary::superseded(run_id, None),
            Err(e) => RunSummary {
                run_id,
                success: false,
                cancelled: false,
                run: None,
                error: Some(format!("run task failed: {}", e)),
            },
        }
    }
}

struct ActiveRun {
    run_id: String,
    cancel: CancelHandle,
}

/// Runs pipelines for one session, superseding as needed.
pub struct PipelineSession {
    /// Application settings.
    settings: Settings,
    /// Job backend shared by all runs of this session.
    backend: Arc<dyn JobBackend>,
    /// Directory for run log files.
    log_dir: PathBuf,
    /// Polling behavior passed to each run's job client.
    poll: PollConfig,
    /// The in-flight run, if any.
    active: Mutex<Option<ActiveRun>>,
}

impl PipelineSession {
    /// Create a session.
    pub fn new(settings: Settings, backend: Arc<dyn JobBackend>, log_dir: impl Into<PathBuf>) -> Self {
        let poll = PollConfig::from_settings(&settings.api);
        Self {
            settings,
            backend,
            log_dir: log_dir.into(),
            poll,
            active: Mutex::new(None),
        }
    }

    /// Override the polling behavior (mainly for tests and tools).
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Identifier of the in-flight run, if any.
    pub fn active_run_id(&self) -> Option<String> {
        self.active.lock().as_ref().map(|run| run.run_id.clone())
    }

    /// Cancel the in-flight run, if any. Returns whether there was one.
    pub fn cancel_active(&self) -> bool {
        match self.active.lock().take() {
            Some(previous) => {
                tracing::info!("Cancelling run {}", previous.run_id);
                previous.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Start a run, superseding any in-flight one.
    ///
    /// Returns a handle the caller can await, query, or cancel. Errors
    /// only if the run logger cannot be created.
    pub fn start_run(
        &self,
        request: RunRequest,
        gui_callback: Option<GuiLogCallback>,
        progress_callback: Option<ProgressCallback>,
    ) -> std::io::Result<RunHandle> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let pipeline = Pipeline::new(request.variant);
        let cancel = pipeline.cancel_handle();

        let logger = Arc::new(RunLogger::new(
            &request.run_name,
            &self.log_dir,
            LogConfig::from_settings(&self.settings.logging),
            gui_callback,
        )?);

        // Supersede before the new run touches any shared sink.
        {
            let mut active = self.active.lock();
            if let Some(previous) = active.take() {
                tracing::info!(
                    "Superseding in-flight run {} with {}",
                    previous.run_id,
                    run_id
                );
                previous.cancel.cancel();
            }
            *active = Some(ActiveRun {
                run_id: run_id.clone(),
                cancel: cancel.clone(),
            });
        }

        let mut ctx = RunContext::new(&request.run_name, self.settings.clone(), logger);
        if let Some(callback) = progress_callback {
            ctx = ctx.with_progress_callback(callback);
        }

        let client = JobClient::new(Arc::clone(&self.backend), self.poll.clone());
        let preparer = DatasetPreparer::new(Arc::clone(&self.backend));
        let variant = request.variant;
        let input = request.input;
        let task_run_id = run_id.clone();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut run = PipelineRun::new(task_run_id.clone(), variant);
            ctx.logger
                .section(&format!("Run {} ({})", ctx.run_name, variant));

            if task_cancel.is_cancelled() {
                return RunSummary::superseded(task_run_id, None);
            }

            let initial = match preparer.prepare(&input).await {
                Ok(artifact) => artifact,
                Err(e) => {
                    if task_cancel.is_cancelled() {
                        return RunSummary::superseded(task_run_id, None);
                    }
                    let err = PipelineError::preparation_failed(&ctx.run_name, e);
                    ctx.logger.error(&err.to_string());
                    run.mark_failed(err.to_string());
                    return RunSummary::failed(run, err.to_string());
                }
            };
            if task_cancel.is_cancelled() {
                return RunSummary::superseded(task_run_id, None);
            }
            ctx.logger
                .info(&format!("Initial dataset artifact: {}", initial.name()));

            match pipeline.run(&ctx, &client, &mut run, initial).await {
                Ok(()) => RunSummary::succeeded(run),
                Err(e) if e.is_cancelled() => RunSummary::superseded(task_run_id, Some(run)),
                Err(e) => RunSummary::failed(run, e.to_string()),
            }
        });

        Ok(RunHandle {
            run_id,
            cancel,
            task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tempfile::tempdir;

    use crate::backend::testing::ScriptedBackend;
    use crate::dataset::SelectionCriteria;
    use crate::models::{ArtifactOrigin, ArtifactRef, StageKind};
    use crate::orchestrator::progress::ProgressTracker;

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(1),
            timeout: None,
        }
    }

    fn existing_input(name: &str) -> DatasetInput {
        DatasetInput::Existing(ArtifactRef::new(name, ArtifactOrigin::Merged))
    }

    #[tokio::test]
    async fn run_completes_and_reports_artifacts() {
        let dir = tempdir().unwrap();
        let backend = ScriptedBackend::new();
        let session = PipelineSession::new(Settings::default(), backend.clone(), dir.path())
            .with_poll_config(fast_poll());

        let handle = session
            .start_run(
                RunRequest {
                    run_name: "insulin_run".to_string(),
                    variant: PipelineVariant::WithoutFiltering,
                    input: existing_input("input.fasta"),
                },
                None,
                None,
            )
            .unwrap();

        let summary = handle.wait().await;
        assert!(summary.success);
        assert!(!summary.cancelled);
        let run = summary.run.unwrap();
        assert_eq!(run.artifacts.len(), 3);
        assert_eq!(backend.start_calls(StageKind::Filtering), 0);
    }

    #[tokio::test]
    async fn failed_preparation_reports_no_data() {
        let dir = tempdir().unwrap();
        let backend = ScriptedBackend::new();
        let session = PipelineSession::new(Settings::default(), backend.clone(), dir.path())
            .with_poll_config(fast_poll());

        let mut criteria = SelectionCriteria::new("insulin", "9606");
        criteria.use_uniprot = false;
        criteria.use_ncbi = false;

        let handle = session
            .start_run(
                RunRequest {
                    run_name: "empty_run".to_string(),
                    variant: PipelineVariant::WithoutFiltering,
                    input: DatasetInput::Selection {
                        criteria,
                        records: Vec::new(),
                    },
                },
                None,
                None,
            )
            .unwrap();

        let summary = handle.wait().await;
        assert!(!summary.success);
        assert!(!summary.cancelled);
        assert!(summary.error.unwrap().contains("no sequence source"));
        // Nothing was ever submitted.
        assert_eq!(backend.start_calls(StageKind::Alignment), 0);
    }

    #[tokio::test]
    async fn new_run_supersedes_previous() {
        let dir = tempdir().unwrap();
        let backend = ScriptedBackend::new();
        // Run A's alignment job stays pending indefinitely.
        backend.script_stage_success(StageKind::Alignment, 100_000, "a_mafft.fasta");
        let session = PipelineSession::new(Settings::default(), backend.clone(), dir.path())
            .with_poll_config(PollConfig {
                interval: Duration::from_millis(5),
                timeout: None,
            });

        let tracker_a = ProgressTracker::new();
        let handle_a = session
            .start_run(
                RunRequest {
                    run_name: "run_a".to_string(),
                    variant: PipelineVariant::WithoutFiltering,
                    input: existing_input("a.fasta"),
                },
                None,
                Some(tracker_a.callback()),
            )
            .unwrap();
        let run_a_id = handle_a.run_id().to_string();

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(session.active_run_id().as_deref(), Some(run_a_id.as_str()));

        // Jobs submitted from here on finish promptly.
        backend.script_stage_success(StageKind::Alignment, 1, "b_mafft.fasta");

        let tracker_b = ProgressTracker::new();
        let handle_b = session
            .start_run(
                RunRequest {
                    run_name: "run_b".to_string(),
                    variant: PipelineVariant::WithoutFiltering,
                    input: existing_input("b.fasta"),
                },
                None,
                Some(tracker_b.callback()),
            )
            .unwrap();

        let summary_a = handle_a.wait().await;
        assert!(summary_a.cancelled);
        assert!(!summary_a.success);
        assert!(summary_a.error.is_none());

        let summary_b = handle_b.wait().await;
        assert!(summary_b.success);
        assert_eq!(summary_b.run.unwrap().artifacts.len(), 3);

        // Run A's progress froze at its first stage and never completed.
        let history_a = tracker_a.history();
        assert_eq!(history_a.len(), 1);
        assert_eq!(history_a[0].index, 0);
        assert!(!tracker_a.is_complete());
        assert!(tracker_b.is_complete());
    }

    #[tokio::test]
    async fn cancel_active_stops_run() {
        let dir = tempdir().unwrap();
        let backend = ScriptedBackend::new();
        backend.script_stage_success(StageKind::Alignment, 100_000, "never.fasta");
        let session = PipelineSession::new(Settings::default(), backend.clone(), dir.path())
            .with_poll_config(fast_poll());

        let handle = session
            .start_run(
                RunRequest {
                    run_name: "doomed".to_string(),
                    variant: PipelineVariant::WithoutFiltering,
                    input: existing_input("x.fasta"),
                },
                None,
                None,
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(session.cancel_active());
        assert!(session.active_run_id().is_none());

        let summary = handle.wait().await;
        assert!(summary.cancelled);
        // A cancelled run never marks its record failed.
        if let Some(run) = summary.run {
            assert!(!run.is_terminal());
        }
    }
}
