//! Core types for the pipeline orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::RunLogger;
use crate::models::{ArtifactRef, PipelineVariant, RunOutcome, StageKind};

/// Progress callback type for reporting pipeline progress.
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// One progress notification from a run.
///
/// Emitted when a stage is entered (before its job is submitted) and
/// once more when the whole sequence has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Zero-based stage index; equals `total` on the completion event.
    pub index: usize,
    /// Number of stages in the run.
    pub total: usize,
    /// Stage label; empty on the completion event.
    pub label: String,
}

impl ProgressEvent {
    /// Event for entering a stage.
    pub fn stage(index: usize, total: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            total,
            label: label.into(),
        }
    }

    /// Final event after the last stage succeeded.
    pub fn complete(total: usize) -> Self {
        Self {
            index: total,
            total,
            label: String::new(),
        }
    }

    /// Whether this is the completion event.
    pub fn is_complete(&self) -> bool {
        self.index >= self.total
    }
}

/// Read-only context passed through a pipeline run.
///
/// Contains run configuration and shared sinks that stages can use but
/// not modify. Mutable state goes in `PipelineRun`.
pub struct RunContext {
    /// Run name (used for logging and error context).
    pub run_name: String,
    /// Application settings.
    pub settings: Settings,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl RunContext {
    /// Create a new context for a run.
    pub fn new(run_name: impl Into<String>, settings: Settings, logger: Arc<RunLogger>) -> Self {
        Self {
            run_name: run_name.into(),
            settings,
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to the callback (if set).
    pub fn report_progress(&self, event: &ProgressEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}

/// Mutable run record that accumulates results from pipeline stages.
///
/// The orchestrator is the sole writer; stages never touch this
/// directly. One record exists per run and is discarded with it -
/// nothing here is shared between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Unique run identifier.
    pub run_id: String,
    /// Stage sequence variant, fixed for the duration of the run.
    pub variant: PipelineVariant,
    /// When the run started.
    pub started_at: Option<String>,
    /// Index of the stage currently (or last) running. Only advances.
    pub current_stage_index: usize,
    /// The stage-0 input artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_artifact: Option<ArtifactRef>,
    /// Output artifact of each completed stage.
    pub artifacts: HashMap<StageKind, ArtifactRef>,
    /// Aggregate outcome; transitions out of `InProgress` exactly once.
    pub outcome: RunOutcome,
    /// Failure message, present when the outcome is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineRun {
    /// Create a new in-progress run record.
    pub fn new(run_id: impl Into<String>, variant: PipelineVariant) -> Self {
        Self {
            run_id: run_id.into(),
            variant,
            started_at: Some(chrono::Local::now().to_rfc3339()),
            current_stage_index: 0,
            initial_artifact: None,
            artifacts: HashMap::new(),
            outcome: RunOutcome::InProgress,
            error: None,
        }
    }

    /// The run's ordered stage list.
    pub fn stages(&self) -> &'static [StageKind] {
        self.variant.stages()
    }

    /// Output artifact of a stage, if it completed.
    pub fn artifact_for(&self, stage: StageKind) -> Option<&ArtifactRef> {
        self.artifacts.get(&stage)
    }

    /// Output of the last stage, if the run got that far.
    pub fn final_artifact(&self) -> Option<&ArtifactRef> {
        self.stages()
            .last()
            .and_then(|stage| self.artifacts.get(stage))
    }

    /// Record a completed stage's output.
    pub fn record_artifact(&mut self, stage: StageKind, artifact: ArtifactRef) {
        self.artifacts.insert(stage, artifact);
    }

    /// Mark the run failed with the given message. No-op once terminal.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        if self.outcome.is_terminal() {
            return;
        }
        self.outcome = RunOutcome::Failed;
        self.error = Some(message.into());
    }

    /// Mark the run succeeded. No-op once terminal.
    pub fn mark_succeeded(&mut self) {
        if self.outcome.is_terminal() {
            return;
        }
        self.outcome = RunOutcome::Succeeded;
    }

    /// Whether the run has reached a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArtifactOrigin;

    #[test]
    fn run_records_artifacts_per_stage() {
        let mut run = PipelineRun::new("run-1", PipelineVariant::WithoutFiltering);
        assert!(run.artifact_for(StageKind::Alignment).is_none());

        run.record_artifact(
            StageKind::Alignment,
            ArtifactRef::new("aligned.fasta", ArtifactOrigin::Stage(StageKind::Alignment)),
        );

        assert_eq!(
            run.artifact_for(StageKind::Alignment).unwrap().name(),
            "aligned.fasta"
        );
    }

    #[test]
    fn outcome_transitions_once() {
        let mut run = PipelineRun::new("run-2", PipelineVariant::WithFiltering);
        run.mark_failed("first failure");
        run.mark_succeeded();
        run.mark_failed("second failure");

        assert_eq!(run.outcome, RunOutcome::Failed);
        assert_eq!(run.error.as_deref(), Some("first failure"));
    }

    #[test]
    fn final_artifact_is_last_stage_output() {
        let mut run = PipelineRun::new("run-3", PipelineVariant::WithoutFiltering);
        run.record_artifact(
            StageKind::DistanceCalculation,
            ArtifactRef::new(
                "distances_nwd.tsv",
                ArtifactOrigin::Stage(StageKind::DistanceCalculation),
            ),
        );
        assert_eq!(run.final_artifact().unwrap().name(), "distances_nwd.tsv");
    }

    #[test]
    fn run_serializes() {
        let run = PipelineRun::new("run-4", PipelineVariant::WithoutFiltering);
        let json = serde_json::to_string(&run).unwrap();
        assert!(json.contains("\"run_id\":\"run-4\""));
    }

    #[test]
    fn completion_event_has_empty_label() {
        let event = ProgressEvent::complete(3);
        assert_eq!(event.index, 3);
        assert!(event.label.is_empty());
        assert!(event.is_complete());
        assert!(!ProgressEvent::stage(0, 3, "x").is_complete());
    }
}
