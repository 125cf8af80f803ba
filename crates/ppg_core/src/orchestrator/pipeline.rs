//! Pipeline runner that executes stages in sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::JobClient;
use crate::models::{ArtifactRef, PipelineVariant};

use super::errors::{PipelineError, PipelineResult};
use super::stage::StageRunner;
use super::types::{PipelineRun, ProgressEvent, RunContext};

/// Pipeline that runs a variant's stage sequence in order.
///
/// Each stage's output artifact becomes the next stage's input. A
/// progress event is emitted before each submission, and one final
/// completion event after the last stage. On a stage failure the run
/// is marked failed and no later stage is submitted.
pub struct Pipeline {
    /// Stage sequence variant, fixed at construction.
    variant: PipelineVariant,
    /// Cancellation flag shared with handles.
    cancelled: Arc<AtomicBool>,
}

impl Pipeline {
    /// Create a pipeline for the given variant.
    pub fn new(variant: PipelineVariant) -> Self {
        Self {
            variant,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The pipeline's variant.
    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    /// Number of stages this pipeline will run.
    pub fn stage_count(&self) -> usize {
        self.variant.stage_count()
    }

    /// Get a cancellation handle.
    ///
    /// Call `cancel()` on the returned handle to stop the run: polling
    /// stops at the next boundary and no further state mutation or
    /// progress emission happens.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    /// Check if the pipeline has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run the stage sequence against the given initial artifact.
    ///
    /// `run` is the single-writer run record; on success it holds one
    /// artifact per stage and a `Succeeded` outcome. A cancelled run
    /// returns `PipelineError::Cancelled` with the record left
    /// untouched past the last completed mutation.
    pub async fn run(
        &self,
        ctx: &RunContext,
        client: &JobClient,
        run: &mut PipelineRun,
        initial: ArtifactRef,
    ) -> PipelineResult<()> {
        let cancel = self.cancel_handle();
        let stages = self.variant.stages();
        let total = stages.len();

        if cancel.is_cancelled() {
            return Err(PipelineError::cancelled(&ctx.run_name));
        }
        run.initial_artifact = Some(initial.clone());

        let mut input = initial;
        for (i, stage) in stages.iter().copied().enumerate() {
            if cancel.is_cancelled() {
                ctx.logger
                    .warn(&format!("Run cancelled before stage '{}'", stage));
                return Err(PipelineError::cancelled(&ctx.run_name));
            }

            ctx.logger.phase(stage.label());
            ctx.report_progress(&ProgressEvent::stage(i, total, stage.label()));
            run.current_stage_index = i;

            let runner = StageRunner::new(client);
            match runner.run(ctx, stage, &input, &cancel).await {
                Ok(artifact) => {
                    if cancel.is_cancelled() {
                        return Err(PipelineError::cancelled(&ctx.run_name));
                    }
                    run.record_artifact(stage, artifact.clone());
                    input = artifact;
                }
                Err(e) if e.is_cancelled() => {
                    return Err(PipelineError::cancelled(&ctx.run_name));
                }
                Err(e) => {
                    ctx.logger.error(&e.to_string());
                    ctx.logger.show_tail("error");
                    run.mark_failed(e.to_string());
                    return Err(PipelineError::stage_failed(&ctx.run_name, stage, e));
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(PipelineError::cancelled(&ctx.run_name));
        }
        ctx.report_progress(&ProgressEvent::complete(total));
        run.mark_succeeded();
        ctx.logger.success("Pipeline completed successfully");
        Ok(())
    }
}

/// Handle for cancelling a running pipeline.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// A standalone handle, not yet tied to a pipeline.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel the run. Polling stops at the next boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
