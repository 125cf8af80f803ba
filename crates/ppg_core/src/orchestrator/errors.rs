//! Error types for the pipeline orchestrator.
//!
//! Errors carry context that chains through layers:
//! Run → Stage → Request → Detail

use thiserror::Error;

use crate::backend::BackendError;
use crate::dataset::DatasetError;
use crate::models::StageKind;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage failed; no later stage was submitted.
    #[error("Run '{run_name}' failed at stage '{stage}': {source}")]
    StageFailed {
        run_name: String,
        stage: StageKind,
        #[source]
        source: StageError,
    },

    /// No usable input dataset could be built before stage 0.
    #[error("Run '{run_name}' could not build an input dataset: {source}")]
    PreparationFailed {
        run_name: String,
        #[source]
        source: DatasetError,
    },

    /// A newer run superseded this one. Not a user-visible failure;
    /// callers discard the run silently.
    #[error("Run '{run_name}' was cancelled")]
    Cancelled { run_name: String },
}

impl PipelineError {
    /// Create a stage failed error.
    pub fn stage_failed(
        run_name: impl Into<String>,
        stage: StageKind,
        source: StageError,
    ) -> Self {
        Self::StageFailed {
            run_name: run_name.into(),
            stage,
            source,
        }
    }

    /// Create a preparation failed error.
    pub fn preparation_failed(run_name: impl Into<String>, source: DatasetError) -> Self {
        Self::PreparationFailed {
            run_name: run_name.into(),
            source,
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(run_name: impl Into<String>) -> Self {
        Self::Cancelled {
            run_name: run_name.into(),
        }
    }

    /// Whether this error is a silent supersession rather than a
    /// failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Error from a single stage execution.
#[derive(Error, Debug)]
pub enum StageError {
    /// The start request failed at the transport or HTTP-status level.
    #[error("{stage} start request failed: {source}")]
    Submission {
        stage: StageKind,
        #[source]
        source: BackendError,
    },

    /// A status request failed at the transport or HTTP-status level.
    #[error("{stage} status request failed: {source}")]
    Poll {
        stage: StageKind,
        #[source]
        source: BackendError,
    },

    /// The backend reported the job as errored. The message is the
    /// backend's, surfaced verbatim.
    #[error("{stage} error: {message}")]
    JobFailed { stage: StageKind, message: String },

    /// The configured poll deadline expired before a terminal status.
    #[error("{stage} did not finish within {elapsed_secs}s")]
    Timeout {
        stage: StageKind,
        elapsed_secs: u64,
    },

    /// The backend reported `finished` without an output artifact.
    #[error("{stage} finished without an output artifact")]
    MissingArtifact { stage: StageKind },

    /// The input artifact was unusable.
    #[error("invalid input for {stage}: {message}")]
    InvalidInput { stage: StageKind, message: String },

    /// The run was superseded while this stage was in flight.
    #[error("{stage} was cancelled")]
    Cancelled { stage: StageKind },
}

impl StageError {
    /// Create a submission error.
    pub fn submission(stage: StageKind, source: BackendError) -> Self {
        Self::Submission { stage, source }
    }

    /// Create a poll error.
    pub fn poll(stage: StageKind, source: BackendError) -> Self {
        Self::Poll { stage, source }
    }

    /// Create a job failed error.
    pub fn job_failed(stage: StageKind, message: impl Into<String>) -> Self {
        Self::JobFailed {
            stage,
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(stage: StageKind, elapsed: std::time::Duration) -> Self {
        Self::Timeout {
            stage,
            elapsed_secs: elapsed.as_secs(),
        }
    }

    /// Create a missing artifact error.
    pub fn missing_artifact(stage: StageKind) -> Self {
        Self::MissingArtifact { stage }
    }

    /// Create an invalid input error.
    pub fn invalid_input(stage: StageKind, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            stage,
            message: message.into(),
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(stage: StageKind) -> Self {
        Self::Cancelled { stage }
    }

    /// The stage this error belongs to.
    pub fn stage(&self) -> StageKind {
        match self {
            Self::Submission { stage, .. }
            | Self::Poll { stage, .. }
            | Self::JobFailed { stage, .. }
            | Self::Timeout { stage, .. }
            | Self::MissingArtifact { stage }
            | Self::InvalidInput { stage, .. }
            | Self::Cancelled { stage } => *stage,
        }
    }

    /// Whether this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type for stage operations.
pub type StageResult<T> = Result<T, StageError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
