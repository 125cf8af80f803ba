//! Pipeline orchestrator for coordinating remote analysis runs.
//!
//! This module drives a sequence dataset through an ordered chain of
//! long-running backend jobs, carrying each stage's output artifact
//! into the next stage and reporting step-level progress.
//!
//! # Architecture
//!
//! ```text
//! PipelineSession
//!     └── Pipeline (one variant)
//!         ├── Stage: Alignment            (MAFFT)
//!         ├── Stage: Filtering            (BMGE, optional)
//!         ├── Stage: TreeBuilding         (IQTREE)
//!         └── Stage: DistanceCalculation  (NW Distance)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ppg_core::orchestrator::{PipelineSession, RunRequest, ProgressTracker};
//! use ppg_core::models::PipelineVariant;
//!
//! let session = PipelineSession::new(settings, backend, ".logs");
//! let tracker = ProgressTracker::new();
//!
//! let handle = session.start_run(
//!     RunRequest {
//!         run_name: "insulin_9606".into(),
//!         variant: PipelineVariant::WithFiltering,
//!         input,
//!     },
//!     None,
//!     Some(tracker.callback()),
//! )?;
//!
//! let summary = handle.wait().await;
//! println!("Succeeded: {}", summary.success);
//! ```

pub mod errors;
mod pipeline;
mod progress;
mod session;
mod stage;
mod types;

pub use errors::{PipelineError, PipelineResult, StageError, StageResult};
pub use pipeline::{CancelHandle, Pipeline};
pub use progress::ProgressTracker;
pub use session::{PipelineSession, RunHandle, RunRequest, RunSummary};
pub use stage::StageRunner;
pub use types::{PipelineRun, ProgressCallback, ProgressEvent, RunContext};

use crate::models::PipelineVariant;

/// Create a pipeline from the "include filtering" flag.
///
/// With filtering disabled the sequence is exactly
/// Alignment -> TreeBuilding -> DistanceCalculation; with it enabled,
/// Filtering runs between Alignment and TreeBuilding.
pub fn create_pipeline(run_filtering: bool) -> Pipeline {
    Pipeline::new(PipelineVariant::from_filtering_flag(run_filtering))
}
