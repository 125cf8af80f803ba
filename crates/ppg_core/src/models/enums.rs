//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// One remote long-running operation in the analysis pipeline.
///
/// Each stage maps to a `{prefix}_start` / `{prefix}_status` endpoint
/// pair on the job backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Multiple sequence alignment (MAFFT).
    Alignment,
    /// Alignment column filtering (BMGE).
    Filtering,
    /// Phylogenetic tree inference (IQTREE).
    TreeBuilding,
    /// Branch length / distance extraction from the tree (NW Distance).
    DistanceCalculation,
}

impl StageKind {
    /// Get the display name of the backing tool.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Alignment => "MAFFT",
            Self::Filtering => "BMGE",
            Self::TreeBuilding => "IQTREE",
            Self::DistanceCalculation => "NW Distance",
        }
    }

    /// Get the endpoint prefix for this stage's start/status routes.
    pub fn endpoint_prefix(&self) -> &'static str {
        match self {
            Self::Alignment => "mafft",
            Self::Filtering => "bmge",
            Self::TreeBuilding => "iqtree",
            Self::DistanceCalculation => "nw_distance",
        }
    }

    /// JSON key carrying the input artifact in the start request body.
    ///
    /// The distance stage consumes a tree file; every other stage
    /// consumes a FASTA file.
    pub fn start_body_key(&self) -> &'static str {
        match self {
            Self::DistanceCalculation => "treefile",
            _ => "fasta_file",
        }
    }

    /// Progress label shown while this stage is running.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alignment => "Running MAFFT alignment",
            Self::Filtering => "Filtering with BMGE",
            Self::TreeBuilding => "Building tree with IQTREE",
            Self::DistanceCalculation => "Calculating distances",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Pipeline variant selecting one of the two fixed stage sequences.
///
/// The stage list is decided once when a run starts and never changes
/// for the duration of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    /// Alignment -> TreeBuilding -> DistanceCalculation.
    #[default]
    WithoutFiltering,
    /// Alignment -> Filtering -> TreeBuilding -> DistanceCalculation.
    WithFiltering,
}

impl PipelineVariant {
    /// Get the ordered stage list for this variant.
    pub fn stages(&self) -> &'static [StageKind] {
        match self {
            Self::WithoutFiltering => &[
                StageKind::Alignment,
                StageKind::TreeBuilding,
                StageKind::DistanceCalculation,
            ],
            Self::WithFiltering => &[
                StageKind::Alignment,
                StageKind::Filtering,
                StageKind::TreeBuilding,
                StageKind::DistanceCalculation,
            ],
        }
    }

    /// Select a variant from the "include filtering" flag.
    pub fn from_filtering_flag(run_filtering: bool) -> Self {
        if run_filtering {
            Self::WithFiltering
        } else {
            Self::WithoutFiltering
        }
    }

    /// Whether the filtering stage is part of this variant.
    pub fn includes_filtering(&self) -> bool {
        matches!(self, Self::WithFiltering)
    }

    /// Number of stages in this variant.
    pub fn stage_count(&self) -> usize {
        self.stages().len()
    }
}

impl std::fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WithoutFiltering => write!(f, "without filtering"),
            Self::WithFiltering => write!(f, "with filtering"),
        }
    }
}

/// Aggregate outcome of a pipeline run.
///
/// Transitions `InProgress -> Succeeded` or `InProgress -> Failed`
/// exactly once; both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    #[default]
    InProgress,
    Succeeded,
    Failed,
}

impl RunOutcome {
    /// Whether the run has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_kind_serializes_snake_case() {
        let json = serde_json::to_string(&StageKind::TreeBuilding).unwrap();
        assert_eq!(json, "\"tree_building\"");
    }

    #[test]
    fn distance_stage_uses_treefile_key() {
        assert_eq!(StageKind::DistanceCalculation.start_body_key(), "treefile");
        assert_eq!(StageKind::Alignment.start_body_key(), "fasta_file");
        assert_eq!(StageKind::Filtering.start_body_key(), "fasta_file");
    }

    #[test]
    fn variant_without_filtering_has_three_stages() {
        let stages = PipelineVariant::WithoutFiltering.stages();
        assert_eq!(stages.len(), 3);
        assert!(!stages.contains(&StageKind::Filtering));
    }

    #[test]
    fn variant_with_filtering_runs_filtering_after_alignment() {
        let stages = PipelineVariant::WithFiltering.stages();
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[0], StageKind::Alignment);
        assert_eq!(stages[1], StageKind::Filtering);
    }

    #[test]
    fn variant_from_flag() {
        assert!(PipelineVariant::from_filtering_flag(true).includes_filtering());
        assert!(!PipelineVariant::from_filtering_flag(false).includes_filtering());
    }

    #[test]
    fn outcome_terminal_states() {
        assert!(!RunOutcome::InProgress.is_terminal());
        assert!(RunOutcome::Succeeded.is_terminal());
        assert!(RunOutcome::Failed.is_terminal());
    }
}
