//! Dataset preparation - builds the stage-0 input artifact.

use std::sync::Arc;

use thiserror::Error;

use crate::backend::{BackendError, JobBackend};
use crate::models::{timestamped_fasta_name, ArtifactOrigin, ArtifactRef};

use super::types::{SelectionCriteria, SequenceRecord, UniprotQuery};

/// Errors from building the initial dataset artifact.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// No source is enabled, or the given artifact reference is unusable.
    #[error("no sequence source produced an input dataset")]
    NoData,

    #[error("UniProt FASTA creation failed: {0}")]
    UniprotFailed(#[source] BackendError),

    #[error("NCBI FASTA creation failed: {0}")]
    NcbiFailed(#[source] BackendError),

    #[error("merging source FASTA files failed: {0}")]
    MergeFailed(#[source] BackendError),

    #[error("branch length FASTA creation failed: {0}")]
    BranchLengthFailed(#[source] BackendError),
}

/// Where a run's initial artifact comes from.
#[derive(Debug, Clone)]
pub enum DatasetInput {
    /// Build from the enabled database sources.
    Selection {
        criteria: SelectionCriteria,
        /// Records feeding the NCBI source (user-curated selection or a
        /// parsed custom upload).
        records: Vec<SequenceRecord>,
    },
    /// Rebuild from a prior run's FASTA and its distance file.
    BranchLength {
        original_fasta: ArtifactRef,
        distance_file: ArtifactRef,
    },
    /// Reuse an artifact that already exists on the backend.
    Existing(ArtifactRef),
}

/// Builds the initial artifact consumed by the first pipeline stage.
///
/// The actual sequence-set construction and merging run on the backend;
/// this side owns the call order (UniProt before NCBI, merge last),
/// fail-fast on either source, and the merge input pairing.
pub struct DatasetPreparer {
    backend: Arc<dyn JobBackend>,
}

impl DatasetPreparer {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self { backend }
    }

    /// Produce the stage-0 artifact for the given input kind.
    pub async fn prepare(&self, input: &DatasetInput) -> Result<ArtifactRef, DatasetError> {
        match input {
            DatasetInput::Selection { criteria, records } => {
                self.prepare_from_selection(criteria, records).await
            }
            DatasetInput::BranchLength {
                original_fasta,
                distance_file,
            } => self.create_branch_length_fasta(original_fasta, distance_file).await,
            DatasetInput::Existing(artifact) => {
                if artifact.is_empty() {
                    return Err(DatasetError::NoData);
                }
                Ok(artifact.clone())
            }
        }
    }

    /// Build from the enabled sources, merging when both produce a file.
    async fn prepare_from_selection(
        &self,
        criteria: &SelectionCriteria,
        records: &[SequenceRecord],
    ) -> Result<ArtifactRef, DatasetError> {
        let mut uniprot_file = None;
        if criteria.use_uniprot {
            let query = UniprotQuery::from_criteria(criteria);
            let fasta_file = timestamped_fasta_name("Uniprot");
            let file = self
                .backend
                .create_uniprot_fasta(&query, &fasta_file)
                .await
                .map_err(DatasetError::UniprotFailed)?;
            uniprot_file = Some(file);
        }

        let mut ncbi_file = None;
        if criteria.use_ncbi {
            let fasta_file = timestamped_fasta_name("NCBI");
            let file = self
                .backend
                .create_ncbi_fasta(records, &fasta_file)
                .await
                .map_err(DatasetError::NcbiFailed)?;
            ncbi_file = Some(file);
        }

        match (uniprot_file, ncbi_file) {
            (Some(uniprot), Some(ncbi)) => {
                tracing::info!("Merging UniProt file {} and NCBI file {}", uniprot, ncbi);
                let merged_name = timestamped_fasta_name("Merged");
                let file = self
                    .backend
                    .merge_source_fastas(&uniprot, &ncbi, &merged_name)
                    .await
                    .map_err(DatasetError::MergeFailed)?;
                Ok(ArtifactRef::new(file, ArtifactOrigin::Merged))
            }
            (Some(uniprot), None) => Ok(ArtifactRef::new(uniprot, ArtifactOrigin::Uniprot)),
            (None, Some(ncbi)) => Ok(ArtifactRef::new(ncbi, ArtifactOrigin::Ncbi)),
            (None, None) => Err(DatasetError::NoData),
        }
    }

    /// Rebuild a FASTA from a completed run's branch lengths.
    ///
    /// Also usable standalone (outside a run) to export the rebuilt
    /// file for download.
    pub async fn create_branch_length_fasta(
        &self,
        original_fasta: &ArtifactRef,
        distance_file: &ArtifactRef,
    ) -> Result<ArtifactRef, DatasetError> {
        let bl_name = timestamped_fasta_name("bl");
        let file = self
            .backend
            .create_branch_length_fasta(original_fasta.name(), distance_file.name(), &bl_name)
            .await
            .map_err(DatasetError::BranchLengthFailed)?;
        Ok(ArtifactRef::new(file, ArtifactOrigin::BranchLength))
    }
}
