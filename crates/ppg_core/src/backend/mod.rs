//! Remote job backend access.
//!
//! The backend runs the actual bioinformatics tools; this side only
//! submits work and polls for status. This module provides:
//! - Wire types for the start/status/create endpoints
//! - The `JobBackend` trait (the seam tests mock)
//! - `HttpBackend`, the reqwest implementation
//! - `JobClient`, the submit / poll-until-terminal policy layer

use async_trait::async_trait;
use thiserror::Error;

use crate::dataset::{SequenceRecord, UniprotQuery};
use crate::models::{ArtifactRef, StageKind};

mod client;
mod http;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use client::{JobClient, PollConfig};
pub use http::{HttpBackend, RetryPolicy};
pub use types::{FileCreated, JobStarted, JobStatus, JobStatusSnapshot};

/// Errors from the transport layer of the job backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request never produced an HTTP response (after retries).
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status code.
    #[error("request to {path} failed with status code: {status}")]
    Status { path: String, status: u16 },

    /// The response body did not match the expected shape.
    #[error("invalid response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Request/response channel to the remote job backend.
///
/// One implementation speaks HTTP (`HttpBackend`); tests script an
/// in-memory one. All methods are side-effect-free on this side beyond
/// the network call itself.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Start a stage job for the given input artifact, returning the
    /// backend job id.
    async fn start_stage(
        &self,
        stage: StageKind,
        input: &ArtifactRef,
    ) -> Result<String, BackendError>;

    /// Read the current status of a stage job. One network read, no
    /// other side effects.
    async fn stage_status(
        &self,
        stage: StageKind,
        job_id: &str,
    ) -> Result<JobStatusSnapshot, BackendError>;

    /// Build a FASTA file from a UniProt stream query. Returns the
    /// created artifact name.
    async fn create_uniprot_fasta(
        &self,
        query: &UniprotQuery,
        fasta_file: &str,
    ) -> Result<String, BackendError>;

    /// Build a FASTA file from already-selected NCBI records.
    async fn create_ncbi_fasta(
        &self,
        records: &[SequenceRecord],
        fasta_file: &str,
    ) -> Result<String, BackendError>;

    /// Merge the UniProt and NCBI source files into one FASTA.
    /// Record order is preserved: UniProt entries come first.
    async fn merge_source_fastas(
        &self,
        uniprot_file: &str,
        ncbi_file: &str,
        merged_file: &str,
    ) -> Result<String, BackendError>;

    /// Rebuild a FASTA from a prior run's original FASTA and its
    /// distance file.
    async fn create_branch_length_fasta(
        &self,
        original_fasta: &str,
        distance_file: &str,
        bl_fasta_file: &str,
    ) -> Result<String, BackendError>;
}
