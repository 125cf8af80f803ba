//! Scripted in-memory job backend for tests.
//!
//! Tests script per-stage outcomes up front, then assert on the calls
//! the code under test actually made. Unscripted stages finish
//! immediately with a name derived from their input; unscripted
//! creation endpoints echo the requested filename, which is what the
//! real backend does.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::dataset::{SequenceRecord, UniprotQuery};
use crate::models::{ArtifactRef, StageKind};

use super::types::JobStatusSnapshot;
use super::{BackendError, JobBackend};

#[derive(Clone)]
struct StageScript {
    pending_polls: usize,
    terminal: JobStatusSnapshot,
    fail_submission: bool,
}

struct JobState {
    stage: StageKind,
    remaining_pending: usize,
    terminal: JobStatusSnapshot,
}

#[derive(Default)]
struct EndpointScript {
    fail_status: Option<u16>,
    file: Option<String>,
}

impl EndpointScript {
    fn respond(&self, path: &str, requested: &str) -> Result<String, BackendError> {
        if let Some(status) = self.fail_status {
            return Err(BackendError::Status {
                path: path.to_string(),
                status,
            });
        }
        Ok(self.file.clone().unwrap_or_else(|| requested.to_string()))
    }
}

#[derive(Default)]
struct ScriptState {
    next_job: u32,
    stage_scripts: HashMap<StageKind, StageScript>,
    jobs: HashMap<String, JobState>,
    started: Vec<(StageKind, String)>,
    polls: HashMap<StageKind, usize>,
    uniprot: EndpointScript,
    ncbi: EndpointScript,
    merge: EndpointScript,
    branch_length: EndpointScript,
    uniprot_requests: Vec<(String, String)>,
    ncbi_requests: Vec<(usize, String)>,
    merge_requests: Vec<(String, String, String)>,
    branch_length_requests: Vec<(String, String, String)>,
}

pub(crate) struct ScriptedBackend {
    state: Mutex<ScriptState>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ScriptState::default()),
        })
    }

    /// Script a stage to report `pending` the given number of polls,
    /// then finish with the given output artifact.
    pub fn script_stage_success(&self, stage: StageKind, pending_polls: usize, output: &str) {
        self.state.lock().stage_scripts.insert(
            stage,
            StageScript {
                pending_polls,
                terminal: JobStatusSnapshot::finished(output),
                fail_submission: false,
            },
        );
    }

    /// Script a stage to report `pending` then fail with a message.
    pub fn script_stage_error(&self, stage: StageKind, pending_polls: usize, message: &str) {
        self.state.lock().stage_scripts.insert(
            stage,
            StageScript {
                pending_polls,
                terminal: JobStatusSnapshot::errored(message),
                fail_submission: false,
            },
        );
    }

    /// Script a stage's start endpoint to return HTTP 500.
    pub fn script_stage_submission_failure(&self, stage: StageKind) {
        self.state.lock().stage_scripts.insert(
            stage,
            StageScript {
                pending_polls: 0,
                terminal: JobStatusSnapshot::pending(),
                fail_submission: true,
            },
        );
    }

    pub fn script_uniprot_file(&self, file: &str) {
        self.state.lock().uniprot.file = Some(file.to_string());
    }

    pub fn fail_uniprot(&self, status: u16) {
        self.state.lock().uniprot.fail_status = Some(status);
    }

    pub fn script_ncbi_file(&self, file: &str) {
        self.state.lock().ncbi.file = Some(file.to_string());
    }

    pub fn fail_ncbi(&self, status: u16) {
        self.state.lock().ncbi.fail_status = Some(status);
    }

    pub fn script_merge_file(&self, file: &str) {
        self.state.lock().merge.file = Some(file.to_string());
    }

    pub fn fail_merge(&self, status: u16) {
        self.state.lock().merge.fail_status = Some(status);
    }

    pub fn script_branch_length_file(&self, file: &str) {
        self.state.lock().branch_length.file = Some(file.to_string());
    }

    /// Number of start calls made for a stage.
    pub fn start_calls(&self, stage: StageKind) -> usize {
        self.state
            .lock()
            .started
            .iter()
            .filter(|(s, _)| *s == stage)
            .count()
    }

    /// Input artifact names passed to a stage's start endpoint, in
    /// submission order.
    pub fn started_inputs(&self, stage: StageKind) -> Vec<String> {
        self.state
            .lock()
            .started
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, input)| input.clone())
            .collect()
    }

    /// Number of status polls made for a stage.
    pub fn poll_calls(&self, stage: StageKind) -> usize {
        self.state.lock().polls.get(&stage).copied().unwrap_or(0)
    }

    /// Total status polls across all stages.
    pub fn total_poll_calls(&self) -> usize {
        self.state.lock().polls.values().sum()
    }

    /// `(uniprot_file, ncbi_file, merged_file)` triples passed to merge.
    pub fn merge_requests(&self) -> Vec<(String, String, String)> {
        self.state.lock().merge_requests.clone()
    }

    /// `(query, fasta_file)` pairs passed to UniProt creation.
    pub fn uniprot_requests(&self) -> Vec<(String, String)> {
        self.state.lock().uniprot_requests.clone()
    }

    /// `(record_count, fasta_file)` pairs passed to NCBI creation.
    pub fn ncbi_requests(&self) -> Vec<(usize, String)> {
        self.state.lock().ncbi_requests.clone()
    }

    /// `(original, distances, bl_file)` triples passed to bl creation.
    pub fn branch_length_requests(&self) -> Vec<(String, String, String)> {
        self.state.lock().branch_length_requests.clone()
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn start_stage(
        &self,
        stage: StageKind,
        input: &ArtifactRef,
    ) -> Result<String, BackendError> {
        let mut state = self.state.lock();
        state.started.push((stage, input.name().to_string()));

        let script = state.stage_scripts.get(&stage).cloned().unwrap_or_else(|| {
            StageScript {
                pending_polls: 0,
                terminal: JobStatusSnapshot::finished(format!(
                    "{}_{}.out",
                    input.name(),
                    stage.endpoint_prefix()
                )),
                fail_submission: false,
            }
        });

        if script.fail_submission {
            return Err(BackendError::Status {
                path: format!("{}_start", stage.endpoint_prefix()),
                status: 500,
            });
        }

        state.next_job += 1;
        let job_id = format!("job-{}", state.next_job);
        state.jobs.insert(
            job_id.clone(),
            JobState {
                stage,
                remaining_pending: script.pending_polls,
                terminal: script.terminal,
            },
        );
        Ok(job_id)
    }

    async fn stage_status(
        &self,
        stage: StageKind,
        job_id: &str,
    ) -> Result<JobStatusSnapshot, BackendError> {
        let mut state = self.state.lock();
        *state.polls.entry(stage).or_insert(0) += 1;

        let job = state.jobs.get_mut(job_id).ok_or_else(|| BackendError::Status {
            path: format!("{}_status", stage.endpoint_prefix()),
            status: 404,
        })?;
        debug_assert_eq!(job.stage, stage);

        if job.remaining_pending > 0 {
            job.remaining_pending -= 1;
            return Ok(JobStatusSnapshot::pending());
        }
        Ok(job.terminal.clone())
    }

    async fn create_uniprot_fasta(
        &self,
        query: &UniprotQuery,
        fasta_file: &str,
    ) -> Result<String, BackendError> {
        let mut state = self.state.lock();
        state
            .uniprot_requests
            .push((query.query.clone(), fasta_file.to_string()));
        state.uniprot.respond("create_uniprot_fasta", fasta_file)
    }

    async fn create_ncbi_fasta(
        &self,
        records: &[SequenceRecord],
        fasta_file: &str,
    ) -> Result<String, BackendError> {
        let mut state = self.state.lock();
        state
            .ncbi_requests
            .push((records.len(), fasta_file.to_string()));
        state.ncbi.respond("create_ncbi_fasta", fasta_file)
    }

    async fn merge_source_fastas(
        &self,
        uniprot_file: &str,
        ncbi_file: &str,
        merged_file: &str,
    ) -> Result<String, BackendError> {
        let mut state = self.state.lock();
        state.merge_requests.push((
            uniprot_file.to_string(),
            ncbi_file.to_string(),
            merged_file.to_string(),
        ));
        state.merge.respond("merge_uniprot_ncbi_fasta", merged_file)
    }

    async fn create_branch_length_fasta(
        &self,
        original_fasta: &str,
        distance_file: &str,
        bl_fasta_file: &str,
    ) -> Result<String, BackendError> {
        let mut state = self.state.lock();
        state.branch_length_requests.push((
            original_fasta.to_string(),
            distance_file.to_string(),
            bl_fasta_file.to_string(),
        ));
        state.branch_length.respond("create_bl_fasta", bl_fasta_file)
    }
}
