//! HTTP implementation of the job backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::ApiSettings;
use crate::dataset::{SequenceRecord, UniprotQuery};
use crate::models::{ArtifactRef, StageKind};

use super::types::{FileCreated, JobStarted, JobStatusSnapshot};
use super::{BackendError, JobBackend};

/// Bounded retry for transport-level failures.
///
/// Only requests that never produced an HTTP response are retried;
/// a non-success status code escalates immediately. Stage failures are
/// never retried at any layer.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Whether the given 1-based attempt was the last one allowed.
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.attempts.max(1)
    }
}

/// Job backend reached over HTTP with JSON bodies.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    /// Timeout for start/status requests.
    request_timeout: Duration,
    /// Timeout for FASTA creation/merge requests (the backend builds
    /// these synchronously, which can take a while for large sets).
    build_timeout: Duration,
    retry: RetryPolicy,
}

impl HttpBackend {
    /// Create a backend client from API settings.
    pub fn from_settings(api: &ApiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(api.start_timeout_secs),
            build_timeout: Duration::from_secs(api.build_timeout_secs),
            retry: RetryPolicy {
                attempts: api.retry_attempts,
                delay: Duration::from_secs(api.retry_delay_secs),
            },
        }
    }

    /// Create a backend client for the given base URL with defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_settings(&ApiSettings {
            base_url: base_url.into(),
            ..ApiSettings::default()
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<T, BackendError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self
                .http
                .post(&url)
                .timeout(timeout)
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) => return Self::decode(path, response).await,
                Err(source) if self.retry.is_exhausted(attempt) => {
                    return Err(BackendError::Transport {
                        path: path.to_string(),
                        source,
                    });
                }
                Err(source) => {
                    tracing::warn!(
                        "POST {} failed (attempt {}/{}): {}",
                        path,
                        attempt,
                        self.retry.attempts,
                        source
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<T, BackendError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self
                .http
                .get(&url)
                .timeout(timeout)
                .query(query)
                .send()
                .await;

            match result {
                Ok(response) => return Self::decode(path, response).await,
                Err(source) if self.retry.is_exhausted(attempt) => {
                    return Err(BackendError::Transport {
                        path: path.to_string(),
                        source,
                    });
                }
                Err(source) => {
                    tracing::warn!(
                        "GET {} failed (attempt {}/{}): {}",
                        path,
                        attempt,
                        self.retry.attempts,
                        source
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
            }
        }
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|source| BackendError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl JobBackend for HttpBackend {
    async fn start_stage(
        &self,
        stage: StageKind,
        input: &ArtifactRef,
    ) -> Result<String, BackendError> {
        let path = format!("{}_start", stage.endpoint_prefix());
        let body = json!({ stage.start_body_key(): input.name() });
        let started: JobStarted = self.post_json(&path, &body, self.request_timeout).await?;
        Ok(started.job_id)
    }

    async fn stage_status(
        &self,
        stage: StageKind,
        job_id: &str,
    ) -> Result<JobStatusSnapshot, BackendError> {
        let path = format!("{}_status", stage.endpoint_prefix());
        self.get_json(&path, &[("id", job_id)], self.request_timeout)
            .await
    }

    async fn create_uniprot_fasta(
        &self,
        query: &UniprotQuery,
        fasta_file: &str,
    ) -> Result<String, BackendError> {
        let body = json!({
            "base_url": query.base_url,
            "params": { "query": query.query, "format": query.format },
            "fasta_file": fasta_file,
        });
        let created: FileCreated = self
            .post_json("create_uniprot_fasta", &body, self.build_timeout)
            .await?;
        Ok(created.file)
    }

    async fn create_ncbi_fasta(
        &self,
        records: &[SequenceRecord],
        fasta_file: &str,
    ) -> Result<String, BackendError> {
        let body = json!({
            "selected_data": records,
            "fasta_file": fasta_file,
        });
        let created: FileCreated = self
            .post_json("create_ncbi_fasta", &body, self.build_timeout)
            .await?;
        Ok(created.file)
    }

    async fn merge_source_fastas(
        &self,
        uniprot_file: &str,
        ncbi_file: &str,
        merged_file: &str,
    ) -> Result<String, BackendError> {
        let body = json!({
            "uniprot_file": uniprot_file,
            "ncbi_file": ncbi_file,
            "merged_file": merged_file,
        });
        let created: FileCreated = self
            .post_json("merge_uniprot_ncbi_fasta", &body, self.build_timeout)
            .await?;
        Ok(created.file)
    }

    async fn create_branch_length_fasta(
        &self,
        original_fasta: &str,
        distance_file: &str,
        bl_fasta_file: &str,
    ) -> Result<String, BackendError> {
        let body = json!({
            "original_fasta_file": original_fasta,
            "nw_distance_file": distance_file,
            "bl_fasta_file": bl_fasta_file,
        });
        let created: FileCreated = self
            .post_json("create_bl_fasta", &body, self.build_timeout)
            .await?;
        Ok(created.file)
    }
}
