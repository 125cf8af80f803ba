//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level
//! updates.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Job backend API settings.
    #[serde(default)]
    pub api: ApiSettings,

    /// Sequence search defaults.
    #[serde(default)]
    pub search: SearchSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,
}

/// Remote job backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the job backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Delay between job status polls, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Timeout for start/status requests, in seconds.
    #[serde(default = "default_start_timeout")]
    pub start_timeout_secs: u64,

    /// Timeout for FASTA creation/merge requests, in seconds. These
    /// build synchronously on the backend and can run long.
    #[serde(default = "default_build_timeout")]
    pub build_timeout_secs: u64,

    /// Optional deadline for a whole stage poll loop, in seconds.
    /// Unset means polling continues until the backend reports a
    /// terminal status - jobs can legitimately run for hours, but a
    /// dead backend then hangs the run.
    #[serde(default)]
    pub stage_timeout_secs: Option<u64>,

    /// Transport-level retry attempts for a single request.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between transport retries, in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

fn default_base_url() -> String {
    "http://134.158.151.55".to_string()
}

fn default_poll_interval() -> u64 {
    2
}

fn default_start_timeout() -> u64 {
    10
}

fn default_build_timeout() -> u64 {
    3600
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_secs: default_poll_interval(),
            start_timeout_secs: default_start_timeout(),
            build_timeout_secs: default_build_timeout(),
            stage_timeout_secs: None,
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// Defaults for the sequence selection form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Include the UniProt source by default.
    #[serde(default = "default_true")]
    pub use_uniprot: bool,

    /// Include the NCBI source by default.
    #[serde(default = "default_true")]
    pub use_ncbi: bool,

    /// Default minimum sequence length, in residues.
    #[serde(default)]
    pub min_length: Option<u32>,

    /// Default maximum sequence length, in residues.
    #[serde(default)]
    pub max_length: Option<u32>,

    /// Last search term used.
    #[serde(default)]
    pub last_search_term: String,

    /// Last taxonomy id used.
    #[serde(default)]
    pub last_taxonomy_id: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            use_uniprot: true,
            use_ncbi: true,
            min_length: None,
            max_length: None,
            last_search_term: String::new(),
            last_taxonomy_id: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (poll chatter buffered, replayed on
    /// failure).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Auto-scroll log output.
    #[serde(default = "default_true")]
    pub autoscroll: bool,

    /// Number of buffered lines replayed on failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Show timestamps in run logs.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            autoscroll: true,
            error_tail: default_error_tail(),
            show_timestamps: true,
        }
    }
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Folder where downloaded artifacts are saved.
    #[serde(default = "default_downloads_folder")]
    pub downloads_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_downloads_folder() -> String {
    "downloads".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
            downloads_folder: default_downloads_folder(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Api,
    Search,
    Logging,
    Paths,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Api => "api",
            ConfigSection::Search => "search",
            ConfigSection::Logging => "logging",
            ConfigSection::Paths => "paths",
        }
    }
}
