//! Artifact references - immutable handles to files held by the backend.
//!
//! The backend owns artifact storage; this side only ever passes names
//! around. Names we generate locally follow the
//! `<ddmmyyyyHHMMSS>_<Suffix>.fasta` convention; names returned by the
//! backend (stage outputs) are opaque and stored verbatim.

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::enums::StageKind;

/// What produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOrigin {
    /// Built from a UniProt search by the backend.
    Uniprot,
    /// Built from selected NCBI records by the backend.
    Ncbi,
    /// Merge of the UniProt and NCBI source files.
    Merged,
    /// Rebuilt from a previous run's branch lengths.
    BranchLength,
    /// Output of a pipeline stage.
    Stage(StageKind),
}

/// Generate a timestamped local artifact filename.
///
/// Format is `<ddmmyyyyHHMMSS>_<suffix>.fasta`; the backend expects this
/// shape for locally-initiated creations (`Uniprot`, `NCBI`, `Merged`,
/// `bl`). Stage outputs are named by the backend instead.
pub fn timestamped_fasta_name(suffix: &str) -> String {
    let identifier = Local::now().format("%d%m%Y%H%M%S");
    format!("{}_{}.fasta", identifier, suffix)
}

/// Immutable reference to a named backend artifact.
///
/// Never mutated in place - each stage returns a new reference. The
/// backend owns the underlying storage lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    name: String,
    origin: ArtifactOrigin,
    created_at: String,
}

impl ArtifactRef {
    /// Wrap a backend-returned artifact name.
    pub fn new(name: impl Into<String>, origin: ArtifactOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
            created_at: Local::now().to_rfc3339(),
        }
    }

    /// The artifact name as known to the backend.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What produced this artifact.
    pub fn origin(&self) -> ArtifactOrigin {
        self.origin
    }

    /// RFC 3339 creation timestamp (local clock, informational only).
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Whether the reference is unusable as a stage input.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_carry_suffix_and_timestamp() {
        let name = timestamped_fasta_name("Merged");
        assert!(name.ends_with("_Merged.fasta"));
        // 14-digit timestamp prefix: ddmmyyyyHHMMSS
        let prefix = name.split('_').next().unwrap();
        assert_eq!(prefix.len(), 14);
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn backend_names_are_stored_verbatim() {
        let artifact = ArtifactRef::new(
            "01012025120000_Merged_mafft.fasta",
            ArtifactOrigin::Stage(StageKind::Alignment),
        );
        assert_eq!(artifact.name(), "01012025120000_Merged_mafft.fasta");
        assert!(!artifact.is_empty());
    }

    #[test]
    fn blank_name_counts_as_empty() {
        let artifact = ArtifactRef::new("  ", ArtifactOrigin::Uniprot);
        assert!(artifact.is_empty());
    }
}
