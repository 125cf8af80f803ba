//! Selection criteria and sequence record types.

use serde::{Deserialize, Serialize};

/// UniProt REST endpoint the backend streams search results from.
pub const UNIPROT_STREAM_URL: &str = "https://rest.uniprot.org/uniprotkb/stream";

/// What to pull from the sequence databases when building the initial
/// dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    /// Include the UniProt source.
    pub use_uniprot: bool,
    /// Include the NCBI source (uses the selected records).
    pub use_ncbi: bool,
    /// Protein or gene name searched for.
    pub search_term: String,
    /// NCBI taxonomy id restricting the search.
    pub taxonomy_id: String,
    /// Minimum sequence length in residues; `None` is unbounded.
    pub min_length: Option<u32>,
    /// Maximum sequence length in residues; `None` is unbounded.
    pub max_length: Option<u32>,
}

impl SelectionCriteria {
    /// Criteria with both sources enabled and no length bounds.
    pub fn new(search_term: impl Into<String>, taxonomy_id: impl Into<String>) -> Self {
        Self {
            use_uniprot: true,
            use_ncbi: true,
            search_term: search_term.into(),
            taxonomy_id: taxonomy_id.into(),
            min_length: None,
            max_length: None,
        }
    }

    /// Whether any source is enabled at all.
    pub fn any_source_enabled(&self) -> bool {
        self.use_uniprot || self.use_ncbi
    }
}

/// Query the backend forwards to the UniProt stream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniprotQuery {
    pub base_url: String,
    pub query: String,
    pub format: String,
}

impl UniprotQuery {
    /// Build the stream query from selection criteria.
    ///
    /// Unset length bounds become `*` and spaces in the search term
    /// become `+`, matching what the UniProt query language expects.
    pub fn from_criteria(criteria: &SelectionCriteria) -> Self {
        let min = bound_str(criteria.min_length);
        let max = bound_str(criteria.max_length);
        let term = criteria.search_term.replace(' ', "+");
        let query = format!(
            "taxonomy_id:{} AND protein_name:{} AND length:[{} TO {}]",
            criteria.taxonomy_id, term, min, max
        );
        Self {
            base_url: UNIPROT_STREAM_URL.to_string(),
            query,
            format: "fasta".to_string(),
        }
    }
}

fn bound_str(bound: Option<u32>) -> String {
    match bound {
        Some(value) => value.to_string(),
        None => "*".to_string(),
    }
}

/// One selected sequence record, as sent to the NCBI FASTA builder.
///
/// Field names are part of the backend contract; `mRNA` keeps its
/// original capitalization on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub accession: String,
    pub protein_name: String,
    pub sequence: Option<String>,
    pub scientific_name: Option<String>,
    pub taxid: Option<String>,
    pub sequence_length: Option<u64>,
    #[serde(rename = "mRNA")]
    pub mrna: Option<String>,
    pub database: Option<String>,
}

impl SequenceRecord {
    /// A record with just an accession and name; remaining fields are
    /// filled in from whichever lookup produced the record.
    pub fn new(accession: impl Into<String>, protein_name: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            protein_name: protein_name.into(),
            sequence: None,
            scientific_name: None,
            taxid: None,
            sequence_length: None,
            mrna: None,
            database: None,
        }
    }
}
