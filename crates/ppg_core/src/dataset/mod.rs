//! Dataset preparation - assembling the initial sequence set.
//!
//! A run starts from a FASTA artifact built by the backend from one or
//! both database sources (UniProt search, selected NCBI records), from
//! a prior run's branch lengths, or from an artifact that already
//! exists. This module owns the source call order and the merge
//! contract; the sequence-set construction itself happens backend-side.

mod preparer;
mod types;

pub use preparer::{DatasetError, DatasetInput, DatasetPreparer};
pub use types::{SelectionCriteria, SequenceRecord, UniprotQuery, UNIPROT_STREAM_URL};
