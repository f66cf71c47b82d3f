// src/models.rs

use polars::prelude::*;

use crate::errors::Result;

/// An input table of the pipeline: read from disk, then indexed into a lookup table.
pub trait Dataset {
    type Table;

    fn load(&self) -> PolarsResult<DataFrame>;

    fn index(&self, df: &DataFrame) -> Result<Self::Table>;
}

/// Wrap any error as a polars compute error, for code paths that return `PolarsResult`.
pub fn polars_err(e: Box<dyn std::error::Error>) -> PolarsError {
    PolarsError::ComputeError(format!("{}", e).into())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRecord {
    pub hgnc_symbol: Option<String>,
    pub gene_stable_id: Option<String>,
    pub transcript_stable_id: Option<String>,
    pub is_canonical: bool,
    pub protein_length: Option<u32>,
}

impl TranscriptRecord {
    pub fn field(&self, field: TranscriptField) -> Option<&str> {
        match field {
            TranscriptField::GeneStableId => self.gene_stable_id.as_deref(),
            TranscriptField::TranscriptStableId => self.transcript_stable_id.as_deref(),
        }
    }
}

/// Which identifier of a transcript row a canonical lookup should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptField {
    GeneStableId,
    TranscriptStableId,
}

/// One approved HGNC entry, using the legacy column vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneRecord {
    pub approved_symbol: Option<String>,
    pub approved_name: Option<String>,
    pub chromosome: Option<String>,
    pub synonyms: Vec<String>,
    pub previous_symbols: Vec<String>,
    pub entrez_gene_id: Option<String>,
    pub accession_numbers: Option<String>,
    pub refseq_ids: Option<String>,
    pub uniprot_id: Option<String>,
    pub ensembl_gene_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRecord {
    pub gene_name: String,
    pub isoform_override: String,
}

/// Resolved identifiers for one approved symbol. `None` means unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalResult {
    pub hgnc_symbol: String,
    pub ensembl_canonical_gene: Option<String>,
    pub ensembl_canonical_transcript: Option<String>,
    pub genome_nexus_canonical_transcript: Option<String>,
    pub uniprot_canonical_transcript: Option<String>,
    pub mskcc_canonical_transcript: Option<String>,
}

pub const RESOLVED_COLUMNS: [&str; 5] = [
    "ensembl_canonical_gene",
    "ensembl_canonical_transcript",
    "genome_nexus_canonical_transcript",
    "uniprot_canonical_transcript",
    "mskcc_canonical_transcript",
];

impl CanonicalResult {
    /// Values in the order of [`RESOLVED_COLUMNS`].
    pub fn values(&self) -> [Option<&str>; 5] {
        [
            self.ensembl_canonical_gene.as_deref(),
            self.ensembl_canonical_transcript.as_deref(),
            self.genome_nexus_canonical_transcript.as_deref(),
            self.uniprot_canonical_transcript.as_deref(),
            self.mskcc_canonical_transcript.as_deref(),
        ]
    }
}
