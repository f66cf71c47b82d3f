use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{PipelineError, Result};
use crate::helper_functions::resolve_path;

/// HGNC renamed its columns; downstream consumers still expect the old names.
pub const DEFAULT_COLUMN_RENAMES: [(&str, &str); 10] = [
    ("name", "approved_name"),
    ("symbol", "approved_symbol"),
    ("prev_symbol", "previous_symbols"),
    ("alias_symbol", "synonyms"),
    ("location", "chromosome"),
    ("entrez_id", "entrez_gene_id"),
    ("ena", "accession_numbers"),
    ("refseq_accession", "refseq_ids"),
    ("uniprot_ids", "uniprot_id"),
    ("ensembl_id", "ensembl_gene_id"),
];

/// Tunables of a pipeline run. Every field has a default, so an empty JSON
/// object is a valid configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tab-separated list of cancer genes with a `Hugo Symbol` column.
    pub cancer_genes_path: PathBuf,
    /// Transcript-table symbols that are allowed to be unknown to HGNC.
    pub ignored_symbols_path: PathBuf,
    /// Lower-case cancer genes exempt from the HGNC membership check.
    pub legacy_cancer_gene_exceptions: Vec<String>,
    /// Lower-case prefixes of RNA gene families exempt from the HGNC membership check.
    pub rna_gene_prefixes: Vec<String>,
    /// `approved_name` of HGNC rows that should be dropped.
    pub withdrawn_marker: String,
    /// Treat several override rows for one symbol in a single table as fatal.
    pub strict_overrides: bool,
    /// Current HGNC column name -> legacy column name.
    pub column_renames: Vec<(String, String)>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cancer_genes_path: PathBuf::from("common_input/oncokb_cancer_genes_list_20170926.txt"),
            ignored_symbols_path: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/data/ignored_symbols.txt"
            )),
            legacy_cancer_gene_exceptions: vec!["c12orf9".to_string()],
            rna_gene_prefixes: ["rn", "mir", "linc"].iter().map(|s| s.to_string()).collect(),
            withdrawn_marker: "entry withdrawn".to_string(),
            strict_overrides: false,
            column_renames: DEFAULT_COLUMN_RENAMES
                .iter()
                .map(|&(old, new)| (old.to_string(), new.to_string()))
                .collect(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Reading configuration from {}", path.display());
        let raw = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn cancer_genes_path(&self) -> PathBuf {
        resolve_path(&self.cancer_genes_path)
    }

    pub fn ignored_symbols_path(&self) -> PathBuf {
        resolve_path(&self.ignored_symbols_path)
    }
}
