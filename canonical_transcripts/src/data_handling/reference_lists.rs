use std::collections::HashSet;
use std::path::PathBuf;

use tracing::info;

use crate::errors::Result;
use crate::helper_functions::{lowercase_set, read_symbol_column, read_symbol_lines};

const CANCER_GENE_COLUMN: &str = "Hugo Symbol";

/// Cancer gene list; only used to validate the inputs.
pub struct CancerGenes {
    pub path: PathBuf,
}

impl CancerGenes {
    pub fn load(&self) -> Result<HashSet<String>> {
        info!("Reading cancer genes from {}", self.path.display());
        let genes: HashSet<String> = read_symbol_column(&self.path, CANCER_GENE_COLUMN)?
            .into_iter()
            .collect();
        info!("Loaded {} cancer genes", genes.len());
        Ok(genes)
    }
}

/// Lower-case transcript-table symbols known to be absent from HGNC.
pub struct IgnoredSymbols {
    pub path: PathBuf,
}

impl IgnoredSymbols {
    pub fn load(&self) -> Result<HashSet<String>> {
        info!("Reading ignored symbols from {}", self.path.display());
        let symbols = read_symbol_lines(&self.path)?;
        Ok(lowercase_set(symbols.iter().map(String::as_str)))
    }
}
