use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use polars::prelude::*;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::helper_functions::{optional_str_values, read_tsv, split_list, str_values};
use crate::models::{Dataset, GeneRecord};

/// HGNC complete set, the universe of approved symbols.
pub struct HgncDataset {
    pub path: PathBuf,
    pub column_renames: Vec<(String, String)>,
    pub withdrawn_marker: String,
}

/// Rename columns from the current HGNC headers to the legacy names
/// downstream consumers expect. Columns not present are skipped.
fn rename_columns(mut df: DataFrame, renames: &[(String, String)]) -> PolarsResult<DataFrame> {
    for (old, new) in renames {
        if df.get_column_names().iter().any(|c| c.as_str() == old) {
            df.rename(old, PlSmallStr::from(new.as_str()))?;
        }
    }
    Ok(df)
}

fn drop_withdrawn(df: DataFrame, marker: &str) -> PolarsResult<DataFrame> {
    df.lazy()
        .filter(col("approved_name").neq_missing(lit(marker)))
        .collect()
}

impl Dataset for HgncDataset {
    type Table = GeneTable;

    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading HGNC complete set from {}", self.path.display());
        let df = match read_tsv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read HGNC complete set: {}", e);
                return Err(e);
            }
        };

        let df = rename_columns(df, &self.column_renames)?;
        let total = df.height();
        let df = drop_withdrawn(df, &self.withdrawn_marker)?;
        debug!("Dropped {} withdrawn HGNC entries", total - df.height());

        Ok(df)
    }

    fn index(&self, df: &DataFrame) -> Result<GeneTable> {
        let symbols = str_values(df, "approved_symbol")?;
        let names = optional_str_values(df, "approved_name")?;
        let chromosomes = optional_str_values(df, "chromosome")?;
        let synonyms = optional_str_values(df, "synonyms")?;
        let previous = optional_str_values(df, "previous_symbols")?;
        let entrez = optional_str_values(df, "entrez_gene_id")?;
        let accessions = optional_str_values(df, "accession_numbers")?;
        let refseq = optional_str_values(df, "refseq_ids")?;
        let uniprot = optional_str_values(df, "uniprot_id")?;
        let ensembl = optional_str_values(df, "ensembl_gene_id")?;

        let records = (0..df.height())
            .map(|i| GeneRecord {
                approved_symbol: symbols[i].clone(),
                approved_name: names[i].clone(),
                chromosome: chromosomes[i].clone(),
                synonyms: split_list(synonyms[i].as_deref()),
                previous_symbols: split_list(previous[i].as_deref()),
                entrez_gene_id: entrez[i].clone(),
                accession_numbers: accessions[i].clone(),
                refseq_ids: refseq[i].clone(),
                uniprot_id: uniprot[i].clone(),
                ensembl_gene_id: ensembl[i].clone(),
            })
            .collect::<Vec<_>>();

        let table = GeneTable::from_records(records);
        info!("Indexed {} HGNC entries", table.len());
        Ok(table)
    }
}

/// HGNC rows indexed by approved symbol.
#[derive(Debug, Default)]
pub struct GeneTable {
    records: Vec<GeneRecord>,
    by_symbol: HashMap<String, Vec<usize>>,
}

impl GeneTable {
    pub fn from_records(records: Vec<GeneRecord>) -> Self {
        let mut by_symbol: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            if let Some(symbol) = &record.approved_symbol {
                by_symbol.entry(symbol.clone()).or_default().push(idx);
            }
        }
        Self { records, by_symbol }
    }

    pub fn records(&self) -> &[GeneRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn by_symbol(&self, symbol: &str) -> Vec<&GeneRecord> {
        self.by_symbol
            .get(symbol)
            .map(|rows| rows.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Distinct approved symbols in first-seen order.
    pub fn symbols(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter_map(|r| r.approved_symbol.as_deref())
            .filter(|s| seen.insert(*s))
            .collect()
    }

    pub fn synonyms(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .flat_map(|r| r.synonyms.iter().map(String::as_str))
    }

    pub fn previous_symbols(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .flat_map(|r| r.previous_symbols.iter().map(String::as_str))
    }
}
