use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use polars::prelude::*;
use tracing::{error, info, warn};

use crate::errors::Result;
use crate::helper_functions::{read_tsv, str_values};
use crate::models::{Dataset, OverrideRecord};

/// Curated isoform override sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideKind {
    Uniprot,
    Mskcc,
    GenomeNexus,
    Oncokb,
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverrideKind::Uniprot => "uniprot",
            OverrideKind::Mskcc => "mskcc",
            OverrideKind::GenomeNexus => "genome_nexus",
            OverrideKind::Oncokb => "oncokb",
        };
        write!(f, "{s}")
    }
}

pub struct IsoformOverridesDataset {
    pub kind: OverrideKind,
    pub path: PathBuf,
}

fn rename_columns(mut df: DataFrame) -> PolarsResult<DataFrame> {
    df.rename("enst_id", PlSmallStr::from("isoform_override"))?;
    Ok(df)
}

impl Dataset for IsoformOverridesDataset {
    type Table = OverrideTable;

    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading {} isoform overrides from {}", self.kind, self.path.display());
        let df = match read_tsv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read {} overrides: {}", self.kind, e);
                return Err(e);
            }
        };
        rename_columns(df)
    }

    fn index(&self, df: &DataFrame) -> Result<OverrideTable> {
        let symbols = str_values(df, "gene_name")?;
        let transcripts = str_values(df, "isoform_override")?;

        let mut records = Vec::with_capacity(df.height());
        for (row, (symbol, transcript)) in symbols.into_iter().zip(transcripts).enumerate() {
            match (symbol, transcript) {
                (Some(gene_name), Some(isoform_override)) => records.push(OverrideRecord {
                    gene_name,
                    isoform_override,
                }),
                (symbol, _) => warn!(
                    "Skipping incomplete {} override at row {} (gene_name = {:?})",
                    self.kind,
                    row + 1,
                    symbol
                ),
            }
        }

        let table = OverrideTable::from_records(self.kind, records);
        let ambiguous = table.ambiguous_symbols();
        if !ambiguous.is_empty() {
            warn!(
                "{} symbols have several {} overrides, using the first of each: {:?}",
                ambiguous.len(),
                self.kind,
                ambiguous
            );
        }
        info!("Indexed {} {} overrides", table.len(), self.kind);
        Ok(table)
    }
}

/// Preferred transcript per symbol for one override source.
#[derive(Debug)]
pub struct OverrideTable {
    kind: OverrideKind,
    records: Vec<OverrideRecord>,
    by_symbol: HashMap<String, Vec<usize>>,
}

impl OverrideTable {
    pub fn from_records(kind: OverrideKind, records: Vec<OverrideRecord>) -> Self {
        let mut by_symbol: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_symbol.entry(record.gene_name.clone()).or_default().push(idx);
        }
        Self {
            kind,
            records,
            by_symbol,
        }
    }

    pub fn kind(&self) -> OverrideKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The override for `symbol`; the first row wins when there are several.
    pub fn first(&self, symbol: &str) -> Option<&str> {
        self.by_symbol
            .get(symbol)
            .and_then(|rows| rows.first())
            .map(|&i| self.records[i].isoform_override.as_str())
    }

    /// Symbols with more than one row, sorted.
    pub fn ambiguous_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self
            .by_symbol
            .iter()
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(s, _)| s.as_str())
            .collect();
        symbols.sort_unstable();
        symbols
    }
}

/// The four override tables of a run.
#[derive(Debug)]
pub struct OverrideSet {
    pub uniprot: OverrideTable,
    pub mskcc: OverrideTable,
    pub genome_nexus: OverrideTable,
    pub oncokb: OverrideTable,
}

impl OverrideSet {
    pub fn get(&self, kind: OverrideKind) -> &OverrideTable {
        match kind {
            OverrideKind::Uniprot => &self.uniprot,
            OverrideKind::Mskcc => &self.mskcc,
            OverrideKind::GenomeNexus => &self.genome_nexus,
            OverrideKind::Oncokb => &self.oncokb,
        }
    }

    pub fn tables(&self) -> [&OverrideTable; 4] {
        [&self.uniprot, &self.mskcc, &self.genome_nexus, &self.oncokb]
    }
}
