use std::collections::HashMap;
use std::path::PathBuf;

use polars::prelude::*;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::helper_functions::{read_tsv, str_values};
use crate::models::{Dataset, TranscriptRecord};

/// Ensembl BioMart dump of gene and transcript ids per HGNC symbol.
pub struct TranscriptInfoDataset {
    pub path: PathBuf,
}

/// Transcript rows indexed by annotated symbol and by gene stable id.
/// Index lists keep input row order.
#[derive(Debug, Default)]
pub struct TranscriptTable {
    records: Vec<TranscriptRecord>,
    by_symbol: HashMap<String, Vec<usize>>,
    by_gene_id: HashMap<String, Vec<usize>>,
}

impl TranscriptTable {
    pub fn from_records(records: Vec<TranscriptRecord>) -> Self {
        let mut by_symbol: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_gene_id: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            if let Some(symbol) = &record.hgnc_symbol {
                by_symbol.entry(symbol.clone()).or_default().push(idx);
            }
            if let Some(gene_id) = &record.gene_stable_id {
                by_gene_id.entry(gene_id.clone()).or_default().push(idx);
            }
        }
        Self {
            records,
            by_symbol,
            by_gene_id,
        }
    }

    pub fn records(&self) -> &[TranscriptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn by_symbol(&self, symbol: &str) -> Vec<&TranscriptRecord> {
        self.rows(self.by_symbol.get(symbol))
    }

    pub fn by_gene_id(&self, gene_id: &str) -> Vec<&TranscriptRecord> {
        self.rows(self.by_gene_id.get(gene_id))
    }

    fn rows(&self, idx: Option<&Vec<usize>>) -> Vec<&TranscriptRecord> {
        idx.map(|rows| rows.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }
}

fn parse_is_canonical(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "t" | "yes")
    )
}

fn parse_protein_length(value: Option<&str>) -> Option<u32> {
    let value = value?.trim();
    value
        .parse::<u32>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u32))
}

impl Dataset for TranscriptInfoDataset {
    type Table = TranscriptTable;

    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading transcript info from {}", self.path.display());
        let df = match read_tsv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read transcript info: {}", e);
                return Err(e);
            }
        };
        let raw_rows = df.height();

        let df = df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        debug!(
            "Dropped {} duplicate transcript rows, {} remain",
            raw_rows - df.height(),
            df.height()
        );

        Ok(df)
    }

    fn index(&self, df: &DataFrame) -> Result<TranscriptTable> {
        let symbols = str_values(df, "hgnc_symbol")?;
        let gene_ids = str_values(df, "gene_stable_id")?;
        let transcript_ids = str_values(df, "transcript_stable_id")?;
        let canonical = df.column("is_canonical")?.str()?;
        let protein_length = df.column("protein_length")?.str()?;

        let records = symbols
            .into_iter()
            .zip(gene_ids)
            .zip(transcript_ids)
            .enumerate()
            .map(|(i, ((hgnc_symbol, gene_stable_id), transcript_stable_id))| TranscriptRecord {
                hgnc_symbol,
                gene_stable_id,
                transcript_stable_id,
                is_canonical: parse_is_canonical(canonical.get(i)),
                protein_length: parse_protein_length(protein_length.get(i)),
            })
            .collect::<Vec<_>>();

        let table = TranscriptTable::from_records(records);
        info!("Indexed {} transcripts", table.len());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_lengths() {
        assert!(parse_is_canonical(Some("1")));
        assert!(parse_is_canonical(Some("True")));
        assert!(!parse_is_canonical(Some("0")));
        assert!(!parse_is_canonical(None));
        assert_eq!(parse_protein_length(Some("393")), Some(393));
        assert_eq!(parse_protein_length(Some("393.0")), Some(393));
        assert_eq!(parse_protein_length(Some("n/a")), None);
        assert_eq!(parse_protein_length(None), None);
    }

    #[test]
    fn load_drops_exact_duplicates_and_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcripts.tsv");
        std::fs::write(
            &path,
            "hgnc_symbol\tgene_stable_id\ttranscript_stable_id\tis_canonical\tprotein_length\n\
             TP53\tENSG1\tENST1\t1\t393\n\
             TP53\tENSG1\tENST1\t1\t393\n\
             TP53\tENSG1\tENST2\t0\t\n\
             \tENSG2\tENST3\t0\t100\n",
        )
        .unwrap();

        let dataset = TranscriptInfoDataset { path };
        let df = dataset.load().unwrap();
        assert_eq!(df.height(), 3);

        let table = dataset.index(&df).unwrap();
        assert_eq!(table.len(), 3);
        let tp53 = table.by_symbol("TP53");
        assert_eq!(tp53.len(), 2);
        assert_eq!(tp53[0].transcript_stable_id.as_deref(), Some("ENST1"));
        assert!(tp53[0].is_canonical);
        assert_eq!(tp53[1].protein_length, None);
        assert_eq!(table.by_gene_id("ENSG2")[0].hgnc_symbol, None);
        assert!(table.by_gene_id("ENSG9").is_empty());
    }
}
