use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::helper_functions::{str_values, write_tsv};
use crate::models::{CanonicalResult, RESOLVED_COLUMNS};

/// Metadata columns superseded by the output's own columns.
const DROPPED_COLUMNS: [&str; 2] = ["approved_symbol", "ensembl_gene_id"];

/// Join resolved identifiers onto the HGNC metadata by symbol.
///
/// The output starts with `hgnc_symbol` and the five resolved columns, followed
/// by the metadata columns in their original order, minus the approved symbol
/// and the HGNC ensembl gene id. Metadata rows without a result are dropped.
pub fn join_metadata(results: &[CanonicalResult], metadata: &DataFrame) -> PolarsResult<DataFrame> {
    let by_symbol: HashMap<&str, &CanonicalResult> = results
        .iter()
        .map(|r| (r.hgnc_symbol.as_str(), r))
        .collect();

    let mut rows: Vec<IdxSize> = Vec::with_capacity(metadata.height());
    let mut matched: Vec<&CanonicalResult> = Vec::with_capacity(metadata.height());
    for (i, symbol) in str_values(metadata, "approved_symbol")?.iter().enumerate() {
        if let Some(result) = symbol.as_deref().and_then(|s| by_symbol.get(s).copied()) {
            rows.push(i as IdxSize);
            matched.push(result);
        }
    }
    let metadata = metadata.take(&IdxCa::from_vec(PlSmallStr::from("row"), rows))?;
    debug!("{} of {} results matched metadata rows", matched.len(), results.len());

    let mut columns: Vec<Column> = Vec::with_capacity(RESOLVED_COLUMNS.len() + metadata.width());
    let symbols: Vec<&str> = matched.iter().map(|r| r.hgnc_symbol.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from("hgnc_symbol"), symbols).into());
    for (j, name) in RESOLVED_COLUMNS.iter().enumerate() {
        let values: Vec<Option<&str>> = matched.iter().map(|r| r.values()[j]).collect();
        columns.push(Series::new(PlSmallStr::from(*name), values).into());
    }
    for column in metadata.get_columns() {
        if !DROPPED_COLUMNS.contains(&column.name().as_str()) {
            columns.push(column.clone());
        }
    }

    DataFrame::new(columns)
}

/// Rewrite `|` list separators as `, ` in every column.
pub fn replace_list_separators(df: DataFrame) -> PolarsResult<DataFrame> {
    let exprs: Vec<Expr> = df
        .get_column_names()
        .iter()
        .map(|name| {
            let name_str: &str = name.as_ref();
            col(name_str)
                .cast(DataType::String)
                .str()
                .replace_all(lit("|"), lit(", "), true)
                .alias(name_str)
        })
        .collect();

    df.lazy().with_columns(exprs).collect()
}

pub fn write_output(results: &[CanonicalResult], metadata: &DataFrame, path: &Path) -> PolarsResult<()> {
    let merged = join_metadata(results, metadata)?;
    let mut merged = replace_list_separators(merged)?;
    info!(
        "Writing {} rows x {} columns to {}",
        merged.height(),
        merged.width(),
        path.display()
    );
    write_tsv(&mut merged, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn result(symbol: &str, transcript: Option<&str>) -> CanonicalResult {
        CanonicalResult {
            hgnc_symbol: symbol.to_string(),
            ensembl_canonical_gene: transcript.map(|_| "ENSG1".to_string()),
            ensembl_canonical_transcript: transcript.map(str::to_owned),
            genome_nexus_canonical_transcript: transcript.map(str::to_owned),
            uniprot_canonical_transcript: transcript.map(str::to_owned),
            mskcc_canonical_transcript: transcript.map(str::to_owned),
        }
    }

    #[test]
    fn joins_in_metadata_order_and_drops_superseded_columns() {
        let metadata = df![
            "hgnc_id" => &["HGNC:1", "HGNC:2", "HGNC:3"],
            "approved_symbol" => &["A1BG", "NAT2", "SKIPPED"],
            "approved_name" => &["alpha-1-B glycoprotein", "N-acetyltransferase 2", "x"],
            "ensembl_gene_id" => &[Some("ENSG1"), None, None],
            "synonyms" => &[Some("ABG|GAB"), None, None]
        ]
        .unwrap();
        let results = vec![result("NAT2", None), result("A1BG", Some("ENST1"))];

        let joined = join_metadata(&results, &metadata).unwrap();
        let names: Vec<&str> = joined.get_column_names().iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "hgnc_symbol",
                "ensembl_canonical_gene",
                "ensembl_canonical_transcript",
                "genome_nexus_canonical_transcript",
                "uniprot_canonical_transcript",
                "mskcc_canonical_transcript",
                "hgnc_id",
                "approved_name",
                "synonyms"
            ]
        );
        assert_eq!(
            str_values(&joined, "hgnc_symbol").unwrap(),
            vec![Some("A1BG".to_string()), Some("NAT2".to_string())]
        );
        assert_eq!(
            str_values(&joined, "mskcc_canonical_transcript").unwrap(),
            vec![Some("ENST1".to_string()), None]
        );

        let replaced = replace_list_separators(joined).unwrap();
        assert_eq!(
            str_values(&replaced, "synonyms").unwrap(),
            vec![Some("ABG, GAB".to_string()), None]
        );
    }

    #[test]
    fn writes_tab_separated_with_empty_unknowns() {
        let metadata = df![
            "approved_symbol" => &["A1BG"],
            "approved_name" => &["alpha|beta"],
            "ensembl_gene_id" => &["ENSG1"]
        ]
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut res = result("A1BG", Some("ENST1"));
        res.uniprot_canonical_transcript = None;

        write_output(&[res], &metadata, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines[0],
            "hgnc_symbol\tensembl_canonical_gene\tensembl_canonical_transcript\t\
             genome_nexus_canonical_transcript\tuniprot_canonical_transcript\t\
             mskcc_canonical_transcript\tapproved_name"
        );
        assert_eq!(lines[1], "A1BG\tENSG1\tENST1\tENST1\t\tENST1\talpha, beta");
        assert_eq!(lines.len(), 2);
    }
}
