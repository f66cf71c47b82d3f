use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::info;

use crate::config::PipelineConfig;
use crate::data_handling::hgnc::GeneTable;
use crate::data_handling::isoform_overrides::OverrideSet;
use crate::data_handling::transcript_info::TranscriptTable;
use crate::errors::{PipelineError, Result};
use crate::helper_functions::lowercase_set;

/// At most this many offenders are listed in an assertion message.
const MAX_REPORTED: usize = 20;

pub struct ValidationInputs<'a> {
    pub genes: &'a GeneTable,
    pub transcripts: &'a TranscriptTable,
    pub overrides: &'a OverrideSet,
    pub cancer_genes: &'a HashSet<String>,
    pub ignored_symbols: &'a HashSet<String>,
    pub config: &'a PipelineConfig,
}

/// Run every integrity check; the first failing one aborts the run.
pub fn validate(inputs: &ValidationInputs) -> Result<()> {
    check_unique_symbols(inputs.genes)?;
    check_cancer_gene_ids(inputs.transcripts, inputs.cancer_genes)?;
    check_transcript_gene_ids(inputs.transcripts)?;
    check_cancer_genes_known(
        inputs.genes,
        inputs.cancer_genes,
        &inputs.config.legacy_cancer_gene_exceptions,
    )?;
    check_unknown_transcript_symbols(
        inputs.genes,
        inputs.transcripts,
        inputs.ignored_symbols,
        &inputs.config.rna_gene_prefixes,
    )?;
    if inputs.config.strict_overrides {
        check_unambiguous_overrides(inputs.overrides)?;
    }
    info!("All input assertions passed");
    Ok(())
}

fn sample<'a, I: IntoIterator<Item = &'a str>>(values: I) -> String {
    let values: Vec<&str> = values.into_iter().collect();
    let mut shown = values.iter().take(MAX_REPORTED).copied().collect::<Vec<_>>().join(", ");
    if values.len() > MAX_REPORTED {
        shown.push_str(&format!(", ... ({} total)", values.len()));
    }
    shown
}

/// Every HGNC row has an approved symbol and no symbol occurs twice.
pub fn check_unique_symbols(genes: &GeneTable) -> Result<()> {
    let missing = genes
        .records()
        .iter()
        .filter(|r| r.approved_symbol.is_none())
        .count();
    if missing > 0 {
        return Err(PipelineError::assertion(format!(
            "{} HGNC rows have no approved symbol",
            missing
        )));
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for symbol in genes.records().iter().filter_map(|r| r.approved_symbol.as_deref()) {
        *counts.entry(symbol).or_default() += 1;
    }
    let duplicated: Vec<&str> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(s, _)| s)
        .collect();
    if !duplicated.is_empty() {
        return Err(PipelineError::assertion(format!(
            "approved symbols are not unique: {}",
            sample(duplicated)
        )));
    }
    Ok(())
}

/// Among cancer-gene transcripts, each gene stable id carries a single symbol.
pub fn check_cancer_gene_ids(transcripts: &TranscriptTable, cancer_genes: &HashSet<String>) -> Result<()> {
    let mut symbols_per_gene: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for row in transcripts.records() {
        if let (Some(gene_id), Some(symbol)) = (row.gene_stable_id.as_deref(), row.hgnc_symbol.as_deref()) {
            if cancer_genes.contains(symbol) {
                symbols_per_gene.entry(gene_id).or_default().insert(symbol);
            }
        }
    }

    let conflicting: Vec<String> = symbols_per_gene
        .iter()
        .filter(|(_, symbols)| symbols.len() > 1)
        .map(|(gene_id, symbols)| {
            format!("{} -> {}", gene_id, symbols.iter().copied().collect::<Vec<_>>().join("/"))
        })
        .collect();
    if !conflicting.is_empty() {
        return Err(PipelineError::assertion(format!(
            "cancer gene stable ids map to several symbols: {}",
            sample(conflicting.iter().map(String::as_str))
        )));
    }
    Ok(())
}

/// Each transcript stable id belongs to exactly one gene stable id.
pub fn check_transcript_gene_ids(transcripts: &TranscriptTable) -> Result<()> {
    let mut genes_per_transcript: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for row in transcripts.records() {
        if let Some(transcript_id) = row.transcript_stable_id.as_deref() {
            let genes = genes_per_transcript.entry(transcript_id).or_default();
            if let Some(gene_id) = row.gene_stable_id.as_deref() {
                genes.insert(gene_id);
            }
        }
    }

    let offending: Vec<&str> = genes_per_transcript
        .iter()
        .filter(|(_, genes)| genes.len() != 1)
        .map(|(transcript_id, _)| *transcript_id)
        .collect();
    if !offending.is_empty() {
        return Err(PipelineError::assertion(format!(
            "transcript stable ids without exactly one gene stable id: {}",
            sample(offending)
        )));
    }
    Ok(())
}

/// Approved symbols, synonyms and previous symbols, lower-cased.
fn known_symbols(genes: &GeneTable) -> HashSet<String> {
    lowercase_set(
        genes
            .symbols()
            .into_iter()
            .chain(genes.synonyms())
            .chain(genes.previous_symbols()),
    )
}

/// Every cancer gene is known to HGNC, case-insensitively.
pub fn check_cancer_genes_known(
    genes: &GeneTable,
    cancer_genes: &HashSet<String>,
    exceptions: &[String],
) -> Result<()> {
    let known = known_symbols(genes);
    let exceptions = lowercase_set(exceptions.iter().map(String::as_str));

    let unknown: BTreeSet<String> = lowercase_set(cancer_genes.iter().map(String::as_str))
        .into_iter()
        .filter(|s| !exceptions.contains(s) && !known.contains(s))
        .collect();
    if !unknown.is_empty() {
        return Err(PipelineError::assertion(format!(
            "cancer genes missing from HGNC symbols, synonyms and previous symbols: {}",
            sample(unknown.iter().map(String::as_str))
        )));
    }
    Ok(())
}

/// Transcript-table symbols unknown to HGNC must all be explained by an RNA
/// family prefix or the ignore list.
pub fn check_unknown_transcript_symbols(
    genes: &GeneTable,
    transcripts: &TranscriptTable,
    ignored: &HashSet<String>,
    rna_prefixes: &[String],
) -> Result<()> {
    let known = known_symbols(genes);
    let annotated = lowercase_set(
        transcripts
            .records()
            .iter()
            .filter_map(|r| r.hgnc_symbol.as_deref()),
    );

    let unexplained: BTreeSet<String> = annotated
        .into_iter()
        .filter(|s| !known.contains(s))
        .filter(|s| !rna_prefixes.iter().any(|p| s.starts_with(p.as_str())))
        .filter(|s| !ignored.contains(s))
        .collect();
    if !unexplained.is_empty() {
        return Err(PipelineError::assertion(format!(
            "transcript symbols unknown to HGNC: {}",
            sample(unexplained.iter().map(String::as_str))
        )));
    }
    Ok(())
}

/// No override table lists a symbol more than once.
pub fn check_unambiguous_overrides(overrides: &OverrideSet) -> Result<()> {
    for table in overrides.tables() {
        let ambiguous = table.ambiguous_symbols();
        if !ambiguous.is_empty() {
            return Err(PipelineError::assertion(format!(
                "{} overrides list several transcripts for: {}",
                table.kind(),
                sample(ambiguous)
            )));
        }
    }
    Ok(())
}
