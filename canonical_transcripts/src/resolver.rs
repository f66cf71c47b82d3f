//! Canonical transcript resolution.
//!
//! The ensembl canonical answer comes from the BioMart transcript table, first
//! through the gene id HGNC assigns to a symbol and then through the symbol the
//! table itself carries. Curated override tables are consulted in a fixed,
//! column-specific order before falling back to that answer.

use tracing::{debug, info};

use crate::data_handling::hgnc::GeneTable;
use crate::data_handling::isoform_overrides::{OverrideKind, OverrideSet, OverrideTable};
use crate::data_handling::transcript_info::TranscriptTable;
use crate::errors::{PipelineError, Result};
use crate::models::{CanonicalResult, TranscriptField, TranscriptRecord};

/// Anything that can propose a transcript id for a symbol.
pub trait CanonicalSource {
    fn name(&self) -> String;

    fn resolve(&self, symbol: &str) -> Result<Option<String>>;
}

impl CanonicalSource for OverrideTable {
    fn name(&self) -> String {
        format!("{} overrides", self.kind())
    }

    fn resolve(&self, symbol: &str) -> Result<Option<String>> {
        Ok(self.first(symbol).map(str::to_owned))
    }
}

/// Ordered sources; the first one with an answer wins.
pub struct ResolverChain<'a> {
    sources: Vec<&'a dyn CanonicalSource>,
}

impl<'a> ResolverChain<'a> {
    pub fn new(sources: Vec<&'a dyn CanonicalSource>) -> Self {
        Self { sources }
    }

    pub fn resolve(&self, symbol: &str) -> Result<Option<String>> {
        for source in &self.sources {
            if let Some(transcript) = source.resolve(symbol)? {
                debug!("{} resolved by {}", symbol, source.name());
                return Ok(Some(transcript));
            }
        }
        Ok(None)
    }
}

/// Sort key of a transcript row, larger is preferred. `None` sorts lowest.
fn rank(row: &TranscriptRecord) -> (bool, Option<u32>, Option<&str>) {
    (row.is_canonical, row.protein_length, row.gene_stable_id.as_deref())
}

/// Pick `field` from the canonical row among `rows`: canonical flag first, then
/// protein length, then gene stable id. Full ties go to the earliest row.
pub fn pick_canonical<'r>(rows: &[&'r TranscriptRecord], field: TranscriptField) -> Option<&'r str> {
    let best = match rows {
        [] => return None,
        [only] => *only,
        [first, rest @ ..] => rest
            .iter()
            .fold(*first, |best, row| if rank(row) > rank(best) { *row } else { best }),
    };
    best.field(field)
}

/// The default, annotation-derived canonical choice.
pub struct EnsemblCanonical<'a> {
    genes: &'a GeneTable,
    transcripts: &'a TranscriptTable,
}

impl<'a> EnsemblCanonical<'a> {
    pub fn new(genes: &'a GeneTable, transcripts: &'a TranscriptTable) -> Self {
        Self { genes, transcripts }
    }

    /// Resolve `field` for `symbol` via its HGNC ensembl gene id, falling back to
    /// the transcript table's own symbol column.
    pub fn lookup(&self, symbol: &str, field: TranscriptField) -> Result<Option<String>> {
        let gene = match self.genes.by_symbol(symbol).as_slice() {
            [] => return Err(PipelineError::UnknownSymbol(symbol.to_string())),
            [gene] => *gene,
            _ => {
                return Err(PipelineError::assertion(format!(
                    "one hugo symbol expected in HGNC data, found several rows for {}",
                    symbol
                )))
            }
        };

        let by_gene = gene
            .ensembl_gene_id
            .as_deref()
            .map(|id| self.transcripts.by_gene_id(id))
            .unwrap_or_default();
        if let Some(value) = pick_canonical(&by_gene, field) {
            return Ok(Some(value.to_string()));
        }

        let by_symbol = self.transcripts.by_symbol(symbol);
        Ok(pick_canonical(&by_symbol, field).map(str::to_owned))
    }
}

impl CanonicalSource for EnsemblCanonical<'_> {
    fn name(&self) -> String {
        "ensembl canonical".to_string()
    }

    fn resolve(&self, symbol: &str) -> Result<Option<String>> {
        self.lookup(symbol, TranscriptField::TranscriptStableId)
    }
}

/// Output columns backed by override tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideColumn {
    GenomeNexus,
    Uniprot,
    Mskcc,
}

impl OverrideColumn {
    /// Override tables to try, highest priority first.
    pub fn priority(&self) -> &'static [OverrideKind] {
        match self {
            OverrideColumn::GenomeNexus => &[OverrideKind::GenomeNexus],
            OverrideColumn::Uniprot => &[OverrideKind::Uniprot, OverrideKind::GenomeNexus],
            OverrideColumn::Mskcc => &[
                OverrideKind::Oncokb,
                OverrideKind::Mskcc,
                OverrideKind::Uniprot,
                OverrideKind::GenomeNexus,
            ],
        }
    }
}

pub struct Resolver<'a> {
    ensembl: EnsemblCanonical<'a>,
    overrides: &'a OverrideSet,
}

impl<'a> Resolver<'a> {
    pub fn new(genes: &'a GeneTable, transcripts: &'a TranscriptTable, overrides: &'a OverrideSet) -> Self {
        Self {
            ensembl: EnsemblCanonical::new(genes, transcripts),
            overrides,
        }
    }

    /// Override tables for `column` in priority order, ending with the ensembl canonical transcript.
    pub fn chain(&self, column: OverrideColumn) -> ResolverChain<'_> {
        let mut sources: Vec<&dyn CanonicalSource> = column
            .priority()
            .iter()
            .map(|&kind| self.overrides.get(kind) as &dyn CanonicalSource)
            .collect();
        sources.push(&self.ensembl);
        ResolverChain::new(sources)
    }

    pub fn resolve(&self, symbol: &str) -> Result<CanonicalResult> {
        Ok(CanonicalResult {
            hgnc_symbol: symbol.to_string(),
            ensembl_canonical_gene: self.ensembl.lookup(symbol, TranscriptField::GeneStableId)?,
            ensembl_canonical_transcript: self
                .ensembl
                .lookup(symbol, TranscriptField::TranscriptStableId)?,
            genome_nexus_canonical_transcript: self.chain(OverrideColumn::GenomeNexus).resolve(symbol)?,
            uniprot_canonical_transcript: self.chain(OverrideColumn::Uniprot).resolve(symbol)?,
            mskcc_canonical_transcript: self.chain(OverrideColumn::Mskcc).resolve(symbol)?,
        })
    }

    pub fn resolve_all(&self, symbols: &[&str]) -> Result<Vec<CanonicalResult>> {
        info!("Resolving canonical transcripts for {} symbols", symbols.len());
        let results = symbols
            .iter()
            .map(|symbol| self.resolve(symbol))
            .collect::<Result<Vec<_>>>()?;

        let unresolved = results
            .iter()
            .filter(|r| r.ensembl_canonical_transcript.is_none())
            .count();
        info!("{} symbols have no ensembl canonical transcript", unresolved);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneRecord, OverrideRecord};

    fn gene(symbol: &str, ensembl: Option<&str>) -> GeneRecord {
        GeneRecord {
            approved_symbol: Some(symbol.to_string()),
            ensembl_gene_id: ensembl.map(str::to_owned),
            ..Default::default()
        }
    }

    fn transcript(
        symbol: Option<&str>,
        gene_id: &str,
        transcript_id: &str,
        is_canonical: bool,
        protein_length: Option<u32>,
    ) -> TranscriptRecord {
        TranscriptRecord {
            hgnc_symbol: symbol.map(str::to_owned),
            gene_stable_id: Some(gene_id.to_string()),
            transcript_stable_id: Some(transcript_id.to_string()),
            is_canonical,
            protein_length,
        }
    }

    fn overrides(kind: OverrideKind, rows: &[(&str, &str)]) -> OverrideTable {
        OverrideTable::from_records(
            kind,
            rows.iter()
                .map(|&(s, t)| OverrideRecord {
                    gene_name: s.to_string(),
                    isoform_override: t.to_string(),
                })
                .collect(),
        )
    }

    fn empty_overrides() -> OverrideSet {
        OverrideSet {
            uniprot: overrides(OverrideKind::Uniprot, &[]),
            mskcc: overrides(OverrideKind::Mskcc, &[]),
            genome_nexus: overrides(OverrideKind::GenomeNexus, &[]),
            oncokb: overrides(OverrideKind::Oncokb, &[]),
        }
    }

    #[test]
    fn canonical_flag_beats_protein_length() {
        let genes = GeneTable::from_records(vec![gene("ABC1", Some("ENSG1"))]);
        let transcripts = TranscriptTable::from_records(vec![
            transcript(Some("ABC1"), "ENSG1", "ENST1", true, Some(100)),
            transcript(Some("ABC1"), "ENSG1", "ENST2", false, Some(500)),
        ]);
        let ensembl = EnsemblCanonical::new(&genes, &transcripts);
        assert_eq!(
            ensembl.lookup("ABC1", TranscriptField::TranscriptStableId).unwrap().as_deref(),
            Some("ENST1")
        );
        assert_eq!(
            ensembl.lookup("ABC1", TranscriptField::GeneStableId).unwrap().as_deref(),
            Some("ENSG1")
        );
    }

    #[test]
    fn protein_length_then_gene_id_then_row_order() {
        let a = transcript(None, "ENSG1", "ENST1", false, None);
        let b = transcript(None, "ENSG1", "ENST2", false, Some(300));
        let c = transcript(None, "ENSG2", "ENST3", false, Some(300));
        let d = transcript(None, "ENSG2", "ENST4", false, Some(300));
        assert_eq!(pick_canonical(&[&a, &b], TranscriptField::TranscriptStableId), Some("ENST2"));
        assert_eq!(pick_canonical(&[&b, &c], TranscriptField::TranscriptStableId), Some("ENST3"));
        assert_eq!(pick_canonical(&[&c, &d], TranscriptField::TranscriptStableId), Some("ENST3"));
        assert_eq!(pick_canonical(&[], TranscriptField::TranscriptStableId), None);
    }

    #[test]
    fn falls_back_to_symbol_lookup() {
        let genes = GeneTable::from_records(vec![
            gene("NSD3", Some("ENSG_RETIRED")),
            gene("NOGENE", None),
        ]);
        let transcripts = TranscriptTable::from_records(vec![
            transcript(Some("NSD3"), "ENSG9", "ENST9", false, Some(10)),
            transcript(Some("NOGENE"), "ENSG8", "ENST8", true, None),
        ]);
        let ensembl = EnsemblCanonical::new(&genes, &transcripts);
        assert_eq!(
            ensembl.lookup("NSD3", TranscriptField::TranscriptStableId).unwrap().as_deref(),
            Some("ENST9")
        );
        assert_eq!(
            ensembl.lookup("NOGENE", TranscriptField::GeneStableId).unwrap().as_deref(),
            Some("ENSG8")
        );
    }

    #[test]
    fn missing_field_on_gene_match_falls_back() {
        let genes = GeneTable::from_records(vec![gene("ABC1", Some("ENSG1"))]);
        let mut blank = transcript(Some("OTHER"), "ENSG1", "ENST1", true, None);
        blank.transcript_stable_id = None;
        let transcripts = TranscriptTable::from_records(vec![
            blank,
            transcript(Some("ABC1"), "ENSG2", "ENST2", false, None),
        ]);
        let ensembl = EnsemblCanonical::new(&genes, &transcripts);
        assert_eq!(
            ensembl.lookup("ABC1", TranscriptField::TranscriptStableId).unwrap().as_deref(),
            Some("ENST2")
        );
    }

    #[test]
    fn unresolvable_symbol_is_absent_and_unknown_symbol_errors() {
        let genes = GeneTable::from_records(vec![gene("LONELY", Some("ENSG1"))]);
        let transcripts = TranscriptTable::default();
        let ensembl = EnsemblCanonical::new(&genes, &transcripts);
        assert_eq!(ensembl.lookup("LONELY", TranscriptField::TranscriptStableId).unwrap(), None);
        assert!(matches!(
            ensembl.lookup("MISSING", TranscriptField::TranscriptStableId),
            Err(PipelineError::UnknownSymbol(s)) if s == "MISSING"
        ));
    }

    #[test]
    fn duplicate_metadata_symbol_is_fatal() {
        let genes = GeneTable::from_records(vec![gene("DUP", Some("ENSG1")), gene("DUP", Some("ENSG2"))]);
        let transcripts = TranscriptTable::default();
        let ensembl = EnsemblCanonical::new(&genes, &transcripts);
        assert!(matches!(
            ensembl.lookup("DUP", TranscriptField::GeneStableId),
            Err(PipelineError::FatalAssertion(_))
        ));
    }

    #[test]
    fn override_precedence_per_column() {
        let genes = GeneTable::from_records(vec![gene("KRAS", Some("ENSG1")), gene("TP53", Some("ENSG2"))]);
        let transcripts = TranscriptTable::from_records(vec![
            transcript(Some("KRAS"), "ENSG1", "ENST_ENS_KRAS", true, Some(189)),
            transcript(Some("TP53"), "ENSG2", "ENST_ENS_TP53", true, Some(393)),
        ]);
        let set = OverrideSet {
            uniprot: overrides(OverrideKind::Uniprot, &[("KRAS", "ENST_UNI")]),
            mskcc: overrides(OverrideKind::Mskcc, &[("KRAS", "ENST_MSK")]),
            genome_nexus: overrides(OverrideKind::GenomeNexus, &[("KRAS", "ENST_GN")]),
            oncokb: overrides(OverrideKind::Oncokb, &[]),
        };
        let resolver = Resolver::new(&genes, &transcripts, &set);

        let kras = resolver.resolve("KRAS").unwrap();
        assert_eq!(kras.genome_nexus_canonical_transcript.as_deref(), Some("ENST_GN"));
        assert_eq!(kras.uniprot_canonical_transcript.as_deref(), Some("ENST_UNI"));
        assert_eq!(kras.mskcc_canonical_transcript.as_deref(), Some("ENST_MSK"));
        assert_eq!(kras.ensembl_canonical_transcript.as_deref(), Some("ENST_ENS_KRAS"));

        let tp53 = resolver.resolve("TP53").unwrap();
        for value in &tp53.values()[1..] {
            assert_eq!(*value, Some("ENST_ENS_TP53"));
        }
    }

    #[test]
    fn ambiguous_override_uses_first_row() {
        let genes = GeneTable::from_records(vec![gene("BRAF", None)]);
        let transcripts = TranscriptTable::default();
        let mut set = empty_overrides();
        set.oncokb = overrides(OverrideKind::Oncokb, &[("BRAF", "ENST_A"), ("BRAF", "ENST_B")]);
        let resolver = Resolver::new(&genes, &transcripts, &set);

        let braf = resolver.resolve("BRAF").unwrap();
        assert_eq!(braf.mskcc_canonical_transcript.as_deref(), Some("ENST_A"));
        assert_eq!(braf.uniprot_canonical_transcript, None);
        assert_eq!(braf.ensembl_canonical_gene, None);
    }
}
