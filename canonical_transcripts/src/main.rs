use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::PipelineConfig;
use crate::data_handling::hgnc::HgncDataset;
use crate::data_handling::isoform_overrides::{IsoformOverridesDataset, OverrideKind, OverrideSet, OverrideTable};
use crate::data_handling::reference_lists::{CancerGenes, IgnoredSymbols};
use crate::data_handling::transcript_info::TranscriptInfoDataset;
use crate::errors::Result;
use crate::merge::write_output;
use crate::models::Dataset;
use crate::resolver::Resolver;
use crate::validation::{validate, ValidationInputs};

mod config;
mod data_handling;
mod errors;
mod helper_functions;
mod merge;
mod models;
mod resolver;
mod validation;

/// Pick one canonical transcript per HGNC symbol from Ensembl BioMart data and
/// curated isoform overrides, and merge it with the HGNC gene metadata.
#[derive(Parser, Debug)]
#[command(name = "canonical_transcripts")]
struct Cli {
    /// Ensembl BioMart transcript info (e.g. tmp/ensembl_biomart_geneids.transcript_info.txt)
    ensembl_biomart_geneids_transcript_info: PathBuf,

    /// HGNC complete set (e.g. common_input/hgnc_complete_set_20210218.txt)
    hgnc_complete_set: PathBuf,

    /// Uniprot isoform overrides
    isoform_overrides_uniprot: PathBuf,

    /// MSKCC isoform overrides for the reference build
    isoform_overrides_at_mskcc: PathBuf,

    /// Genome Nexus isoform overrides
    isoform_overrides_genome_nexus: PathBuf,

    /// OncoKB isoform overrides
    isoform_overrides_at_oncokb: PathBuf,

    /// Output table (e.g. tmp/ensembl_biomart_canonical_transcripts_per_hgnc.txt)
    ensembl_biomart_canonical_transcripts_per_hgnc: PathBuf,

    /// JSON configuration file
    #[arg(long, env = "CANONICAL_TRANSCRIPTS_CONFIG")]
    config: Option<PathBuf>,

    /// Cancer gene list with a `Hugo Symbol` column, overrides the configuration
    #[arg(long)]
    cancer_genes: Option<PathBuf>,

    /// Ignored symbol list, overrides the configuration
    #[arg(long)]
    ignored_symbols: Option<PathBuf>,
}

fn load_overrides(kind: OverrideKind, path: &Path) -> Result<OverrideTable> {
    let dataset = IsoformOverridesDataset {
        kind,
        path: path.to_path_buf(),
    };
    let df = dataset.load()?;
    dataset.index(&df)
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.cancer_genes {
        config.cancer_genes_path = path.clone();
    }
    if let Some(path) = &cli.ignored_symbols {
        config.ignored_symbols_path = path.clone();
    }

    // Load inputs
    let transcript_info = TranscriptInfoDataset {
        path: cli.ensembl_biomart_geneids_transcript_info.clone(),
    };
    let transcripts = transcript_info.index(&transcript_info.load()?)?;

    let hgnc = HgncDataset {
        path: cli.hgnc_complete_set.clone(),
        column_renames: config.column_renames.clone(),
        withdrawn_marker: config.withdrawn_marker.clone(),
    };
    let hgnc_df = hgnc.load()?;
    let genes = hgnc.index(&hgnc_df)?;

    let overrides = OverrideSet {
        uniprot: load_overrides(OverrideKind::Uniprot, &cli.isoform_overrides_uniprot)?,
        mskcc: load_overrides(OverrideKind::Mskcc, &cli.isoform_overrides_at_mskcc)?,
        genome_nexus: load_overrides(OverrideKind::GenomeNexus, &cli.isoform_overrides_genome_nexus)?,
        oncokb: load_overrides(OverrideKind::Oncokb, &cli.isoform_overrides_at_oncokb)?,
    };

    let cancer_genes = CancerGenes {
        path: config.cancer_genes_path(),
    }
    .load()?;
    let ignored_symbols = IgnoredSymbols {
        path: config.ignored_symbols_path(),
    }
    .load()?;

    validate(&ValidationInputs {
        genes: &genes,
        transcripts: &transcripts,
        overrides: &overrides,
        cancer_genes: &cancer_genes,
        ignored_symbols: &ignored_symbols,
        config: &config,
    })?;

    // Resolve and write
    let resolver = Resolver::new(&genes, &transcripts, &overrides);
    let results = resolver.resolve_all(&genes.symbols())?;

    write_output(
        &results,
        &hgnc_df,
        &cli.ensembl_biomart_canonical_transcripts_per_hgnc,
    )?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Starting canonical transcript selection");

    run(&cli).context("canonical transcript selection failed")?;

    info!(
        "Wrote {}",
        cli.ensembl_biomart_canonical_transcripts_per_hgnc.display()
    );
    Ok(())
}
