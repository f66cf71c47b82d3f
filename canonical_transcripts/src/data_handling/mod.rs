pub mod hgnc;
pub mod isoform_overrides;
pub mod reference_lists;
pub mod transcript_info;
