use std::collections::HashSet;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use crate::errors::{PipelineError, Result};
use crate::models::polars_err;

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// Absolute paths are returned unchanged, relative ones are joined onto [`project_root`].
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root().join(path)
    }
}

/// Read a tab-separated file with a header row. Every column is read as a string
/// and empty cells become null.
pub fn read_tsv(path: &Path) -> PolarsResult<DataFrame> {
    if !path.exists() {
        return Err(polars_err(
            format!("input file not found: {}", path.display()).into(),
        ));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|mut o| {
            o.separator = b'\t';
            o.truncate_ragged_lines = true;
            o
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!("Read {} with shape {:?}", path.display(), df.shape());
    Ok(df)
}

/// Write a frame tab-separated with a single header row; nulls become empty cells.
pub fn write_tsv(df: &mut DataFrame, path: &Path) -> PolarsResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b'\t')
        .finish(df)
}

/// Owned values of a string column.
pub fn str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

/// Like [`str_values`], but a missing column yields all-null values.
pub fn optional_str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    if has_column(df, name) {
        str_values(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Split a `|`-separated HGNC list cell, dropping surrounding quotes.
pub fn split_list(cell: Option<&str>) -> Vec<String> {
    match cell {
        None => Vec::new(),
        Some(raw) => raw
            .trim_matches('"')
            .split('|')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
    }
}

pub fn lowercase_set<'a, I>(values: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().map(str::to_lowercase).collect()
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Values of one named column of a tab-separated file with a header row.
pub fn read_symbol_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(open(path)?);

    let idx = reader
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| {
            PipelineError::assertion(format!(
                "column '{}' missing from {}",
                column,
                path.display()
            ))
        })?;

    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(idx).map(str::trim).filter(|v| !v.is_empty()) {
            symbols.push(value.to_string());
        }
    }
    Ok(symbols)
}

/// One value per line; blank lines and lines starting with `#` are skipped.
pub fn read_symbol_lines(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(open(path)?);

    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(0).map(str::trim).filter(|v| !v.is_empty()) {
            symbols.push(value.to_string());
        }
    }
    Ok(symbols)
}
