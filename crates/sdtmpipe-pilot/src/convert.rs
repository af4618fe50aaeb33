//! Existence-check → load → coerce → write pipeline for pilot domains

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use sdtmpipe_core::{fetch_bytes, url_exists};

use crate::source::{SourceConfig, SourceRevision};
use crate::table::{DomainTable, to_domain_table};
use crate::xpt;

/// Outcome of a conversion attempt.
///
/// Soft failures are values, not errors; the caller decides whether to
/// log, retry, or abort a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    Written { path: PathBuf, rows: usize },
    NoSourceData { url: String },
    MissingOutputDir { dir: PathBuf },
}

/// Converts remote pilot transport files into local CSV files.
pub struct PilotConverter {
    sources: SourceConfig,
}

impl PilotConverter {
    pub fn new(sources: SourceConfig) -> Self {
        Self { sources }
    }

    /// Fetch and parse one domain.
    ///
    /// `Ok(None)` when the revision publishes no transport file for the
    /// domain; transport and parse failures are hard errors.
    pub fn load_domain(
        &self,
        domain: &str,
        revision: SourceRevision,
    ) -> Result<Option<DomainTable>> {
        let url = self.sources.dataset_url(revision, domain);
        if !url_exists(&url).with_context(|| format!("checking {url}"))? {
            log::debug!("no transport file at {url}");
            return Ok(None);
        }
        let bytes = fetch_bytes(&url).with_context(|| format!("downloading {url}"))?;
        let dataset = xpt::read_xpt(&bytes).with_context(|| format!("parsing {url}"))?;
        let table = to_domain_table(dataset)?;
        log::debug!("loaded {} rows for {domain} from {url}", table.num_rows());
        Ok(Some(table))
    }

    /// Convert one domain to `output_dir/{domain}.csv` (lower-cased,
    /// header row, no index column).
    pub fn convert_domain(
        &self,
        domain: &str,
        revision: SourceRevision,
        output_dir: &Path,
    ) -> Result<ConvertOutcome> {
        let table = match self.load_domain(domain, revision)? {
            Some(table) => table,
            None => {
                return Ok(ConvertOutcome::NoSourceData {
                    url: self.sources.dataset_url(revision, domain),
                });
            }
        };
        if !output_dir.is_dir() {
            return Ok(ConvertOutcome::MissingOutputDir {
                dir: output_dir.to_path_buf(),
            });
        }
        let path = output_dir.join(format!("{}.csv", domain.to_lowercase()));
        let rows = write_csv(&table, &path)?;
        Ok(ConvertOutcome::Written { path, rows })
    }
}

/// Write a table as CSV with a header row, via tmp-file-then-rename.
pub fn write_csv(table: &DomainTable, path: &Path) -> Result<usize> {
    let tmp_path = path.with_extension("csv.tmp");
    let file =
        File::create(&tmp_path).with_context(|| format!("creating {}", tmp_path.display()))?;
    let mut writer = arrow::csv::WriterBuilder::new().with_header(true).build(file);
    writer
        .write(&table.batch)
        .with_context(|| format!("writing {}", tmp_path.display()))?;
    drop(writer);
    fs::rename(&tmp_path, path).with_context(|| format!("renaming to {}", path.display()))?;
    Ok(table.batch.num_rows())
}
