//! CSV export for spreadsheet tools.
//!
//! The file is UTF-8 with a byte-order marker so Excel detects the encoding
//! of Korean text. The header row is always written, even for an empty run.

use crate::error::ExportError;
use crate::models::{COLUMNS, NormalizedRecord, SearchCriteria};
use crate::utils::sanitize_file_component;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// UTF-8 byte-order marker.
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Export path for a run: `{dir}/naver_news_RESULTS_{query}_{start}_{end}.csv`.
pub fn output_path(dir: &Path, criteria: &SearchCriteria) -> PathBuf {
    dir.join(format!(
        "naver_news_RESULTS_{}_{}_{}.csv",
        sanitize_file_component(criteria.query()),
        criteria.start().format("%Y%m%d"),
        criteria.end().format("%Y%m%d"),
    ))
}

/// Serialize `records` to CSV bytes, BOM and header included.
pub fn to_csv_bytes(records: &[NormalizedRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BOM.to_vec());

    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.error().to_string()))
}

/// Write `records` to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(records: &[NormalizedRecord], path: &Path) -> Result<(), ExportError> {
    let bytes = to_csv_bytes(records)?;
    fs::write(path, bytes).await?;
    info!("Wrote CSV export");
    Ok(())
}
