use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::errors::ExportError;
use crate::listing_structs::{BatchOutcome, FailedListing};

pub(crate) fn export_file_name(property_type: &str, start: usize, end: usize) -> String {
    format!("century_data_{property_type}_{start}-{end}.json")
}

pub(crate) fn report_file_name(property_type: &str, start: usize, end: usize) -> String {
    format!("century_invalid_{property_type}_{start}-{end}.json")
}

/// Written next to the export when a run saw invalid or failed URLs.
#[derive(Debug, Serialize)]
pub(crate) struct RunReport<'a> {
    pub(crate) generated_at: DateTime<Local>,
    pub(crate) property_type: &'a str,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) invalid_urls: &'a [String],
    pub(crate) failed: &'a [FailedListing],
}

/// Writes `results` as a 4-space indented JSON document and returns its path.
pub(crate) fn export_results<S: Serialize + ?Sized>(
    results: &S,
    out_dir: &Path,
    property_type: &str,
    start: usize,
    end: usize,
) -> Result<PathBuf, ExportError> {
    let path = out_dir.join(export_file_name(property_type, start, end));
    write_pretty(&path, results)?;
    Ok(path)
}

/// Writes the run report, or nothing when every probe succeeded.
pub(crate) fn export_report(
    batch: &BatchOutcome,
    out_dir: &Path,
    property_type: &str,
    start: usize,
    end: usize,
) -> Result<Option<PathBuf>, ExportError> {
    if !batch.has_problems() {
        return Ok(None);
    }

    let report = RunReport {
        generated_at: Local::now(),
        property_type,
        start,
        end,
        invalid_urls: &batch.invalid_urls,
        failed: &batch.failed,
    };
    let path = out_dir.join(report_file_name(property_type, start, end));
    write_pretty(&path, &report)?;
    Ok(Some(path))
}

fn write_pretty<S: Serialize + ?Sized>(path: &Path, value: &S) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}
