//! BED-style batch input.
//!
//! Each line is a tab-delimited `chromosome start end [...]` record; extra
//! columns are ignored. A single-column `chr:start-end` line is accepted as
//! well. Blank lines, `#` comments and `track`/`browser` header lines are
//! skipped.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use locus_core::parse_range;
use locus_types::GenomicRange;
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

const HEADER_PREFIXES: &[&str] = &["track", "browser"];

/// Reads every range from a BED file.
///
/// # Errors
/// Returns an error if the file cannot be read or a line is not a valid locus.
pub fn read_bed_path<P: AsRef<Path>>(path: P) -> ServiceResult<Vec<GenomicRange>> {
    let reader = builder().from_path(path.as_ref())?;
    collect_ranges(reader)
}

/// Reads every range from BED-formatted input.
pub fn read_bed<R: Read>(reader: R) -> ServiceResult<Vec<GenomicRange>> {
    collect_ranges(builder().from_reader(reader))
}

fn builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::None);
    builder
}

fn collect_ranges<R: Read>(mut reader: csv::Reader<R>) -> ServiceResult<Vec<GenomicRange>> {
    let mut ranges = Vec::new();
    let mut record = StringRecord::new();
    let mut skipped = 0usize;

    while reader.read_record(&mut record)? {
        if is_blank_or_header(&record) {
            skipped += 1;
            continue;
        }

        let line = record.iter().collect::<Vec<_>>().join("\t");
        let range = parse_range(&line).map_err(|source| ServiceError::BatchLine {
            line: record.position().map_or(0, |p| p.line()),
            source,
        })?;
        ranges.push(range);
    }

    debug!("read {} ranges, skipped {} lines", ranges.len(), skipped);
    Ok(ranges)
}

fn is_blank_or_header(record: &StringRecord) -> bool {
    match record.get(0) {
        None => true,
        Some(first) => {
            (record.len() == 1 && first.trim().is_empty())
                || HEADER_PREFIXES.iter().any(|p| first.starts_with(p))
        }
    }
}
