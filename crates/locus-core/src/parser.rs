//! Locus string parser.
//!
//! Reduces user-supplied locus strings to a canonical [`GenomicRange`].
//! Two grammars are accepted, tried in this order:
//!
//! 1. Tab-separated triple `chromosome<TAB>start<TAB>end`, as pasted from a
//!    spreadsheet or BED file. Thousands separators (`,`) in the numbers are
//!    stripped. Columns after the third are ignored.
//! 2. Delimited `chromosome:start-end`, where the separator may also be the
//!    URL-encoded `%3A`. The encoded form is checked first.
//!
//! Nothing is coerced: a non-numeric coordinate, an empty chromosome or
//! `start > end` is a [`LocusError::MalformedLocus`].

use locus_types::{well_known, GenomicRange, RangeError};

use crate::types::{LocusError, LocusResult, MalformedReason};

/// Parses a locus string into a [`GenomicRange`].
///
/// # Examples
///
/// ```
/// use locus_core::parse_range;
///
/// let plain = parse_range("chr6:31000000-31100000").unwrap();
/// let encoded = parse_range("chr6%3A31000000-31100000").unwrap();
/// let pasted = parse_range("chr6\t31,000,000\t31,100,000").unwrap();
///
/// assert_eq!(plain, encoded);
/// assert_eq!(plain, pasted);
/// assert!(parse_range("chr6:500-100").is_err());
/// ```
pub fn parse_range(input: &str) -> LocusResult<GenomicRange> {
    let line = input.trim_end_matches(|c: char| c == '\r' || c == '\n');

    if line.trim().is_empty() {
        return Err(LocusError::malformed(input, MalformedReason::Empty));
    }

    if line.contains('\t') {
        return parse_tab_separated(input, line);
    }

    let encoded = [well_known::ENCODED_COLON, "%3a"]
        .into_iter()
        .find(|sep| line.contains(*sep));

    match encoded {
        Some(sep) => parse_delimited(input, line, sep),
        None if line.contains(':') => parse_delimited(input, line, ":"),
        None => Err(LocusError::malformed(input, MalformedReason::MissingSeparator)),
    }
}

/// Strips the version suffix from an Ensembl id.
///
/// ```
/// use locus_core::strip_version;
///
/// assert_eq!(strip_version("ENSG00000141510.17"), "ENSG00000141510");
/// assert_eq!(strip_version("ENSG00000141510"), "ENSG00000141510");
/// ```
pub fn strip_version(id: &str) -> &str {
    match id.split_once(well_known::ENSEMBL_VERSION_SEPARATOR) {
        Some((base, _)) => base,
        None => id,
    }
}

fn parse_tab_separated(input: &str, line: &str) -> LocusResult<GenomicRange> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        return Err(LocusError::malformed(
            input,
            MalformedReason::TabFieldCount {
                found: fields.len(),
            },
        ));
    }

    let start = parse_coordinate(input, "start", &fields[1].replace(',', ""))?;
    let end = parse_coordinate(input, "end", &fields[2].replace(',', ""))?;
    build_range(input, fields[0], start, end)
}

fn parse_delimited(input: &str, line: &str, separator: &str) -> LocusResult<GenomicRange> {
    let (chromosome, pair) = line
        .split_once(separator)
        .ok_or_else(|| LocusError::malformed(input, MalformedReason::MissingSeparator))?;

    let (start, end) = pair.split_once('-').ok_or_else(|| {
        LocusError::malformed(
            input,
            MalformedReason::MissingDash {
                pair: pair.to_string(),
            },
        )
    })?;

    let start = parse_coordinate(input, "start", start)?;
    let end = parse_coordinate(input, "end", end)?;
    build_range(input, chromosome, start, end)
}

fn parse_coordinate(input: &str, field: &'static str, token: &str) -> LocusResult<u64> {
    let token = token.trim();
    let non_numeric = || {
        LocusError::malformed(
            input,
            MalformedReason::NonNumeric {
                field,
                token: token.to_string(),
            },
        )
    };
    // u64::from_str takes a leading '+'
    if !token.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(non_numeric());
    }
    token.parse::<u64>().map_err(|_| non_numeric())
}

fn build_range(input: &str, chromosome: &str, start: u64, end: u64) -> LocusResult<GenomicRange> {
    GenomicRange::new(chromosome.trim(), start, end).map_err(|e| {
        let reason = match e {
            RangeError::EmptyChromosome => MalformedReason::EmptyChromosome,
            RangeError::StartAfterEnd { start, end } => MalformedReason::StartAfterEnd { start, end },
        };
        LocusError::malformed(input, reason)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason_of(input: &str) -> MalformedReason {
        match parse_range(input) {
            Err(LocusError::MalformedLocus { reason, .. }) => reason,
            other => panic!("expected MalformedLocus for {:?}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_delimited_and_encoded_agree() {
        for (plain, encoded) in [
            ("chr1:100-200", "chr1%3A100-200"),
            ("chrX:0-0", "chrX%3A0-0"),
            ("chr6:31000000-31100000", "chr6%3a31000000-31100000"),
        ] {
            assert_eq!(parse_range(plain).unwrap(), parse_range(encoded).unwrap());
        }
    }

    #[test]
    fn test_tab_separated_with_grouping() {
        let range = parse_range("chr1\t1,000\t2,000").unwrap();
        assert_eq!(range, GenomicRange::new("chr1", 1000, 2000).unwrap());

        // trailing newline and extra BED columns
        let range = parse_range("chr2\t5\t10\tpeak_1\t0\n").unwrap();
        assert_eq!(range, GenomicRange::new("chr2", 5, 10).unwrap());
    }

    #[test]
    fn test_tab_checked_before_colon() {
        let range = parse_range("chr1\t100\t200").unwrap();
        assert_eq!(range.chromosome, "chr1");
        assert_eq!(
            reason_of("chr1:100\t200"),
            MalformedReason::TabFieldCount { found: 2 }
        );
    }

    #[test]
    fn test_rejects_start_after_end() {
        assert_eq!(
            reason_of("chr1:500-100"),
            MalformedReason::StartAfterEnd { start: 500, end: 100 }
        );
        assert_eq!(
            reason_of("chr1\t500\t100"),
            MalformedReason::StartAfterEnd { start: 500, end: 100 }
        );
    }

    #[test]
    fn test_rejects_missing_separator() {
        assert_eq!(reason_of("chr1-500-100"), MalformedReason::MissingSeparator);
        assert_eq!(reason_of("   "), MalformedReason::Empty);
    }

    #[test]
    fn test_rejects_missing_dash_and_empty_chromosome() {
        assert_eq!(
            reason_of("chr1:500"),
            MalformedReason::MissingDash {
                pair: "500".to_string()
            }
        );
        assert_eq!(reason_of(":1-2"), MalformedReason::EmptyChromosome);
        assert_eq!(reason_of("\t1\t2"), MalformedReason::EmptyChromosome);
    }

    #[test]
    fn test_rejects_non_numeric_instead_of_zero() {
        assert_eq!(
            reason_of("chr1:abc-200"),
            MalformedReason::NonNumeric {
                field: "start",
                token: "abc".to_string()
            }
        );
        assert_eq!(
            reason_of("chr1:100-"),
            MalformedReason::NonNumeric {
                field: "end",
                token: String::new()
            }
        );
        // grouping separators are only stripped in the tab form
        assert_eq!(
            reason_of("chr1:1,000-2,000"),
            MalformedReason::NonNumeric {
                field: "start",
                token: "1,000".to_string()
            }
        );
        assert!(matches!(
            reason_of("chr1:-5-10"),
            MalformedReason::NonNumeric { field: "start", .. }
        ));
    }

    #[test]
    fn test_rejects_signed_coordinates() {
        assert_eq!(
            reason_of("chr1:+5-10"),
            MalformedReason::NonNumeric {
                field: "start",
                token: "+5".to_string()
            }
        );
        assert_eq!(
            reason_of("chr1%3A5-+10"),
            MalformedReason::NonNumeric {
                field: "end",
                token: "+10".to_string()
            }
        );
        assert_eq!(
            reason_of("chr1\t+5\t10"),
            MalformedReason::NonNumeric {
                field: "start",
                token: "+5".to_string()
            }
        );
    }

    #[test]
    fn test_strip_version() {
        assert_eq!(strip_version("ENSG00000185591.9"), "ENSG00000185591");
        assert_eq!(strip_version(""), "");
    }
}
