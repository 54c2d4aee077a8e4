//! Genomic range type.
//!
//! This module provides the `GenomicRange` struct, the canonical form every
//! locus string is reduced to, along with the distance helpers used when
//! relating elements to genes and transcripts.

use std::fmt;

use crate::{RangeAnchor, Strand};

/// Error returned when a `GenomicRange` would violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// The chromosome name was empty.
    EmptyChromosome,
    /// The start coordinate lies after the end coordinate.
    StartAfterEnd {
        /// Offending start coordinate.
        start: u64,
        /// Offending end coordinate.
        end: u64,
    },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyChromosome => write!(f, "chromosome name is empty"),
            Self::StartAfterEnd { start, end } => {
                write!(f, "start {} is greater than end {}", start, end)
            }
        }
    }
}

impl std::error::Error for RangeError {}

/// A chromosome interval.
///
/// The chromosome is conventionally prefixed (`chr6`) but the prefix is not
/// validated. `start <= end` always holds for values built through
/// [`GenomicRange::new`].
///
/// # Examples
///
/// ```
/// use locus_types::GenomicRange;
///
/// let range = GenomicRange::new("chr6", 31_000_000, 31_100_000).unwrap();
/// assert_eq!(range.to_string(), "chr6:31000000-31100000");
/// assert_eq!(range.to_url_segment(), "chr6%3A31000000-31100000");
/// assert_eq!(range.len(), 100_000);
///
/// assert!(GenomicRange::new("chr6", 10, 5).is_err());
/// ```
///
/// With the `serde` feature, deserialization goes through
/// [`GenomicRange::new`], so a record with `start > end` or an empty
/// chromosome fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGenomicRange"))]
pub struct GenomicRange {
    /// Chromosome name, e.g. `chr6`.
    pub chromosome: String,
    /// Start coordinate.
    pub start: u64,
    /// End coordinate.
    pub end: u64,
}

/// Unvalidated wire form of a [`GenomicRange`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGenomicRange {
    chromosome: String,
    start: u64,
    end: u64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGenomicRange> for GenomicRange {
    type Error = RangeError;

    fn try_from(raw: RawGenomicRange) -> Result<Self, Self::Error> {
        GenomicRange::new(raw.chromosome, raw.start, raw.end)
    }
}

impl GenomicRange {
    /// Creates a range, rejecting an empty chromosome or `start > end`.
    pub fn new(chromosome: impl Into<String>, start: u64, end: u64) -> Result<Self, RangeError> {
        let chromosome = chromosome.into();
        if chromosome.is_empty() {
            return Err(RangeError::EmptyChromosome);
        }
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        Ok(Self {
            chromosome,
            start,
            end,
        })
    }

    /// Number of bases spanned (`end - start`).
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the range spans zero bases.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `position` lies within `[start, end]`.
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }

    /// Returns true if both ranges share a chromosome and at least one base.
    pub fn overlaps(&self, other: &GenomicRange) -> bool {
        self.chromosome == other.chromosome
            && self.start <= other.end
            && other.start <= self.end
    }

    /// Renders the range with the URL-encoded separator (`chr1%3A100-200`).
    pub fn to_url_segment(&self) -> String {
        format!("{}%3A{}-{}", self.chromosome, self.start, self.end)
    }

    /// Distance from the chosen anchor of this range to `point`.
    ///
    /// Returns 0 whenever the point lies inside the range, regardless of the
    /// anchor.
    ///
    /// ```
    /// use locus_types::{GenomicRange, RangeAnchor};
    ///
    /// let range = GenomicRange::new("chr1", 100, 200).unwrap();
    /// assert_eq!(range.distance_to_position(150, RangeAnchor::Start), 0.0);
    /// assert_eq!(range.distance_to_position(300, RangeAnchor::Start), 200.0);
    /// assert_eq!(range.distance_to_position(300, RangeAnchor::Middle), 150.0);
    /// assert_eq!(range.distance_to_position(300, RangeAnchor::Closest), 100.0);
    /// ```
    pub fn distance_to_position(&self, point: u64, anchor: RangeAnchor) -> f64 {
        if self.contains(point) {
            return 0.0;
        }

        let to_start = self.start.abs_diff(point) as f64;
        let to_end = self.end.abs_diff(point) as f64;
        let to_middle = ((self.start as f64 + self.end as f64) / 2.0 - point as f64).abs();

        match anchor {
            RangeAnchor::Start => to_start,
            RangeAnchor::End => to_end,
            RangeAnchor::Middle => to_middle,
            RangeAnchor::Closest => to_start.min(to_end).min(to_middle),
        }
    }

    /// Smallest distance between any two points of the ranges; 0 on overlap.
    ///
    /// Chromosomes are not compared.
    pub fn distance_to_range(&self, other: &GenomicRange) -> u64 {
        if self.end < other.start {
            other.start - self.end
        } else if other.end < self.start {
            self.start - other.end
        } else {
            0
        }
    }

    /// Distance to the nearest transcription start site among `transcripts`.
    ///
    /// The TSS is the transcript start on the `+` strand and its end on the
    /// `-` strand. Returns `None` when no transcripts are given.
    pub fn distance_to_tss<'a, I>(&self, transcripts: I, strand: Strand) -> Option<f64>
    where
        I: IntoIterator<Item = &'a GenomicRange>,
    {
        transcripts
            .into_iter()
            .map(|transcript| {
                let tss = match strand {
                    Strand::Forward => transcript.start,
                    Strand::Reverse => transcript.end,
                };
                self.distance_to_position(tss, RangeAnchor::Closest)
            })
            .reduce(f64::min)
    }
}

impl fmt::Display for GenomicRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}
