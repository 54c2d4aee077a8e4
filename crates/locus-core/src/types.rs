//! Error and configuration types shared across locus resolution.

use std::fmt;

use locus_types::well_known;
use thiserror::Error;

use crate::query::{ExecutorError, Operation};

/// Reasons a locus string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// Input was empty or whitespace.
    #[error("input is empty")]
    Empty,

    /// Neither a tab, `:` nor `%3A` separates the chromosome from the coordinates.
    #[error("expected 'chromosome:start-end' or a tab-separated triple")]
    MissingSeparator,

    /// The coordinate pair has no `-`.
    #[error("coordinate pair '{pair}' has no '-'")]
    MissingDash {
        /// The coordinate text after the separator.
        pair: String,
    },

    /// A tab-separated line has fewer than three fields.
    #[error("expected 3 tab-separated fields, found {found}")]
    TabFieldCount {
        /// Number of fields present.
        found: usize,
    },

    /// The chromosome token is empty.
    #[error("chromosome is empty")]
    EmptyChromosome,

    /// A coordinate token is not a non-negative integer.
    #[error("{field} '{token}' is not a valid coordinate")]
    NonNumeric {
        /// Which coordinate (`start` or `end`).
        field: &'static str,
        /// The offending token.
        token: String,
    },

    /// Start lies after end.
    #[error("start {start} is greater than end {end}")]
    StartAfterEnd {
        /// Parsed start.
        start: u64,
        /// Parsed end.
        end: u64,
    },
}

/// Which stage of a dependent query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStage {
    /// The primary (element) query.
    Primary,
    /// The secondary (cross-reference) query.
    Secondary,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Errors that can occur while resolving or aggregating loci.
#[derive(Error, Debug)]
pub enum LocusError {
    /// Input string matches no supported locus grammar.
    #[error("malformed locus '{input}': {reason}")]
    MalformedLocus {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: MalformedReason,
    },

    /// A query spec supplied both or neither of name and coordinates.
    #[error("invalid query spec: {0}")]
    InvalidQuerySpec(&'static str),

    /// The injected executor failed.
    #[error("{stage} query {operation} failed: {source}")]
    QueryExecution {
        /// Stage that failed.
        stage: QueryStage,
        /// Operation that was issued.
        operation: Operation,
        /// Executor error.
        #[source]
        source: ExecutorError,
    },

    /// A returned record did not have the expected shape.
    #[error("{stage} query {operation} returned an undecodable record: {source}")]
    Decode {
        /// Stage whose records failed to decode.
        stage: QueryStage,
        /// Operation whose records failed to decode.
        operation: Operation,
        /// Decode error.
        #[source]
        source: serde_json::Error,
    },

    /// I/O error reading an annotation store.
    #[error("IO error reading annotation store: {0}")]
    Io(#[from] std::io::Error),

    /// Annotation store document is not valid JSON of the expected shape.
    #[error("invalid annotation store: {0}")]
    InvalidStore(#[source] serde_json::Error),
}

impl LocusError {
    pub(crate) fn malformed(input: &str, reason: MalformedReason) -> Self {
        Self::MalformedLocus {
            input: input.to_string(),
            reason,
        }
    }

    /// Returns the failing stage for query errors.
    pub fn stage(&self) -> Option<QueryStage> {
        match self {
            Self::QueryExecution { stage, .. } | Self::Decode { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type for locus operations.
pub type LocusResult<T> = Result<T, LocusError>;

/// Configuration for primary queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Genome assembly sent with every query.
    pub assembly: String,
    /// Gene annotation version sent with gene queries.
    pub gene_annotation_version: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            assembly: well_known::ASSEMBLY.to_string(),
            gene_annotation_version: well_known::GENE_ANNOTATION_VERSION,
        }
    }
}

/// What the aggregator does when the secondary query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondaryFailurePolicy {
    /// Return every primary record with its attribute marked unknown.
    #[default]
    Degrade,
    /// Fail the whole aggregation.
    Fail,
}

/// Configuration for dependent queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregatorConfig {
    /// Behavior on secondary query failure.
    pub on_secondary_failure: SecondaryFailurePolicy,
}

impl AggregatorConfig {
    /// Creates a config that fails the aggregation when the secondary query fails.
    pub fn strict() -> Self {
        Self {
            on_secondary_failure: SecondaryFailurePolicy::Fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LocusError::malformed("chr1-500-100", MalformedReason::MissingSeparator);
        assert_eq!(
            err.to_string(),
            "malformed locus 'chr1-500-100': expected 'chromosome:start-end' or a tab-separated triple"
        );

        let err = LocusError::QueryExecution {
            stage: QueryStage::Secondary,
            operation: Operation::CcreClassification,
            source: ExecutorError::Transport("connection reset".to_string()),
        };
        assert_eq!(err.stage(), Some(QueryStage::Secondary));
        assert!(err.to_string().starts_with("secondary query cCREAutocompleteQuery failed"));
    }

    #[test]
    fn test_config_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.assembly, "GRCh38");
        assert_eq!(config.gene_annotation_version, 29);
        assert_eq!(
            AggregatorConfig::default().on_secondary_failure,
            SecondaryFailurePolicy::Degrade
        );
        assert_eq!(
            AggregatorConfig::strict().on_secondary_failure,
            SecondaryFailurePolicy::Fail
        );
    }
}
