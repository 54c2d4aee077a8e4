//! Query contract between the core and the annotation service.
//!
//! The core never performs transport itself. Every query goes through an
//! injected [`QueryExecutor`], which receives an [`Operation`] and its
//! [`QueryVariables`] and returns the raw JSON records of the result.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use locus_types::{GenomicElementKind, GenomicRange};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Named operations the core composes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    /// iCRE lookup by accession or coordinates.
    Icre,
    /// SNP lookup by rsID or coordinates.
    Snp,
    /// Gene lookup by name/id or coordinates.
    Gene,
    /// cCREs linked to a gene (eQTL, chromatin loops, CRISPR).
    LinkedIcres,
    /// cCREs whose closest gene is the given gene.
    NearbyCcres,
    /// iCRE classification of a set of cCRE accessions.
    CcreClassification,
}

impl Operation {
    /// Upstream operation name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Icre => "iCREQuery",
            Self::Snp => "snpQuery",
            Self::Gene => "gene",
            Self::LinkedIcres => "linkedcCREsQuery",
            Self::NearbyCcres => "closestGenetocCRE",
            Self::CcreClassification => "cCREAutocompleteQuery",
        }
    }

    /// Element kind this operation resolves, for primary element queries.
    pub fn element_kind(self) -> Option<GenomicElementKind> {
        match self {
            Self::Icre => Some(GenomicElementKind::Icre),
            Self::Snp => Some(GenomicElementKind::Snp),
            Self::Gene => Some(GenomicElementKind::Gene),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Variables sent with a query, keyed by upstream variable name.
///
/// Keys are kept sorted so two requests built from the same inputs compare
/// and serialize identically.
///
/// # Examples
///
/// ```
/// use locus_core::QueryVariables;
///
/// let vars = QueryVariables::new()
///     .with("assembly", "GRCh38")
///     .with("name", vec!["SP1"]);
///
/// assert_eq!(vars.str("assembly"), Some("GRCh38"));
/// assert_eq!(vars.strings("name"), Some(vec!["SP1"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryVariables(BTreeMap<String, Value>);

impl QueryVariables {
    /// Creates an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, builder style.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds `chromosome`, `start` and `end` from a range.
    pub fn with_range(self, range: &GenomicRange) -> Self {
        self.with("chromosome", range.chromosome.as_str())
            .with("start", range.start)
            .with("end", range.end)
    }

    /// Inserts or replaces a variable.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Returns a variable.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a string variable.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Returns an unsigned integer variable.
    pub fn u64(&self, key: &str) -> Option<u64> {
        self.get(key)?.as_u64()
    }

    /// Returns a list-of-strings variable; non-string entries are skipped.
    pub fn strings(&self, key: &str) -> Option<Vec<&str>> {
        let items = self.get(key)?.as_array()?;
        Some(items.iter().filter_map(Value::as_str).collect())
    }

    /// Reassembles `chromosome`/`start`/`end` into a range, if all are present
    /// and well formed.
    pub fn range(&self) -> Option<GenomicRange> {
        GenomicRange::new(self.str("chromosome")?, self.u64("start")?, self.u64("end")?).ok()
    }

    /// Returns true if no variables are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An operation paired with its variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    /// Operation to issue.
    pub operation: Operation,
    /// Variables for the operation.
    pub variables: QueryVariables,
}

impl QueryRequest {
    /// Creates a request.
    pub fn new(operation: Operation, variables: QueryVariables) -> Self {
        Self {
            operation,
            variables,
        }
    }
}

/// Errors reported by a [`QueryExecutor`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service rejected the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The executor does not serve this operation.
    #[error("operation {0} is not supported")]
    UnknownOperation(Operation),
}

/// The query-execution capability injected into the core.
///
/// Implementations own transport, retries and caching. The core issues one
/// call per query and awaits it.
pub trait QueryExecutor: Send + Sync {
    /// Executes `operation` with `variables`, returning the raw records.
    fn execute(
        &self,
        operation: Operation,
        variables: &QueryVariables,
    ) -> impl Future<Output = Result<Vec<Value>, ExecutorError>> + Send;
}

impl<E: QueryExecutor> QueryExecutor for &E {
    fn execute(
        &self,
        operation: Operation,
        variables: &QueryVariables,
    ) -> impl Future<Output = Result<Vec<Value>, ExecutorError>> + Send {
        (**self).execute(operation, variables)
    }
}

impl<E: QueryExecutor> QueryExecutor for Arc<E> {
    fn execute(
        &self,
        operation: Operation,
        variables: &QueryVariables,
    ) -> impl Future<Output = Result<Vec<Value>, ExecutorError>> + Send {
        (**self).execute(operation, variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::Icre.to_string(), "iCREQuery");
        assert_eq!(Operation::Icre.element_kind(), Some(GenomicElementKind::Icre));
        assert_eq!(Operation::CcreClassification.element_kind(), None);
    }

    #[test]
    fn test_variables_range_roundtrip() {
        let range = GenomicRange::new("chr6", 100, 200).unwrap();
        let vars = QueryVariables::new().with_range(&range);
        assert_eq!(vars.range(), Some(range));
        assert_eq!(QueryVariables::new().range(), None);
    }

    #[test]
    fn test_executor_error_messages() {
        assert_eq!(
            ExecutorError::UnknownOperation(Operation::Gene).to_string(),
            "operation gene is not supported"
        );
        assert_eq!(
            ExecutorError::Rejected("bad assembly".to_string()).to_string(),
            "request rejected: bad assembly"
        );
    }

    #[test]
    fn test_variables_serialize_sorted() {
        let vars = QueryVariables::new()
            .with("start", 1u64)
            .with("assembly", "GRCh38");
        let json = serde_json::to_string(&vars).unwrap();
        assert_eq!(json, r#"{"assembly":"GRCh38","start":1}"#);
    }
}
