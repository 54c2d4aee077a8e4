//! Two-stage dependent query with deduplication and merge-by-key.
//!
//! A [`DependentQuery`] runs a primary query, deduplicates its records by
//! natural key (first occurrence wins, order preserved), issues a secondary
//! query keyed on the unique key set, and attaches the secondary attribute
//! to every primary record.
//!
//! The dedup key and the lookup key are the same unless a separate lookup
//! key is set with [`DependentQuery::with_lookup_key`]. Link rows use this:
//! each distinct linkage is kept, while the attribute is looked up by the
//! linked accession.
//!
//! ## Failure policy
//!
//! - Primary failure aborts the aggregation; nothing partial is returned.
//! - An empty primary result returns an empty sequence and never issues the
//!   secondary query.
//! - Secondary failure degrades by default: every primary record is returned
//!   with its attribute set to [`CrossRef::Unknown`] and the outcome is
//!   reported as [`SecondaryStatus::Degraded`]. Callers that prefer to fail
//!   set [`SecondaryFailurePolicy::Fail`].
//!
//! The secondary dispatch strictly follows primary completion, since its key
//! set is derived from the deduplicated primary result. The merge runs only
//! after both awaits resolve, so dropping the future before then yields no
//! output at all.

use std::collections::{HashMap, HashSet};

use locus_types::{CrossRef, NaturalKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::query::{Operation, QueryExecutor, QueryRequest};
use crate::types::{AggregatorConfig, LocusError, LocusResult, QueryStage, SecondaryFailurePolicy};

type KeyFn<P> = Box<dyn Fn(&P) -> String + Send + Sync>;
type SecondaryFn = Box<dyn Fn(&[String]) -> QueryRequest + Send + Sync>;
type EntryFn<S, A> = Box<dyn Fn(S) -> (String, A) + Send + Sync>;
type MergeFn<P, A, M> = Box<dyn Fn(P, CrossRef<A>) -> M + Send + Sync>;

/// How the secondary stage of an aggregation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SecondaryStatus {
    /// The primary result was empty, so no secondary query was issued.
    Skipped,
    /// The secondary query succeeded and was merged.
    Complete,
    /// The secondary query failed; attributes are unknown.
    Degraded {
        /// Description of the secondary failure.
        reason: String,
    },
}

/// Merged output of a [`DependentQuery`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregated<M> {
    /// One record per unique dedup key, in first-seen order.
    pub records: Vec<M>,
    /// Outcome of the secondary stage.
    pub secondary: SecondaryStatus,
}

impl<M> Aggregated<M> {
    /// An empty result whose secondary stage was skipped.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            secondary: SecondaryStatus::Skipped,
        }
    }

    /// True if the secondary stage failed and attributes are unknown.
    pub fn is_degraded(&self) -> bool {
        matches!(self.secondary, SecondaryStatus::Degraded { .. })
    }
}

/// A primary query enriched by a secondary query over the same natural key.
///
/// # Examples
///
/// ```
/// use locus_core::{DependentQuery, Operation, QueryRequest, QueryVariables};
/// use locus_types::{CcreClassification, CrossRef, NearbyCcre};
///
/// let query = DependentQuery::new(
///     QueryRequest::new(Operation::NearbyCcres, QueryVariables::new()),
///     |ccre: &NearbyCcre| ccre.ccre.clone(),
///     |keys: &[String]| {
///         QueryRequest::new(
///             Operation::CcreClassification,
///             QueryVariables::new().with("accession", keys.to_vec()),
///         )
///     },
///     |c: CcreClassification| (c.accession, c.is_icre),
///     |ccre: NearbyCcre, is_icre: CrossRef<bool>| (ccre.ccre, is_icre),
/// );
/// assert_eq!(query.primary().operation, Operation::NearbyCcres);
/// ```
pub struct DependentQuery<P, S, A, M> {
    primary: QueryRequest,
    key: KeyFn<P>,
    lookup_key: Option<KeyFn<P>>,
    secondary: SecondaryFn,
    entry: EntryFn<S, A>,
    merge: MergeFn<P, A, M>,
    config: AggregatorConfig,
}

impl<P, S, A, M> DependentQuery<P, S, A, M>
where
    P: DeserializeOwned,
    S: DeserializeOwned,
    A: Clone,
{
    /// Creates a dependent query.
    ///
    /// * `primary` - the primary request
    /// * `key` - natural key of a primary record, used for dedup and lookup
    /// * `secondary` - builds the secondary request from the unique key set
    /// * `entry` - splits a secondary record into its key and attribute
    /// * `merge` - attaches an attribute (or `Unknown`) to a primary record
    pub fn new<K, B, T, F>(primary: QueryRequest, key: K, secondary: B, entry: T, merge: F) -> Self
    where
        K: Fn(&P) -> String + Send + Sync + 'static,
        B: Fn(&[String]) -> QueryRequest + Send + Sync + 'static,
        T: Fn(S) -> (String, A) + Send + Sync + 'static,
        F: Fn(P, CrossRef<A>) -> M + Send + Sync + 'static,
    {
        Self {
            primary,
            key: Box::new(key),
            lookup_key: None,
            secondary: Box::new(secondary),
            entry: Box::new(entry),
            merge: Box::new(merge),
            config: AggregatorConfig::default(),
        }
    }

    /// Sets the aggregator config.
    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Looks attributes up by `lookup` instead of the dedup key.
    ///
    /// Several unique records may then share one lookup key; each receives
    /// a copy of the attribute.
    pub fn with_lookup_key<L>(mut self, lookup: L) -> Self
    where
        L: Fn(&P) -> String + Send + Sync + 'static,
    {
        self.lookup_key = Some(Box::new(lookup));
        self
    }

    /// Returns the primary request.
    pub fn primary(&self) -> &QueryRequest {
        &self.primary
    }

    /// Builds the secondary request for a key set.
    pub fn secondary_request(&self, keys: &[String]) -> QueryRequest {
        (self.secondary)(keys)
    }

    /// Runs both stages against `executor` and merges the results.
    pub async fn aggregate<E: QueryExecutor>(&self, executor: &E) -> LocusResult<Aggregated<M>> {
        let primary = &self.primary;
        let rows = executor
            .execute(primary.operation, &primary.variables)
            .await
            .map_err(|source| LocusError::QueryExecution {
                stage: QueryStage::Primary,
                operation: primary.operation,
                source,
            })?;

        if rows.is_empty() {
            debug!("{} returned no records; skipping secondary query", primary.operation);
            return Ok(Aggregated::empty());
        }

        let records: Vec<P> = decode_rows(rows, QueryStage::Primary, primary.operation)?;
        let raw_count = records.len();
        let unique = dedup_by_key(records, &self.key);
        debug!(
            "{} returned {} records, {} unique keys",
            primary.operation,
            raw_count,
            unique.len()
        );

        let keyed: Vec<(String, P)> = match &self.lookup_key {
            Some(lookup) => unique
                .into_iter()
                .map(|(_, record)| (lookup(&record), record))
                .collect(),
            None => unique,
        };

        let mut seen = HashSet::with_capacity(keyed.len());
        let mut keys = Vec::with_capacity(keyed.len());
        for (key, _) in &keyed {
            if seen.insert(key.as_str()) {
                keys.push(key.clone());
            }
        }
        if keys.is_empty() {
            return Ok(Aggregated::empty());
        }

        let request = (self.secondary)(&keys);
        let (lookup, secondary) = match self.run_secondary(executor, &request).await {
            Ok(lookup) => (lookup, SecondaryStatus::Complete),
            Err(err) => match self.config.on_secondary_failure {
                SecondaryFailurePolicy::Fail => return Err(err),
                SecondaryFailurePolicy::Degrade => {
                    warn!("{}; returning primary records with unknown attributes", err);
                    (
                        HashMap::new(),
                        SecondaryStatus::Degraded {
                            reason: err.to_string(),
                        },
                    )
                }
            },
        };

        let records = merge_by_key(keyed, lookup, &self.merge);
        Ok(Aggregated { records, secondary })
    }

    async fn run_secondary<E: QueryExecutor>(
        &self,
        executor: &E,
        request: &QueryRequest,
    ) -> LocusResult<HashMap<String, A>> {
        let rows = executor
            .execute(request.operation, &request.variables)
            .await
            .map_err(|source| LocusError::QueryExecution {
                stage: QueryStage::Secondary,
                operation: request.operation,
                source,
            })?;
        let entries: Vec<S> = decode_rows(rows, QueryStage::Secondary, request.operation)?;
        Ok(build_lookup(entries, &self.entry))
    }
}

impl<P, S, A, M> DependentQuery<P, S, A, M>
where
    P: DeserializeOwned + NaturalKey + 'static,
    S: DeserializeOwned + NaturalKey + 'static,
    A: Clone + 'static,
{
    /// Creates a dependent query keyed on the records' [`NaturalKey`]s.
    pub fn by_natural_key<B, T, F>(primary: QueryRequest, secondary: B, attribute: T, merge: F) -> Self
    where
        B: Fn(&[String]) -> QueryRequest + Send + Sync + 'static,
        T: Fn(S) -> A + Send + Sync + 'static,
        F: Fn(P, CrossRef<A>) -> M + Send + Sync + 'static,
    {
        Self::new(
            primary,
            |record: &P| record.natural_key().to_string(),
            secondary,
            move |record: S| (record.natural_key().to_string(), attribute(record)),
            merge,
        )
    }
}

/// Deduplicates records by key, keeping the first occurrence of each key in
/// its original position.
///
/// ```
/// use locus_core::dedup_by_key;
///
/// let unique = dedup_by_key(vec!["A", "B", "A", "C", "B"], |s: &&str| s.to_string());
/// let keys: Vec<_> = unique.into_iter().map(|(k, _)| k).collect();
/// assert_eq!(keys, ["A", "B", "C"]);
/// ```
pub fn dedup_by_key<P, K>(records: Vec<P>, key: K) -> Vec<(String, P)>
where
    K: Fn(&P) -> String,
{
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter_map(|record| {
            let k = key(&record);
            if seen.insert(k.clone()) {
                Some((k, record))
            } else {
                None
            }
        })
        .collect()
}

/// Builds a key to attribute lookup; a later entry for a key replaces an
/// earlier one.
pub fn build_lookup<S, A, T>(entries: Vec<S>, entry: T) -> HashMap<String, A>
where
    T: Fn(S) -> (String, A),
{
    let mut lookup = HashMap::with_capacity(entries.len());
    for record in entries {
        let (key, attribute) = entry(record);
        lookup.insert(key, attribute);
    }
    lookup
}

/// Attaches the looked-up attribute to each keyed record, or
/// [`CrossRef::Unknown`] when the lookup has no entry for its key.
///
/// Records sharing a key each receive a copy of the attribute.
pub fn merge_by_key<P, A, M, F>(records: Vec<(String, P)>, lookup: HashMap<String, A>, merge: F) -> Vec<M>
where
    A: Clone,
    F: Fn(P, CrossRef<A>) -> M,
{
    records
        .into_iter()
        .map(|(key, record)| merge(record, CrossRef::from_option(lookup.get(&key).cloned())))
        .collect()
}

fn decode_rows<T: DeserializeOwned>(
    rows: Vec<Value>,
    stage: QueryStage,
    operation: Operation,
) -> LocusResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|source| LocusError::Decode {
                stage,
                operation,
                source,
            })
        })
        .collect()
}
