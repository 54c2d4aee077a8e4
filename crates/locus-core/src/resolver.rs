//! Locus resolution.
//!
//! Turns a [`LocusQuerySpec`] into a primary element query and normalizes
//! the shape of the answer. The shape follows the input: a single name
//! yields [`Resolved::Single`], a name list or a coordinate range yields
//! [`Resolved::Many`], no matter how many records came back.

use locus_types::{
    GeneRecord, GenomicElementKind, GenomicRange, IcreRecord, NaturalKey, SnpRecord,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::query::{Operation, QueryExecutor, QueryVariables};
use crate::types::{LocusError, LocusResult, QueryStage, ResolverConfig};

/// One name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocusName {
    /// A single name; resolves to at most one entity.
    One(String),
    /// A list of names; resolves to a collection.
    Many(Vec<String>),
}

impl LocusName {
    fn as_list(&self) -> Vec<&str> {
        match self {
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Input to [`LocusResolver::resolve`].
///
/// Exactly one of name and coordinates is populated. The `by_*`
/// constructors guarantee this; [`LocusQuerySpec::from_parts`] checks it.
///
/// # Examples
///
/// ```
/// use locus_core::{LocusName, LocusQuerySpec};
/// use locus_types::{GenomicElementKind, GenomicRange};
///
/// let spec = LocusQuerySpec::by_name("SP1").with_kind(GenomicElementKind::Gene);
/// assert_eq!(spec.element_kind(), Some(GenomicElementKind::Gene));
///
/// let range = GenomicRange::new("chr1", 1, 2).unwrap();
/// let both = LocusQuerySpec::from_parts(
///     Some(LocusName::One("SP1".to_string())),
///     Some(range),
///     None,
/// );
/// assert!(both.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocusQuerySpec {
    name: Option<LocusName>,
    coordinates: Option<GenomicRange>,
    element_kind: Option<GenomicElementKind>,
}

impl LocusQuerySpec {
    /// Looks up a single entity by name or identifier.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(LocusName::One(name.into())),
            coordinates: None,
            element_kind: None,
        }
    }

    /// Looks up several entities by name or identifier.
    pub fn by_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(LocusName::Many(names.into_iter().map(Into::into).collect())),
            coordinates: None,
            element_kind: None,
        }
    }

    /// Looks up every entity overlapping a range.
    pub fn by_coordinates(range: GenomicRange) -> Self {
        Self {
            name: None,
            coordinates: Some(range),
            element_kind: None,
        }
    }

    /// Builds a spec from optional parts, rejecting both-or-neither.
    pub fn from_parts(
        name: Option<LocusName>,
        coordinates: Option<GenomicRange>,
        element_kind: Option<GenomicElementKind>,
    ) -> LocusResult<Self> {
        match (&name, &coordinates) {
            (Some(_), Some(_)) => Err(LocusError::InvalidQuerySpec(
                "name and coordinates are mutually exclusive",
            )),
            (None, None) => Err(LocusError::InvalidQuerySpec(
                "one of name or coordinates is required",
            )),
            _ => Ok(Self {
                name,
                coordinates,
                element_kind,
            }),
        }
    }

    /// Narrows the spec to one element kind.
    pub fn with_kind(mut self, kind: GenomicElementKind) -> Self {
        self.element_kind = Some(kind);
        self
    }

    /// The name, if this is a name lookup.
    pub fn name(&self) -> Option<&LocusName> {
        self.name.as_ref()
    }

    /// The range, if this is a coordinate lookup.
    pub fn coordinates(&self) -> Option<&GenomicRange> {
        self.coordinates.as_ref()
    }

    /// The element kind this spec is narrowed to.
    pub fn element_kind(&self) -> Option<GenomicElementKind> {
        self.element_kind
    }

    /// True if the answer is a single optional entity.
    pub fn is_single(&self) -> bool {
        matches!(self.name, Some(LocusName::One(_)))
    }

    /// True if the spec's kind admits entities of `kind`.
    pub fn admits(&self, kind: GenomicElementKind) -> bool {
        self.element_kind.map_or(true, |k| k == kind)
    }
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum Resolved<T> {
    /// The spec's element kind does not match this entity type; no query was issued.
    NotApplicable,
    /// Scalar name lookup: the first match, if any.
    Single(Option<T>),
    /// Name-list or coordinate lookup: every match, in upstream order.
    Many(Vec<T>),
}

impl<T> Resolved<T> {
    /// True unless the lookup was skipped.
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    /// Flattens into a vector (empty when not applicable).
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::NotApplicable => Vec::new(),
            Self::Single(entity) => entity.into_iter().collect(),
            Self::Many(entities) => entities,
        }
    }
}

/// An entity type resolvable through a primary element query.
pub trait LocusEntity: DeserializeOwned + NaturalKey {
    /// Kind of element.
    const KIND: GenomicElementKind;
    /// Primary operation that returns this entity.
    const OPERATION: Operation;
}

impl LocusEntity for IcreRecord {
    const KIND: GenomicElementKind = GenomicElementKind::Icre;
    const OPERATION: Operation = Operation::Icre;
}

impl LocusEntity for SnpRecord {
    const KIND: GenomicElementKind = GenomicElementKind::Snp;
    const OPERATION: Operation = Operation::Snp;
}

impl LocusEntity for GeneRecord {
    const KIND: GenomicElementKind = GenomicElementKind::Gene;
    const OPERATION: Operation = Operation::Gene;
}

/// Every element kind resolved for one spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocus {
    /// iCREs.
    pub icres: Resolved<IcreRecord>,
    /// SNPs.
    pub snps: Resolved<SnpRecord>,
    /// Genes.
    pub genes: Resolved<GeneRecord>,
}

/// Resolves locus specs against an injected executor.
#[derive(Debug, Clone)]
pub struct LocusResolver<E> {
    executor: E,
    config: ResolverConfig,
}

impl<E: QueryExecutor> LocusResolver<E> {
    /// Creates a resolver with the default config.
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, ResolverConfig::default())
    }

    /// Creates a resolver with the given config.
    pub fn with_config(executor: E, config: ResolverConfig) -> Self {
        Self { executor, config }
    }

    /// Returns the resolver config.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Builds the primary query variables for `T`.
    ///
    /// Variables come straight from the range fields or the name list;
    /// no filtering or sorting is added.
    pub fn variables<T: LocusEntity>(&self, spec: &LocusQuerySpec) -> QueryVariables {
        let mut vars = QueryVariables::new().with("assembly", self.config.assembly.as_str());
        if T::KIND == GenomicElementKind::Gene {
            vars.insert("version", self.config.gene_annotation_version);
        }
        if let Some(range) = &spec.coordinates {
            vars = vars.with_range(range);
        }
        if let Some(name) = &spec.name {
            vars.insert("name", name.as_list());
        }
        vars
    }

    /// Resolves `spec` to entities of type `T`.
    ///
    /// Returns [`Resolved::NotApplicable`] without issuing a query when the
    /// spec is narrowed to a different element kind.
    pub async fn resolve<T: LocusEntity>(&self, spec: &LocusQuerySpec) -> LocusResult<Resolved<T>> {
        if !spec.admits(T::KIND) {
            debug!(
                "skipping {} for spec narrowed to {:?}",
                T::OPERATION,
                spec.element_kind
            );
            return Ok(Resolved::NotApplicable);
        }

        if let Some(LocusName::Many(names)) = &spec.name {
            if names.is_empty() {
                return Ok(Resolved::Many(Vec::new()));
            }
        }

        let variables = self.variables::<T>(spec);
        debug!("issuing primary query {}", T::OPERATION);

        let rows = self
            .executor
            .execute(T::OPERATION, &variables)
            .await
            .map_err(|source| LocusError::QueryExecution {
                stage: QueryStage::Primary,
                operation: T::OPERATION,
                source,
            })?;

        if spec.is_single() {
            let first = rows.into_iter().next().map(decode_row::<T>).transpose()?;
            Ok(Resolved::Single(first))
        } else {
            let entities = rows
                .into_iter()
                .map(decode_row::<T>)
                .collect::<LocusResult<Vec<T>>>()?;
            Ok(Resolved::Many(entities))
        }
    }

    /// Resolves `spec` against every element kind concurrently.
    ///
    /// Kinds excluded by the spec come back as [`Resolved::NotApplicable`].
    pub async fn resolve_all(&self, spec: &LocusQuerySpec) -> LocusResult<ResolvedLocus> {
        let (icres, snps, genes) = tokio::join!(
            self.resolve::<IcreRecord>(spec),
            self.resolve::<SnpRecord>(spec),
            self.resolve::<GeneRecord>(spec),
        );
        Ok(ResolvedLocus {
            icres: icres?,
            snps: snps?,
            genes: genes?,
        })
    }
}

fn decode_row<T: LocusEntity>(row: Value) -> LocusResult<T> {
    serde_json::from_value(row).map_err(|source| LocusError::Decode {
        stage: QueryStage::Primary,
        operation: T::OPERATION,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ExecutorError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns fixed rows and records every request.
    struct RecordingExecutor {
        rows: Vec<Value>,
        calls: AtomicUsize,
        last: Mutex<Option<(Operation, QueryVariables)>>,
    }

    impl RecordingExecutor {
        fn new(rows: Vec<Value>) -> Self {
            Self {
                rows,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }
    }

    impl QueryExecutor for RecordingExecutor {
        async fn execute(
            &self,
            operation: Operation,
            variables: &QueryVariables,
        ) -> Result<Vec<Value>, ExecutorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((operation, variables.clone()));
            Ok(self.rows.clone())
        }
    }

    fn make_test_icre(accession: &str) -> Value {
        json!({
            "accession": accession,
            "group": "dELS",
            "coordinates": { "chromosome": "chr11", "start": 100, "end": 200 }
        })
    }

    #[tokio::test]
    async fn test_single_name_yields_first_match() {
        let executor = RecordingExecutor::new(vec![
            make_test_icre("EH38E0000001"),
            make_test_icre("EH38E0000002"),
        ]);
        let resolver = LocusResolver::new(&executor);

        let resolved = resolver
            .resolve::<IcreRecord>(&LocusQuerySpec::by_name("EH38E0000001"))
            .await
            .unwrap();

        match resolved {
            Resolved::Single(Some(icre)) => assert_eq!(icre.accession, "EH38E0000001"),
            other => panic!("expected single entity, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_name_with_no_match_is_absent() {
        let executor = RecordingExecutor::new(vec![]);
        let resolver = LocusResolver::new(&executor);

        let resolved = resolver
            .resolve::<SnpRecord>(&LocusQuerySpec::by_name("rs1"))
            .await
            .unwrap();
        assert_eq!(resolved, Resolved::Single(None));
    }

    #[tokio::test]
    async fn test_name_list_yields_collection_even_for_one_result() {
        let executor = RecordingExecutor::new(vec![make_test_icre("EH38E0000001")]);
        let resolver = LocusResolver::new(&executor);

        let resolved = resolver
            .resolve::<IcreRecord>(&LocusQuerySpec::by_names(["EH38E0000001"]))
            .await
            .unwrap();
        assert!(matches!(resolved, Resolved::Many(ref v) if v.len() == 1));
    }

    #[tokio::test]
    async fn test_coordinates_become_variables() {
        let executor = RecordingExecutor::new(vec![make_test_icre("EH38E0000001")]);
        let resolver = LocusResolver::new(&executor);
        let range = GenomicRange::new("chr11", 50, 250).unwrap();

        let resolved = resolver
            .resolve::<IcreRecord>(&LocusQuerySpec::by_coordinates(range.clone()))
            .await
            .unwrap();
        assert_eq!(resolved.into_vec().len(), 1);

        let (operation, vars) = executor.last.lock().unwrap().clone().unwrap();
        assert_eq!(operation, Operation::Icre);
        assert_eq!(vars.range(), Some(range));
        assert_eq!(vars.str("assembly"), Some("GRCh38"));
        assert!(vars.get("name").is_none());
    }

    #[tokio::test]
    async fn test_gene_variables_carry_version() {
        let executor = RecordingExecutor::new(vec![]);
        let resolver = LocusResolver::new(&executor);
        let vars = resolver.variables::<GeneRecord>(&LocusQuerySpec::by_name("SP1"));
        assert_eq!(vars.u64("version"), Some(29));
        assert_eq!(vars.strings("name"), Some(vec!["SP1"]));
    }

    #[tokio::test]
    async fn test_mismatched_kind_skips_execution() {
        let executor = RecordingExecutor::new(vec![make_test_icre("EH38E0000001")]);
        let resolver = LocusResolver::new(&executor);
        let spec = LocusQuerySpec::by_name("SP1").with_kind(GenomicElementKind::Gene);

        let resolved = resolver.resolve::<IcreRecord>(&spec).await.unwrap();
        assert_eq!(resolved, Resolved::NotApplicable);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_name_list_skips_execution() {
        let executor = RecordingExecutor::new(vec![make_test_icre("EH38E0000001")]);
        let resolver = LocusResolver::new(&executor);

        let resolved = resolver
            .resolve::<IcreRecord>(&LocusQuerySpec::by_names(Vec::<String>::new()))
            .await
            .unwrap();
        assert_eq!(resolved, Resolved::Many(vec![]));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_all_gates_each_kind() {
        let executor = RecordingExecutor::new(vec![]);
        let resolver = LocusResolver::new(&executor);
        let spec = LocusQuerySpec::by_name("rs1").with_kind(GenomicElementKind::Snp);

        let resolved = resolver.resolve_all(&spec).await.unwrap();
        assert_eq!(resolved.icres, Resolved::NotApplicable);
        assert_eq!(resolved.genes, Resolved::NotApplicable);
        assert_eq!(resolved.snps, Resolved::Single(None));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_undecodable_row_is_an_error() {
        let executor = RecordingExecutor::new(vec![json!({ "unexpected": true })]);
        let resolver = LocusResolver::new(&executor);

        let err = resolver
            .resolve::<SnpRecord>(&LocusQuerySpec::by_names(["rs1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, LocusError::Decode { stage: QueryStage::Primary, .. }));
    }

    #[tokio::test]
    async fn test_inverted_coordinates_are_a_decode_error() {
        let executor = RecordingExecutor::new(vec![json!({
            "accession": "EH38E0000001",
            "coordinates": { "chromosome": "chr1", "start": 900, "end": 100 }
        })]);
        let resolver = LocusResolver::new(&executor);

        let err = resolver
            .resolve::<IcreRecord>(&LocusQuerySpec::by_name("EH38E0000001"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LocusError::Decode {
                stage: QueryStage::Primary,
                operation: Operation::Icre,
                ..
            }
        ));
    }

    #[test]
    fn test_from_parts_rejects_neither() {
        let err = LocusQuerySpec::from_parts(None, None, None).unwrap_err();
        assert!(matches!(err, LocusError::InvalidQuerySpec(_)));

        let ok = LocusQuerySpec::from_parts(
            None,
            Some(GenomicRange::new("chr1", 1, 2).unwrap()),
            Some(GenomicElementKind::Snp),
        )
        .unwrap();
        assert!(!ok.is_single());
        assert!(ok.admits(GenomicElementKind::Snp));
        assert!(!ok.admits(GenomicElementKind::Gene));
    }
}
