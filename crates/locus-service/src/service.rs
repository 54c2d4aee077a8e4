//! Lookup service producing projection-ready results.

use std::sync::Arc;

use locus_core::{
    classify_search, linked_icres, nearby_ccres, AggregatorConfig, LocusQuerySpec, LocusResolver,
    QueryExecutor, ResolverConfig, SecondaryStatus,
};
use locus_types::{GenomicElementKind, GenomicRange};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ServiceResult;

/// One lookup, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// The input as the user gave it.
    pub query: String,
    /// Parsed range, for coordinate lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<GenomicRange>,
    /// Element kind the lookup was narrowed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<GenomicElementKind>,
    /// Resolved or aggregated records.
    pub records: Value,
    /// Outcome of the secondary stage, for aggregated lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SecondaryStatus>,
}

/// Locus lookup service.
pub struct LocusService<E> {
    executor: Arc<E>,
    resolver: ResolverConfig,
    aggregator: AggregatorConfig,
}

impl<E> Clone for LocusService<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            resolver: self.resolver.clone(),
            aggregator: self.aggregator,
        }
    }
}

impl<E: QueryExecutor> LocusService<E> {
    /// Creates a new service with the given executor.
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, ResolverConfig::default(), AggregatorConfig::default())
    }

    /// Creates a service with explicit configs.
    pub fn with_config(executor: E, resolver: ResolverConfig, aggregator: AggregatorConfig) -> Self {
        Self {
            executor: Arc::new(executor),
            resolver,
            aggregator,
        }
    }

    /// Returns a reference to the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn resolver(&self) -> LocusResolver<&E> {
        LocusResolver::with_config(&*self.executor, self.resolver.clone())
    }

    /// Resolves a free-text search.
    ///
    /// `kind` overrides the kind inferred from the input.
    pub async fn resolve(
        &self,
        input: &str,
        kind: Option<GenomicElementKind>,
    ) -> ServiceResult<Projection> {
        let target = classify_search(input)?;
        debug!("classified {:?} as {:?}", input, target);

        let mut spec = target.into_query_spec();
        if let Some(kind) = kind {
            spec = spec.with_kind(kind);
        }
        self.project(input.trim().to_string(), &spec).await
    }

    /// Resolves a batch of ranges, one projection per range in input order.
    pub async fn resolve_batch(
        &self,
        ranges: Vec<GenomicRange>,
        kind: Option<GenomicElementKind>,
    ) -> ServiceResult<Vec<Projection>> {
        info!("Resolving {} ranges", ranges.len());

        let mut projections = Vec::with_capacity(ranges.len());
        for range in ranges {
            let query = range.to_string();
            let mut spec = LocusQuerySpec::by_coordinates(range);
            if let Some(kind) = kind {
                spec = spec.with_kind(kind);
            }
            projections.push(self.project(query, &spec).await?);
        }
        Ok(projections)
    }

    /// cCREs closest to a gene, with their iCRE flag.
    pub async fn nearby_ccres(&self, gene_id: &str) -> ServiceResult<Projection> {
        let result = nearby_ccres(&*self.executor, gene_id, &self.resolver, self.aggregator).await?;
        Ok(Projection {
            query: gene_id.to_string(),
            range: None,
            kind: Some(GenomicElementKind::Gene),
            records: serde_json::to_value(&result.records)?,
            secondary: Some(result.secondary),
        })
    }

    /// cCREs linked to a gene, with their iCRE flag.
    pub async fn linked_icres(&self, gene_id: &str) -> ServiceResult<Projection> {
        let result = linked_icres(&*self.executor, gene_id, &self.resolver, self.aggregator).await?;
        Ok(Projection {
            query: gene_id.to_string(),
            range: None,
            kind: Some(GenomicElementKind::Gene),
            records: serde_json::to_value(&result.records)?,
            secondary: Some(result.secondary),
        })
    }

    async fn project(&self, query: String, spec: &LocusQuerySpec) -> ServiceResult<Projection> {
        let resolved = self.resolver().resolve_all(spec).await?;
        Ok(Projection {
            query,
            range: spec.coordinates().cloned(),
            kind: spec.element_kind(),
            records: serde_json::to_value(&resolved)?,
            secondary: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use locus_core::{AnnotationStore, LocusError};
    use locus_types::{CcreClassification, IcreRecord, NearbyCcre, SnpRecord};

    fn make_test_store() -> AnnotationStore {
        let mut store = AnnotationStore::new();
        store.insert_icres([IcreRecord {
            accession: "EH38E1516972".to_string(),
            group: Some("dELS".to_string()),
            ataccelltypes: vec![],
            dnasecelltypes: vec![],
            coordinates: GenomicRange::new("chr11", 5_205_263, 5_205_613).unwrap(),
        }]);
        store.insert_snps([SnpRecord {
            id: "rs334".to_string(),
            coordinates: GenomicRange::new("chr11", 5_227_001, 5_227_002).unwrap(),
        }]);
        store.insert_nearby_ccres(
            "ENSG00000244734",
            [NearbyCcre {
                ccre: "EH38E1516972".to_string(),
                chromosome: "chr11".to_string(),
                start: 5_205_263,
                stop: 5_205_613,
                group: None,
                gene: None,
            }],
        );
        store.insert_classifications([CcreClassification {
            accession: "EH38E1516972".to_string(),
            is_icre: true,
        }]);
        store
    }

    #[tokio::test]
    async fn test_resolve_coordinates() {
        let service = LocusService::new(make_test_store());

        let projection = service.resolve("chr11%3A5200000-5230000", None).await.unwrap();

        assert_eq!(projection.query, "chr11%3A5200000-5230000");
        assert_eq!(
            projection.range,
            Some(GenomicRange::new("chr11", 5_200_000, 5_230_000).unwrap())
        );
        assert_eq!(projection.kind, None);
        assert_eq!(projection.records["icres"]["shape"], "many");
        assert_eq!(
            projection.records["snps"]["data"][0]["id"],
            "rs334"
        );
    }

    #[tokio::test]
    async fn test_resolve_name_with_kind_override() {
        let service = LocusService::new(make_test_store());

        let projection = service.resolve("rs334", None).await.unwrap();
        assert_eq!(projection.kind, Some(GenomicElementKind::Snp));
        assert_eq!(projection.records["snps"]["data"]["id"], "rs334");
        assert_eq!(projection.records["icres"]["shape"], "not_applicable");

        let forced = service
            .resolve("rs334", Some(GenomicElementKind::Gene))
            .await
            .unwrap();
        assert_eq!(forced.kind, Some(GenomicElementKind::Gene));
        assert_eq!(forced.records["snps"]["shape"], "not_applicable");
    }

    #[tokio::test]
    async fn test_malformed_input_is_an_error() {
        let service = LocusService::new(make_test_store());
        let err = service.resolve("chr1:500-100", None).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Locus(LocusError::MalformedLocus { .. })
        ));
    }

    #[tokio::test]
    async fn test_nearby_projection_carries_status() {
        let service = LocusService::new(make_test_store());

        let projection = service.nearby_ccres("ENSG00000244734.4").await.unwrap();
        assert_eq!(projection.secondary, Some(SecondaryStatus::Complete));
        assert_eq!(projection.records[0]["isiCRE"], true);

        let json = serde_json::to_value(&projection).unwrap();
        assert!(json.get("range").is_none());
        assert_eq!(json["kind"], "gene");
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        let service = LocusService::new(make_test_store());
        let ranges = vec![
            GenomicRange::new("chr11", 5_227_000, 5_227_010).unwrap(),
            GenomicRange::new("chr1", 1, 2).unwrap(),
        ];

        let projections = service
            .resolve_batch(ranges, Some(GenomicElementKind::Snp))
            .await
            .unwrap();
        assert_eq!(projections.len(), 2);
        assert_eq!(projections[0].query, "chr11:5227000-5227010");
        assert_eq!(projections[0].records["snps"]["data"][0]["id"], "rs334");
        assert_eq!(projections[1].records["snps"]["data"], serde_json::json!([]));
    }
}
