//! Gene-centred cross-reference pipelines.
//!
//! Both pipelines take a gene id, fetch cCREs related to it, and mark each
//! cCRE with whether it is also an iCRE using the classification query.

use locus_types::{CcreClassification, CrossRef, LinkedIcre, NaturalKey, NearbyCcre};
use serde::Serialize;

use crate::aggregator::{Aggregated, DependentQuery};
use crate::parser::strip_version;
use crate::query::{Operation, QueryExecutor, QueryRequest, QueryVariables};
use crate::types::{AggregatorConfig, LocusResult, ResolverConfig};

/// A nearby cCRE with its iCRE flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyCcreRow {
    /// The cCRE as returned by the closest-gene query.
    #[serde(flatten)]
    pub ccre: NearbyCcre,
    /// Whether the cCRE is an iCRE.
    #[serde(rename = "isiCRE")]
    pub is_icre: CrossRef<bool>,
}

/// A gene-linked cCRE with its iCRE flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedIcreRow {
    /// The linkage record.
    #[serde(flatten)]
    pub link: LinkedIcre,
    /// Whether the linked cCRE is an iCRE.
    #[serde(rename = "isiCRE")]
    pub is_icre: CrossRef<bool>,
}

/// Both cross-reference views of one gene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneCrossReferences {
    /// cCREs closest to the gene.
    pub nearby: Aggregated<NearbyCcreRow>,
    /// cCREs linked to the gene.
    pub linked: Aggregated<LinkedIcreRow>,
}

/// Builds the iCRE classification request for a set of accessions.
pub fn classification_request(accessions: &[String], assembly: &str) -> QueryRequest {
    QueryRequest::new(
        Operation::CcreClassification,
        QueryVariables::new()
            .with("accession", accessions.to_vec())
            .with("assembly", assembly.to_lowercase())
            .with("includeiCREs", true),
    )
}

/// Dependent query for cCREs whose closest gene is `gene_id`.
///
/// The version suffix of `gene_id` is dropped before querying.
pub fn nearby_ccres_query(
    gene_id: &str,
    config: &ResolverConfig,
) -> DependentQuery<NearbyCcre, CcreClassification, bool, NearbyCcreRow> {
    let primary = QueryRequest::new(
        Operation::NearbyCcres,
        QueryVariables::new().with("geneid", vec![strip_version(gene_id)]),
    );
    let assembly = config.assembly.clone();

    DependentQuery::by_natural_key(
        primary,
        move |keys: &[String]| classification_request(keys, &assembly),
        |class: CcreClassification| class.is_icre,
        |ccre, is_icre| NearbyCcreRow { ccre, is_icre },
    )
}

/// Identity of a link row: the linked accession plus everything that
/// distinguishes one linkage of it from another.
fn link_identity(link: &LinkedIcre) -> String {
    let fields = [
        link.method.as_deref(),
        link.assay.as_deref(),
        link.celltype.as_deref(),
        link.tissue.as_deref(),
        link.variantid.as_deref(),
        link.grnaid.as_deref(),
        link.experiment_accession.as_deref(),
    ];
    let mut identity = link.accession.clone();
    for field in fields {
        identity.push('\u{1f}');
        identity.push_str(field.unwrap_or_default());
    }
    identity
}

/// Dependent query for cCREs linked to `gene_id`.
///
/// Every distinct linkage is kept; only rows that repeat the same linkage
/// (same accession, method, assay, cell type, tissue, variant, guide RNA
/// and experiment) collapse to the first. The iCRE flag is looked up by
/// accession.
pub fn linked_icres_query(
    gene_id: &str,
    config: &ResolverConfig,
) -> DependentQuery<LinkedIcre, CcreClassification, bool, LinkedIcreRow> {
    let primary = QueryRequest::new(
        Operation::LinkedIcres,
        QueryVariables::new()
            .with("geneid", vec![strip_version(gene_id)])
            .with("assembly", config.assembly.to_lowercase()),
    );
    let assembly = config.assembly.clone();

    DependentQuery::new(
        primary,
        link_identity,
        move |keys: &[String]| classification_request(keys, &assembly),
        |class: CcreClassification| (class.accession, class.is_icre),
        |link, is_icre| LinkedIcreRow { link, is_icre },
    )
    .with_lookup_key(|link: &LinkedIcre| link.natural_key().to_string())
}

/// Fetches nearby cCREs for a gene, flagged with iCRE membership.
pub async fn nearby_ccres<E: QueryExecutor>(
    executor: &E,
    gene_id: &str,
    config: &ResolverConfig,
    aggregator: AggregatorConfig,
) -> LocusResult<Aggregated<NearbyCcreRow>> {
    nearby_ccres_query(gene_id, config)
        .with_config(aggregator)
        .aggregate(executor)
        .await
}

/// Fetches linked cCREs for a gene, flagged with iCRE membership.
pub async fn linked_icres<E: QueryExecutor>(
    executor: &E,
    gene_id: &str,
    config: &ResolverConfig,
    aggregator: AggregatorConfig,
) -> LocusResult<Aggregated<LinkedIcreRow>> {
    linked_icres_query(gene_id, config)
        .with_config(aggregator)
        .aggregate(executor)
        .await
}

/// Runs both gene pipelines concurrently.
///
/// Each pipeline is itself sequential; only the two pipelines overlap.
pub async fn gene_cross_references<E: QueryExecutor>(
    executor: &E,
    gene_id: &str,
    config: &ResolverConfig,
    aggregator: AggregatorConfig,
) -> LocusResult<GeneCrossReferences> {
    let (nearby, linked) = tokio::join!(
        nearby_ccres(executor, gene_id, config, aggregator),
        linked_icres(executor, gene_id, config, aggregator),
    );
    Ok(GeneCrossReferences {
        nearby: nearby?,
        linked: linked?,
    })
}
