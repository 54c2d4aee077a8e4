//! # locus-core
//!
//! Locus resolution and cross-reference aggregation for genome annotation
//! lookups.
//!
//! The crate never talks to the network itself. Every query goes through an
//! injected [`QueryExecutor`]; [`AnnotationStore`] is an in-memory one.
//!
//! ## Pieces
//!
//! - [`parse_range`]: locus strings (`chr:start-end`, `chr%3Astart-end`,
//!   tab-separated) to a [`GenomicRange`](locus_types::GenomicRange).
//! - [`LocusResolver`]: a [`LocusQuerySpec`] to iCRE, SNP and gene records.
//! - [`DependentQuery`]: a primary query joined with a secondary query keyed
//!   by the primary records' natural keys.
//! - [`linked`]: gene-centred pipelines built on `DependentQuery`.
//!
//! ## Usage
//!
//! ```rust
//! use locus_core::{parse_range, AnnotationStore, LocusQuerySpec, LocusResolver};
//! use locus_types::IcreRecord;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = AnnotationStore::new();
//! let resolver = LocusResolver::new(&store);
//!
//! let range = parse_range("chr11%3A5205263-5381894").unwrap();
//! let icres = resolver
//!     .resolve::<IcreRecord>(&LocusQuerySpec::by_coordinates(range))
//!     .await
//!     .unwrap();
//! assert!(icres.into_vec().is_empty());
//! # }
//! ```

#![warn(missing_docs)]

mod aggregator;
pub mod linked;
mod parser;
mod query;
mod resolver;
mod search;
mod store;
mod types;

pub use aggregator::{
    build_lookup, dedup_by_key, merge_by_key, Aggregated, DependentQuery, SecondaryStatus,
};
pub use linked::{gene_cross_references, linked_icres, nearby_ccres, GeneCrossReferences};
pub use parser::{parse_range, strip_version};
pub use query::{ExecutorError, Operation, QueryExecutor, QueryRequest, QueryVariables};
pub use resolver::{LocusEntity, LocusName, LocusQuerySpec, LocusResolver, Resolved, ResolvedLocus};
pub use search::{classify_search, SearchTarget};
pub use store::{AnnotationStore, NearbyCcreEntry};
pub use types::{
    AggregatorConfig, LocusError, LocusResult, MalformedReason, QueryStage, ResolverConfig,
    SecondaryFailurePolicy,
};

// Re-export locus-types for convenience
pub use locus_types;
