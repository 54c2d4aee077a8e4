//! # locus-types
//!
//! Type definitions for genomic loci and the annotation records that are
//! cross-referenced against them.
//!
//! This crate provides the canonical `GenomicRange`, the closed set of
//! element kinds a locus can resolve to, the entity records returned by the
//! annotation service, and the `CrossRef` wrapper used when attributes from a
//! second query are merged onto those records.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use locus_types::{CrossRef, GenomicElementKind, GenomicRange};
//!
//! let range = GenomicRange::new("chr6", 100, 200).unwrap();
//! assert_eq!(range.to_string(), "chr6:100-200");
//!
//! let kind = GenomicElementKind::from_route("icre");
//! assert_eq!(kind, Some(GenomicElementKind::Icre));
//!
//! let flag: CrossRef<bool> = CrossRef::Unknown;
//! assert!(flag.is_unknown());
//! ```

#![warn(missing_docs)]

mod cross_ref;
mod enums;
mod range;
mod records;
pub mod well_known;

// Re-export all public types at crate root
pub use cross_ref::CrossRef;
pub use enums::{CcreClass, GenomicElementKind, RangeAnchor, Strand};
pub use range::{GenomicRange, RangeError};
pub use records::{
    CcreClassification, GeneRecord, IcreRecord, LinkedIcre, NaturalKey, NearbyCcre, NearbyGene,
    SnpRecord,
};
