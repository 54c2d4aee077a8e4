//! # locus-service
//!
//! Projection-ready locus lookups over any
//! [`QueryExecutor`](locus_core::QueryExecutor).
//!
//! [`LocusService`] wraps an executor, classifies free-text input, runs the
//! resolver or a cross-reference pipeline, and returns a [`Projection`]
//! whose records are plain JSON. Rendering is left to the caller; the
//! `locus` binary prints projections to stdout.

#![warn(missing_docs)]

mod batch;
mod error;
mod service;

pub use batch::{read_bed, read_bed_path};
pub use error::{ServiceError, ServiceResult};
pub use service::{LocusService, Projection};

// Re-export the core types callers need alongside the service
pub use locus_core::{AggregatorConfig, AnnotationStore, ResolverConfig};
