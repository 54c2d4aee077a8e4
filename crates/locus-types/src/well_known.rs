//! Well-known constants of the annotation service.
//!
//! # Examples
//!
//! ```
//! use locus_types::well_known;
//!
//! assert_eq!(well_known::ASSEMBLY, "GRCh38");
//! assert!("EH38E0001314".starts_with(well_known::ICRE_ACCESSION_PREFIX));
//! ```

/// Genome assembly every query is issued against.
pub const ASSEMBLY: &str = "GRCh38";

/// GENCODE annotation version used for gene queries.
pub const GENE_ANNOTATION_VERSION: u32 = 29;

/// URL encoding of `:`, the chromosome/coordinate separator.
pub const ENCODED_COLON: &str = "%3A";

/// Prefix of dbSNP reference SNP identifiers.
pub const RSID_PREFIX: &str = "rs";

/// Prefix of GRCh38 cCRE/iCRE accessions.
pub const ICRE_ACCESSION_PREFIX: &str = "EH38E";

/// Separator between an Ensembl id and its version suffix.
pub const ENSEMBL_VERSION_SEPARATOR: char = '.';
