//! Free-text search classification.
//!
//! A search box accepts coordinates, rsIDs, iCRE accessions and gene
//! symbols in one field. [`classify_search`] decides which one the user
//! typed.

use locus_types::{well_known, GenomicElementKind, GenomicRange};

use crate::parser::parse_range;
use crate::resolver::LocusQuerySpec;
use crate::types::{LocusError, LocusResult, MalformedReason};

/// What a search string refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// A genomic range.
    Coordinates(GenomicRange),
    /// An rsID.
    Snp(String),
    /// An iCRE accession, upper-cased.
    Icre(String),
    /// A gene symbol or Ensembl id.
    Gene(String),
}

impl SearchTarget {
    /// Element kind of a name target; `None` for coordinates.
    pub fn element_kind(&self) -> Option<GenomicElementKind> {
        match self {
            Self::Coordinates(_) => None,
            Self::Snp(_) => Some(GenomicElementKind::Snp),
            Self::Icre(_) => Some(GenomicElementKind::Icre),
            Self::Gene(_) => Some(GenomicElementKind::Gene),
        }
    }

    /// Converts the target into a resolver spec.
    ///
    /// Names become single-name lookups narrowed to their kind; coordinates
    /// are left open to every kind.
    pub fn into_query_spec(self) -> LocusQuerySpec {
        match self {
            Self::Coordinates(range) => LocusQuerySpec::by_coordinates(range),
            Self::Snp(id) => LocusQuerySpec::by_name(id).with_kind(GenomicElementKind::Snp),
            Self::Icre(accession) => {
                LocusQuerySpec::by_name(accession).with_kind(GenomicElementKind::Icre)
            }
            Self::Gene(name) => LocusQuerySpec::by_name(name).with_kind(GenomicElementKind::Gene),
        }
    }
}

/// Classifies a search string.
///
/// Anything with a locus separator (`:`, `%3A` or a tab) must parse as a
/// range; a malformed one is an error rather than a gene name.
///
/// # Examples
///
/// ```
/// use locus_core::{classify_search, SearchTarget};
///
/// assert!(matches!(classify_search("chr1:100-200"), Ok(SearchTarget::Coordinates(_))));
/// assert_eq!(classify_search("rs12345").unwrap(), SearchTarget::Snp("rs12345".to_string()));
/// assert_eq!(
///     classify_search("eh38e1516972").unwrap(),
///     SearchTarget::Icre("EH38E1516972".to_string())
/// );
/// assert_eq!(classify_search("SP1").unwrap(), SearchTarget::Gene("SP1".to_string()));
/// ```
pub fn classify_search(input: &str) -> LocusResult<SearchTarget> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LocusError::malformed(input, MalformedReason::Empty));
    }

    if looks_like_locus(input) {
        return parse_range(input).map(SearchTarget::Coordinates);
    }

    if let Some(digits) = trimmed.strip_prefix(well_known::RSID_PREFIX) {
        if is_digits(digits) {
            return Ok(SearchTarget::Snp(trimmed.to_string()));
        }
    }

    let prefix_len = well_known::ICRE_ACCESSION_PREFIX.len();
    if trimmed.len() > prefix_len
        && trimmed.is_char_boundary(prefix_len)
        && trimmed[..prefix_len].eq_ignore_ascii_case(well_known::ICRE_ACCESSION_PREFIX)
        && is_digits(&trimmed[prefix_len..])
    {
        return Ok(SearchTarget::Icre(trimmed.to_ascii_uppercase()));
    }

    Ok(SearchTarget::Gene(trimmed.to_string()))
}

fn looks_like_locus(input: &str) -> bool {
    input.contains(':')
        || input.contains('\t')
        || input.to_ascii_uppercase().contains(well_known::ENCODED_COLON)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::LocusName;

    #[test]
    fn test_coordinates_in_any_grammar() {
        let expected = GenomicRange::new("chr6", 100, 200).unwrap();
        for input in ["chr6:100-200", "chr6%3A100-200", "chr6\t100\t200", " chr6:100-200 "] {
            assert_eq!(
                classify_search(input).unwrap(),
                SearchTarget::Coordinates(expected.clone()),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_malformed_coordinates_are_errors() {
        assert!(matches!(
            classify_search("chr1:500-100"),
            Err(LocusError::MalformedLocus { .. })
        ));
        assert!(matches!(
            classify_search("  "),
            Err(LocusError::MalformedLocus {
                reason: MalformedReason::Empty,
                ..
            })
        ));
    }

    #[test]
    fn test_identifier_shapes() {
        assert_eq!(
            classify_search("rs4680").unwrap(),
            SearchTarget::Snp("rs4680".to_string())
        );
        // prefix alone, or trailing letters, is a gene symbol
        assert_eq!(
            classify_search("rs").unwrap(),
            SearchTarget::Gene("rs".to_string())
        );
        assert_eq!(
            classify_search("EH38E12x").unwrap(),
            SearchTarget::Gene("EH38E12x".to_string())
        );
        assert_eq!(
            classify_search("ENSG00000185591.9").unwrap(),
            SearchTarget::Gene("ENSG00000185591.9".to_string())
        );
    }

    #[test]
    fn test_into_query_spec() {
        let spec = SearchTarget::Icre("EH38E1".to_string()).into_query_spec();
        assert_eq!(spec.element_kind(), Some(GenomicElementKind::Icre));
        assert_eq!(spec.name(), Some(&LocusName::One("EH38E1".to_string())));

        let range = GenomicRange::new("chr1", 1, 2).unwrap();
        let spec = SearchTarget::Coordinates(range.clone()).into_query_spec();
        assert_eq!(spec.element_kind(), None);
        assert_eq!(spec.coordinates(), Some(&range));
    }
}
