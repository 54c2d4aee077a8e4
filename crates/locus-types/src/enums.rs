//! Enumeration types.
//!
//! This module provides enum representations for element kinds, strands,
//! range anchors and candidate regulatory element classes.

use std::fmt;

/// Kind of genomic element a locus page can show.
///
/// Used to gate which primary queries are legal for a given locus.
///
/// # Examples
///
/// ```
/// use locus_types::GenomicElementKind;
///
/// assert_eq!(GenomicElementKind::from_route("variant"), Some(GenomicElementKind::Snp));
/// assert_eq!(GenomicElementKind::from_route("iCRE"), Some(GenomicElementKind::Icre));
/// assert_eq!(GenomicElementKind::from_route("region"), None);
/// assert_eq!(GenomicElementKind::Icre.display_name(), "iCRE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GenomicElementKind {
    /// Single nucleotide polymorphism, identified by rsID.
    Snp,
    /// Gene, identified by symbol or Ensembl id.
    Gene,
    /// Immune candidate cis-regulatory element, identified by accession.
    Icre,
}

impl GenomicElementKind {
    /// All element kinds, in routing order.
    pub const ALL: [GenomicElementKind; 3] = [Self::Snp, Self::Gene, Self::Icre];

    /// Parses a route segment (`variant`, `snp`, `gene`, `icre`).
    ///
    /// Matching is case-insensitive. Returns `None` for anything else,
    /// including the `region` portal which is not an element kind.
    pub fn from_route(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "variant" | "snp" => Some(Self::Snp),
            "gene" => Some(Self::Gene),
            "icre" => Some(Self::Icre),
            _ => None,
        }
    }

    /// Returns the route segment used for this kind.
    pub fn route(self) -> &'static str {
        match self {
            Self::Snp => "variant",
            Self::Gene => "gene",
            Self::Icre => "icre",
        }
    }

    /// Human-readable name for this kind.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Snp => "Variant",
            Self::Gene => "Gene",
            Self::Icre => "iCRE",
        }
    }
}

impl fmt::Display for GenomicElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// DNA strand of a gene or transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    /// Forward (`+`) strand.
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Forward,
    /// Reverse (`-`) strand.
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Reverse,
}

impl Strand {
    /// Parses `+` or `-`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Forward),
            "-" => Some(Self::Reverse),
            _ => None,
        }
    }

    /// Returns `+` or `-`.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Forward => "+",
            Self::Reverse => "-",
        }
    }
}

/// Point of a range that distances are measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RangeAnchor {
    /// The start coordinate.
    Start,
    /// The end coordinate.
    End,
    /// The midpoint.
    Middle,
    /// Whichever of start, end and midpoint is nearest.
    #[default]
    Closest,
}

/// Candidate cis-regulatory element classification.
///
/// # Examples
///
/// ```
/// use locus_types::CcreClass;
///
/// let class = CcreClass::from_code("dELS");
/// assert_eq!(class, Some(CcreClass::DistalEnhancer));
/// assert_eq!(CcreClass::display_name_for("dELS"), "Distal Enhancer");
/// assert_eq!(CcreClass::display_name_for("???"), "No Class Found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CcreClass {
    /// Promoter-like signature (`PLS`).
    Promoter,
    /// Proximal enhancer-like signature (`pELS`).
    ProximalEnhancer,
    /// Distal enhancer-like signature (`dELS`).
    DistalEnhancer,
    /// Chromatin accessible with H3K4me3 (`CA-H3K4me3`).
    AccessibleH3k4me3,
    /// Chromatin accessible with TF (`CA-TF`).
    AccessibleTf,
    /// Chromatin accessible with CTCF (`CA-CTCF`).
    AccessibleCtcf,
    /// Chromatin accessible only (`CA`).
    Accessible,
    /// Transcription factor (`TF`).
    TranscriptionFactor,
    /// Inactive (`InActive`).
    Inactive,
}

impl CcreClass {
    /// Fallback display name for unrecognized codes.
    pub const UNKNOWN_DISPLAY_NAME: &'static str = "No Class Found";

    /// Creates a class from its upstream code.
    ///
    /// Returns `None` if the code is not recognized. Codes are case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PLS" => Some(Self::Promoter),
            "pELS" => Some(Self::ProximalEnhancer),
            "dELS" => Some(Self::DistalEnhancer),
            "CA-H3K4me3" => Some(Self::AccessibleH3k4me3),
            "CA-TF" => Some(Self::AccessibleTf),
            "CA-CTCF" => Some(Self::AccessibleCtcf),
            "CA" => Some(Self::Accessible),
            "TF" => Some(Self::TranscriptionFactor),
            "InActive" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Returns the upstream code for this class.
    pub fn code(self) -> &'static str {
        match self {
            Self::Promoter => "PLS",
            Self::ProximalEnhancer => "pELS",
            Self::DistalEnhancer => "dELS",
            Self::AccessibleH3k4me3 => "CA-H3K4me3",
            Self::AccessibleTf => "CA-TF",
            Self::AccessibleCtcf => "CA-CTCF",
            Self::Accessible => "CA",
            Self::TranscriptionFactor => "TF",
            Self::Inactive => "InActive",
        }
    }

    /// Human-readable name for this class.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Promoter => "Promoter",
            Self::ProximalEnhancer => "Proximal Enhancer",
            Self::DistalEnhancer => "Distal Enhancer",
            Self::AccessibleH3k4me3 => "Chromatin Accessible with H3K4me3",
            Self::AccessibleTf => "Chromatin Accessible with TF",
            Self::AccessibleCtcf => "Chromatin Accessible with CTCF",
            Self::Accessible => "Chromatin Accessible",
            Self::TranscriptionFactor => "Transcription Factor",
            Self::Inactive => "Inactive",
        }
    }

    /// Display name for a raw code, falling back to "No Class Found".
    pub fn display_name_for(code: &str) -> &'static str {
        Self::from_code(code)
            .map(Self::display_name)
            .unwrap_or(Self::UNKNOWN_DISPLAY_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_kind_routes_roundtrip() {
        for kind in GenomicElementKind::ALL {
            assert_eq!(GenomicElementKind::from_route(kind.route()), Some(kind));
        }
        assert_eq!(GenomicElementKind::from_route("SNP"), Some(GenomicElementKind::Snp));
    }

    #[test]
    fn test_strand_symbols() {
        assert_eq!(Strand::from_symbol("+"), Some(Strand::Forward));
        assert_eq!(Strand::from_symbol("-"), Some(Strand::Reverse));
        assert_eq!(Strand::from_symbol("."), None);
        assert_eq!(Strand::Reverse.symbol(), "-");
    }

    #[test]
    fn test_ccre_class_codes() {
        let codes = [
            "PLS", "pELS", "dELS", "CA-H3K4me3", "CA-TF", "CA-CTCF", "CA", "TF", "InActive",
        ];
        for code in codes {
            let class = CcreClass::from_code(code).unwrap();
            assert_eq!(class.code(), code);
        }
        assert_eq!(CcreClass::from_code("pls"), None);
        assert_eq!(CcreClass::display_name_for("InActive"), "Inactive");
    }
}
