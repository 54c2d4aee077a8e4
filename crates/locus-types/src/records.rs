//! Entity records returned by the annotation service.
//!
//! Field names follow the upstream service so records deserialize directly
//! from its JSON rows.

use crate::{GenomicRange, Strand};

/// A record carrying a natural key.
///
/// The key is unique among distinct entities but may repeat inside one raw
/// result when the upstream service fans out a one-to-many join.
pub trait NaturalKey {
    /// Returns the stable identifier (accession, rsID, gene id).
    fn natural_key(&self) -> &str;
}

/// An immune candidate cis-regulatory element.
///
/// # Examples
///
/// ```
/// use locus_types::{GenomicRange, IcreRecord, NaturalKey};
///
/// let icre = IcreRecord {
///     accession: "EH38E1516972".to_string(),
///     group: Some("dELS".to_string()),
///     ataccelltypes: vec![],
///     dnasecelltypes: vec![],
///     coordinates: GenomicRange::new("chr11", 5_205_263, 5_205_613).unwrap(),
/// };
/// assert_eq!(icre.natural_key(), "EH38E1516972");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IcreRecord {
    /// iCRE accession.
    pub accession: String,
    /// cCRE class code (see [`CcreClass`](crate::CcreClass)).
    #[cfg_attr(feature = "serde", serde(default))]
    pub group: Option<String>,
    /// Cell types with ATAC signal.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ataccelltypes: Vec<String>,
    /// Cell types with DNase signal.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dnasecelltypes: Vec<String>,
    /// Element coordinates.
    pub coordinates: GenomicRange,
}

impl NaturalKey for IcreRecord {
    fn natural_key(&self) -> &str {
        &self.accession
    }
}

/// A single nucleotide polymorphism.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnpRecord {
    /// rsID.
    pub id: String,
    /// SNP coordinates.
    pub coordinates: GenomicRange,
}

impl NaturalKey for SnpRecord {
    fn natural_key(&self) -> &str {
        &self.id
    }
}

/// A gene.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneRecord {
    /// Gene symbol.
    pub name: String,
    /// Versioned Ensembl gene id.
    pub id: String,
    /// Strand, when reported.
    #[cfg_attr(feature = "serde", serde(default))]
    pub strand: Option<Strand>,
    /// Gene coordinates.
    pub coordinates: GenomicRange,
}

impl NaturalKey for GeneRecord {
    fn natural_key(&self) -> &str {
        &self.id
    }
}

/// A linkage between a cCRE and a gene (eQTL, chromatin loop, CRISPR screen).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkedIcre {
    /// Linked cCRE accession.
    pub accession: String,
    /// Linkage p-value.
    pub p_val: Option<f64>,
    /// Gene symbol.
    pub gene: Option<String>,
    /// Gene id.
    pub geneid: Option<String>,
    /// Gene biotype.
    pub genetype: Option<String>,
    /// Linkage method.
    pub method: Option<String>,
    /// Guide RNA id for CRISPR links.
    pub grnaid: Option<String>,
    /// Effect size.
    pub effectsize: Option<f64>,
    /// Assay (`RNAPII-ChIAPET`, `CTCF-ChIAPET`, `Intact-HiC`, `CRISPRi-FlowFISH`).
    pub assay: Option<String>,
    /// Cell type.
    pub celltype: Option<String>,
    /// Experiment accession.
    pub experiment_accession: Option<String>,
    /// Tissue.
    pub tissue: Option<String>,
    /// Variant id for eQTL links.
    pub variantid: Option<String>,
    /// Source study.
    pub source: Option<String>,
    /// eQTL slope.
    pub slope: Option<f64>,
    /// Link score.
    pub score: Option<f64>,
    /// Display name of the biosample.
    pub displayname: Option<String>,
}

impl NaturalKey for LinkedIcre {
    fn natural_key(&self) -> &str {
        &self.accession
    }
}

/// Gene summary embedded in a [`NearbyCcre`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NearbyGene {
    /// Gene symbol.
    pub name: String,
    /// Chromosome.
    pub chromosome: String,
    /// Gene start.
    pub start: u64,
    /// Gene end.
    pub stop: u64,
    /// Gene biotype.
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub gene_type: Option<String>,
}

/// A cCRE near a gene, as reported by the closest-gene query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NearbyCcre {
    /// cCRE accession.
    pub ccre: String,
    /// Chromosome.
    pub chromosome: String,
    /// cCRE start.
    pub start: u64,
    /// cCRE end.
    pub stop: u64,
    /// cCRE class code.
    #[cfg_attr(feature = "serde", serde(default))]
    pub group: Option<String>,
    /// The gene this cCRE is closest to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gene: Option<NearbyGene>,
}

impl NaturalKey for NearbyCcre {
    fn natural_key(&self) -> &str {
        &self.ccre
    }
}

/// Whether a cCRE accession is also classified as an iCRE.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CcreClassification {
    /// cCRE accession.
    pub accession: String,
    /// True if the accession is an iCRE.
    #[cfg_attr(feature = "serde", serde(rename = "isiCRE"))]
    pub is_icre: bool,
}

impl NaturalKey for CcreClassification {
    fn natural_key(&self) -> &str {
        &self.accession
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_upstream_rows() {
        let icre: IcreRecord = serde_json::from_value(serde_json::json!({
            "accession": "EH38E0001314",
            "group": "PLS",
            "ataccelltypes": ["Bulk_B"],
            "coordinates": { "chromosome": "chr1", "start": 10, "end": 20 }
        }))
        .unwrap();
        assert_eq!(icre.natural_key(), "EH38E0001314");
        assert!(icre.dnasecelltypes.is_empty());

        let class: CcreClassification = serde_json::from_value(serde_json::json!({
            "accession": "EH38E0001314",
            "isiCRE": true
        }))
        .unwrap();
        assert!(class.is_icre);

        let gene: GeneRecord = serde_json::from_value(serde_json::json!({
            "name": "SP1",
            "id": "ENSG00000185591.9",
            "strand": "+",
            "coordinates": { "chromosome": "chr12", "start": 53380176, "end": 53416446 }
        }))
        .unwrap();
        assert_eq!(gene.strand, Some(Strand::Forward));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_inverted_coordinates_fail_to_decode() {
        let snp = serde_json::from_value::<SnpRecord>(serde_json::json!({
            "id": "rs1",
            "coordinates": { "chromosome": "chr1", "start": 900, "end": 100 }
        }));
        assert!(snp.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_linked_icre_tolerates_sparse_rows() {
        let link: LinkedIcre = serde_json::from_value(serde_json::json!({
            "accession": "EH38E2941580",
            "assay": "Intact-HiC",
            "p_val": 0.001
        }))
        .unwrap();
        assert_eq!(link.natural_key(), "EH38E2941580");
        assert_eq!(link.assay.as_deref(), Some("Intact-HiC"));
        assert!(link.slope.is_none());
    }
}
