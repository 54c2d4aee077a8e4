//! In-memory annotation store.
//!
//! Serves every [`Operation`] from records held in memory, so the resolver
//! and aggregator can run without a remote service. Rows come back in
//! storage order with duplicates preserved, which keeps join fan-out
//! reproducible.
//!
//! ```ignore
//! let store = AnnotationStore::from_path("annotations.json")?;
//! let resolver = LocusResolver::new(&store);
//! let icres = resolver.resolve::<IcreRecord>(&spec).await?;
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use locus_types::{
    CcreClassification, GeneRecord, GenomicRange, IcreRecord, LinkedIcre, NearbyCcre, SnpRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parser::strip_version;
use crate::query::{ExecutorError, Operation, QueryExecutor, QueryVariables};
use crate::types::{LocusError, LocusResult};

/// A nearby cCRE filed under the gene it is closest to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearbyCcreEntry {
    /// Gene id the cCRE is closest to (version suffix optional).
    pub geneid: String,
    /// The cCRE row returned for that gene.
    #[serde(flatten)]
    pub ccre: NearbyCcre,
}

/// In-memory store for annotation records.
///
/// The JSON document layout mirrors the fields:
///
/// ```json
/// { "icres": [], "snps": [], "genes": [], "linkedIcres": [],
///   "nearbyCcres": [], "ccreClassifications": [] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationStore {
    icres: Vec<IcreRecord>,
    snps: Vec<SnpRecord>,
    genes: Vec<GeneRecord>,
    linked_icres: Vec<LinkedIcre>,
    nearby_ccres: Vec<NearbyCcreEntry>,
    ccre_classifications: Vec<CcreClassification>,
}

impl AnnotationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a JSON document on disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid store document.
    pub fn from_path<P: AsRef<Path>>(path: P) -> LocusResult<Self> {
        let file = File::open(path.as_ref())?;
        serde_json::from_reader(BufReader::new(file)).map_err(LocusError::InvalidStore)
    }

    /// Parses a store from a JSON string.
    pub fn from_json(json: &str) -> LocusResult<Self> {
        serde_json::from_str(json).map_err(LocusError::InvalidStore)
    }

    /// Inserts iCREs.
    pub fn insert_icres(&mut self, icres: impl IntoIterator<Item = IcreRecord>) {
        self.icres.extend(icres);
    }

    /// Inserts SNPs.
    pub fn insert_snps(&mut self, snps: impl IntoIterator<Item = SnpRecord>) {
        self.snps.extend(snps);
    }

    /// Inserts genes.
    pub fn insert_genes(&mut self, genes: impl IntoIterator<Item = GeneRecord>) {
        self.genes.extend(genes);
    }

    /// Inserts gene-cCRE links.
    pub fn insert_linked_icres(&mut self, links: impl IntoIterator<Item = LinkedIcre>) {
        self.linked_icres.extend(links);
    }

    /// Inserts nearby cCREs for a gene.
    pub fn insert_nearby_ccres(
        &mut self,
        geneid: &str,
        ccres: impl IntoIterator<Item = NearbyCcre>,
    ) {
        self.nearby_ccres.extend(ccres.into_iter().map(|ccre| NearbyCcreEntry {
            geneid: geneid.to_string(),
            ccre,
        }));
    }

    /// Inserts iCRE classifications.
    pub fn insert_classifications(
        &mut self,
        classifications: impl IntoIterator<Item = CcreClassification>,
    ) {
        self.ccre_classifications.extend(classifications);
    }

    /// Returns the number of iCREs.
    pub fn icre_count(&self) -> usize {
        self.icres.len()
    }

    /// Returns the number of SNPs.
    pub fn snp_count(&self) -> usize {
        self.snps.len()
    }

    /// Returns the number of genes.
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    /// Returns the number of gene-cCRE links.
    pub fn link_count(&self) -> usize {
        self.linked_icres.len() + self.nearby_ccres.len()
    }

    fn query(&self, operation: Operation, vars: &QueryVariables) -> Result<Vec<Value>, ExecutorError> {
        let range = vars.range();
        let names = vars.strings("name");

        match operation {
            Operation::Icre => rows(self.icres.iter().filter(|icre| {
                matches_range(&range, &icre.coordinates)
                    && matches_any(&names, |n| n == icre.accession)
            })),
            Operation::Snp => rows(self.snps.iter().filter(|snp| {
                matches_range(&range, &snp.coordinates) && matches_any(&names, |n| n == snp.id)
            })),
            Operation::Gene => rows(self.genes.iter().filter(|gene| {
                matches_range(&range, &gene.coordinates)
                    && matches_any(&names, |n| {
                        n == gene.name || strip_version(n) == strip_version(&gene.id)
                    })
            })),
            Operation::LinkedIcres => {
                let gene_ids = vars.strings("geneid");
                rows(self.linked_icres.iter().filter(|link| {
                    let linked_gene = link.geneid.as_deref().map(strip_version);
                    matches_any(&gene_ids, |g| Some(strip_version(g)) == linked_gene)
                }))
            }
            Operation::NearbyCcres => {
                let gene_ids = vars.strings("geneid");
                rows(
                    self.nearby_ccres
                        .iter()
                        .filter(|entry| {
                            matches_any(&gene_ids, |g| {
                                strip_version(g) == strip_version(&entry.geneid)
                            })
                        })
                        .map(|entry| &entry.ccre),
                )
            }
            Operation::CcreClassification => {
                let accessions = vars.strings("accession");
                rows(
                    self.ccre_classifications
                        .iter()
                        .filter(|c| matches_any(&accessions, |a| a == c.accession)),
                )
            }
        }
    }
}

impl QueryExecutor for AnnotationStore {
    async fn execute(
        &self,
        operation: Operation,
        variables: &QueryVariables,
    ) -> Result<Vec<Value>, ExecutorError> {
        self.query(operation, variables)
    }
}

fn matches_range(range: &Option<GenomicRange>, coordinates: &GenomicRange) -> bool {
    range.as_ref().map_or(true, |r| r.overlaps(coordinates))
}

fn matches_any<F: Fn(&str) -> bool>(filter: &Option<Vec<&str>>, pred: F) -> bool {
    filter.as_ref().map_or(true, |values| values.iter().any(|&v| pred(v)))
}

fn rows<'a, T, I>(records: I) -> Result<Vec<Value>, ExecutorError>
where
    T: Serialize + 'a,
    I: Iterator<Item = &'a T>,
{
    records
        .map(|record| serde_json::to_value(record).map_err(|e| ExecutorError::Rejected(e.to_string())))
        .collect()
}
