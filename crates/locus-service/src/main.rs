//! Locus lookup command-line tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use locus_core::SecondaryStatus;
use locus_service::{
    read_bed_path, AggregatorConfig, AnnotationStore, LocusService, Projection, ResolverConfig,
};
use locus_types::{well_known, GenomicElementKind};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "locus", version, about = "Resolve genomic loci against an annotation store")]
struct Cli {
    /// Annotation store JSON document.
    #[arg(long, env = "LOCUS_DATA_PATH")]
    data: PathBuf,

    /// Output format.
    #[arg(long, env = "LOCUS_OUTPUT", value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Genome assembly sent with queries.
    #[arg(long, default_value = well_known::ASSEMBLY)]
    assembly: String,

    /// Fail instead of degrading when a cross-reference query fails.
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve coordinates, an rsID, an iCRE accession or a gene.
    Resolve {
        /// Search input, e.g. `chr11:5205263-5381894`, `rs334`, `SP1`.
        input: String,
        /// Narrow to one element kind (`snp`, `gene`, `icre`).
        #[arg(long, value_parser = parse_kind)]
        kind: Option<GenomicElementKind>,
    },
    /// cCREs closest to a gene.
    Nearby {
        /// Ensembl gene id, version suffix optional.
        gene_id: String,
    },
    /// cCREs linked to a gene.
    Linked {
        /// Ensembl gene id, version suffix optional.
        gene_id: String,
    },
    /// Resolve every range in a BED file.
    Batch {
        /// Tab-delimited BED file.
        bed_file: PathBuf,
        /// Narrow to one element kind (`snp`, `gene`, `icre`).
        #[arg(long, value_parser = parse_kind)]
        kind: Option<GenomicElementKind>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn parse_kind(value: &str) -> Result<GenomicElementKind, String> {
    GenomicElementKind::from_route(value)
        .ok_or_else(|| format!("unknown element kind '{}' (expected snp, gene or icre)", value))
}

fn write_output<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), serde_json::Error> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
    };
    println!("{}", rendered);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!("Loading annotation store from: {}", cli.data.display());
    let store = AnnotationStore::from_path(&cli.data)?;
    tracing::info!(
        "Loaded {} iCREs, {} SNPs, {} genes, {} gene links",
        store.icre_count(),
        store.snp_count(),
        store.gene_count(),
        store.link_count()
    );

    let resolver = ResolverConfig {
        assembly: cli.assembly,
        ..ResolverConfig::default()
    };
    let aggregator = if cli.strict {
        AggregatorConfig::strict()
    } else {
        AggregatorConfig::default()
    };
    let service = LocusService::with_config(store, resolver, aggregator);

    match cli.command {
        Command::Resolve { input, kind } => {
            let projection = service.resolve(&input, kind).await?;
            write_output(&projection, cli.output)?;
        }
        Command::Nearby { gene_id } => {
            let projection = service.nearby_ccres(&gene_id).await?;
            report_degraded(&projection);
            write_output(&projection, cli.output)?;
        }
        Command::Linked { gene_id } => {
            let projection = service.linked_icres(&gene_id).await?;
            report_degraded(&projection);
            write_output(&projection, cli.output)?;
        }
        Command::Batch { bed_file, kind } => {
            let ranges = read_bed_path(&bed_file)?;
            tracing::info!("Read {} ranges from {}", ranges.len(), bed_file.display());
            let projections = service.resolve_batch(ranges, kind).await?;
            write_output(&projections, cli.output)?;
        }
    }

    Ok(())
}

fn report_degraded(projection: &Projection) {
    if let Some(SecondaryStatus::Degraded { reason }) = &projection.secondary {
        tracing::warn!("iCRE flags unavailable for {}: {}", projection.query, reason);
    }
}
