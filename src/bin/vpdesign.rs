//! Designs Capture Hi-C viewpoints from the command line.
//!
//! ```shell
//! cargo run --release --bin=vpdesign --features=binaries -- \
//!     design --fasta hg38.fa --targets tss.tsv --enzyme DpnII --bed design
//! ```

use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use clap_verbosity_flag::Verbosity;
use nonempty::NonEmpty;
use tabled::builder::Builder as TableBuilder;
use tabled::settings::object::Rows;
use tabled::settings::Alignment;
use tabled::settings::Style;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;
use vpdesign::alignability;
use vpdesign::batch;
use vpdesign::config;
use vpdesign::design::Design;
use vpdesign::digest::Digester;
use vpdesign::enzyme::Enzyme;
use vpdesign::enzyme::Registry;
use vpdesign::export;
use vpdesign::sequence::IndexedFasta;
use vpdesign::viewpoint;
use vpdesign::viewpoint::Strategy;
use vpdesign::viewpoint::Target;
use vpdesign::viewpoint::ViewPoint;

////////////////////////////////////////////////////////////////////////////////////////
// Arguments
////////////////////////////////////////////////////////////////////////////////////////

/// The restriction enzymes to digest with.
#[derive(clap::Args)]
struct EnzymeArgs {
    /// The name of an enzyme to cut with (may be repeated).
    #[arg(short, long = "enzyme", required = true)]
    enzymes: Vec<String>,

    /// A file of additional `name<TAB>site` enzyme definitions.
    #[arg(long = "enzymes")]
    enzyme_file: Option<PathBuf>,
}

impl EnzymeArgs {
    /// Resolves the requested enzymes.
    fn resolve(&self) -> Result<NonEmpty<Enzyme>> {
        let mut registry = Registry::builtin();

        if let Some(path) = &self.enzyme_file {
            let file = File::open(path)
                .with_context(|| format!("opening enzyme file {}", path.display()))?;
            let custom = Registry::try_from_reader(vpdesign::Reader::new(BufReader::new(file)))
                .with_context(|| format!("reading enzyme file {}", path.display()))?;

            for enzyme in custom.enzymes() {
                registry.insert(enzyme.clone());
            }
        }

        Ok(registry.resolve(&self.enzymes)?)
    }
}

/// Digests a whole genome.
#[derive(clap::Args)]
struct DigestArgs {
    /// The indexed FASTA file of the genome.
    #[arg(short, long)]
    fasta: PathBuf,

    #[command(flatten)]
    enzymes: EnzymeArgs,

    /// Where to write the fragment report (defaults to stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Builds viewpoints around a list of targets.
#[derive(clap::Args)]
struct DesignArgs {
    /// The indexed FASTA file of the genome.
    #[arg(short, long)]
    fasta: PathBuf,

    /// A file of `chromosome<TAB>position<TAB>strand<TAB>name` targets.
    #[arg(short, long)]
    targets: PathBuf,

    #[command(flatten)]
    enzymes: EnzymeArgs,

    /// The selection strategy (`simple` or `extended`).
    #[arg(short, long, default_value_t = Strategy::Extended)]
    strategy: Strategy,

    /// The number of bases searched upstream of each target.
    #[arg(long, default_value_t = config::DEFAULT_UPSTREAM)]
    upstream: u64,

    /// The number of bases searched downstream of each target.
    #[arg(long, default_value_t = config::DEFAULT_DOWNSTREAM)]
    downstream: u64,

    /// The maximum distance of a selected fragment's start upstream of a
    /// target.
    #[arg(long, default_value_t = config::DEFAULT_MAX_DISTANCE_UPSTREAM)]
    max_distance_upstream: u64,

    /// The maximum distance of a selected fragment's end downstream of a
    /// target.
    #[arg(long, default_value_t = config::DEFAULT_MAX_DISTANCE_DOWNSTREAM)]
    max_distance_downstream: u64,

    /// The margin size.
    #[arg(long, default_value_t = config::DEFAULT_MARGIN_SIZE)]
    margin_size: u64,

    /// The minimum fragment size.
    #[arg(long, default_value_t = config::DEFAULT_MIN_FRAGMENT_SIZE)]
    min_fragment_size: u64,

    /// The maximum repeat content of either margin.
    #[arg(long, default_value_t = config::DEFAULT_MAX_REPEAT_CONTENT)]
    max_repeat_content: f64,

    /// The minimum GC content of a fragment.
    #[arg(long, default_value_t = config::DEFAULT_MIN_GC_CONTENT)]
    min_gc_content: f64,

    /// The maximum GC content of a fragment.
    #[arg(long, default_value_t = config::DEFAULT_MAX_GC_CONTENT)]
    max_gc_content: f64,

    /// The probe length.
    #[arg(long, default_value_t = config::DEFAULT_PROBE_LENGTH)]
    probe_length: u64,

    /// The tiling factor.
    #[arg(long, default_value_t = config::DEFAULT_TILING_FACTOR)]
    tiling_factor: u64,

    /// A (possibly gzipped) chromosome-length table, required for baits.
    #[arg(long, requires = "alignability")]
    chrom_sizes: Option<PathBuf>,

    /// A (possibly gzipped) alignability bedGraph track, required for baits.
    #[arg(long, requires = "chrom_sizes")]
    alignability: Option<PathBuf>,

    /// The k-mer size the alignability track was computed with.
    #[arg(long)]
    kmer_size: Option<usize>,

    /// The bait length.
    #[arg(long, default_value_t = config::DEFAULT_BAIT_LENGTH)]
    bait_length: u64,

    /// The maximum mean alignability score of a bait.
    #[arg(long, default_value_t = config::DEFAULT_MAX_ALIGNABILITY)]
    max_bait_alignability: f64,

    /// A prefix for the BED files of fragments, margins and baits.
    #[arg(long)]
    bed: Option<PathBuf>,
}

impl DesignArgs {
    /// Builds the design parameters.
    fn parameters(&self) -> Result<config::Parameters> {
        let builder = config::Builder::default()
            .upstream(self.upstream)
            .downstream(self.downstream)
            .max_distance_upstream(self.max_distance_upstream)
            .max_distance_downstream(self.max_distance_downstream)
            .margin_size(self.margin_size)
            .min_fragment_size(self.min_fragment_size)
            .max_repeat_content(self.max_repeat_content)
            .gc_content(self.min_gc_content, self.max_gc_content)
            .probe_length(self.probe_length)
            .tiling_factor(self.tiling_factor);

        let builder = match self.alignability {
            Some(_) => builder
                .bait_length(self.bait_length)
                .max_bait_alignability(self.max_bait_alignability),
            None => builder.without_baits(),
        };

        builder.try_build().context("validating parameters")
    }
}

/// The subcommands.
#[derive(Subcommand)]
enum Command {
    /// Digests a whole genome into a fragment report.
    Digest(DigestArgs),

    /// Designs viewpoints around a list of targets.
    Design(DesignArgs),
}

/// Designs Capture Hi-C viewpoints.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The subcommand.
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity,
}

////////////////////////////////////////////////////////////////////////////////////////
// Subcommands
////////////////////////////////////////////////////////////////////////////////////////

/// Opens an output file, or stdout when no path is given.
fn create(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

fn digest(args: &DigestArgs) -> Result<()> {
    let digester = Digester::new(args.enzymes.resolve()?);
    let fasta = IndexedFasta::from_path(&args.fasta)
        .with_context(|| format!("opening {}", args.fasta.display()))?;

    let digest = digester.digest_genome(&fasta);

    if digest.catalog.fragment_count() == 0 && !digest.failures.is_empty() {
        bail!("no chromosome could be digested");
    }

    info!(
        "{} fragment(s) with a mean length of {:.1} bp",
        digest.catalog.fragment_count(),
        digest.catalog.mean_fragment_length()
    );

    let mut writer = create(args.output.as_deref())?;
    digest
        .catalog
        .write_report(&mut writer)
        .context("writing fragment report")?;
    writer.flush()?;

    Ok(())
}

/// Reads the targets.
fn read_targets(path: &Path) -> Result<Vec<Target>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = vpdesign::Reader::new(BufReader::new(file));

    reader
        .records::<Target>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading targets from {}", path.display()))
}

/// Writes the BED files of a design.
fn write_beds(prefix: &Path, viewpoints: &[ViewPoint]) -> Result<()> {
    let path = |suffix: &str| {
        let mut path = prefix.as_os_str().to_owned();
        path.push(suffix);
        PathBuf::from(path)
    };

    type Writer = fn(&mut Box<dyn Write>, &[ViewPoint]) -> std::io::Result<()>;

    let writers: [(&str, Writer); 3] = [
        (".fragments.bed", export::write_fragments),
        (".margins.bed", export::write_margins),
        (".baits.bed", export::write_baits),
    ];

    for (suffix, write) in writers {
        let path = path(suffix);
        let mut writer = create(Some(&path))?;
        write(&mut writer, viewpoints)
            .with_context(|| format!("writing {}", path.display()))?;
        writer.flush()?;
        info!("wrote {}", path.display());
    }

    Ok(())
}

/// Prints a table of every viewpoint and the design summary.
fn print_summary(viewpoints: &[ViewPoint], design: &Design) {
    let mut builder = TableBuilder::default();
    builder.push_record([
        "Target",
        "Location",
        "Strategy",
        "Fragments",
        "Length",
        "Score",
        "Status",
    ]);

    for viewpoint in viewpoints {
        let status = match viewpoint.unresolved() {
            Some(reason) => reason.to_string(),
            None => String::from("resolved"),
        };

        builder.push_record([
            viewpoint.target().name().to_string(),
            viewpoint.genomic_location(),
            viewpoint.strategy().to_string(),
            viewpoint.selected_count().to_string(),
            viewpoint.total_length().to_string(),
            viewpoint.score_as_percent(),
            status,
        ]);
    }

    let table = builder
        .build()
        .with(Style::rounded())
        .modify(Rows::new(1..), Alignment::left())
        .to_string();

    println!("{}", table);

    let mut builder = TableBuilder::default();
    builder.push_record(["Statistic", "Value"]);

    let rows = [
        ("Viewpoints", design.viewpoints().to_string()),
        ("Resolved viewpoints", design.resolved_viewpoints().to_string()),
        ("Genes", design.genes().to_string()),
        ("Resolved genes", design.resolved_genes().to_string()),
        ("Unique fragments", design.unique_fragments().to_string()),
        (
            "Fragments per viewpoint",
            format!("{:.2}", design.mean_fragments_per_viewpoint()),
        ),
        ("Mean score", format!("{:.2}%", 100.0 * design.mean_score())),
        ("Mean size (bp)", format!("{:.1}", design.mean_size())),
        ("Margin nucleotides", design.margin_nucleotides().to_string()),
        ("Total effective size", design.total_effective_size().to_string()),
        ("Estimated probes", design.estimated_probes().to_string()),
    ];

    for (name, value) in rows {
        builder.push_record([name, value.as_str()]);
    }

    let table = builder
        .build()
        .with(Style::rounded())
        .modify(Rows::new(1..), Alignment::left())
        .to_string();

    println!("{}", table);
}

fn design(args: &DesignArgs) -> Result<()> {
    let parameters = args.parameters()?;
    let digester = Digester::new(args.enzymes.resolve()?);
    let fasta = IndexedFasta::from_path(&args.fasta)
        .with_context(|| format!("opening {}", args.fasta.display()))?;
    let targets = read_targets(&args.targets)?;

    let index = match (&args.chrom_sizes, &args.alignability) {
        (Some(sizes), Some(track)) => {
            let mut builder = alignability::Builder::default();

            if let Some(k) = args.kmer_size {
                builder = builder.kmer_size(k);
            }

            Some(
                builder
                    .try_build_from_paths(sizes, track)
                    .context("building alignability index")?,
            )
        }
        _ => None,
    };

    let mut builder = viewpoint::Builder::new(&fasta, &digester, &parameters);

    if let Some(index) = &index {
        builder = builder.alignability(index);
    }

    let batch = batch::run(&builder, &targets, args.strategy, &AtomicBool::new(false));

    if batch.viewpoints.is_empty() && !batch.failures.is_empty() {
        bail!("no viewpoint could be built");
    }

    let design = Design::from_viewpoints(&batch.viewpoints, &parameters);
    print_summary(&batch.viewpoints, &design);

    if let Some(prefix) = &args.bed {
        write_beds(prefix, &batch.viewpoints)?;
    }

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .with_writer(std::io::stderr)
            .init(),
    };

    match &args.command {
        Command::Digest(args) => digest(args),
        Command::Design(args) => design(args),
    }
}
