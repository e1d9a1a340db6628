use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::PathBuf,
    process::ExitCode,
};

use cascade::{
    input::Instance, layout::Layout, playback::Playback, Cascade, CascadeError, EdgePolicy,
    NodeId,
};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Run one Independent Cascade trial and report how far the influence spread.
#[derive(Parser, Debug)]
#[command(name = "cascade", version, about)]
struct Args {
    /// Instance file in the `n m / edges / p / s / seeds` text format, `-` for stdin.
    /// Without it the built-in 25-node demo graph is used.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override the activation probability of the instance
    #[arg(short, long)]
    probability: Option<f64>,

    /// Override the seed set of the instance
    #[arg(short, long, num_args = 1..)]
    seed: Option<Vec<NodeId>>,

    /// Seed for the random draws; omitted means a fresh, non-reproducible run
    #[arg(long)]
    rng_seed: Option<u64>,

    /// Ignore repeated edges and self-loops while reading the instance
    #[arg(long)]
    dedup: bool,

    /// Write the frames, node positions and edges as JSON for a renderer
    #[arg(long)]
    playback: Option<PathBuf>,

    /// Maximum number of force-directed layout steps for the playback
    #[arg(long, default_value_t = 500)]
    layout_iterations: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cascade=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CascadeError> {
    let policy = if args.dedup {
        EdgePolicy::Deduplicate
    } else {
        EdgePolicy::KeepDuplicates
    };

    let mut instance = match &args.input {
        None => Instance::demo()?,
        Some(path) if path.as_os_str() == "-" => Instance::parse(io::stdin().lock(), policy)?,
        Some(path) => Instance::parse(BufReader::new(File::open(path)?), policy)?,
    };
    if let Some(p) = args.probability {
        instance.probability = p;
    }
    if let Some(seed) = args.seed {
        instance.seed = seed;
    }

    info!(
        nodes = instance.graph.node_count(),
        edges = instance.graph.edge_count(),
        probability = instance.probability,
        seed = ?instance.seed,
        "loaded instance"
    );

    let mut rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let outcome = Cascade::builder()
        .probability(instance.probability)
        .build()?
        .run(&instance.graph, &instance.seed, &mut rng)?;

    println!("Size of C: {}", outcome.influenced_count);
    println!("Value of t: {}", outcome.rounds);

    if let Some(path) = args.playback {
        let positions = Layout::builder()
            .iterations(args.layout_iterations)
            .build()
            .compute(&instance.graph);
        let playback = Playback::new(&instance.graph, &outcome, &positions);
        playback.to_json_writer(BufWriter::new(File::create(&path)?))?;
        info!(
            frames = playback.frames.len(),
            path = %path.display(),
            "playback written"
        );
    }

    Ok(())
}
