use std::any::Any;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::Result;
use forge::{default_artifact_dir, CircuitKind, Scenario};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::{self, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Compile, set up, prove and verify the bundled example circuits.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output formats
    #[clap(short, long, value_enum, global = true)]
    format: Option<Vec<Format>>,

    /// Seed for a reproducible run. Omitted means fresh OS randomness.
    #[clap(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile, set up, prove and verify in one go
    Run(CircuitArgs),
    /// Print constraint counts
    Stats(CircuitArgs),
    /// Generate keys and write pk.bin and vk.bin
    Setup(ArtifactArgs),
    /// Prove with a stored proving key and write proof.bin and public.bin
    Prove(ArtifactArgs),
    /// Verify a stored proof
    Verify(ArtifactArgs),
}

#[derive(Args, Debug)]
struct CircuitArgs {
    #[clap(value_enum)]
    circuit: CircuitKind,
}

#[derive(Args, Debug)]
struct ArtifactArgs {
    #[clap(value_enum)]
    circuit: CircuitKind,

    /// Directory holding the keys and proof
    #[clap(long, visible_aliases = ["out", "keys"], default_value_os_t = default_artifact_dir())]
    dir: PathBuf,
}

#[derive(Debug, Clone, ValueEnum, PartialEq)]
enum Format {
    Default,
    Chrome,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guards = init_tracing(cli.format.as_deref().unwrap_or_default());
    let mut rng = match cli.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_seed(rand::random()),
    };

    match cli.command {
        Commands::Run(args) => Scenario::new(args.circuit)?.run(&mut rng),
        Commands::Stats(args) => {
            let stats = Scenario::new(args.circuit)?.stats();
            println!("constraints:   {}", stats.num_constraints);
            println!("variables:     {}", stats.num_variables);
            println!("public inputs: {}", stats.num_public_inputs);
            println!(
                "non-zero:      A {} / B {} / C {}",
                stats.a_non_zero, stats.b_non_zero, stats.c_non_zero
            );
            Ok(())
        }
        Commands::Setup(args) => Scenario::new(args.circuit)?.write_keys(&args.dir, &mut rng),
        Commands::Prove(args) => Scenario::new(args.circuit)?.write_proof(&args.dir, &mut rng),
        Commands::Verify(args) => Scenario::new(args.circuit)?.verify_stored(&args.dir),
    }
}

fn init_tracing(formats: &[Format]) -> Vec<Box<dyn Any>> {
    let mut layers = Vec::new();

    let log_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(log_filter)
        .boxed();
    layers.push(log_layer);

    let mut guards: Vec<Box<dyn Any>> = vec![];

    if formats.contains(&Format::Default) {
        let collector_layer = tracing_subscriber::fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .compact()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed();
        layers.push(collector_layer);
    }
    if formats.contains(&Format::Chrome) {
        let (chrome_layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
        layers.push(chrome_layer.boxed());
        guards.push(Box::new(guard));
    }

    tracing_subscriber::registry().with(layers).init();
    if formats.contains(&Format::Chrome) {
        tracing::info!("Running tracing-chrome. Files will be saved as trace-<some timestamp>.json and can be viewed in https://ui.perfetto.dev/");
    }
    guards
}
