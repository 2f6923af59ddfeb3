//! Trains a digit classifier on IDX (MNIST) files and reports test accuracy.
//!
//! Run with:
//!   cargo run --release -- --train-images res/train-images.idx3-ubyte ...
//!
//! Set `RUST_LOG=debug` for per-layer and per-batch detail.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use digitnet::dataset::load_idx_pair;
use digitnet::{Network, NetworkSpec, TrainConfig};

#[derive(Debug, Parser)]
#[command(name = "digitnet", version, about = "Train a feedforward network on handwritten digits")]
struct Args {
    #[arg(long, default_value = "res/train-images.idx3-ubyte")]
    train_images: PathBuf,

    #[arg(long, default_value = "res/train-labels.idx1-ubyte")]
    train_labels: PathBuf,

    #[arg(long, default_value = "res/t10k-images.idx3-ubyte")]
    test_images: PathBuf,

    #[arg(long, default_value = "res/t10k-labels.idx1-ubyte")]
    test_labels: PathBuf,

    /// Network architecture as JSON; defaults to 784-16-16-10.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 5)]
    epochs: usize,

    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    #[arg(long, default_value_t = 0.05)]
    learning_rate: f64,

    /// Use at most this many training examples.
    #[arg(long)]
    train_limit: Option<usize>,

    /// Use at most this many test examples.
    #[arg(long)]
    test_limit: Option<usize>,

    /// Compute the gradients of a batch on all cores.
    #[arg(long)]
    parallel: bool,

    /// Overrides the seed from the architecture file.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut spec = match &args.config {
        Some(path) => NetworkSpec::load_json(path)
            .with_context(|| format!("reading network config {}", path.display()))?,
        None => NetworkSpec::default(),
    };
    if args.seed.is_some() {
        spec.seed = args.seed;
    }

    let mut network = Network::from_spec(&spec).context("invalid network configuration")?;
    network.initialize()?;
    info!(layers = ?network.sizes(), cost = ?network.cost(), "initialized the weights and biases");

    let classes = network.sizes()[network.sizes().len() - 1];
    let mut train = load_idx_pair(&args.train_images, &args.train_labels, classes)
        .context("loading training data")?;
    let mut test = load_idx_pair(&args.test_images, &args.test_labels, classes)
        .context("loading test data")?;
    if let Some(limit) = args.train_limit {
        train.truncate(limit);
    }
    if let Some(limit) = args.test_limit {
        test.truncate(limit);
    }

    let mut config = TrainConfig::new(args.epochs, args.batch_size, args.learning_rate);
    config.parallel = args.parallel;

    info!(
        examples = train.len(),
        epochs = args.epochs,
        batch_size = args.batch_size,
        learning_rate = args.learning_rate,
        parallel = args.parallel,
        "starting training"
    );
    let report = network.train_with(&mut train.inputs, &mut train.targets, &config)?;

    let accuracy = network.accuracy(&test.inputs, &test.labels)? * 100.0;
    let secs = report.elapsed.as_secs_f64();
    info!(
        examples = test.len(),
        accuracy = %format!("{accuracy:.2}%"),
        train_secs = secs,
        "evaluated test set"
    );
    if secs > 0.0 {
        info!(efficiency = accuracy * 10.0 / secs, "accuracy per training second (x10)");
    }

    Ok(())
}
