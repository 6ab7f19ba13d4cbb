// src/main.rs
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use mnist_fingerprint::config::{Config, TEST_IMAGES, TEST_LABELS};
use mnist_fingerprint::{
    evaluate, load_query_image, Classification, NormalizedTable, RawDataset, VisualGrid,
};

/// Build per-digit MNIST fingerprints and classify images against them.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding the dataset files
    #[arg(long, default_value = "training_data")]
    data_dir: PathBuf,

    /// Training image file name inside the data directory
    #[arg(long, default_value = mnist_fingerprint::config::TRAIN_IMAGES)]
    images: String,

    /// Training label file name inside the data directory
    #[arg(long, default_value = mnist_fingerprint::config::TRAIN_LABELS)]
    labels: String,

    /// Fingerprint cache file [default: <data-dir>/fingerprints.bin]
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Always recompute the fingerprints
    #[arg(long)]
    no_cache: bool,

    /// Download missing dataset files from the MNIST mirror
    #[arg(long)]
    download: bool,

    /// Skip printing the ASCII fingerprints
    #[arg(long)]
    no_render: bool,

    /// Image file(s) to classify
    #[arg(long = "query")]
    queries: Vec<PathBuf>,

    /// Training set index(es) to classify
    #[arg(long = "query-index")]
    query_indices: Vec<usize>,

    /// Score the t10k test set against the fingerprints
    #[arg(long)]
    evaluate: bool,
}

impl Args {
    fn config(&self) -> Config {
        let cache = if self.no_cache {
            None
        } else {
            Some(
                self.cache
                    .clone()
                    .unwrap_or_else(|| self.data_dir.join("fingerprints.bin")),
            )
        };
        Config {
            data_dir: self.data_dir.clone(),
            images: self.images.clone(),
            labels: self.labels.clone(),
            cache,
            download: self.download,
        }
    }
}

fn report(name: &str, result: &Classification) {
    let probs = result
        .probabilities()
        .iter()
        .map(|p| format!("{p:.4}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("{name}: scores [{probs}]");
    println!("Predicted digit for {name}: {}", result.best_class());
}

fn run_evaluation(config: &Config, normalized: &NormalizedTable) -> anyhow::Result<()> {
    let test = Config {
        images: TEST_IMAGES.to_string(),
        labels: TEST_LABELS.to_string(),
        cache: None,
        ..config.clone()
    };
    println!("Running evaluation...");
    let dataset = test.load_dataset().context("loading test set")?;
    let eval = evaluate(normalized, &dataset)?;
    println!(
        "Accuracy: {}/{} ({:.2}%)",
        eval.correct,
        eval.total,
        eval.accuracy()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = args.config();

    let dataset: RawDataset = config
        .load_dataset()
        .with_context(|| format!("loading dataset from {:?}", config.data_dir))?;
    let table = config.fingerprints(&dataset);
    let normalized = table.normalize();

    if !args.no_render {
        print!("{}", VisualGrid::render(&normalized));
    }

    for path in &args.queries {
        let query = load_query_image(path)?;
        let result = normalized.classify(&query.pixels)?;
        report(&path.display().to_string(), &result);
    }

    for &index in &args.query_indices {
        anyhow::ensure!(
            index < dataset.image_count() as usize,
            "query index {index} is out of range for {} images",
            dataset.image_count()
        );
        let result = normalized.classify_bytes(dataset.image(index))?;
        report(&format!("#{index} (label {})", dataset.label(index)), &result);
    }

    if args.evaluate {
        run_evaluation(&config, &normalized)?;
    }

    Ok(())
}
