//! Writes every MNIST image as `<out>/<label>/<index>.ppm`.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use indicatif::ProgressBar;

use mnist_fingerprint::config::{Config, TRAIN_IMAGES, TRAIN_LABELS};
use mnist_fingerprint::{Pixmap, RawDataset, CLASSES};

#[derive(Parser, Debug)]
#[command(version, about = "Export MNIST images into per-digit directories")]
struct Args {
    /// Directory holding the dataset files
    #[arg(long, default_value = "training_data")]
    data_dir: PathBuf,

    #[arg(long, default_value = TRAIN_IMAGES)]
    images: String,

    #[arg(long, default_value = TRAIN_LABELS)]
    labels: String,

    /// Root of the per-digit output directories [default: the data directory]
    #[arg(long)]
    out: Option<PathBuf>,

    /// Download missing dataset files from the MNIST mirror
    #[arg(long)]
    download: bool,

    /// Print `index|label|pixels` lines to stdout instead of writing files
    #[arg(long)]
    print: bool,

    /// Only handle the first N images
    #[arg(long)]
    limit: Option<usize>,
}

fn print_images(dataset: &RawDataset, count: usize) -> io::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    for (i, (label, image)) in dataset.iter().take(count).enumerate() {
        let pic = image
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{i}|{label}|{pic}")?;
    }
    out.flush()
}

fn save_images(dataset: &RawDataset, count: usize, root: &Path) -> anyhow::Result<()> {
    for digit in 0..CLASSES {
        let dir = root.join(digit.to_string());
        fs::create_dir_all(&dir).with_context(|| format!("creating {dir:?}"))?;
    }

    let pb = ProgressBar::new(count as u64);
    for (i, (label, image)) in dataset.iter().take(count).enumerate() {
        let path = root.join(label.to_string()).join(format!("{i}.ppm"));
        let pm = Pixmap::from_grey(dataset.col_count(), dataset.row_count(), image)?;
        pm.save(&path)
            .with_context(|| format!("writing {path:?}"))?;
        pb.inc(1);
    }
    pb.finish_with_message("done");
    println!("{count} images saved under {root:?}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = Config {
        data_dir: args.data_dir.clone(),
        images: args.images,
        labels: args.labels,
        cache: None,
        download: args.download,
    };
    let dataset = config
        .load_dataset()
        .with_context(|| format!("loading dataset from {:?}", config.data_dir))?;
    let count = args
        .limit
        .unwrap_or(usize::MAX)
        .min(dataset.image_count() as usize);

    if args.print {
        print_images(&dataset, count)?;
    } else {
        let root = args.out.unwrap_or(args.data_dir);
        save_images(&dataset, count, &root)?;
    }
    Ok(())
}
