//! Average-intensity "fingerprints" of the ten MNIST digits.
//!
//! The training set is decoded from its IDX files into a [`RawDataset`], every
//! image is summed into the row of its label ([`FingerprintTable`]), and the
//! sums are scaled into `[0, 1]` ([`NormalizedTable`]). A new image is then
//! classified by how closely it matches each of the ten templates.
//!
//! ```no_run
//! use mnist_fingerprint::{Config, VisualGrid};
//!
//! let config = Config::default();
//! let dataset = config.load_dataset()?;
//! let normalized = config.fingerprints(&dataset).normalize();
//! print!("{}", VisualGrid::render(&normalized));
//!
//! let result = normalized.classify_bytes(dataset.image(0))?;
//! println!("predicted {}", result.best_class());
//! # Ok::<(), mnist_fingerprint::Error>(())
//! ```

pub mod bytes;
pub mod cache;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod download;
pub mod error;
pub mod fingerprint;
pub mod pixmap;
pub mod query;
pub mod visualize;

pub use cache::FingerprintCache;
pub use classify::{evaluate, Classification, Evaluation};
pub use config::Config;
pub use dataset::{RawDataset, CLASSES};
pub use error::{Error, FormatError, Result};
pub use fingerprint::{FingerprintTable, NormalizedTable};
pub use pixmap::Pixmap;
pub use query::{load_query_image, QueryImage};
pub use visualize::VisualGrid;
