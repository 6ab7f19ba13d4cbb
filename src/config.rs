use std::path::PathBuf;

use crate::cache::FingerprintCache;
use crate::dataset::RawDataset;
use crate::download::fetch_if_missing;
use crate::error::Result;
use crate::fingerprint::FingerprintTable;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Where the dataset and derived files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory the dataset files are resolved against.
    pub data_dir: PathBuf,
    pub images: String,
    pub labels: String,
    /// Fingerprint cache; `None` disables caching.
    pub cache: Option<PathBuf>,
    /// Fetch missing dataset files from the MNIST mirror.
    pub download: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from("training_data");
        Self {
            cache: Some(data_dir.join("fingerprints.bin")),
            data_dir,
            images: TRAIN_IMAGES.to_string(),
            labels: TRAIN_LABELS.to_string(),
            download: false,
        }
    }
}

impl Config {
    pub fn images_path(&self) -> PathBuf {
        self.data_dir.join(&self.images)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.data_dir.join(&self.labels)
    }

    /// Loads the configured image and label files, fetching them first when
    /// `download` is set.
    pub fn load_dataset(&self) -> Result<RawDataset> {
        if self.download {
            let images = fetch_if_missing(&self.data_dir, &self.images)?;
            let labels = fetch_if_missing(&self.data_dir, &self.labels)?;
            return RawDataset::load(images, labels);
        }
        RawDataset::load(self.images_path(), self.labels_path())
    }

    /// Fingerprints of `dataset`, going through the cache when one is set.
    pub fn fingerprints(&self, dataset: &RawDataset) -> FingerprintTable {
        match &self.cache {
            Some(path) => FingerprintCache::new(path).load_or_accumulate(dataset),
            None => FingerprintTable::accumulate(dataset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_training_set() {
        let config = Config::default();
        assert_eq!(
            config.images_path(),
            PathBuf::from("training_data/train-images-idx3-ubyte")
        );
        assert_eq!(
            config.labels_path(),
            PathBuf::from("training_data/train-labels-idx1-ubyte")
        );
        assert_eq!(
            config.cache,
            Some(PathBuf::from("training_data/fingerprints.bin"))
        );
    }

    #[test]
    fn missing_files_are_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let err = config.load_dataset().unwrap_err();
        assert!(matches!(err, crate::Error::Read { .. }));
    }
}
