use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::tempdir;

use mnist_fingerprint::dataset::{encode_images, encode_labels};
use mnist_fingerprint::error::IdxKind;
use mnist_fingerprint::{
    Config, Error, FingerprintCache, FingerprintTable, FormatError, Pixmap, RawDataset,
    VisualGrid,
};

fn write_scenario(dir: &Path) -> Config {
    let images = encode_images(
        2,
        2,
        &[&[10, 20, 30, 40], &[0, 0, 0, 0], &[255, 255, 255, 255]],
    );
    fs::write(dir.join("images"), images).unwrap();
    fs::write(dir.join("labels"), encode_labels(&[1, 1, 2])).unwrap();
    Config {
        data_dir: dir.to_path_buf(),
        images: "images".to_string(),
        labels: "labels".to_string(),
        cache: Some(dir.join("fingerprints.bin")),
        download: false,
    }
}

#[test]
fn three_image_scenario() {
    let dir = tempdir().unwrap();
    let config = write_scenario(dir.path());

    let dataset = config.load_dataset().unwrap();
    assert_eq!(dataset.pixels().len(), 3 * 2 * 2);
    assert!(dataset.labels().iter().all(|&l| l < 10));

    let table = FingerprintTable::accumulate(&dataset);
    assert_eq!(table.class(1), &[10, 20, 30, 40]);
    assert_eq!(table.class(2), &[255, 255, 255, 255]);

    let normalized = table.normalize();
    for &v in normalized.class(2) {
        assert!((v - 0.333_333_333).abs() < 1e-6);
    }

    // 10/765 falls below every band, 20/765 lands on '.', the rest on '+'.
    let grid = VisualGrid::render(&normalized);
    assert_eq!(grid.class(2), b"****");
    assert_eq!(grid.class(1), b" .++");
}

#[test]
fn label_magic_mismatch_stops_loading() {
    let dir = tempdir().unwrap();
    let config = write_scenario(dir.path());
    let mut labels = fs::read(config.labels_path()).unwrap();
    labels[..4].copy_from_slice(&0x0000_0802u32.to_be_bytes());
    fs::write(config.labels_path(), labels).unwrap();

    let err = config.load_dataset().unwrap_err();
    assert!(matches!(
        err,
        Error::Format(FormatError::BadMagic {
            kind: IdxKind::Labels,
            found: 0x802,
            ..
        })
    ));
    // Nothing was accumulated, so nothing was cached.
    assert!(!dir.path().join("fingerprints.bin").exists());
}

#[test]
fn gzipped_files_load_like_plain_ones() {
    let dir = tempdir().unwrap();
    let config = write_scenario(dir.path());
    for name in ["images", "labels"] {
        let plain = fs::read(dir.path().join(name)).unwrap();
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&plain).unwrap();
        fs::write(dir.path().join(format!("{name}.gz")), enc.finish().unwrap()).unwrap();
    }

    let plain = config.load_dataset().unwrap();
    let gz = RawDataset::load(dir.path().join("images.gz"), dir.path().join("labels.gz")).unwrap();
    assert_eq!(plain, gz);
}

#[test]
fn cache_round_trip_matches_direct_pipeline() {
    let dir = tempdir().unwrap();
    let config = write_scenario(dir.path());
    let dataset = config.load_dataset().unwrap();

    let direct = FingerprintTable::accumulate(&dataset).normalize();

    // First run writes the cache, second run reads it back.
    let first = config.fingerprints(&dataset);
    assert!(dir.path().join("fingerprints.bin").exists());
    let cached = FingerprintCache::new(dir.path().join("fingerprints.bin"))
        .load_for(&dataset)
        .unwrap();

    assert_eq!(first.normalize(), direct);
    assert_eq!(cached.normalize(), direct);
    assert_eq!(config.fingerprints(&dataset).normalize(), direct);
}

#[test]
fn stale_cache_is_recomputed() {
    let dir = tempdir().unwrap();
    let config = write_scenario(dir.path());
    let dataset = config.load_dataset().unwrap();
    let cache = FingerprintCache::new(dir.path().join("fingerprints.bin"));

    // A training file of the same shape but other contents.
    let other = RawDataset::from_bytes(
        &encode_images(2, 2, &[&[9, 9, 9, 9], &[8, 8, 8, 8], &[7, 7, 7, 7]]),
        &encode_labels(&[1, 1, 2]),
    )
    .unwrap();
    cache.save(&FingerprintTable::accumulate(&other)).unwrap();
    assert_eq!(
        config.fingerprints(&dataset),
        FingerprintTable::accumulate(&dataset)
    );

    cache.save(&FingerprintTable::zeroed(4, 2, 2)).unwrap();
    assert_eq!(
        config.fingerprints(&dataset),
        FingerprintTable::accumulate(&dataset)
    );
    assert_eq!(cache.load_for(&dataset).unwrap().checksum(), dataset.checksum());
}

#[test]
fn classifies_training_images() {
    let dir = tempdir().unwrap();
    let images = encode_images(2, 2, &[&[255, 0, 0, 0], &[0, 0, 0, 255], &[200, 0, 0, 10]]);
    fs::write(dir.path().join("images"), images).unwrap();
    fs::write(dir.path().join("labels"), encode_labels(&[4, 6, 4])).unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        images: "images".to_string(),
        labels: "labels".to_string(),
        cache: None,
        download: false,
    };

    let dataset = config.load_dataset().unwrap();
    let normalized = config.fingerprints(&dataset).normalize();

    assert_eq!(normalized.classify_bytes(dataset.image(0)).unwrap().best_class(), 4);
    assert_eq!(normalized.classify_bytes(dataset.image(1)).unwrap().best_class(), 6);
    assert!(!dir.path().join("fingerprints.bin").exists());
}

#[test]
fn exported_pixmap_is_grey_p6() {
    let dir = tempdir().unwrap();
    let config = write_scenario(dir.path());
    let dataset = config.load_dataset().unwrap();

    let path = dir.path().join("1").join("0.ppm");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    Pixmap::from_grey(dataset.col_count(), dataset.row_count(), dataset.image(0))
        .unwrap()
        .save(&path)
        .unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"P6"));
    assert_eq!(
        &bytes[bytes.len() - 12..],
        &[10, 10, 10, 20, 20, 20, 30, 30, 30, 40, 40, 40]
    );
}
