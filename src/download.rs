use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::info;
use tempfile::NamedTempFile;

use crate::error::DownloadError;

/// CVDF mirror of the MNIST files.
pub const MNIST_BASE: &str = "https://storage.googleapis.com/cvdf-datasets/mnist/";

/// Makes sure `dir/name` exists, gunzipping a local `name.gz` or downloading
/// `MNIST_BASE/name.gz` when it does not.
pub fn fetch_if_missing(dir: &Path, name: &str) -> Result<PathBuf, DownloadError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    if path.exists() {
        info!("File exists: {:?}", path);
        return Ok(path);
    }

    let gz_path = dir.join(format!("{name}.gz"));
    if !gz_path.exists() {
        let url = format!("{MNIST_BASE}{name}.gz");
        info!("Downloading {url} ...");
        let mut resp = reqwest::blocking::get(&url)
            .and_then(|r| r.error_for_status())
            .map_err(|source| DownloadError::Request {
                url: url.clone(),
                source,
            })?;
        let mut out = NamedTempFile::new_in(dir)?;
        resp.copy_to(&mut out)
            .map_err(|source| DownloadError::Request { url, source })?;
        out.persist(&gz_path).map_err(|e| e.error)?;
    }

    gunzip(&gz_path, &path)?;
    info!("Saved to {:?}", path);
    Ok(path)
}

/// Decompresses `src` into `dest`. `dest` only appears once fully written.
fn gunzip(src: &Path, dest: &Path) -> io::Result<()> {
    let mut gz = GzDecoder::new(File::open(src)?);
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut out = NamedTempFile::new_in(dir)?;
    io::copy(&mut gz, &mut out)?;
    out.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
