//! Gzip compression of rotated log files

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

/// Compress `path` into `path.gz` and remove the original.
///
/// Returns the path of the compressed file.
pub fn gzip_file(path: &Path) -> io::Result<PathBuf> {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    let compressed_path = PathBuf::from(name);

    let mut input = BufReader::new(File::open(path)?);
    let output = BufWriter::new(File::create(&compressed_path)?);
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(compressed_path)
}
