//! Placement and materialization of downloaded result files.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::TideError;
use crate::request::{DateRange, OutputFormat};

/// `{dir}/{station}_async_{start}_au_{end}.{ext}`
pub fn output_path(
    dir: &Path,
    station_name: &str,
    range: &DateRange,
    format: OutputFormat,
) -> PathBuf {
    dir.join(format!(
        "{station_name}_async_{}_au_{}.{}",
        range.start_label(),
        range.end_label(),
        format.extension()
    ))
}

/// Writes `payload` to `path`, creating parent directories and replacing any
/// previous file.
///
/// The bytes go to a temporary file in the same directory, which is then
/// renamed over `path`. A failed write leaves an earlier file untouched.
pub async fn write_payload(path: &Path, payload: &[u8]) -> Result<(), TideError> {
    let target = path.to_path_buf();
    let payload = payload.to_vec();

    let result = tokio::task::spawn_blocking(move || persist_payload(&target, &payload))
        .await
        .unwrap_or_else(|e| Err(io::Error::other(e)));

    result.map_err(|source| TideError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn persist_payload(path: &Path, payload: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(payload)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
