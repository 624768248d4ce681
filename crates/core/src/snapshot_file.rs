//! File-backed snapshot with a SHA-256 integrity digest.
//!
//! The file has exactly two JSON lines:
//! - Line 1: header with `format_version`, `seed` and `body_sha256_hex`.
//! - Line 2: the serialized `Snapshot`.
//!
//! Loading validates both lines' shape, the digest of the body line and that
//! the header agrees with the body, stopping at the first problem.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::snapshot::{SNAPSHOT_FORMAT_VERSION, Snapshot};

/// First line of the snapshot file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileHeader {
    format_version: u16,
    seed: u64,
    body_sha256_hex: String,
}

fn compute_body_sha256(body_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    let result = hasher.finalize();
    format!("{result:064x}")
}

/// Writes `snapshot` to `path`, creating parent directories as needed.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body_json = serde_json::to_string(snapshot).map_err(io::Error::other)?;
    let header = FileHeader {
        format_version: snapshot.format_version,
        seed: snapshot.seed,
        body_sha256_hex: compute_body_sha256(&body_json),
    };
    let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{header_json}")?;
    writeln!(writer, "{body_json}")?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), seed = snapshot.seed, "snapshot saved");
    Ok(())
}

/// Describes why a snapshot file could not be loaded.
#[derive(Debug, Error)]
pub enum SnapshotLoadError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot file is empty")]
    EmptyFile,
    #[error("incomplete snapshot line at line {line}")]
    IncompleteLine { line: usize },
    #[error("invalid snapshot header at line 1: {message}")]
    InvalidHeader { message: String },
    #[error("invalid snapshot body at line 2: {message}")]
    InvalidBody { message: String },
    #[error("unsupported snapshot format version {found} (expected {SNAPSHOT_FORMAT_VERSION})")]
    UnsupportedVersion { found: u16 },
    #[error("snapshot body does not match its SHA-256 digest")]
    DigestMismatch,
    #[error("snapshot header disagrees with its body: {message}")]
    HeaderMismatch { message: String },
}

/// Loads and validates a snapshot file written by `save_snapshot`.
pub fn load_snapshot_from_file(path: &Path) -> Result<Snapshot, SnapshotLoadError> {
    let content = fs::read_to_string(path)?;
    if content.is_empty() {
        return Err(SnapshotLoadError::EmptyFile);
    }
    let lines: Vec<&str> = content.lines().collect();
    if !content.ends_with('\n') {
        return Err(SnapshotLoadError::IncompleteLine { line: lines.len() });
    }
    let [header_line, body_line] = lines.as_slice() else {
        return Err(SnapshotLoadError::InvalidBody {
            message: format!("expected 2 lines, found {}", lines.len()),
        });
    };

    let header: FileHeader = serde_json::from_str(header_line)
        .map_err(|e| SnapshotLoadError::InvalidHeader { message: e.to_string() })?;
    if header.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(SnapshotLoadError::UnsupportedVersion { found: header.format_version });
    }
    if compute_body_sha256(body_line) != header.body_sha256_hex {
        return Err(SnapshotLoadError::DigestMismatch);
    }

    let snapshot: Snapshot = serde_json::from_str(body_line)
        .map_err(|e| SnapshotLoadError::InvalidBody { message: e.to_string() })?;
    if snapshot.format_version != header.format_version || snapshot.seed != header.seed {
        return Err(SnapshotLoadError::HeaderMismatch {
            message: format!(
                "header has version {} seed {}, body has version {} seed {}",
                header.format_version, header.seed, snapshot.format_version, snapshot.seed
            ),
        });
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests;
