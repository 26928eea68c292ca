// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deterministic zip archives and artifact digests.
//!
//! ```text
//! ArchivePlan  name --> source (BTreeMap, so entries are path-sorted)
//!    add_file / add_tree / add_path
//!       |
//!       v
//!    write()   Deflate, 1980-01-01 00:00:00, 0644 | 0755
//!       |
//!       v
//! Artifact::from_file()  size + sha256
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{EvermodError, EvermodResult, FsError, Result};
use crate::utility::fs::walk::{WalkOptions, walk_sorted};

const FILE_MODE: u32 = 0o644;
const EXEC_MODE: u32 = 0o755;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Dir,
    File { path: PathBuf, mode: u32 },
}

/// The full set of entries an archive will hold.
#[derive(Debug, Default)]
pub struct ArchivePlan {
    entries: BTreeMap<String, Source>,
}

impl ArchivePlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of file entries.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .filter(|s| matches!(s, Source::File { .. }))
            .count()
    }

    /// Add one file as `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's metadata cannot be read.
    pub fn add_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let mode = archive_mode(path)?;
        self.entries.insert(
            name.to_string(),
            Source::File {
                path: path.to_path_buf(),
                mode,
            },
        );
        Ok(())
    }

    /// Add `root` and everything below it under `prefix/`.
    ///
    /// Returns the number of files added.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked.
    pub fn add_tree(&mut self, prefix: &str, root: &Path, options: &WalkOptions) -> Result<usize> {
        self.entries.insert(prefix.to_string(), Source::Dir);
        let mut files = 0;
        for entry in walk_sorted(root, options)? {
            let name = format!("{prefix}/{}", entry.relative_slash());
            if entry.is_dir() {
                self.entries.insert(name, Source::Dir);
            } else {
                self.add_file(&name, entry.path())?;
                files += 1;
            }
        }
        Ok(files)
    }

    /// Add a file or a directory tree as `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be read.
    pub fn add_path(&mut self, name: &str, path: &Path, options: &WalkOptions) -> Result<usize> {
        if path.is_dir() {
            self.add_tree(name, path, options)
        } else {
            self.add_file(name, path)?;
            Ok(1)
        }
    }

    /// Write the archive to `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dest` cannot be created or a source file cannot
    /// be read.
    pub fn write(&self, dest: &Path) -> Result<()> {
        let file = File::create(dest).map_err(|e| EvermodError::from(FsError::io(dest, e)))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let base = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for (name, source) in &self.entries {
            match source {
                Source::Dir => {
                    zip.add_directory(name.as_str(), base.unix_permissions(EXEC_MODE))
                        .map_err(EvermodError::from)?;
                }
                Source::File { path, mode } => {
                    zip.start_file(name.as_str(), base.unix_permissions(*mode))
                        .map_err(EvermodError::from)?;
                    let file = File::open(path).map_err(|e| EvermodError::from(FsError::io(path, e)))?;
                    let mut reader = BufReader::new(file);
                    io::copy(&mut reader, &mut zip)
                        .with_context(|| format!("failed to archive {}", path.display()))?;
                }
            }
        }

        zip.finish().map_err(EvermodError::from)?;
        debug!(archive = %dest.display(), entries = self.entries.len(), "archive written");
        Ok(())
    }
}

#[cfg(unix)]
fn archive_mode(path: &Path) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)
        .map_err(|e| EvermodError::from(FsError::io(path, e)))?
        .permissions()
        .mode();
    Ok(if mode & 0o111 == 0 { FILE_MODE } else { EXEC_MODE })
}

#[cfg(not(unix))]
fn archive_mode(path: &Path) -> Result<u32> {
    fs::metadata(path).map_err(|e| EvermodError::from(FsError::io(path, e)))?;
    Ok(FILE_MODE)
}

/// Hex-encoded SHA-256 of a file's bytes.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn sha256_file(path: &Path) -> EvermodResult<String> {
    let mut reader = BufReader::new(File::open(path).map_err(|e| FsError::io(path, e))?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(|e| FsError::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// A finished archive: where it is published and what it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path relative to the target root, `/`-separated.
    pub path: String,
    pub size_bytes: u64,
    /// 64 lowercase hex characters.
    pub sha256: String,
}

impl Artifact {
    /// Measure the archive at `file`, recorded under `published_path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn from_file(file: &Path, published_path: String) -> EvermodResult<Self> {
        let size_bytes = fs::metadata(file).map_err(|e| FsError::io(file, e))?.len();
        Ok(Self {
            path: published_path,
            size_bytes,
            sha256: sha256_file(file)?,
        })
    }

    /// Size in whole KiB, as shown in the manifest.
    #[must_use]
    pub fn size_label(&self) -> String {
        format!("{}KB", self.size_bytes / 1024)
    }
}
