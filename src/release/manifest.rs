// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `versions.json`: the signed description of one release.
//!
//! ```json
//! {
//!   "schema": 1,
//!   "version": "1.0.0",
//!   "status": "stable",
//!   "date": "2026-01-31",
//!   "modules": { "1.20.1": { "path": "...", "size": "12KB", "sha256": "..." } },
//!   "workspace": { "path": "...", "size": "480KB", "sha256": "..." }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::archive::Artifact;
use super::artifact::ModuleArtifact;
use super::tag::{Channel, ReleaseTag};
use crate::error::{EvermodResult, FsError, ReleaseError};

/// Manifest format version.
pub const SCHEMA_VERSION: u32 = 1;

/// One artifact as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    /// Whole KiB with a `KB` suffix.
    pub size: String,
    pub sha256: String,
}

impl From<&Artifact> for ManifestEntry {
    fn from(artifact: &Artifact) -> Self {
        Self {
            path: artifact.path.clone(),
            size: artifact.size_label(),
            sha256: artifact.sha256.clone(),
        }
    }
}

impl ManifestEntry {
    /// File name component of `path`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    pub schema: u32,
    pub version: String,
    pub status: Channel,
    pub date: NaiveDate,
    pub modules: BTreeMap<String, ManifestEntry>,
    pub workspace: ManifestEntry,
}

impl ReleaseManifest {
    /// Aggregate artifact metadata into a manifest.
    #[must_use]
    pub fn assemble(
        tag: &ReleaseTag,
        modules: &[ModuleArtifact],
        workspace: &Artifact,
        date: NaiveDate,
    ) -> Self {
        Self {
            schema: SCHEMA_VERSION,
            version: tag.as_str().to_string(),
            status: tag.channel(),
            date,
            modules: modules
                .iter()
                .map(|m| (m.version.clone(), ManifestEntry::from(&m.artifact)))
                .collect(),
            workspace: ManifestEntry::from(workspace),
        }
    }

    /// Pretty JSON, two-space indent, trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the manifest to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write(&self, path: &Path) -> EvermodResult<()> {
        let json = self.to_json().map_err(|e| ReleaseError::InvalidManifest {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| FsError::io(path, e))?;
        Ok(())
    }

    /// Read a manifest back from disk.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// `ReleaseError::InvalidManifest` if it does not parse.
    pub fn read(path: &Path) -> EvermodResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| FsError::io(path, e))?;
        let manifest: Self =
            serde_json::from_str(&text).map_err(|e| ReleaseError::InvalidManifest {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        if manifest.schema != SCHEMA_VERSION {
            return Err(ReleaseError::InvalidManifest {
                path: path.display().to_string(),
                message: format!("unsupported schema {}", manifest.schema),
            }
            .into());
        }
        Ok(manifest)
    }

    /// Every artifact entry, modules first (by version), workspace last.
    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.modules.values().chain(std::iter::once(&self.workspace))
    }
}
