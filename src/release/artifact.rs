// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-module archives.
//!
//! ```text
//! framework/
//!   evermod-1.19.2/src/main/java/net/...  --> evermod-1.19.2.zip  (net/...)
//!   evermod-1.20.1/                       --> skipped, no payload
//!   common/                               --> not a module
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use super::archive::{ArchivePlan, Artifact};
use crate::config::Config;
use crate::error::{EvermodError, ReleaseError, Result};
use crate::utility::fs::walk::WalkOptions;

/// Archive built for one module directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArtifact {
    /// Module directory name without the module prefix.
    pub version: String,
    pub artifact: Artifact,
}

/// Module directory selected for packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDir {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
}

/// Builds one archive per module payload.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactBuilder<'a> {
    config: &'a Config,
}

impl<'a> ArtifactBuilder<'a> {
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Immediate subdirectories of `framework_root` matching the module
    /// pattern, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::MissingDirectory` if `framework_root` is not a
    /// directory, or an I/O error if it cannot be listed.
    pub fn discover_modules(&self, framework_root: &Path) -> Result<Vec<ModuleDir>> {
        if !framework_root.is_dir() {
            return Err(EvermodError::from(ReleaseError::MissingDirectory {
                path: framework_root.display().to_string(),
            })
            .into());
        }

        let prefix = &self.config.release.module_prefix;
        let mut modules = Vec::new();
        let entries = fs::read_dir(framework_root)
            .with_context(|| format!("failed to read {}", framework_root.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("failed to read {}", framework_root.display()))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !entry.path().is_dir() || !self.config.is_module_dir(&name) {
                continue;
            }
            let Some(version) = name.strip_prefix(prefix.as_str()).map(str::to_string) else {
                warn!(module = %name, "skipped: name does not start with '{prefix}'");
                continue;
            };
            modules.push(ModuleDir {
                name,
                version,
                path: entry.path(),
            });
        }

        modules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modules)
    }

    /// Archive each module's payload into `out_dir`.
    ///
    /// `published_dir` is the `/`-separated location of `out_dir` relative to
    /// the target root once the release is in place; it prefixes each
    /// artifact's recorded path. Modules without a payload are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::MissingDirectory` if `framework_root` is absent,
    /// or an error if an archive cannot be written or hashed.
    pub fn build_module_artifacts(
        &self,
        framework_root: &Path,
        out_dir: &Path,
        published_dir: &str,
    ) -> Result<Vec<ModuleArtifact>> {
        let release = &self.config.release;
        let payload_root = payload_root_name(&release.payload_subpath);

        let mut artifacts = Vec::new();
        for module in self.discover_modules(framework_root)? {
            let payload = module.path.join(&release.payload_subpath);
            if !payload.is_dir() {
                warn!(
                    module = %module.name,
                    "skipped: no '{}/' directory",
                    release.payload_subpath
                );
                continue;
            }

            let mut plan = ArchivePlan::new();
            plan.add_tree(payload_root, &payload, &WalkOptions::default())?;

            let zip_name = format!("{}.zip", module.name);
            let zip_path = out_dir.join(&zip_name);
            plan.write(&zip_path)
                .with_context(|| format!("failed to archive module {}", module.name))?;

            let artifact = Artifact::from_file(&zip_path, format!("{published_dir}/{zip_name}"))?;
            info!(
                module = %module.name,
                size = %artifact.size_label(),
                "compressed {zip_name}"
            );
            artifacts.push(ModuleArtifact {
                version: module.version,
                artifact,
            });
        }

        Ok(artifacts)
    }
}

/// Last component of the payload subpath (`src/main/java/net` -> `net`).
pub(super) fn payload_root_name(subpath: &str) -> &str {
    subpath
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(subpath)
}

