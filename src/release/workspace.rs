// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Whole-workspace archive.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use super::archive::{ArchivePlan, Artifact};
use crate::config::types::ReleaseConfig;
use crate::error::Result;
use crate::utility::fs::walk::WalkOptions;

/// Packages the buildable workspace, minus build output.
#[derive(Debug, Clone, Copy)]
pub struct WorkspacePackager<'a> {
    config: &'a ReleaseConfig,
}

impl<'a> WorkspacePackager<'a> {
    #[must_use]
    pub const fn new(config: &'a ReleaseConfig) -> Self {
        Self { config }
    }

    /// Archive every entry of `includes` found under `root` into
    /// `out_dir/<workspace_archive>`.
    ///
    /// The framework entry is pruned of every `pruned_dir` directory at any
    /// depth; other directories are taken whole. Missing entries are skipped
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry cannot be read or the archive cannot be
    /// written or hashed.
    pub fn build_workspace_artifact(
        &self,
        root: &Path,
        out_dir: &Path,
        published_dir: &str,
        includes: &[String],
    ) -> Result<Artifact> {
        let mut plan = ArchivePlan::new();
        let pruned = WalkOptions::pruning(&self.config.pruned_dir);
        let whole = WalkOptions::default();

        for item in includes {
            let src = root.join(item);
            if !src.exists() {
                warn!("missing {item}, skipped");
                continue;
            }
            let options = if *item == self.config.framework_dir {
                &pruned
            } else {
                &whole
            };
            let name = item.trim_end_matches(['/', '\\']).replace('\\', "/");
            plan.add_path(&name, &src, options)
                .with_context(|| format!("failed to collect {item}"))?;
        }

        let zip_name = &self.config.workspace_archive;
        let zip_path = out_dir.join(zip_name);
        plan.write(&zip_path)
            .with_context(|| format!("failed to write {zip_name}"))?;

        let artifact = Artifact::from_file(&zip_path, format!("{published_dir}/{zip_name}"))?;
        info!(
            files = plan.file_count(),
            size = %artifact.size_label(),
            "created {zip_name}"
        );
        Ok(artifact)
    }
}
