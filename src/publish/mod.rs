// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Publishing a finished release directory to the `releases` branch.
//!
//! ```text
//! ensure_branch      ls-remote; orphan + empty commit + push if absent
//! stage              copy releases/<tag> to a temp dir outside the tree
//! park               move local releases/ into a hidden sibling
//! with_branch(releases):
//!     pull --ff-only
//!     replace releases/<tag>            (stage beside, rename)
//!     replace releases/latest           stable only
//!     add, commit "Release <tag> (stable|pre-release)", push
//! restore            original branch (guard), parked local releases/
//! ```

pub mod tagger;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;

use anyhow::Context;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

use crate::config::types::PublishConfig;
use crate::error::{EvermodError, ReleaseError, Result};
use crate::git::Repository;
use crate::release::tag::ReleaseTag;
use crate::utility::fs::copy::{copy_dir_contents, replace_dir, replace_dir_with_copy, stage_beside};
use crate::utility::fs::walk::WalkOptions;

pub use tagger::{Prompter, StdinPrompter, TagOutcome, TagStrategy, Tagger};

/// What a publish run changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Whether the publishing branch had to be created first.
    pub branch_created: bool,
    /// Whether the `latest` alias was replaced.
    pub latest_updated: bool,
    /// Commit message, or `None` when the branch already held this release.
    pub commit: Option<String>,
}

/// Moves release directories into the publishing branch.
#[derive(Debug, Clone, Copy)]
pub struct BranchPublisher<'a> {
    repo: &'a Repository,
    config: &'a PublishConfig,
    releases_dir: &'a str,
}

impl<'a> BranchPublisher<'a> {
    #[must_use]
    pub const fn new(repo: &'a Repository, config: &'a PublishConfig, releases_dir: &'a str) -> Self {
        Self {
            repo,
            config,
            releases_dir,
        }
    }

    /// Create the publishing branch on the remote if it does not exist.
    ///
    /// Returns `true` when the branch was created.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be queried or the branch
    /// cannot be created and pushed. The original branch is restored either
    /// way.
    pub fn ensure_branch(&self) -> Result<bool> {
        let branch = &self.config.branch;
        if self.repo.remote_branch_exists(branch)? {
            debug!(%branch, "remote branch found");
            return Ok(false);
        }

        info!(%branch, remote = %self.repo.remote(), "creating empty publishing branch");
        let guard = self.repo.switch_to_orphan(branch)?;
        self.repo
            .commit_empty(&format!("Initialize empty {branch} branch"))
            .context("failed to create initial commit")?;
        self.repo
            .push(branch)
            .with_context(|| format!("failed to push {branch}"))?;
        guard.restore()?;
        Ok(true)
    }

    /// Publish the built release in `source_dir` as `<releases_dir>/<tag>`.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::MissingDirectory` if `source_dir` is absent,
    /// or the first failing git or filesystem step. The original branch is
    /// restored and `source_dir` keeps its contents on every path.
    pub fn publish(&self, tag: &ReleaseTag, source_dir: &Path) -> Result<PublishOutcome> {
        if !source_dir.is_dir() {
            return Err(EvermodError::from(ReleaseError::MissingDirectory {
                path: source_dir.display().to_string(),
            })
            .into());
        }

        let branch_created = self.ensure_branch()?;

        let staging = stage_outside_tree(source_dir, tag.as_str())?;
        let staged = staging.path().join(tag.as_str());

        // Untracked local builds would block checking out paths the branch tracks.
        let releases_root = self.repo.root().join(self.releases_dir);
        let parked = park(&releases_root)?;
        let result = self.publish_staged(tag, &staged);
        let restored = parked.map_or(Ok(()), |parking| unpark(parking, &releases_root));

        let (latest_updated, commit) = settle(result, restored)?;
        Ok(PublishOutcome {
            branch_created,
            latest_updated,
            commit,
        })
    }

    fn publish_staged(&self, tag: &ReleaseTag, staged: &Path) -> Result<(bool, Option<String>)> {
        let branch = &self.config.branch;
        self.repo.fetch().context("failed to fetch")?;

        self.repo.with_branch(branch, |repo| -> Result<(bool, Option<String>)> {
            repo.pull(branch)
                .with_context(|| format!("failed to update {branch}"))?;

            let releases_root = repo.root().join(self.releases_dir);
            let release_rel = format!("{}/{}", self.releases_dir, tag);
            let options = WalkOptions::default();

            replace_dir_with_copy(staged, &releases_root.join(tag.as_str()), &options)
                .with_context(|| format!("failed to materialize {release_rel}"))?;
            repo.add(&release_rel)?;

            let latest_updated = if tag.is_prerelease() {
                warn!(
                    "pre-release detected ({tag}), skipping update of '{}/'",
                    self.config.latest_alias
                );
                false
            } else {
                let latest_rel = format!("{}/{}", self.releases_dir, self.config.latest_alias);
                replace_dir_with_copy(staged, &releases_root.join(&self.config.latest_alias), &options)
                    .with_context(|| format!("failed to update {latest_rel}"))?;
                repo.add(&latest_rel)?;
                info!("updated '{}/' -> {tag}", self.config.latest_alias);
                true
            };

            let commit = if repo.has_staged_changes()? {
                let message = format!("Release {tag} ({})", tag.channel().release_kind());
                repo.commit(&message)?;
                Some(message)
            } else {
                info!("{release_rel} already published with identical contents");
                None
            };
            repo.push(branch)
                .with_context(|| format!("failed to push {branch}"))?;

            info!(%tag, "release published");
            Ok((latest_updated, commit))
        })
    }
}

/// Copy `source_dir` into a fresh temporary directory as `<name>/`.
fn stage_outside_tree(source_dir: &Path, name: &str) -> Result<TempDir> {
    let staging = tempfile::Builder::new()
        .prefix("evermod-publish-")
        .tempdir()
        .context("failed to create staging directory")?;
    copy_dir_contents(source_dir, &staging.path().join(name), &WalkOptions::default())
        .with_context(|| format!("failed to stage {}", source_dir.display()))?;
    Ok(staging)
}

/// Move `dir` into a hidden sibling directory, if it exists.
fn park(dir: &Path) -> Result<Option<TempDir>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let parking = stage_beside(dir)?;
    fs::rename(dir, parking.path().join("parked"))
        .with_context(|| format!("failed to move {} out of the way", dir.display()))?;
    debug!(path = %dir.display(), "parked local releases");
    Ok(Some(parking))
}

/// Merge the publish result with restoring the parked releases.
///
/// A publish failure always wins; a restore failure alongside it is logged.
fn settle<T>(published: Result<T>, restored: Result<()>) -> Result<T> {
    match (published, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(restore)) => Err(restore),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(restore)) => {
            error!("{restore:#}");
            Err(e)
        }
    }
}

/// Put a parked directory back, keeping it on disk if that fails.
fn unpark(parking: TempDir, dir: &Path) -> Result<()> {
    if let Err(e) = replace_dir(&parking.path().join("parked"), dir) {
        let kept = parking.keep();
        return Err(e.context(format!(
            "local releases left in {}",
            kept.join("parked").display()
        )));
    }
    Ok(())
}
