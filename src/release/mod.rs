// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release pipeline.
//!
//! ```text
//! Authenticator.authorize("release:<tag>")
//!      |
//!      v
//! releases/.<tag>.staging-*/new/          (built aside, renamed in at the end)
//!   ArtifactBuilder     evermod-<v>.zip per module   (none --> NoModulesFound)
//!   WorkspacePackager   evermod-framework.zip
//!   ReleaseManifest     versions.json
//!   Signer              versions.json.sig
//!      |
//!      v  replace_dir
//! releases/<tag>/
//!      |
//!      v  --publish only
//! BranchPublisher --> Tagger
//! ```

pub mod archive;
pub mod artifact;
pub mod manifest;
pub mod tag;
pub mod verify;
pub mod workspace;


use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use tracing::info;

use crate::auth::{Authenticator, Signer};
use crate::config::Config;
use crate::error::{EvermodError, ReleaseError, Result};
use crate::git::Repository;
use crate::publish::{BranchPublisher, Prompter, PublishOutcome, TagOutcome, Tagger};
use crate::utility::fs::copy::{replace_dir, stage_beside};

use artifact::ArtifactBuilder;
use manifest::ReleaseManifest;
use tag::ReleaseTag;
use workspace::WorkspacePackager;

/// Inputs of one release run.
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    pub tag: ReleaseTag,
    /// Workspace root holding the framework and receiving `releases/`.
    pub target: PathBuf,
    /// Publish to the releases branch and tag after building.
    pub publish: bool,
    /// Tag on the main branch without asking.
    pub auto: bool,
}

/// A release directory in its final place.
#[derive(Debug, Clone)]
pub struct BuiltRelease {
    pub dir: PathBuf,
    pub manifest: ReleaseManifest,
    pub manifest_path: PathBuf,
    pub signature_path: PathBuf,
}

/// Everything a release run produced.
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub build: BuiltRelease,
    /// `None` when publishing was not requested.
    pub publish: Option<PublishOutcome>,
    pub tag: Option<TagOutcome>,
}

/// Builds, signs and optionally publishes a release.
#[derive(Debug, Clone, Copy)]
pub struct ReleasePipeline<'a> {
    config: &'a Config,
    signer: &'a Signer,
}

impl<'a> ReleasePipeline<'a> {
    #[must_use]
    pub const fn new(config: &'a Config, signer: &'a Signer) -> Self {
        Self { config, signer }
    }

    /// Run the whole pipeline, dated today.
    ///
    /// Authorization happens before anything is read or written. Locally
    /// built artifacts stay in place if publishing fails.
    ///
    /// # Errors
    ///
    /// Returns the first failing step: authorization, a missing target,
    /// building, publishing or tagging.
    pub fn run(&self, options: &ReleaseOptions, prompter: &dyn Prompter) -> Result<ReleaseOutcome> {
        let tag = &options.tag;
        Authenticator::new(self.signer)
            .authorize(&Authenticator::release_token(tag.as_str()))
            .context("release not authorized")?;

        let today = chrono::Local::now().date_naive();
        let build = self.build(tag, &options.target, today)?;
        info!(
            dir = %build.dir.display(),
            modules = build.manifest.modules.len(),
            "release {tag} built"
        );

        if !options.publish {
            info!("publish not requested, release left in {}", build.dir.display());
            return Ok(ReleaseOutcome {
                build,
                publish: None,
                tag: None,
            });
        }

        let repo = Repository::open(&options.target, self.config.publish.remote.as_str())
            .context("publishing requires a git repository")?;
        let publish = BranchPublisher::new(&repo, &self.config.publish, &self.config.release.releases_dir)
            .publish(tag, &build.dir)
            .with_context(|| format!("failed to publish {tag}"))?;
        let tagged = Tagger::new(&repo, &self.config.tag)
            .tag(tag, options.auto, prompter)
            .with_context(|| format!("failed to tag {tag}"))?;

        Ok(ReleaseOutcome {
            build,
            publish: Some(publish),
            tag: Some(tagged),
        })
    }

    /// Build and sign `<releases_dir>/<tag>` under `target`.
    ///
    /// The directory is assembled beside its final location and swapped in
    /// only once the manifest is signed, replacing any previous build of the
    /// same tag.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::MissingDirectory` if `target` or its framework
    /// directory is absent, `ReleaseError::NoModulesFound` if no module has
    /// a payload, `AuthError::MissingPrivateKey` if the manifest cannot be
    /// signed, or an I/O or archive error.
    pub fn build(&self, tag: &ReleaseTag, target: &Path, date: NaiveDate) -> Result<BuiltRelease> {
        if !target.is_dir() {
            return Err(EvermodError::from(ReleaseError::MissingDirectory {
                path: target.display().to_string(),
            })
            .into());
        }

        let release = &self.config.release;
        let framework_root = target.join(&release.framework_dir);
        let final_dir = target.join(&release.releases_dir).join(tag.as_str());
        let published_dir = format!("{}/{tag}", release.releases_dir);

        let staging = stage_beside(&final_dir)?;
        let out_dir = staging.path().join("new");
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;

        info!("compressing modules from {}", framework_root.display());
        let modules = ArtifactBuilder::new(self.config).build_module_artifacts(
            &framework_root,
            &out_dir,
            &published_dir,
        )?;
        if modules.is_empty() {
            return Err(EvermodError::from(ReleaseError::NoModulesFound {
                root: framework_root.display().to_string(),
            })
            .into());
        }

        info!("compressing workspace");
        let workspace = WorkspacePackager::new(release).build_workspace_artifact(
            target,
            &out_dir,
            &published_dir,
            &release.workspace_includes,
        )?;

        let manifest = ReleaseManifest::assemble(tag, &modules, &workspace, date);
        let staged_manifest = out_dir.join(&release.manifest_name);
        manifest.write(&staged_manifest)?;
        self.signer
            .sign(&staged_manifest)
            .context("failed to sign the manifest")?;
        info!("wrote and signed {}", release.manifest_name);

        replace_dir(&out_dir, &final_dir)?;

        let manifest_path = final_dir.join(&release.manifest_name);
        let signature_path = Signer::signature_path(&manifest_path);
        Ok(BuiltRelease {
            dir: final_dir,
            manifest,
            manifest_path,
            signature_path,
        })
    }
}
