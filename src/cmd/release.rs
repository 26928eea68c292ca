// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release command.

use tracing::info;

use crate::auth::Signer;
use crate::cli::release::ReleaseArgs;
use crate::config::Config;
use crate::error::Result;
use crate::publish::{StdinPrompter, TagOutcome};
use crate::release::{ReleaseOptions, ReleaseOutcome, ReleasePipeline};

/// Main handler for the release command.
///
/// # Errors
///
/// Returns an error if the caller is not authorized, the release cannot be
/// built or signed, or publishing or tagging fails.
pub fn run_release_command(args: &ReleaseArgs, config: &Config) -> Result<()> {
    let signer = Signer::with_embedded_key(config.private_key_path()?)?;
    let options = ReleaseOptions {
        tag: args.tag.clone(),
        target: args.target.clone(),
        publish: args.publish,
        auto: args.auto,
    };

    let outcome = ReleasePipeline::new(config, &signer).run(&options, &StdinPrompter)?;
    report(&outcome);
    Ok(())
}

fn report(outcome: &ReleaseOutcome) {
    let manifest = &outcome.build.manifest;
    info!(
        version = %manifest.version,
        status = %manifest.status,
        "release ready in {}",
        outcome.build.dir.display()
    );

    if let Some(publish) = &outcome.publish {
        match &publish.commit {
            Some(commit) => info!("published: {commit}"),
            None => info!("published release unchanged"),
        }
    }

    match &outcome.tag {
        Some(TagOutcome::Created {
            name,
            branch,
            signed,
        }) => info!(signed, "tagged {name} on {branch}"),
        Some(TagOutcome::AlreadyExists { name }) => info!("tag {name} already present"),
        None => {}
    }
}
