// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Verify command.

use anyhow::Context;

use crate::auth::Signer;
use crate::cli::release::VerifyArgs;
use crate::config::Config;
use crate::error::Result;
use crate::release::verify::verify_release;

/// Check a release directory against its signed manifest.
///
/// # Errors
///
/// Returns an error if the signature is rejected, the manifest is invalid,
/// or an artifact's checksum does not match.
pub fn run_verify_command(args: &VerifyArgs, config: &Config) -> Result<()> {
    let signer = Signer::with_embedded_key(config.private_key_path()?)?;
    let verified = verify_release(
        &args.release_dir,
        &config.release.manifest_name,
        &signer,
        args.prune,
    )
    .with_context(|| format!("failed to verify {}", args.release_dir.display()))?;

    println!(
        "{} ({}): {} artifacts verified",
        verified.manifest.version, verified.manifest.status, verified.artifacts
    );
    Ok(())
}
