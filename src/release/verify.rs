// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Checking a downloaded release directory.
//!
//! ```text
//! versions.json.sig  --verify-->  SignatureRejected
//! versions.json      --parse--->  InvalidManifest
//! each artifact      --sha256-->  ChecksumMismatch (pruned on request)
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use super::archive::sha256_file;
use super::manifest::ReleaseManifest;
use crate::auth::Signer;
use crate::error::{EvermodResult, FsError, ReleaseError};

/// A release whose signature and checksums all matched.
#[derive(Debug, Clone)]
pub struct VerifiedRelease {
    pub manifest: ReleaseManifest,
    pub artifacts: usize,
}

/// Check the manifest signature in `dir`, then every artifact it lists.
///
/// With `prune`, an artifact whose digest does not match is deleted before
/// the error is returned.
///
/// # Errors
///
/// Returns `ReleaseError::MissingDirectory` if `dir` is absent,
/// `ReleaseError::SignatureRejected` if the manifest signature does not
/// verify, `ReleaseError::InvalidManifest` if it cannot be parsed, and
/// `ReleaseError::ChecksumMismatch` for the first artifact that differs.
pub fn verify_release(
    dir: &Path,
    manifest_name: &str,
    signer: &Signer,
    prune: bool,
) -> EvermodResult<VerifiedRelease> {
    if !dir.is_dir() {
        return Err(ReleaseError::MissingDirectory {
            path: dir.display().to_string(),
        }
        .into());
    }

    let manifest_path = dir.join(manifest_name);
    let signature_path = Signer::signature_path(&manifest_path);
    if !signer.verify(&manifest_path, &signature_path) {
        return Err(ReleaseError::SignatureRejected {
            path: manifest_path.display().to_string(),
        }
        .into());
    }
    let manifest = ReleaseManifest::read(&manifest_path)?;
    info!(version = %manifest.version, status = %manifest.status, "manifest signature valid");

    let mut artifacts = 0;
    for entry in manifest.entries() {
        let file = dir.join(entry.file_name());
        let actual = sha256_file(&file)?;
        if actual != entry.sha256 {
            if prune {
                fs::remove_file(&file).map_err(|e| FsError::io(&file, e))?;
                warn!(file = %file.display(), "deleted artifact with mismatched checksum");
            }
            return Err(ReleaseError::ChecksumMismatch {
                path: entry.path.clone(),
                expected: entry.sha256.clone(),
                actual,
            }
            .into());
        }
        debug!(file = %file.display(), "checksum ok");
        artifacts += 1;
    }

    Ok(VerifiedRelease {
        manifest,
        artifacts,
    })
}
