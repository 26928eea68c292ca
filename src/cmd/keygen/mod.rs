// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Keygen command: the maintainer's signing key pair.
//!
//! ```text
//! keys.private_key   PKCS#8 PEM, 0600   (refused if present, unless --force)
//! --public-out       SPKI PEM           (default: public.pem beside it)
//! ```
//!
//! The public half replaces `src/auth/keys/evermod_public.pem` for the next
//! build.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use anyhow::bail;
use tracing::info;

use crate::auth::keys::{generate_key_pair, write_private_key, write_public_key};
use crate::cli::release::KeygenArgs;
use crate::config::Config;
use crate::error::Result;

/// Where the key pair was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

/// Handler for the keygen command.
///
/// # Errors
///
/// Returns an error if a private key already exists and `--force` was not
/// given, or the keys cannot be generated or written.
pub fn run_keygen_command(args: &KeygenArgs, config: &Config) -> Result<()> {
    let paths = generate_keys(
        &config.private_key_path()?,
        args.public_out.as_deref(),
        args.bits,
        args.force,
    )?;
    println!("private key: {}", paths.private_key.display());
    println!("public key:  {}", paths.public_key.display());
    Ok(())
}

/// Generate a key pair and write both halves.
///
/// # Errors
///
/// Returns an error if `private_key` exists and `force` is false, or the
/// keys cannot be generated or written.
pub fn generate_keys(
    private_key: &Path,
    public_out: Option<&Path>,
    bits: usize,
    force: bool,
) -> Result<KeyPaths> {
    if private_key.exists() && !force {
        bail!(
            "private key already exists at {}; pass --force to replace it",
            private_key.display()
        );
    }
    let public_key = public_out.map_or_else(
        || private_key.with_file_name("public.pem"),
        Path::to_path_buf,
    );

    info!(bits, "generating RSA key pair");
    let (private, public) = generate_key_pair(bits)?;
    write_private_key(&private, private_key)?;
    write_public_key(&public, &public_key)?;

    Ok(KeyPaths {
        private_key: private_key.to_path_buf(),
        public_key,
    })
}
