// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release, verify and keygen arguments.
//!
//! ```text
//! release <TAG> [TARGET] [--publish] [--auto]
//! verify <DIR> [--prune]
//! keygen [--bits N] [--public-out FILE] [--force]
//! ```

use clap::Args;
use clap::builder::TypedValueParser as _;
use std::path::PathBuf;

use crate::auth::keys::DEFAULT_KEY_BITS;
use crate::release::tag::ReleaseTag;

/// Arguments for the `release` command.
#[derive(Debug, Clone, Args)]
pub struct ReleaseArgs {
    /// Release tag, such as 1.2.0 or 1.2.0-beta.1.
    #[arg(value_name = "TAG")]
    pub tag: ReleaseTag,

    /// Workspace root containing the framework directory.
    #[arg(value_name = "TARGET", default_value = ".")]
    pub target: PathBuf,

    /// Publishes the release to the releases branch and creates the version tag.
    #[arg(long)]
    pub publish: bool,

    /// Tags the main branch without asking.
    #[arg(long, requires = "publish")]
    pub auto: bool,
}

/// Arguments for the `verify` command.
#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    /// Release directory holding the manifest and its signature.
    #[arg(value_name = "DIR")]
    pub release_dir: PathBuf,

    /// Deletes an artifact whose checksum does not match.
    #[arg(long)]
    pub prune: bool,
}

/// Arguments for the `keygen` command.
#[derive(Debug, Clone, Args)]
pub struct KeygenArgs {
    /// RSA modulus size.
    #[arg(long, value_name = "BITS", default_value_t = DEFAULT_KEY_BITS,
          value_parser = clap::value_parser!(u16).range(1024..).map(usize::from))]
    pub bits: usize,

    /// Where to write the public key, defaults to `public.pem` beside the private key.
    #[arg(long = "public-out", value_name = "FILE")]
    pub public_out: Option<PathBuf>,

    /// Replaces an existing private key.
    #[arg(long)]
    pub force: bool,
}
