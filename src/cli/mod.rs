// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for evermod using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! evermod [global options] <command>
//! version
//! options
//! inis
//! release <tag> [target] [--publish] [--auto]   (hidden)
//! verify <dir> [--prune]
//! keygen [--bits N] [--public-out FILE]         (hidden)
//! ```

pub mod global;
pub mod release;


use crate::cli::global::GlobalOptions;
use crate::cli::release::{KeygenArgs, ReleaseArgs, VerifyArgs};
use clap::{Parser, Subcommand};

/// EverMod Workspace Release Tool
///
/// Packages, signs and publishes EverMod framework releases.
#[derive(Debug, Parser)]
#[command(
    name = "evermod",
    author,
    version,
    about = "EverMod Workspace Release Tool",
    long_about = "evermod Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Packages, signs and publishes EverMod framework releases.\n\n\
                  Use `evermod verify releases/<tag>` to check a downloaded\n\
                  release against its signed manifest. See\n\
                  `evermod <command> --help` for more information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  By default, evermod loads `evermod.toml` from the current\n\
                  directory if it exists. Additional files can be specified with\n\
                  --ini, those are loaded after it and override it. EVERMOD_*\n\
                  environment variables (EVERMOD_PUBLISH__REMOTE=upstream) and\n\
                  --set options override every file. Use --no-default-inis to\n\
                  only use --ini."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the config files used by evermod.
    Inis,

    /// Builds, signs and optionally publishes a release (maintainers only).
    #[command(hide = true)]
    Release(ReleaseArgs),

    /// Checks a release directory against its signed manifest.
    Verify(VerifyArgs),

    /// Generates the maintainer signing key pair.
    #[command(hide = true)]
    Keygen(KeygenArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
