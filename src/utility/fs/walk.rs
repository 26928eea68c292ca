// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use anyhow::Context;
use bon::Builder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Options for deterministic directory traversal.
#[derive(Debug, Clone, Builder)]
pub struct WalkOptions {
    /// Follow symbolic links
    #[builder(setters(name = with_follow_links), default = true)]
    follow_links: bool,
    /// Skip directories matching these names (exact match, any depth)
    #[builder(setters(name = with_skip_dirs), default)]
    skip_dirs: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalkOptions {
    /// Options that prune every directory called `name`.
    #[must_use]
    pub fn pruning(name: &str) -> Self {
        Self::builder().with_skip_dirs(vec![name.to_string()]).build()
    }

    /// Returns whether to follow symbolic links.
    #[must_use]
    pub const fn follow_links(&self) -> bool {
        self.follow_links
    }

    /// Returns the skip directories list.
    #[must_use]
    pub fn skip_dirs(&self) -> &[String] {
        &self.skip_dirs
    }
}

/// One file or directory found below the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    path: PathBuf,
    relative: PathBuf,
    is_dir: bool,
}

impl WalkEntry {
    /// Absolute (or root-joined) path on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the walk root.
    #[must_use]
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Relative path with `/` separators on every platform.
    #[must_use]
    pub fn relative_slash(&self) -> String {
        self.relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Builds a `WalkBuilder` that sees every file (no ignore rules, hidden
/// files included) in file-name order, pruning `skip_dirs` before descent.
pub(super) fn build_walker(root: &Path, options: &WalkOptions) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder.standard_filters(false);
    builder.follow_links(options.follow_links());
    builder.sort_by_file_name(|a, b| a.cmp(b));

    if !options.skip_dirs().is_empty() {
        let skip_dirs = options.skip_dirs().to_vec();
        builder.filter_entry(move |entry| {
            !(entry.depth() > 0
                && entry.file_type().is_some_and(|ft| ft.is_dir())
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| skip_dirs.iter().any(|skip| skip == name)))
        });
    }

    builder
}

/// Walks `root` and returns every entry below it, sorted by relative path.
///
/// The root itself is not included. Unlike a build-tree scan, nothing is
/// skipped unless it is listed in `skip_dirs`: hidden files, `.gitignore`d
/// files and VCS metadata are all reported.
///
/// # Errors
///
/// Returns an error if the root directory does not exist or any entry
/// cannot be read.
///
/// # Example
/// ```no_run
/// use evermod::utility::fs::walk::{walk_sorted, WalkOptions};
///
/// let entries = walk_sorted("framework", &WalkOptions::pruning("build"))?;
/// for entry in entries.iter().filter(|e| !e.is_dir()) {
///     println!("{}", entry.relative_slash());
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn walk_sorted<P: AsRef<Path>>(root: P, options: &WalkOptions) -> Result<Vec<WalkEntry>> {
    let root = root.as_ref();

    if !root.is_dir() {
        anyhow::bail!("root directory does not exist: {}", root.display());
    }

    let mut entries = Vec::new();
    for result in build_walker(root, options).build() {
        let entry = result.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.depth() == 0 {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} escaped {}", entry.path().display(), root.display()))?
            .to_path_buf();
        entries.push(WalkEntry {
            is_dir: entry.file_type().is_some_and(|ft| ft.is_dir()),
            path: entry.into_path(),
            relative,
        });
    }

    entries.sort_by_cached_key(WalkEntry::relative_slash);
    Ok(entries)
}
