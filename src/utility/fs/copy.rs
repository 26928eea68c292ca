// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, warn};

use super::walk::{WalkOptions, walk_sorted};

/// Recursively copies all contents from `src` into `dst`.
///
/// Creates `dst` if it doesn't exist. Directories named in
/// `options.skip_dirs()` are pruned at any depth. File permissions are
/// preserved.
///
/// Returns the number of files copied.
///
/// # Example
/// ```no_run
/// use evermod::utility::fs::copy::copy_dir_contents;
/// use evermod::utility::fs::walk::WalkOptions;
/// use std::path::Path;
///
/// copy_dir_contents(
///     Path::new("framework"),
///     Path::new("staging/framework"),
///     &WalkOptions::pruning("build"),
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
/// # Errors
///
/// Returns an error if any IO operation fails (creating directory, reading, copying).
pub fn copy_dir_contents(src: &Path, dst: &Path, options: &WalkOptions) -> Result<usize> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory {}", dst.display()))?;

    let mut copied = 0;
    for entry in walk_sorted(src, options)? {
        let dst_path = dst.join(entry.relative());
        if entry.is_dir() {
            fs::create_dir_all(&dst_path)
                .with_context(|| format!("failed to create directory {}", dst_path.display()))?;
        } else {
            fs::copy(entry.path(), &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    dst_path.display()
                )
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Creates an empty staging directory next to `target`.
///
/// Staging on the same filesystem as the target lets [`replace_dir`] finish
/// with a rename.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or written.
pub fn stage_beside(target: &Path) -> Result<TempDir> {
    let parent = parent_of(target);
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory {}", parent.display()))?;

    let name = target
        .file_name()
        .map_or_else(|| "staging".into(), |n| n.to_string_lossy());
    tempfile::Builder::new()
        .prefix(&format!(".{name}.staging-"))
        .tempdir_in(parent)
        .with_context(|| format!("failed to create staging directory in {}", parent.display()))
}

/// Replaces the directory `target` with `staged`.
///
/// `staged` must live on the same filesystem as `target` (see
/// [`stage_beside`]). An existing `target` is first moved aside, so at no
/// point is `target` missing its old contents without the new ones being
/// one rename away. If the final rename fails the old directory is put back.
///
/// # Errors
///
/// Returns an error if either rename fails.
pub fn replace_dir(staged: &Path, target: &Path) -> Result<()> {
    let parent = parent_of(target);
    let trash = if target.exists() {
        let trash = tempfile::Builder::new()
            .prefix(".evermod-replaced-")
            .tempdir_in(parent)
            .with_context(|| format!("failed to create directory in {}", parent.display()))?;
        let aside = trash.path().join("old");
        fs::rename(target, &aside)
            .with_context(|| format!("failed to move {} aside", target.display()))?;
        Some((trash, aside))
    } else {
        None
    };

    if let Err(e) = fs::rename(staged, target) {
        if let Some((_, aside)) = &trash
            && let Err(restore) = fs::rename(aside, target)
        {
            warn!(
                path = %target.display(),
                "failed to restore previous directory: {restore}"
            );
        }
        return Err(e).with_context(|| {
            format!("failed to move {} to {}", staged.display(), target.display())
        });
    }

    debug!(path = %target.display(), "replaced directory");
    // Dropping the trash TempDir removes the old contents.
    Ok(())
}

/// Copies `src` into a fresh directory that then replaces `target`.
///
/// # Errors
///
/// Returns an error if staging, copying or the final swap fails. On failure
/// `target` keeps its previous contents.
pub fn replace_dir_with_copy(src: &Path, target: &Path, options: &WalkOptions) -> Result<()> {
    let staging = stage_beside(target)?;
    let staged = staging.path().join("new");
    copy_dir_contents(src, &staged, options)?;
    replace_dir(&staged, target)
}

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
