// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository handle and scoped branch switching.
//!
//! ```text
//! Repository::open(path, remote)
//!      |
//!      +-- queries   current_branch / tag_exists / remote_branch_exists
//!      +-- mutations checkout / add / commit / push / tag
//!      |
//!      '-- with_branch(target, |repo| ...)
//!             switch_to(target) --> BranchGuard
//!             run closure
//!             guard restores the original branch (Ok, Err, or panic)
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use super::backend::{GitMutation, GitQuery, GixBackend, ShellBackend};
use crate::error::{EvermodError, EvermodResult, GitError};

/// Working copy that release operations act on.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    remote: String,
}

impl Repository {
    /// Open the work tree containing `path`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepoNotFound` if `path` is not inside a git work tree.
    pub fn open(path: &Path, remote: impl Into<String>) -> EvermodResult<Self> {
        if !GixBackend::is_git_repo(path) {
            return Err(GitError::RepoNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let root = PathBuf::from(ShellBackend::toplevel(path)?);
        Ok(Self {
            root,
            remote: remote.into(),
        })
    }

    /// Top level of the work tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remote used for fetch, pull and push.
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Name of the checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns `GitError::DetachedHead` when HEAD does not name a branch.
    pub fn current_branch(&self) -> EvermodResult<String> {
        GixBackend::current_branch(&self.root)?.ok_or_else(|| {
            GitError::DetachedHead {
                path: self.root.display().to_string(),
            }
            .into()
        })
    }

    /// Whether a local tag named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the reference store cannot be read.
    pub fn tag_exists(&self, name: &str) -> EvermodResult<bool> {
        GixBackend::tag_exists(&self.root, name)
    }

    /// Whether the remote carries `branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be queried.
    pub fn remote_branch_exists(&self, branch: &str) -> EvermodResult<bool> {
        ShellBackend::remote_branch_exists(&self.root, &self.remote, branch)
    }

    /// Read a git config value.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails for a reason other than an unset key.
    pub fn config_value(&self, key: &str) -> EvermodResult<Option<String>> {
        ShellBackend::config_value(&self.root, key)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if the fetch fails.
    pub fn fetch(&self) -> EvermodResult<()> {
        ShellBackend::fetch(&self.root, &self.remote)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be fast-forwarded.
    pub fn pull(&self, branch: &str) -> EvermodResult<()> {
        ShellBackend::pull(&self.root, &self.remote, branch)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if the checkout fails.
    pub fn checkout(&self, branch: &str) -> EvermodResult<()> {
        ShellBackend::checkout(&self.root, branch)
    }

    /// Create and check out `branch` with no history and an empty index.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the orphan checkout fails.
    pub fn checkout_orphan(&self, branch: &str) -> EvermodResult<()> {
        ShellBackend::checkout_orphan(&self.root, branch)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if staging fails.
    pub fn add(&self, pathspec: &str) -> EvermodResult<()> {
        ShellBackend::add(&self.root, pathspec)
    }

    /// Whether the index differs from `HEAD`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the comparison cannot be made.
    pub fn has_staged_changes(&self) -> EvermodResult<bool> {
        ShellBackend::has_staged_changes(&self.root)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails.
    pub fn commit(&self, message: &str) -> EvermodResult<()> {
        ShellBackend::commit(&self.root, message, false)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails.
    pub fn commit_empty(&self, message: &str) -> EvermodResult<()> {
        ShellBackend::commit(&self.root, message, true)
    }

    /// Push `refspec` to the configured remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the push is rejected.
    pub fn push(&self, refspec: &str) -> EvermodResult<()> {
        ShellBackend::push(&self.root, &self.remote, refspec)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if tag creation or signing fails.
    pub fn tag_signed(&self, name: &str, message: &str) -> EvermodResult<()> {
        ShellBackend::tag_signed(&self.root, name, message)
    }

    /// # Errors
    ///
    /// Returns a `GitError` if tag creation fails.
    pub fn tag_annotated(&self, name: &str, message: &str) -> EvermodResult<()> {
        ShellBackend::tag_annotated(&self.root, name, message)
    }

    /// Check out `target`, returning a guard that switches back on drop.
    ///
    /// Nothing is checked out when `target` is already current.
    ///
    /// # Errors
    ///
    /// Returns `GitError::DetachedHead` if there is no branch to return to,
    /// or a `GitError` if the checkout fails.
    pub fn switch_to(&self, target: &str) -> EvermodResult<BranchGuard<'_>> {
        let original = self.current_branch()?;
        let switched = original != target;
        if switched {
            debug!(from = %original, to = %target, "switching branch");
            self.checkout(target)?;
        }
        Ok(BranchGuard {
            repo: self,
            original,
            switched,
        })
    }

    /// Create `branch` as an orphan and check it out, returning a guard that
    /// switches back to the current branch on drop.
    ///
    /// # Errors
    ///
    /// Returns `GitError::DetachedHead` if there is no branch to return to,
    /// or a `GitError` if the orphan checkout fails.
    pub fn switch_to_orphan(&self, branch: &str) -> EvermodResult<BranchGuard<'_>> {
        let original = self.current_branch()?;
        debug!(from = %original, to = %branch, "creating orphan branch");
        // Guard first: a half-done orphan checkout still has to be undone.
        let guard = BranchGuard {
            repo: self,
            original,
            switched: true,
        };
        self.checkout_orphan(branch)?;
        Ok(guard)
    }

    /// Run `f` with `target` checked out, then return to the original branch.
    ///
    /// The original branch is restored whether `f` succeeds, fails, or panics.
    /// A failure to restore is reported only when `f` itself succeeded.
    ///
    /// # Errors
    ///
    /// Returns the error from switching, from `f`, or from switching back.
    pub fn with_branch<T, E>(
        &self,
        target: &str,
        f: impl FnOnce(&Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<EvermodError>,
    {
        let guard = self.switch_to(target)?;
        match f(self) {
            Ok(value) => {
                guard.restore()?;
                Ok(value)
            }
            Err(e) => {
                drop(guard);
                Err(e)
            }
        }
    }
}

/// Restores the branch that was current when it was created.
#[derive(Debug)]
#[must_use = "dropping the guard immediately switches back"]
pub struct BranchGuard<'a> {
    repo: &'a Repository,
    original: String,
    switched: bool,
}

impl BranchGuard<'_> {
    /// Branch that will be restored.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Switch back now and report failure.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the original branch cannot be checked out.
    pub fn restore(mut self) -> EvermodResult<()> {
        let result = self.checkout_original();
        self.switched = false;
        result
    }

    fn checkout_original(&self) -> EvermodResult<()> {
        if !self.switched {
            return Ok(());
        }
        info!(branch = %self.original, "restoring branch");
        self.repo.checkout(&self.original)
    }
}

impl Drop for BranchGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.checkout_original() {
            error!(
                branch = %self.original,
                "failed to restore original branch: {e}"
            );
        }
    }
}
