// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery (read)     --> GixBackend (pure Rust gix)
//! GitMutation (write) --> ShellBackend (git CLI)
//! ```

use crate::error::{EvermodResult, GitError, GixError, ProcessError};
use std::path::Path;
use tracing::debug;

// --- Query Trait (Read-only operations) ---

/// Read-only git query operations.
///
/// Implementors inspect repository state without modification.
pub trait GitQuery {
    /// Check if path is inside a git work tree.
    fn is_git_repo(path: &Path) -> bool;

    /// Get current branch name (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    fn current_branch(path: &Path) -> EvermodResult<Option<String>>;

    /// Check if a local tag exists.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or reference lookup fails.
    fn tag_exists(path: &Path, tag: &str) -> EvermodResult<bool>;
}

// --- Mutation Trait (Write operations) ---

/// Git mutation operations that modify repository or remote state.
///
/// These go through the git CLI so credential helpers, hooks and signing
/// programs behave exactly as they do for the maintainer's own commands.
pub trait GitMutation {
    /// Fetch from remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the fetch operation fails.
    fn fetch(repo_path: &Path, remote: &str) -> EvermodResult<()>;

    /// Fast-forward the current branch from `remote/branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the pull operation fails.
    fn pull(repo_path: &Path, remote: &str, branch: &str) -> EvermodResult<()>;

    /// Checkout a branch.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the checkout operation fails.
    fn checkout(repo_path: &Path, what: &str) -> EvermodResult<()>;

    /// Start a new branch with no history and an empty index.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the orphan checkout or index reset fails.
    fn checkout_orphan(repo_path: &Path, branch: &str) -> EvermodResult<()>;

    /// Stage a pathspec.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `git add` fails.
    fn add(repo_path: &Path, pathspec: &str) -> EvermodResult<()>;

    /// Commit staged changes.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails (including "nothing to commit"
    /// when `allow_empty` is false).
    fn commit(repo_path: &Path, message: &str, allow_empty: bool) -> EvermodResult<()>;

    /// Push a refspec to a remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the push is rejected or the remote is unreachable.
    fn push(repo_path: &Path, remote: &str, refspec: &str) -> EvermodResult<()>;

    /// Create a signed tag (`git tag -s`).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if tag creation or signing fails.
    fn tag_signed(repo_path: &Path, name: &str, message: &str) -> EvermodResult<()>;

    /// Create an unsigned annotated tag (`git tag -a`).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if tag creation fails.
    fn tag_annotated(repo_path: &Path, name: &str, message: &str) -> EvermodResult<()>;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
///
/// Read-only operations without spawning subprocesses.
pub struct GixBackend;

impl GitQuery for GixBackend {
    fn is_git_repo(path: &Path) -> bool {
        gix::discover(path).is_ok()
    }

    fn current_branch(path: &Path) -> EvermodResult<Option<String>> {
        let repo =
            gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn tag_exists(path: &Path, tag: &str) -> EvermodResult<bool> {
        let repo =
            gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;

        match repo.find_reference(format!("refs/tags/{tag}").as_str()) {
            Ok(_) => Ok(true),
            Err(gix::reference::find::existing::Error::NotFound { name: _ }) => Ok(false),
            Err(e) => Err(GitError::Gix(GixError::Reference(e)).into()),
        }
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Shell-based git backend using git CLI.
pub struct ShellBackend;

impl ShellBackend {
    /// Execute a git command. Sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    ///
    /// Returns trimmed stdout.
    pub(crate) fn git_command(args: &[&str], cwd: &Path) -> EvermodResult<String> {
        Self::git_output(args, cwd).and_then(|output| {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                Err(command_failed(args, &output).into())
            }
        })
    }

    /// Execute a git command and hand back the raw output, whatever the status.
    pub(crate) fn git_output(args: &[&str], cwd: &Path) -> EvermodResult<std::process::Output> {
        use std::process::Command;

        let command = format!("git {}", args.join(" "));
        debug!(cwd = %cwd.display(), "> {command}");

        let git = which::which("git").map_err(|_| ProcessError::ExecutableNotFound {
            name: "git".to_string(),
        })?;

        Command::new(git)
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| ProcessError::SpawnFailed { command, source }.into())
    }

    /// Read a git config value (None when unset).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails for a reason other than a missing key.
    pub fn config_value(repo_path: &Path, key: &str) -> EvermodResult<Option<String>> {
        let args = ["config", "--get", key];
        let output = Self::git_output(&args, repo_path)?;
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            // exit 1: key not set
            Some(1) => Ok(None),
            _ => Err(command_failed(&args, &output).into()),
        }
    }

    /// Check whether `remote` has a branch named `branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be queried. A reachable remote
    /// without the branch is `Ok(false)`, never an error.
    pub fn remote_branch_exists(repo_path: &Path, remote: &str, branch: &str) -> EvermodResult<bool> {
        let refname = format!("refs/heads/{branch}");
        let args = ["ls-remote", "--exit-code", "--heads", remote, refname.as_str()];
        let output = Self::git_output(&args, repo_path)?;
        match output.status.code() {
            Some(0) => Ok(true),
            // --exit-code: 2 means no matching refs
            Some(2) => Ok(false),
            _ => Err(command_failed(&args, &output).into()),
        }
    }

    /// Whether the index differs from `HEAD`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git cannot compare the index.
    pub fn has_staged_changes(repo_path: &Path) -> EvermodResult<bool> {
        let args = ["diff", "--cached", "--quiet"];
        let output = Self::git_output(&args, repo_path)?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(command_failed(&args, &output).into()),
        }
    }

    /// Top level of the work tree containing `path`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `path` is not inside a work tree.
    pub fn toplevel(path: &Path) -> EvermodResult<String> {
        Self::git_command(&["rev-parse", "--show-toplevel"], path)
    }
}

fn command_failed(args: &[&str], output: &std::process::Output) -> GitError {
    GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        code: output.status.code(),
        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

impl GitMutation for ShellBackend {
    fn fetch(repo_path: &Path, remote: &str) -> EvermodResult<()> {
        Self::git_command(&["fetch", "--quiet", remote], repo_path)?;
        Ok(())
    }

    fn pull(repo_path: &Path, remote: &str, branch: &str) -> EvermodResult<()> {
        Self::git_command(&["pull", "--quiet", "--ff-only", remote, branch], repo_path)?;
        Ok(())
    }

    fn checkout(repo_path: &Path, what: &str) -> EvermodResult<()> {
        Self::git_command(&["checkout", "-q", what], repo_path)?;
        Ok(())
    }

    fn checkout_orphan(repo_path: &Path, branch: &str) -> EvermodResult<()> {
        Self::git_command(&["checkout", "-q", "--orphan", branch], repo_path)?;
        Self::git_command(&["reset", "-q", "--hard"], repo_path)?;
        Ok(())
    }

    fn add(repo_path: &Path, pathspec: &str) -> EvermodResult<()> {
        Self::git_command(&["add", "--all", "--", pathspec], repo_path)?;
        Ok(())
    }

    fn commit(repo_path: &Path, message: &str, allow_empty: bool) -> EvermodResult<()> {
        let mut args = vec!["commit", "-q", "-m", message];
        if allow_empty {
            args.push("--allow-empty");
        }
        Self::git_command(&args, repo_path)?;
        Ok(())
    }

    fn push(repo_path: &Path, remote: &str, refspec: &str) -> EvermodResult<()> {
        Self::git_command(&["push", "--quiet", remote, refspec], repo_path)?;
        Ok(())
    }

    fn tag_signed(repo_path: &Path, name: &str, message: &str) -> EvermodResult<()> {
        Self::git_command(&["tag", "-s", name, "-m", message], repo_path)?;
        Ok(())
    }

    fn tag_annotated(repo_path: &Path, name: &str, message: &str) -> EvermodResult<()> {
        Self::git_command(&["tag", "-a", name, "-m", message], repo_path)?;
        Ok(())
    }
}

impl GitQuery for ShellBackend {
    fn is_git_repo(path: &Path) -> bool {
        Self::git_command(&["rev-parse", "--is-inside-work-tree"], path).is_ok()
    }

    fn current_branch(path: &Path) -> EvermodResult<Option<String>> {
        Self::git_command(&["symbolic-ref", "--short", "HEAD"], path)
            .map_or_else(|_| Ok(None), |branch| Ok(Some(branch)))
    }

    fn tag_exists(path: &Path, tag: &str) -> EvermodResult<bool> {
        let output = Self::git_command(&["tag", "--list", tag], path)?;
        Ok(output.lines().any(|line| line.trim() == tag))
    }
}
