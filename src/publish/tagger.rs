// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Immutable version tags.
//!
//! ```text
//! v<tag> exists?        --> AlreadyExists (no-op)
//! target branch         auto: main | current (ask to retarget when not main)
//! TagStrategy::probe    user.signingkey + signing program on PATH
//!                         Signed   --> git tag -s
//!                         Unsigned --> git tag -a
//!                         Signed, git tag -s fails --> git tag -a
//! push refs/tags/v<tag>
//! ```

use std::io::{self, BufRead, IsTerminal, Write};

use tracing::{info, warn};

use crate::config::types::TagConfig;
use crate::error::EvermodResult;
use crate::git::Repository;
use crate::release::tag::ReleaseTag;

/// Yes/no decision point.
pub trait Prompter {
    /// Ask `question`; `false` means no.
    fn confirm(&self, question: &str) -> bool;
}

impl<F> Prompter for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

/// Asks on stderr and reads stdin. A non-terminal stdin answers no.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, question: &str) -> bool {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            info!("non-interactive input, answering no: {question}");
            return false;
        }

        let mut stderr = io::stderr();
        if write!(stderr, "{question} (y/n): ")
            .and_then(|()| stderr.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// How the tag object is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStrategy {
    /// `git tag -s`
    Signed,
    /// `git tag -a`
    Unsigned,
}

impl TagStrategy {
    /// Choose `Signed` only when git has a signing key and its signing
    /// program can be found.
    #[must_use]
    pub fn probe(repo: &Repository) -> Self {
        let config = |key: &str| {
            repo.config_value(key)
                .ok()
                .flatten()
                .filter(|value| !value.trim().is_empty())
        };

        if config("user.signingkey").is_none() {
            info!("signing unavailable: no user.signingkey configured, tag will be unsigned");
            return Self::Unsigned;
        }

        let format = config("gpg.format");
        let program = match format.as_deref() {
            Some("ssh") => config("gpg.ssh.program").unwrap_or_else(|| "ssh-keygen".into()),
            Some("x509") => config("gpg.x509.program").unwrap_or_else(|| "gpgsm".into()),
            _ => config("gpg.program").unwrap_or_else(|| "gpg".into()),
        };

        if which::which(&program).is_ok() {
            Self::Signed
        } else {
            warn!("signing unavailable: '{program}' not found, tag will be unsigned");
            Self::Unsigned
        }
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Signed)
    }
}

/// Result of a tagging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// The tag was already present locally; nothing was done.
    AlreadyExists { name: String },
    Created {
        name: String,
        branch: String,
        signed: bool,
    },
}

/// Creates and pushes `v<tag>`.
#[derive(Debug, Clone, Copy)]
pub struct Tagger<'a> {
    repo: &'a Repository,
    config: &'a TagConfig,
}

impl<'a> Tagger<'a> {
    #[must_use]
    pub const fn new(repo: &'a Repository, config: &'a TagConfig) -> Self {
        Self { repo, config }
    }

    /// Tag the release.
    ///
    /// With `auto`, the tag always goes on the main branch. Otherwise the
    /// current branch is used, and when it is not the main branch the
    /// `prompter` decides whether to retarget. A retargeted run checks out
    /// and pulls the main branch, then switches back.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if HEAD is detached, the target branch cannot be
    /// checked out or updated, or the tag cannot be created or pushed.
    pub fn tag(
        &self,
        tag: &ReleaseTag,
        auto: bool,
        prompter: &dyn Prompter,
    ) -> EvermodResult<TagOutcome> {
        let name = tag.version_tag_name(&self.config.prefix);
        if self.repo.tag_exists(&name)? {
            info!("tag {name} already exists, skipping creation");
            return Ok(TagOutcome::AlreadyExists { name });
        }

        let current = self.repo.current_branch()?;
        let main = &self.config.main_branch;
        let target = if auto {
            main.clone()
        } else if current != *main {
            warn!("currently on branch '{current}', not '{main}'");
            if prompter.confirm(&format!("Create the tag on '{main}' instead?")) {
                main.clone()
            } else {
                current.clone()
            }
        } else {
            current.clone()
        };

        let message = format!("EverMod {tag} release");
        let signed = if target == current {
            info!("tag will be created on branch '{target}'");
            self.create_and_push(&name, &message)?
        } else {
            info!("switching from '{current}' to '{target}' to create the tag");
            self.repo.with_branch(&target, |repo| {
                repo.pull(&target)?;
                self.create_and_push(&name, &message)
            })?
        };

        Ok(TagOutcome::Created {
            name,
            branch: target,
            signed,
        })
    }

    /// A signing failure falls back to an unsigned tag.
    fn create_and_push(&self, name: &str, message: &str) -> EvermodResult<bool> {
        let strategy = match TagStrategy::probe(self.repo) {
            TagStrategy::Signed => match self.repo.tag_signed(name, message) {
                Ok(()) => TagStrategy::Signed,
                Err(e) => {
                    warn!("signing unavailable: {e}, tag will be unsigned");
                    TagStrategy::Unsigned
                }
            },
            TagStrategy::Unsigned => TagStrategy::Unsigned,
        };
        if !strategy.is_signed() {
            self.repo.tag_annotated(name, message)?;
        }
        info!(signed = strategy.is_signed(), "created tag {name}");

        self.repo.push(&format!("refs/tags/{name}"))?;
        info!(remote = %self.repo.remote(), "pushed tag {name}");
        Ok(strategy.is_signed())
    }
}
