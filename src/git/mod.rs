// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!          Repository (repo.rs)
//!       handle + BranchGuard scope
//!                  |
//!      ,------------------------,
//!      |    backend (traits)    |
//!      '--+-----------------+---'
//!         |                 |
//!         v                 v
//!    GitQuery          GitMutation
//!   (gix, read)        (CLI, write)
//!         |                 |
//!         v                 v
//!    GixBackend        ShellBackend
//!    .is_repo          .checkout/--orphan
//!    .branch           .add/.commit/.push
//!    .tag_exists       .tag -s/-a, ls-remote
//! ```
//!
//! **`GixBackend`**: pure Rust, no subprocess, read-only.
//! **`ShellBackend`**: git CLI for credentials, signing and writes.

pub mod backend;
pub mod repo;

pub use repo::{BranchGuard, Repository};
