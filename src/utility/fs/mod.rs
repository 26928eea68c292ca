// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities for deterministic traversal and safe replacement.
//!
//! ```text
//! walk:  walk_sorted()    ignore::Walk, sorted, no ignore rules
//!        WalkOptions      follow_links, skip_dirs (pruned at any depth)
//! copy:  copy_dir_contents()
//!        stage_beside() + replace_dir()   rename-based swap
//!        replace_dir_with_copy()
//! ```

pub mod copy;
pub mod walk;

#[cfg(test)]
mod tests;
