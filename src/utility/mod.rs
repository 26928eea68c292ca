// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! fs
//!   walk:  walk_sorted(), WalkOptions (prune by directory name)
//!   copy:  copy_dir_contents(), stage_beside(), replace_dir()
//! ```

pub mod fs;
