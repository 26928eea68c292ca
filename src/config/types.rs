// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! [keys]     private_key
//! [release]  framework_dir, releases_dir, module_pattern, module_prefix,
//!            payload_subpath, workspace_archive, manifest_name,
//!            workspace_includes, pruned_dir
//! [publish]  remote, branch, latest_alias
//! [tag]      main_branch, prefix
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Signing key locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    /// Maintainer private key (default: `~/.evermod/keys/private.pem`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<PathBuf>,
}

/// Release build layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Directory holding the module directories, relative to the target root.
    pub framework_dir: String,
    /// Directory receiving `<tag>/` release folders, relative to the target root.
    pub releases_dir: String,
    /// Glob selecting module directories inside `framework_dir`.
    pub module_pattern: String,
    /// Prefix stripped from a module directory name to get its version.
    pub module_prefix: String,
    /// Payload subtree inside each module; its last component names the
    /// top-level folder in the module archive.
    pub payload_subpath: String,
    /// File name of the whole-workspace archive.
    pub workspace_archive: String,
    /// File name of the release manifest.
    pub manifest_name: String,
    /// Entries copied into the workspace archive, relative to the target root.
    pub workspace_includes: Vec<String>,
    /// Directory name pruned at any depth when copying `framework_dir`.
    pub pruned_dir: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            framework_dir: "framework".to_string(),
            releases_dir: "releases".to_string(),
            module_pattern: "evermod-*".to_string(),
            module_prefix: "evermod-".to_string(),
            payload_subpath: "src/main/java/net".to_string(),
            workspace_archive: "evermod-framework.zip".to_string(),
            manifest_name: "versions.json".to_string(),
            workspace_includes: DEFAULT_WORKSPACE_INCLUDES
                .iter()
                .map(ToString::to_string)
                .collect(),
            pruned_dir: "build".to_string(),
        }
    }
}

/// Default workspace package contents.
pub const DEFAULT_WORKSPACE_INCLUDES: &[&str] = &[
    ".vscode",
    "framework",
    "gradle",
    "mods",
    ".gitattributes",
    ".gitignore",
    "build.gradle",
    "gradle.properties",
    "gradlew",
    "gradlew.bat",
    "settings.gradle",
    "LICENSE",
    "README.md",
];

/// Publishing branch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Remote that receives the publishing branch and tags.
    pub remote: String,
    /// Dedicated publishing branch.
    pub branch: String,
    /// Directory mirroring the newest stable release.
    pub latest_alias: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "releases".to_string(),
            latest_alias: "latest".to_string(),
        }
    }
}

/// Version tag settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagConfig {
    /// Branch that release tags belong on.
    pub main_branch: String,
    /// Prefix prepended to the release tag.
    pub prefix: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            main_branch: "main".to_string(),
            prefix: "v".to_string(),
        }
    }
}
