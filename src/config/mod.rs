// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for evermod.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. evermod.toml (cwd, optional)
//! 3. --ini FILE (repeatable)
//! 4. EVERMOD_* env vars
//! 5. --set section.key=value
//! ```
//!
//! # Environment Variable Mapping
//!
//! Sections and keys are separated by a double underscore, since keys
//! themselves contain single underscores:
//!
//! ```text
//! EVERMOD_KEYS__PRIVATE_KEY=/k.pem       → keys.private_key
//! EVERMOD_PUBLISH__REMOTE=upstream       → publish.remote
//! EVERMOD_RELEASE__WORKSPACE_INCLUDES=a,b → release.workspace_includes
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use wax::Program as _;

use crate::error::{ConfigError, EvermodError, Result};

use loader::ConfigLoader;
use types::{KeysConfig, PublishConfig, ReleaseConfig, TagConfig};

/// Characters with a meaning in `module_pattern` globs.
const GLOB_META: [char; 9] = ['*', '?', '[', ']', '{', '}', '<', '>', '\\'];

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Signing keys.
    pub keys: KeysConfig,
    /// Release build layout.
    pub release: ReleaseConfig,
    /// Publishing branch.
    pub publish: PublishConfig,
    /// Version tags.
    pub tag: TagConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use evermod::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("evermod.toml")
    ///     .with_env_prefix("EVERMOD")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Fill in home-relative defaults and reject unusable values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the module glob does not compile or does
    /// not start with the module prefix, a name
    /// that must be a single path component is empty or nested, or no home
    /// directory is available to place the default private key.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        if self.keys.private_key.is_none() {
            self.keys.private_key = Some(default_private_key_path()?);
        }

        wax::Glob::new(&self.release.module_pattern).map_err(|e| {
            EvermodError::from(ConfigError::InvalidValue {
                section: "release".to_string(),
                key: "module_pattern".to_string(),
                message: e.to_string(),
            })
        })?;

        let (pattern, prefix) = (&self.release.module_pattern, &self.release.module_prefix);
        if prefix.contains(GLOB_META) || !pattern.starts_with(prefix.as_str()) {
            return Err(EvermodError::from(ConfigError::InvalidValue {
                section: "release".to_string(),
                key: "module_prefix".to_string(),
                message: format!("'{prefix}' must be a literal prefix of module_pattern '{pattern}'"),
            })
            .into());
        }

        let single_components = [
            ("release", "releases_dir", &self.release.releases_dir),
            ("release", "framework_dir", &self.release.framework_dir),
            ("release", "workspace_archive", &self.release.workspace_archive),
            ("release", "manifest_name", &self.release.manifest_name),
            ("release", "pruned_dir", &self.release.pruned_dir),
            ("publish", "branch", &self.publish.branch),
            ("publish", "latest_alias", &self.publish.latest_alias),
            ("publish", "remote", &self.publish.remote),
            ("tag", "main_branch", &self.tag.main_branch),
        ];
        for (section, key, value) in single_components {
            if value.is_empty() || value.contains(['/', '\\']) {
                return Err(EvermodError::from(ConfigError::InvalidValue {
                    section: section.to_string(),
                    key: key.to_string(),
                    message: format!("expected a single non-empty name, got '{value}'"),
                })
                .into());
            }
        }

        Ok(())
    }

    /// Whether `name` selects a module directory.
    #[must_use]
    pub fn is_module_dir(&self, name: &str) -> bool {
        wax::Glob::new(&self.release.module_pattern).is_ok_and(|glob| glob.is_match(name))
    }

    /// Private key path after resolution.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` if called before the path was
    /// resolved and no home directory exists.
    pub fn private_key_path(&self) -> Result<PathBuf> {
        match &self.keys.private_key {
            Some(path) => Ok(path.clone()),
            None => default_private_key_path(),
        }
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();

        options.insert(
            "keys.private_key".to_string(),
            self.keys
                .private_key
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );

        let release = &self.release;
        options.insert("release.framework_dir".into(), release.framework_dir.clone());
        options.insert("release.releases_dir".into(), release.releases_dir.clone());
        options.insert("release.module_pattern".into(), release.module_pattern.clone());
        options.insert("release.module_prefix".into(), release.module_prefix.clone());
        options.insert("release.payload_subpath".into(), release.payload_subpath.clone());
        options.insert("release.workspace_archive".into(), release.workspace_archive.clone());
        options.insert("release.manifest_name".into(), release.manifest_name.clone());
        options.insert(
            "release.workspace_includes".into(),
            release.workspace_includes.join(", "),
        );
        options.insert("release.pruned_dir".into(), release.pruned_dir.clone());

        options.insert("publish.remote".into(), self.publish.remote.clone());
        options.insert("publish.branch".into(), self.publish.branch.clone());
        options.insert("publish.latest_alias".into(), self.publish.latest_alias.clone());

        options.insert("tag.main_branch".into(), self.tag.main_branch.clone());
        options.insert("tag.prefix".into(), self.tag.prefix.clone());

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}

fn default_private_key_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        EvermodError::from(ConfigError::MissingKey {
            section: "keys".to_string(),
            key: "private_key".to_string(),
        })
    })?;
    Ok(home.join(".evermod").join("keys").join("private.pem"))
}
