// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release tags and their stability channel.
//!
//! ```text
//! "1.2.0"          --> stable
//! "1.2.0-alpha"    --> alpha
//! "1.2.0-beta.1"   --> beta
//! "1.2.0-rc1"      --> rc
//! first marker found in order alpha, beta, rc wins
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvermodError, ReleaseError};

/// Stability classification of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Alpha,
    Beta,
    Rc,
    Stable,
}

/// Markers checked in order; the first one contained in the tag decides.
const CHANNEL_MARKERS: &[(Channel, &[&str])] = &[
    (Channel::Alpha, &["alpha"]),
    (Channel::Beta, &["beta"]),
    (Channel::Rc, &["rc", "release_candidate"]),
];

impl Channel {
    /// Classify a tag by case-insensitive marker substring.
    #[must_use]
    pub fn classify(tag: &str) -> Self {
        let lower = tag.to_lowercase();
        CHANNEL_MARKERS
            .iter()
            .find(|(_, markers)| markers.iter().any(|m| lower.contains(m)))
            .map_or(Self::Stable, |(channel, _)| *channel)
    }

    #[must_use]
    pub const fn is_prerelease(self) -> bool {
        !matches!(self, Self::Stable)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
            Self::Stable => "stable",
        }
    }

    /// Suffix used in publishing commit messages.
    #[must_use]
    pub const fn release_kind(self) -> &'static str {
        if self.is_prerelease() {
            "pre-release"
        } else {
            "stable"
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated release identifier, usable as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    /// Validate `tag`.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::InvalidTag` if the tag is empty, a reserved
    /// name (`.`, `..`, `latest`), contains a path separator, whitespace or
    /// control character, or starts with `-`.
    pub fn new(tag: impl Into<String>) -> Result<Self, EvermodError> {
        let tag = tag.into();
        let invalid = |reason: &str| ReleaseError::InvalidTag {
            tag: tag.clone(),
            reason: reason.to_string(),
        };

        if tag.is_empty() {
            return Err(invalid("tag is empty").into());
        }
        if matches!(tag.as_str(), "." | ".." | "latest") {
            return Err(invalid("reserved name").into());
        }
        if tag.contains(['/', '\\']) {
            return Err(invalid("contains a path separator").into());
        }
        if tag.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("contains whitespace or control characters").into());
        }
        if tag.starts_with('-') {
            return Err(invalid("starts with '-'").into());
        }

        Ok(Self(tag))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn channel(&self) -> Channel {
        Channel::classify(&self.0)
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.channel().is_prerelease()
    }

    /// Git tag name: `prefix` + tag, unless the tag already carries the prefix.
    #[must_use]
    pub fn version_tag_name(&self, prefix: &str) -> String {
        if self.0.starts_with(prefix) {
            self.0.clone()
        } else {
            format!("{prefix}{}", self.0)
        }
    }
}

impl FromStr for ReleaseTag {
    type Err = EvermodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReleaseTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
