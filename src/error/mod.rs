// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            EvermodError (~24 bytes)
//!                     |
//!   +------+------+---+---+------+-----+----+
//!   |      |      |       |      |     |    |
//!   v      v      v       v      v     v    v
//! Auth  Release  Git   Config  Proc   Fs  Archive/Io/Other
//!  Box    Box    Box    Box    Box   Box   Box
//!
//! Sub-errors (unboxed internally):
//!   Auth     MissingPrivateKey, InvalidKey, InvalidSignature
//!   Release  MissingDirectory, NoModulesFound, ChecksumMismatch,
//!            InvalidTag, SignatureRejected, InvalidManifest
//!   Git      Gix, CommandFailed{code}, DetachedHead
//!   Config   MissingKey, InvalidValue
//!   Process  ExecutableNotFound, SpawnFailed
//!   Fs       IoError
//! ```
//!
//! Command handlers work with [`Result`] (anyhow) and attach the failing
//! step as context; [`exit_code`] recovers the typed cause for `main`.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`EvermodError`].
pub type EvermodResult<T> = std::result::Result<T, EvermodError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum EvermodError {
    /// Internal-command authorization or signing failed.
    #[error("authorization error: {0}")]
    Auth(#[from] Box<AuthError>),

    /// Release build failed.
    #[error("release error: {0}")]
    Release(#[from] Box<ReleaseError>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// Archive could not be written.
    #[error("archive error: {0}")]
    Archive(Box<zip::result::ZipError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl EvermodError {
    /// Create a [`EvermodError::Other`] from a message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into().into_boxed_str())
    }

    /// Process exit code for this error.
    ///
    /// A failed git command exits with git's own status when it fits in a
    /// process exit code; everything else exits with 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Git(git) => match git.as_ref() {
                GitError::CommandFailed {
                    code: Some(code), ..
                } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
                _ => 1,
            },
            _ => 1,
        }
    }
}

/// Map an error chain to a process exit code.
///
/// The first [`EvermodError`] found in the chain decides; untyped errors
/// exit with 1.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<EvermodError>())
        .map_or(1, EvermodError::exit_code)
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for EvermodError {
                fn from(err: $error) -> Self {
                    EvermodError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    AuthError => Auth,
    ReleaseError => Release,
    GitError => Git,
    ConfigError => Config,
    ProcessError => Process,
    FsError => Fs,
    zip::result::ZipError => Archive,
    std::io::Error => Io,
}

// --- Auth Errors ---

/// Signing-key and signature errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No private key on disk; only the release maintainer holds one.
    #[error("missing private key: {path}")]
    MissingPrivateKey { path: String },

    /// Key file exists but could not be parsed.
    #[error("invalid key '{path}': {message}")]
    InvalidKey { path: String, message: String },

    /// Self-check signature did not verify against the embedded public key.
    #[error("invalid signature for internal command '{command}'")]
    InvalidSignature { command: String },

    /// The signing primitive itself failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

// --- Release Errors ---

/// Release build and verification errors.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Required directory is absent.
    #[error("directory not found: {path}")]
    MissingDirectory { path: String },

    /// No module produced an artifact.
    #[error("no modules found under '{root}'; nothing to release")]
    NoModulesFound { root: String },

    /// Artifact bytes do not match the manifest digest.
    #[error("checksum mismatch for '{path}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// Tag cannot name a release directory.
    #[error("invalid release tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },

    /// Detached signature did not verify.
    #[error("signature rejected for '{path}'")]
    SignatureRejected { path: String },

    /// Manifest could not be read back.
    #[error("invalid manifest '{path}': {message}")]
    InvalidManifest { path: String, message: String },
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// gix has multiple error types that are converted through this enum.
/// Large error types are boxed to keep enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] gix::reference::find::existing::Error),

    /// Failed to look up a reference.
    #[error("failed to look up reference: {0}")]
    Reference(gix::reference::find::existing::Error),
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found at the specified path.
    #[error("repository not found: {path}")]
    RepoNotFound { path: String },

    /// Git command exited unsuccessfully.
    #[error("git command failed: {command} - {message}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        message: String,
    },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// HEAD does not point at a branch, so it cannot be restored later.
    #[error("HEAD is detached in {path}; check out a branch first")]
    DetachedHead { path: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Filesystem Errors ---

/// Filesystem operation errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// General I/O error.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Attach a path to an I/O error.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            source,
        }
    }
}
