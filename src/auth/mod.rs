// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release signing and the internal-command gate.
//!
//! ```text
//! Authenticator::authorize("release:1.2.0")
//!      |
//!      v
//! Signer.sign_message("evermod:release:1.2.0")   private key (disk)
//!      |
//!      v
//! Signer.verify_message(..)                      public key (embedded)
//!      |
//!      +-- true  --> Ok(())
//!      '-- false --> AuthError::InvalidSignature
//! ```

pub mod keys;
pub mod signer;


use tracing::debug;

use crate::error::{AuthError, EvermodResult};

pub use signer::Signer;

/// Prefix bound into every internal command token.
pub const TOKEN_NAMESPACE: &str = "evermod:";

/// Gates internal commands on possession of the release private key.
#[derive(Debug, Clone, Copy)]
pub struct Authenticator<'a> {
    signer: &'a Signer,
}

impl<'a> Authenticator<'a> {
    #[must_use]
    pub const fn new(signer: &'a Signer) -> Self {
        Self { signer }
    }

    /// Token authorizing a release of `tag`.
    #[must_use]
    pub fn release_token(tag: &str) -> String {
        format!("release:{tag}")
    }

    /// Prove the caller can sign `command_token` with a key the embedded
    /// public key accepts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingPrivateKey` when no private key is present,
    /// `AuthError::InvalidKey` when it cannot be parsed, and
    /// `AuthError::InvalidSignature` when it does not match the public key.
    pub fn authorize(&self, command_token: &str) -> EvermodResult<()> {
        let message = format!("{TOKEN_NAMESPACE}{command_token}");
        let signature = self.signer.sign_message(message.as_bytes())?;
        if !self.signer.verify_message(message.as_bytes(), &signature) {
            return Err(AuthError::InvalidSignature {
                command: command_token.to_string(),
            }
            .into());
        }
        debug!(command = command_token, "internal command authorized");
        Ok(())
    }
}
