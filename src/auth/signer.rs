// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Detached RSA-PKCS1v15/SHA-256 signatures, base64 encoded.
//!
//! ```text
//! sign(file)        private key --> <file>.sig (base64)
//! verify(file, sig) public key  --> bool (never an error)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use rsa::RsaPublicKey;
use sha2::Sha256;
use tracing::debug;

use super::keys::{embedded_public_key, load_private_key};
use crate::error::{AuthError, EvermodResult, FsError};

/// Extension appended to a signed file's name.
pub const SIGNATURE_EXTENSION: &str = "sig";

/// Signs with the maintainer key and verifies with the release key.
#[derive(Debug, Clone)]
pub struct Signer {
    public_key: RsaPublicKey,
    private_key_path: PathBuf,
}

impl Signer {
    #[must_use]
    pub fn new(public_key: RsaPublicKey, private_key_path: impl Into<PathBuf>) -> Self {
        Self {
            public_key,
            private_key_path: private_key_path.into(),
        }
    }

    /// Signer verifying against the key compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidKey` if the embedded key does not parse.
    pub fn with_embedded_key(private_key_path: impl Into<PathBuf>) -> EvermodResult<Self> {
        Ok(Self::new(embedded_public_key()?, private_key_path))
    }

    #[must_use]
    pub fn private_key_path(&self) -> &Path {
        &self.private_key_path
    }

    /// `<file>.sig`
    #[must_use]
    pub fn signature_path(file: &Path) -> PathBuf {
        let mut name = file.as_os_str().to_owned();
        name.push(".");
        name.push(SIGNATURE_EXTENSION);
        PathBuf::from(name)
    }

    /// Sign `message`, returning the base64 signature.
    ///
    /// The private key is read from disk on every call.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingPrivateKey` or `AuthError::InvalidKey` if
    /// the key cannot be loaded, `AuthError::SigningFailed` if signing fails.
    pub fn sign_message(&self, message: &[u8]) -> EvermodResult<String> {
        let key = load_private_key(&self.private_key_path)?;
        let signing_key = SigningKey::<Sha256>::new(key);
        let signature = signing_key
            .try_sign(message)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }

    /// Check a base64 signature over `message`.
    #[must_use]
    pub fn verify_message(&self, message: &[u8], signature_b64: &str) -> bool {
        let bytes = match STANDARD.decode(signature_b64.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("signature is not valid base64: {e}");
                return false;
            }
        };
        let signature = match Signature::try_from(bytes.as_slice()) {
            Ok(signature) => signature,
            Err(e) => {
                debug!("malformed signature: {e}");
                return false;
            }
        };
        let verifying_key = VerifyingKey::<Sha256>::new(self.public_key.clone());
        match verifying_key.verify(message, &signature) {
            Ok(()) => true,
            Err(e) => {
                debug!("signature verification failed: {e}");
                false
            }
        }
    }

    /// Sign the contents of `file` into `<file>.sig`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingPrivateKey` when no key is present, or an
    /// I/O error if `file` cannot be read or the signature written.
    pub fn sign(&self, file: &Path) -> EvermodResult<PathBuf> {
        let data = fs::read(file).map_err(|e| FsError::io(file, e))?;
        let signature = self.sign_message(&data)?;
        let sig_path = Self::signature_path(file);
        fs::write(&sig_path, signature).map_err(|e| FsError::io(&sig_path, e))?;
        debug!(file = %file.display(), sig = %sig_path.display(), "signed");
        Ok(sig_path)
    }

    /// Check `sig_path` against the contents of `file`.
    ///
    /// Any failure (unreadable files, malformed signature, wrong key) is
    /// reported as `false`.
    #[must_use]
    pub fn verify(&self, file: &Path, sig_path: &Path) -> bool {
        let data = match fs::read(file) {
            Ok(data) => data,
            Err(e) => {
                debug!(file = %file.display(), "cannot read signed file: {e}");
                return false;
            }
        };
        let signature = match fs::read_to_string(sig_path) {
            Ok(signature) => signature,
            Err(e) => {
                debug!(sig = %sig_path.display(), "cannot read signature: {e}");
                return false;
            }
        };
        self.verify_message(&data, &signature)
    }
}
