// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! RSA key material.
//!
//! The public key is compiled into the binary; the private key lives only on
//! the release maintainer's machine.

use std::fs;
use std::io::Write;
use std::path::Path;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::debug;

use crate::error::{AuthError, EvermodResult, FsError};

/// SPKI PEM of the release verification key.
pub const EMBEDDED_PUBLIC_KEY_PEM: &str = include_str!("keys/evermod_public.pem");

/// Default modulus size for `keygen`.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Parse the embedded verification key.
///
/// # Errors
///
/// Returns `AuthError::InvalidKey` if the compiled-in PEM is malformed.
pub fn embedded_public_key() -> EvermodResult<RsaPublicKey> {
    parse_public_key(EMBEDDED_PUBLIC_KEY_PEM, "<embedded>")
}

/// Parse an SPKI PEM public key.
///
/// # Errors
///
/// Returns `AuthError::InvalidKey` if `pem` is not a valid RSA public key.
pub fn parse_public_key(pem: &str, origin: &str) -> EvermodResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| {
        AuthError::InvalidKey {
            path: origin.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Load the maintainer private key (PKCS#8 or PKCS#1 PEM).
///
/// # Errors
///
/// Returns `AuthError::MissingPrivateKey` if no file exists at `path`, and
/// `AuthError::InvalidKey` if it cannot be parsed as either format.
pub fn load_private_key(path: &Path) -> EvermodResult<RsaPrivateKey> {
    if !path.is_file() {
        return Err(AuthError::MissingPrivateKey {
            path: path.display().to_string(),
        }
        .into());
    }

    let pem = fs::read_to_string(path).map_err(|e| FsError::io(path, e))?;
    RsaPrivateKey::from_pkcs8_pem(&pem)
        .or_else(|pkcs8_err| {
            debug!(path = %path.display(), "not PKCS#8 ({pkcs8_err}), trying PKCS#1");
            RsaPrivateKey::from_pkcs1_pem(&pem)
        })
        .map_err(|e| {
            AuthError::InvalidKey {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

/// Generate a fresh key pair.
///
/// # Errors
///
/// Returns `AuthError::SigningFailed` if the modulus size is rejected.
pub fn generate_key_pair(bits: usize) -> EvermodResult<(RsaPrivateKey, RsaPublicKey)> {
    let private_key = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| AuthError::SigningFailed(format!("key generation failed: {e}")))?;
    let public_key = RsaPublicKey::from(&private_key);
    Ok((private_key, public_key))
}

/// Write `key` as PKCS#8 PEM, readable by the owner only on unix.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn write_private_key(key: &RsaPrivateKey, path: &Path) -> EvermodResult<()> {
    let pem = key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| AuthError::SigningFailed(format!("failed to encode private key: {e}")))?;

    create_parent(path)?;
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(|e| FsError::io(path, e))?;
    file.write_all(pem.as_bytes())
        .map_err(|e| FsError::io(path, e))?;
    Ok(())
}

/// Write `key` as SPKI PEM.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn write_public_key(key: &RsaPublicKey, path: &Path) -> EvermodResult<()> {
    let pem = key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| AuthError::SigningFailed(format!("failed to encode public key: {e}")))?;
    create_parent(path)?;
    fs::write(path, pem).map_err(|e| FsError::io(path, e))?;
    Ok(())
}

fn create_parent(path: &Path) -> EvermodResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
    }
    Ok(())
}
