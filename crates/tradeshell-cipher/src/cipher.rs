// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The credential cipher: self-contained encryption of short secret strings.
//!
//! Blob layout (before base64): `salt(16) ‖ nonce(12) ‖ ciphertext+tag`.
//! Each call derives a fresh key from the master secret and a random salt,
//! so neither keys, salts, nor nonces are ever reused across blobs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use tradeshell_config::CipherConfig;
use tradeshell_core::TradeshellError;

use crate::aead;
use crate::kdf::{self, KdfParams, SALT_LEN};

/// Uniform decryption failure message. Wrong key, malformed blob, and
/// tampered ciphertext are indistinguishable by design.
pub const DECRYPT_FAILED: &str = "invalid key or corrupted data";

/// Encrypts and decrypts stored credentials under a process-wide master
/// secret.
///
/// One instance is constructed by the composition root and shared; it holds
/// no mutable state. Debug output omits the master secret.
pub struct CredentialCipher {
    master_secret: SecretString,
    params: KdfParams,
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("master_secret", &"[REDACTED]")
            .finish()
    }
}

impl CredentialCipher {
    /// Create a cipher with the production KDF parameters.
    pub fn new(master_secret: SecretString) -> Self {
        Self {
            master_secret,
            params: kdf::DEFAULT_PARAMS,
        }
    }

    /// Create a cipher from configuration.
    ///
    /// A missing master secret is a fatal configuration error; there is no
    /// built-in fallback secret.
    pub fn from_config(config: &CipherConfig) -> Result<Self, TradeshellError> {
        let secret = config.master_secret.clone().ok_or_else(|| {
            TradeshellError::Config(
                "cipher.master_secret is not set -- supply it via \
                 TRADESHELL_CIPHER_MASTER_SECRET or the config file"
                    .to_string(),
            )
        })?;
        Ok(Self::new(SecretString::from(secret)))
    }

    /// Create a cipher with a reduced-cost KDF profile. Test use only.
    pub fn with_fast_kdf(master_secret: SecretString) -> Self {
        Self {
            master_secret,
            params: kdf::FAST_PARAMS,
        }
    }

    /// Encrypt a plaintext string into a self-contained base64 blob.
    ///
    /// Empty plaintext is allowed. Two calls on the same input never produce
    /// the same blob.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, TradeshellError> {
        let salt = kdf::generate_salt()?;
        let key = kdf::derive_key(
            self.master_secret.expose_secret().as_bytes(),
            &salt,
            self.params,
        )?;

        let (ciphertext, nonce) = aead::seal(&key, plaintext.as_bytes())?;

        let mut blob = Vec::with_capacity(SALT_LEN + aead::NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// Every failure mode surfaces the same [`DECRYPT_FAILED`] message.
    pub fn decrypt(&self, blob: &str) -> Result<String, TradeshellError> {
        let raw = BASE64
            .decode(blob)
            .map_err(|_| TradeshellError::Cipher(DECRYPT_FAILED.to_string()))?;

        // Shortest valid blob carries an empty plaintext plus the tag.
        if raw.len() < SALT_LEN + aead::NONCE_LEN + aead::TAG_LEN {
            return Err(TradeshellError::Cipher(DECRYPT_FAILED.to_string()));
        }

        let salt: [u8; SALT_LEN] = raw[..SALT_LEN]
            .try_into()
            .map_err(|_| TradeshellError::Cipher(DECRYPT_FAILED.to_string()))?;
        let nonce: [u8; aead::NONCE_LEN] = raw[SALT_LEN..SALT_LEN + aead::NONCE_LEN]
            .try_into()
            .map_err(|_| TradeshellError::Cipher(DECRYPT_FAILED.to_string()))?;
        let ciphertext = &raw[SALT_LEN + aead::NONCE_LEN..];

        let key = kdf::derive_key(
            self.master_secret.expose_secret().as_bytes(),
            &salt,
            self.params,
        )?;

        let plaintext = aead::open(&key, &nonce, ciphertext)?;
        String::from_utf8(plaintext)
            .map_err(|_| TradeshellError::Cipher(DECRYPT_FAILED.to_string()))
    }

    /// One-way SHA-256 fingerprint, hex-encoded.
    pub fn hash(&self, data: &str) -> String {
        hex::encode(Sha256::digest(data.as_bytes()))
    }

    /// Verify data against a fingerprint produced by [`hash`](Self::hash).
    pub fn verify_hash(&self, data: &str, digest: &str) -> bool {
        self.hash(data) == digest
    }
}
