// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the
//! system CSPRNG. Nonce reuse would be catastrophic for GCM security.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use tradeshell_core::TradeshellError;

/// Size of the GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`. The caller must store both
/// to be able to decrypt later.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), TradeshellError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| TradeshellError::Cipher("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| TradeshellError::Cipher("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: the plaintext buffer is extended with the tag.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| TradeshellError::Cipher("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt ciphertext with AES-256-GCM.
///
/// `ciphertext` must include the 16-byte authentication tag appended by
/// [`seal`]. Fails if the key is wrong or the data is tampered; the error
/// does not say which.
pub fn open(
    key: &[u8; 32],
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, TradeshellError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| TradeshellError::Cipher("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let nonce = Nonce::assume_unique_for_key(*nonce_bytes);

    let mut in_out = ciphertext.to_vec();
    let plaintext = less_safe
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| TradeshellError::Cipher(crate::DECRYPT_FAILED.to_string()))?;

    Ok(plaintext.to_vec())
}

/// Fill `buf` with bytes from the system CSPRNG.
pub fn random_bytes(buf: &mut [u8]) -> Result<(), TradeshellError> {
    SystemRandom::new()
        .fill(buf)
        .map_err(|_| TradeshellError::Cipher("failed to generate random bytes".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        random_bytes(&mut key).unwrap();
        key
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = random_key();
        let plaintext = b"broker api secret";

        let (ciphertext, nonce) = seal(&key, plaintext).unwrap();
        let decrypted = open(&key, &nonce, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn seal_produces_different_ciphertext_for_same_plaintext() {
        let key = random_key();
        let plaintext = b"same input twice";

        let (ct1, nonce1) = seal(&key, plaintext).unwrap();
        let (ct2, nonce2) = seal(&key, plaintext).unwrap();

        assert_ne!(nonce1, nonce2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn ciphertext_is_longer_than_plaintext_by_tag() {
        let key = random_key();
        let (ciphertext, _) = seal(&key, b"hello").unwrap();
        assert_eq!(ciphertext.len(), 5 + TAG_LEN);
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let (ciphertext, nonce) = seal(&random_key(), b"secret data").unwrap();
        assert!(open(&random_key(), &nonce, &ciphertext).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let key = random_key();
        let (mut ciphertext, nonce) = seal(&key, b"do not tamper").unwrap();
        ciphertext[0] ^= 0x01;
        assert!(open(&key, &nonce, &ciphertext).is_err());
    }
}
