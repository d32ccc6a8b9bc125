// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from the master secret.
//!
//! Derives a 32-byte key using Argon2id (Version::V0x13). Parameters are
//! fixed at compile time so that any blob ever written stays decryptable
//! without embedding parameters in the blob itself.

use zeroize::Zeroizing;

use tradeshell_core::TradeshellError;

/// Size of the per-blob random salt.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Iteration count.
    pub iterations: u32,
    /// Parallelism lanes.
    pub parallelism: u32,
}

/// Production parameters (OWASP-recommended: 64 MiB, 3 passes).
pub const DEFAULT_PARAMS: KdfParams = KdfParams {
    memory_cost: 65536,
    iterations: 3,
    parallelism: 1,
};

/// Reduced-cost profile for tests. Never use outside test code.
pub const FAST_PARAMS: KdfParams = KdfParams {
    memory_cost: 4096,
    iterations: 1,
    parallelism: 1,
};

/// Derive a 32-byte key from the master secret using Argon2id.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_key(
    master_secret: &[u8],
    salt: &[u8; SALT_LEN],
    params: KdfParams,
) -> Result<Zeroizing<[u8; 32]>, TradeshellError> {
    let argon_params =
        argon2::Params::new(params.memory_cost, params.iterations, params.parallelism, Some(32))
            .map_err(|e| TradeshellError::Cipher(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(master_secret, salt, output.as_mut())
        .map_err(|e| TradeshellError::Cipher(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a fresh random salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], TradeshellError> {
    let mut salt = [0u8; SALT_LEN];
    crate::aead::random_bytes(&mut salt)?;
    Ok(salt)
}
