//! Key derivation.
//!
//! Derives per-envelope AES-256 keys from the master key using Argon2id,
//! a deliberately slow, salted KDF. Every envelope carries its own salt,
//! so every envelope is sealed under a unique derived key even though the
//! master key is fixed for the process.

use argon2::Argon2;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Size of a derived AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Derives a 256-bit envelope key from the master key and a salt.
///
/// Deterministic for a given `(master_key, salt)` pair; the salt is what
/// makes derived keys differ between envelopes.
///
/// # Errors
///
/// Returns [`CryptoError::KeyDerivationFailed`] if the underlying KDF
/// rejects its inputs.
pub fn derive_envelope_key(
    master_key: &[u8],
    salt: &[u8],
) -> Result<Zeroizing<[u8; KEY_SIZE]>, CryptoError> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    Argon2::default()
        .hash_password_into(master_key, salt, &mut *key)
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_length() {
        let key = derive_envelope_key(b"master secret", b"0123456789abcdef").unwrap();
        assert_eq!(key.len(), KEY_SIZE);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let key1 = derive_envelope_key(b"master secret", b"0123456789abcdef").unwrap();
        let key2 = derive_envelope_key(b"master secret", b"0123456789abcdef").unwrap();
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_envelope_key(b"master secret", b"0123456789abcdef").unwrap();
        let key2 = derive_envelope_key(b"master secret", b"fedcba9876543210").unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn test_different_master_different_key() {
        let key1 = derive_envelope_key(b"master one", b"0123456789abcdef").unwrap();
        let key2 = derive_envelope_key(b"master two", b"0123456789abcdef").unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn test_short_salt_rejected() {
        let result = derive_envelope_key(b"master secret", b"ab");
        assert!(matches!(result, Err(CryptoError::KeyDerivationFailed(_))));
    }
}
