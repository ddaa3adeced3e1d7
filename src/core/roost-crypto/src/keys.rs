//! Master key handling with automatic memory zeroization.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// The process-wide master key all envelopes are derived from.
///
/// Accepts passphrase-grade material of any non-zero length; the key is
/// never used directly for encryption, only as KDF input. The bytes are
/// securely erased from memory when the key is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Creates a master key from secret material.
    ///
    /// # Errors
    ///
    /// Returns an error if the material is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = secret.into();
        if bytes.is_empty() {
            return Err(CryptoError::InvalidKey("master key cannot be empty".into()));
        }
        Ok(Self { bytes })
    }

    /// Returns the raw key bytes.
    ///
    /// Use with caution - the returned slice is not zeroized automatically.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
