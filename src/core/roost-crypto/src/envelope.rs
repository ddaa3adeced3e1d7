//! AES-256-GCM envelope encryption.
//!
//! Every secret is sealed into a self-describing envelope:
//!
//! ```text
//! base64( salt (16 bytes) || iv (12 bytes) || tag (16 bytes) || ciphertext )
//! ```
//!
//! The salt feeds key derivation, so each envelope is sealed under its own
//! derived key. Both salt and IV are drawn fresh from the OS CSPRNG on
//! every call: encrypting the same plaintext twice never yields the same
//! envelope.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;
use crate::kdf;
use crate::keys::MasterKey;
use crate::random;

/// Size of the key-derivation salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Size of a GCM IV in bytes.
pub const IV_SIZE: usize = 12;

/// Size of a GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Smallest structurally valid envelope: header plus one ciphertext byte.
pub const MIN_ENVELOPE_SIZE: usize = SALT_SIZE + IV_SIZE + TAG_SIZE + 1;

/// Envelope encryption engine bound to a master key.
///
/// All operations are synchronous and CPU-bound. The engine holds no
/// mutable state; it is safe to share behind an `Arc` or clone per
/// consumer.
#[derive(Clone)]
pub struct EncryptionEngine {
    master_key: MasterKey,
}

impl EncryptionEngine {
    /// Creates an engine sealing and opening envelopes under `master_key`.
    pub fn new(master_key: MasterKey) -> Self {
        Self { master_key }
    }

    /// Encrypts a plaintext secret into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidInput`] for empty plaintext,
    /// [`CryptoError::KeyDerivationFailed`] or
    /// [`CryptoError::EncryptionFailed`] if the underlying primitives fail.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        if plaintext.is_empty() {
            return Err(CryptoError::InvalidInput(
                "plaintext cannot be empty".to_string(),
            ));
        }

        let salt = random::generate_salt();
        let iv = random::generate_iv();
        let key = kdf::derive_envelope_key(self.master_key.as_bytes(), &salt)?;

        let cipher = Aes256Gcm::new_from_slice(&*key)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        // AEAD output is ciphertext || tag; the envelope wants the tag first.
        let mut sealed = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed("AEAD seal failed".to_string()))?;
        let tag = sealed.split_off(sealed.len() - TAG_SIZE);

        let mut envelope = Vec::with_capacity(SALT_SIZE + IV_SIZE + TAG_SIZE + sealed.len());
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&iv);
        envelope.extend_from_slice(&tag);
        envelope.extend_from_slice(&sealed);

        Ok(BASE64.encode(envelope))
    }

    /// Decrypts an envelope back into the plaintext secret.
    ///
    /// The plaintext is returned wrapped in `Zeroizing` so it is erased
    /// from memory once the caller drops it.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidFormat`] if the input is not base64 or
    /// is shorter than a minimal envelope; this check runs before any key
    /// derivation. Every later failure surfaces as the detail-free
    /// [`CryptoError::DecryptionFailed`].
    pub fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>, CryptoError> {
        let envelope = decode_envelope(ciphertext)?;

        let salt = &envelope[..SALT_SIZE];
        let iv = &envelope[SALT_SIZE..SALT_SIZE + IV_SIZE];
        let tag = &envelope[SALT_SIZE + IV_SIZE..SALT_SIZE + IV_SIZE + TAG_SIZE];
        let data = &envelope[SALT_SIZE + IV_SIZE + TAG_SIZE..];

        let key = kdf::derive_envelope_key(self.master_key.as_bytes(), salt)
            .map_err(|_| CryptoError::DecryptionFailed)?;
        let cipher =
            Aes256Gcm::new_from_slice(&*key).map_err(|_| CryptoError::DecryptionFailed)?;

        // Reassemble ciphertext || tag for the AEAD open.
        let mut sealed = Vec::with_capacity(data.len() + TAG_SIZE);
        sealed.extend_from_slice(data);
        sealed.extend_from_slice(tag);

        let plaintext = cipher
            .decrypt(Nonce::from_slice(iv), sealed.as_slice())
            .map_err(|_| CryptoError::DecryptionFailed)?;

        match String::from_utf8(plaintext) {
            Ok(text) => Ok(Zeroizing::new(text)),
            Err(e) => {
                let mut bytes = e.into_bytes();
                bytes.zeroize();
                Err(CryptoError::DecryptionFailed)
            }
        }
    }

    /// Checks whether a string is a structurally valid envelope.
    ///
    /// Decodes and checks the minimum length only; no decryption is
    /// attempted and no error is raised.
    pub fn is_valid_ciphertext(&self, ciphertext: &str) -> bool {
        decode_envelope(ciphertext).is_ok()
    }

    /// Re-encrypts an envelope under a new master key.
    ///
    /// Decrypts under this engine's key and seals the recovered plaintext
    /// with a fresh engine built from `new_master_key`. The plaintext only
    /// exists in zeroized memory in between; nothing is persisted.
    pub fn rotate_master_key(
        &self,
        ciphertext: &str,
        new_master_key: MasterKey,
    ) -> Result<String, CryptoError> {
        let plaintext = self.decrypt(ciphertext)?;
        EncryptionEngine::new(new_master_key).encrypt(&plaintext)
    }
}

/// Decodes an envelope and validates its minimum length.
fn decode_envelope(ciphertext: &str) -> Result<Vec<u8>, CryptoError> {
    let bytes = BASE64
        .decode(ciphertext)
        .map_err(|_| CryptoError::InvalidFormat)?;
    if bytes.len() < MIN_ENVELOPE_SIZE {
        return Err(CryptoError::InvalidFormat);
    }
    Ok(bytes)
}
