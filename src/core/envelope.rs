//! Cipher Envelope
//!
//! Authenticated encryption of opaque text blobs with AES-256-GCM.
//!
//! Wire format: `iv_hex:tag_hex:ciphertext_hex`
//!
//! - IV: 16 random bytes per seal
//! - Tag: 16-byte GCM authentication tag
//! - Key: scrypt(secret, "salt", N=2^14, r=8, p=1) -> 32 bytes
//!
//! Opening fails closed. A malformed envelope is a [`EnvelopeError::Format`],
//! a tag that does not verify is [`EnvelopeError::Authentication`]. No partial
//! plaintext is ever returned.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use rand::RngCore;
use thiserror::Error;

/// AES-256-GCM with a 16-byte nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// IV length in bytes.
pub const IV_LEN: usize = 16;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;

/// Fixed KDF salt. Same secret always yields the same key.
const KDF_SALT: &[u8] = b"salt";

/// scrypt cost parameter (log2 N).
const KDF_LOG_N: u8 = 14;
const KDF_R: u32 = 8;
const KDF_P: u32 = 1;

/// Field delimiter.
const DELIMITER: char = ':';

/// Envelope errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// A field is absent or not decodable.
    #[error("invalid envelope format")]
    Format,
    /// Tag verification failed.
    #[error("envelope authentication failed")]
    Authentication,
    /// Encryption backend failure.
    #[error("encryption failed")]
    Encryption,
    /// Key derivation failure.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Derive the envelope key from a configured secret.
pub fn derive_key(secret: &str) -> Result<[u8; KEY_LEN], EnvelopeError> {
    let params = scrypt::Params::new(KDF_LOG_N, KDF_R, KDF_P, KEY_LEN)
        .map_err(|e| EnvelopeError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(secret.as_bytes(), KDF_SALT, &params, &mut key)
        .map_err(|e| EnvelopeError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Seals and opens envelopes under one derived key.
///
/// The key is derived once at construction and reused for every call.
#[derive(Clone)]
pub struct CipherEnvelope {
    cipher: Aes256Gcm16,
}

impl CipherEnvelope {
    /// Create an envelope cipher from the configured secret.
    pub fn new(secret: &str) -> Result<Self, EnvelopeError> {
        let key = derive_key(secret)?;
        Self::from_key(&key)
    }

    /// Create an envelope cipher from an already-derived key.
    pub fn from_key(key: &[u8; KEY_LEN]) -> Result<Self, EnvelopeError> {
        let cipher = Aes256Gcm16::new_from_slice(key)
            .map_err(|e| EnvelopeError::KeyDerivation(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` under a fresh IV.
    pub fn seal(&self, plaintext: &str) -> Result<String, EnvelopeError> {
        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| EnvelopeError::Encryption)?;

        Ok(format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            hex::encode(iv),
            hex::encode(tag),
            hex::encode(buffer)
        ))
    }

    /// Decrypt an envelope produced by [`CipherEnvelope::seal`].
    pub fn open(&self, envelope: &str) -> Result<String, EnvelopeError> {
        let mut parts = envelope.splitn(3, DELIMITER);
        let (iv_hex, tag_hex, ciphertext_hex) = match (parts.next(), parts.next(), parts.next()) {
            (Some(iv), Some(tag), Some(ct)) if !iv.is_empty() && !tag.is_empty() && !ct.is_empty() => {
                (iv, tag, ct)
            }
            _ => return Err(EnvelopeError::Format),
        };

        let iv = decode_exact(iv_hex, IV_LEN)?;
        let tag = decode_exact(tag_hex, TAG_LEN)?;
        let mut buffer = hex::decode(ciphertext_hex).map_err(|_| EnvelopeError::Format)?;

        self.cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(&iv),
                b"",
                &mut buffer,
                GenericArray::from_slice(&tag),
            )
            .map_err(|_| EnvelopeError::Authentication)?;

        String::from_utf8(buffer).map_err(|_| EnvelopeError::Format)
    }
}

impl std::fmt::Debug for CipherEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherEnvelope").finish_non_exhaustive()
    }
}

/// Hex-decode a field that must be exactly `len` bytes.
fn decode_exact(field: &str, len: usize) -> Result<Vec<u8>, EnvelopeError> {
    let bytes = hex::decode(field).map_err(|_| EnvelopeError::Format)?;
    if bytes.len() != len {
        return Err(EnvelopeError::Format);
    }
    Ok(bytes)
}

// =============================================================================
// TESTS
// =============================================================================
