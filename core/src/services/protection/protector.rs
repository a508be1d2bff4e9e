//! Secret protector using AES-256-GCM

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::errors::{DomainError, DomainResult};

/// Length of the protection key in bytes (AES-256)
pub const PROTECTION_KEY_LEN: usize = 32;

const NONCE_LEN: usize = 12;

/// Protect/unprotect arbitrary strings
///
/// Used for the JWT signing secret and any other setting flagged secret.
pub trait SecretProtector: Send + Sync {
    /// Encrypt a plaintext value into an opaque string
    fn protect(&self, plaintext: &str) -> DomainResult<String>;

    /// Recover the plaintext of a value produced by `protect`
    fn unprotect(&self, protected: &str) -> DomainResult<String>;
}

/// AES-GCM based secret protector
///
/// Output format is `Base64(nonce || ciphertext)` with a fresh 96-bit nonce
/// per call.
#[derive(Clone)]
pub struct AesGcmSecretProtector {
    cipher: Aes256Gcm,
}

impl AesGcmSecretProtector {
    /// Create a protector from a raw 256-bit key
    pub fn new(key: &[u8]) -> DomainResult<Self> {
        if key.len() != PROTECTION_KEY_LEN {
            return Err(DomainError::configuration(
                "Protection key must be 32 bytes (256 bits)",
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| DomainError::configuration("Invalid protection key"))?;

        Ok(Self { cipher })
    }

    /// Generate a new random protection key
    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0u8; PROTECTION_KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    fn generate_nonce() -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }

    fn unprotect_failed() -> DomainError {
        DomainError::configuration("secret could not be unprotected")
    }
}

impl std::fmt::Debug for AesGcmSecretProtector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmSecretProtector").finish_non_exhaustive()
    }
}

impl SecretProtector for AesGcmSecretProtector {
    fn protect(&self, plaintext: &str) -> DomainResult<String> {
        let nonce = Self::generate_nonce();

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| DomainError::internal(format!("Encryption failed: {}", e)))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(payload))
    }

    fn unprotect(&self, protected: &str) -> DomainResult<String> {
        let payload = BASE64
            .decode(protected.trim())
            .map_err(|_| Self::unprotect_failed())?;

        if payload.len() <= NONCE_LEN {
            return Err(Self::unprotect_failed());
        }

        let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| Self::unprotect_failed())?;

        String::from_utf8(plaintext).map_err(|_| Self::unprotect_failed())
    }
}
