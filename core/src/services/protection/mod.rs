//! Symmetric protection of secret settings at rest

mod protector;

pub use protector::{AesGcmSecretProtector, SecretProtector, PROTECTION_KEY_LEN};
