//! Local storage of the settings protection key
//!
//! The key is kept as Base64 in a file next to the deployment. Losing the
//! file makes every secret setting unreadable.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use ca_core::services::protection::{AesGcmSecretProtector, PROTECTION_KEY_LEN};

use crate::InfrastructureError;

/// Read the protection key at `path`, creating it if the file is absent
///
/// New files are created with mode 0600 on unix.
pub fn load_or_create_key(path: impl AsRef<Path>) -> Result<Vec<u8>, InfrastructureError> {
    let path = path.as_ref();

    match fs::read_to_string(path) {
        Ok(encoded) => decode_key(&encoded, path),
        Err(e) if e.kind() == ErrorKind::NotFound => create_key(path),
        Err(e) => Err(InfrastructureError::Io(e)),
    }
}

fn decode_key(encoded: &str, path: &Path) -> Result<Vec<u8>, InfrastructureError> {
    let key = BASE64.decode(encoded.trim()).map_err(|_| {
        InfrastructureError::Config(format!("Protection key {} is not valid Base64", path.display()))
    })?;

    if key.len() != PROTECTION_KEY_LEN {
        return Err(InfrastructureError::Config(format!(
            "Protection key {} must be {} bytes",
            path.display(),
            PROTECTION_KEY_LEN
        )));
    }

    Ok(key)
}

fn create_key(path: &Path) -> Result<Vec<u8>, InfrastructureError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let key = AesGcmSecretProtector::generate_key();

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = match options.open(path) {
        Ok(file) => file,
        // another process created it first
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return load_or_create_key(path);
        }
        Err(e) => return Err(InfrastructureError::Io(e)),
    };
    file.write_all(BASE64.encode(&key).as_bytes())?;
    file.sync_all()?;

    tracing::info!("Created settings protection key at {}", path.display());

    Ok(key)
}
