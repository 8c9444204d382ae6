//! Actor signing key loading
//!
//! The relay actor signs outbound requests with an RSA private key kept in
//! a PEM file. Both PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1
//! (`BEGIN RSA PRIVATE KEY`) encodings are accepted.

use crate::error::KeyError;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use std::path::Path;
use tracing::debug;

/// Read and parse the RSA private key at `path`
pub async fn load_actor_key(path: impl AsRef<Path>) -> Result<RsaPrivateKey, KeyError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(KeyError::MissingPath);
    }

    let pem = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| KeyError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let key = parse_private_key(&pem).map_err(|message| KeyError::Parse {
        path: path.display().to_string(),
        message,
    })?;

    debug!(path = %path.display(), "Loaded actor signing key");
    Ok(key)
}

/// Parse an RSA private key from PEM text
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, String> {
    // PKCS#8 is what current tooling emits by default
    let pkcs8_err = match RsaPrivateKey::from_pkcs8_pem(pem) {
        Ok(key) => return Ok(key),
        Err(e) => e,
    };

    RsaPrivateKey::from_pkcs1_pem(pem)
        .map_err(|pkcs1_err| format!("not PKCS#8 ({pkcs8_err}) or PKCS#1 ({pkcs1_err})"))
}
