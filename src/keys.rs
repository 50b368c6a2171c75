//! Private key loading with ordered algorithm detection.
//!
//! A key file is decoded by trying every supported algorithm in a fixed
//! order and returning the first success. When all decoders reject the
//! file the failure is reported as a single [`KeyLoadError`] that names
//! each attempted algorithm and its individual reason.

use std::fmt;
use std::fs;
use std::path::Path;

use ssh_key::{Algorithm, PrivateKey};

use crate::error::KeyLoadError;

/// Supported private-key algorithms, in attempt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// RSA keys.
    Rsa,
    /// ECDSA keys (NIST P-256/P-384/P-521 curves).
    Ecdsa,
    /// Ed25519 keys.
    Ed25519,
    /// Legacy DSA keys.
    Dsa,
}

impl KeyAlgorithm {
    /// Decoders are attempted in this order; the first match wins.
    pub const ATTEMPT_ORDER: [KeyAlgorithm; 4] = [
        KeyAlgorithm::Rsa,
        KeyAlgorithm::Ecdsa,
        KeyAlgorithm::Ed25519,
        KeyAlgorithm::Dsa,
    ];

    /// Attempt to decode `contents` as a key of this algorithm.
    fn decode(&self, contents: &str) -> Result<(), String> {
        let key = PrivateKey::from_openssh(contents).map_err(|e| e.to_string())?;
        if key.is_encrypted() {
            return Err("private key file is encrypted (passphrase not supported)".to_string());
        }
        if self.matches(key.algorithm()) {
            Ok(())
        } else {
            Err(format!("not a {} key (found {})", self, key.algorithm()))
        }
    }

    fn matches(&self, algorithm: Algorithm) -> bool {
        matches!(
            (self, algorithm),
            (KeyAlgorithm::Rsa, Algorithm::Rsa { .. })
                | (KeyAlgorithm::Ecdsa, Algorithm::Ecdsa { .. })
                | (KeyAlgorithm::Ed25519, Algorithm::Ed25519)
                | (KeyAlgorithm::Dsa, Algorithm::Dsa)
        )
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Ecdsa => "ECDSA",
            KeyAlgorithm::Ed25519 => "Ed25519",
            KeyAlgorithm::Dsa => "DSA",
        };
        write!(f, "{}", name)
    }
}

/// A successfully decoded private key.
///
/// Keeps the raw file contents for the transport layer (libssh2 parses the
/// key material itself during authentication) alongside the detected
/// algorithm for diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedKey {
    algorithm: KeyAlgorithm,
    contents: String,
}

impl LoadedKey {
    /// The algorithm that decoded the key.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Raw key file contents, as read from disk.
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// Load a private key file, trying every supported algorithm in order.
///
/// Returns the first successful decode, or a [`KeyLoadError`] enumerating
/// every attempted algorithm and its failure reason.
pub fn load_private_key(path: &Path) -> Result<LoadedKey, KeyLoadError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            // Unreadable file: every decoder would have failed the same way.
            return Err(KeyLoadError {
                path: path.to_path_buf(),
                attempts: KeyAlgorithm::ATTEMPT_ORDER
                    .iter()
                    .map(|algorithm| (*algorithm, err.to_string()))
                    .collect(),
            });
        }
    };

    let mut attempts = Vec::new();
    for algorithm in KeyAlgorithm::ATTEMPT_ORDER {
        match algorithm.decode(&contents) {
            Ok(()) => {
                tracing::debug!("loaded {} private key from {}", algorithm, path.display());
                return Ok(LoadedKey {
                    algorithm,
                    contents,
                });
            }
            Err(reason) => attempts.push((algorithm, reason)),
        }
    }

    Err(KeyLoadError {
        path: path.to_path_buf(),
        attempts,
    })
}
