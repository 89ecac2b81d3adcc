use std::fs;
use std::path::Path;

use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use thiserror::Error;

/// Error type for key loading.
#[derive(Debug, Clone, Error)]
pub enum KeyError {
    #[error("Could not read key file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Invalid EC private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid EC public key: {0}")]
    InvalidPublicKey(String),
}

/// EC P-256 key pair used for ES256 tokens.
///
/// The private half is PKCS#8 PEM (`BEGIN PRIVATE KEY`), the public half is
/// SubjectPublicKeyInfo PEM (`BEGIN PUBLIC KEY`).
pub struct EcKeyPair {
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

impl EcKeyPair {
    /// Build a key pair from in-memory PEM documents.
    ///
    /// # Errors
    /// * `InvalidPrivateKey` - Private PEM is not an EC key
    /// * `InvalidPublicKey` - Public PEM is not an EC key
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, KeyError> {
        let encoding = EncodingKey::from_ec_pem(private_pem)
            .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        let decoding = DecodingKey::from_ec_pem(public_pem)
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;

        Ok(Self { encoding, decoding })
    }

    /// Read and parse both PEM files.
    ///
    /// # Errors
    /// * `Unreadable` - Either file could not be read
    /// * `InvalidPrivateKey` / `InvalidPublicKey` - Content is not an EC key
    pub fn from_files(
        private_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
    ) -> Result<Self, KeyError> {
        let private_pem = read_pem(private_path.as_ref())?;
        let public_pem = read_pem(public_path.as_ref())?;
        Self::from_pem(&private_pem, &public_pem)
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, KeyError> {
    fs::read(path).map_err(|e| KeyError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
