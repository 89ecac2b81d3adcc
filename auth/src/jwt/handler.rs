use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;
use crate::keys::EcKeyPair;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type. Signs with ES256 (ECDSA P-256 / SHA-256)
/// and only ever accepts ES256 on verification, so a token whose header names
/// any other algorithm is rejected before its signature is looked at.
pub struct JwtHandler {
    keys: EcKeyPair,
    issuer: String,
    algorithm: Algorithm,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler.
    ///
    /// # Arguments
    /// * `keys` - EC key pair (private key signs, public key verifies)
    /// * `issuer` - Expected `iss` claim on every verified token
    ///
    /// # Returns
    /// JwtHandler instance configured with ES256
    pub fn new(keys: EcKeyPair, issuer: &str) -> Self {
        let algorithm = Algorithm::ES256;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            keys,
            issuer: issuer.to_string(),
            algorithm,
            validation,
        }
    }

    /// Issuer stamped on and expected from tokens.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Encode claims into a signed JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Serialization or signing failed (e.g. malformed key)
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.keys.encoding)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT.
    ///
    /// Checks algorithm, signature, issuer and expiry.
    ///
    /// # Errors
    /// * `AlgorithmMismatch` - Header algorithm is not ES256
    /// * `InvalidSignature` - Signature does not verify against the public key
    /// * `TokenExpired` - `exp` is in the past
    /// * `DecodingFailed` - Token is structurally malformed
    /// * `InvalidToken` - Any other validation failure (issuer, missing claims)
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let token_data = decode::<T>(token, &self.keys.decoding, &self.validation)?;
        Ok(token_data.claims)
    }
}
