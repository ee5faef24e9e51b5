use crate::identity::Address;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeypairError {
    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Invalid key bytes: {0}")]
    InvalidBytes(String),
}

/// Ed25519 public key (32 bytes)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Get the raw bytes of the public key
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Create a public key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        if bytes.len() != 32 {
            return Err(KeypairError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            });
        }

        let bytes_array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| KeypairError::InvalidBytes("Failed to convert to array".into()))?;

        let verifying_key = VerifyingKey::from_bytes(&bytes_array)
            .map_err(|e| KeypairError::InvalidBytes(e.to_string()))?;

        Ok(Self(verifying_key))
    }
}

/// Ed25519 keypair backing a ledger account
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Get the public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }

    /// Get the ledger address for this keypair
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key())
    }

    /// Serialize the keypair to bytes (secret key seed)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }

    /// Deserialize a keypair from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        if bytes.len() != 32 {
            return Err(KeypairError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            });
        }

        let bytes_array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| KeypairError::InvalidBytes("Failed to convert to array".into()))?;

        let signing_key = SigningKey::from_bytes(&bytes_array);
        Ok(Self { signing_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keypair() {
        let kp = Keypair::generate();
        assert_eq!(kp.public_key().as_bytes().len(), 32);
    }

    #[test]
    fn test_keypair_bytes_roundtrip() {
        let kp = Keypair::generate();
        let restored = Keypair::from_bytes(&kp.to_bytes()).unwrap();
        assert_eq!(kp.address(), restored.address());
    }
}
