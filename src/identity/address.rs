use crate::identity::PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ADDRESS_PREFIX: &str = "0x";
const ADDRESS_LEN: usize = 20;

#[derive(Error, Debug)]
pub enum AddressError {
    #[error("Address must start with '0x', got '{0}'")]
    MissingPrefix(String),

    #[error("Invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),
}

/// Account address: the trailing 20 bytes of SHA256(public key)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Derive an address from an ed25519 public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"account:");
        hasher.update(public_key.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Self(bytes)
    }

    /// Create an address from raw bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// The all-zero address, reserved as "no account"
    pub fn zero() -> Self {
        Self([0u8; ADDRESS_LEN])
    }

    /// Check whether this is the reserved zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ADDRESS_PREFIX, hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;

        let bytes = hex::decode(hex_part).map_err(|e| AddressError::InvalidHex(e.to_string()))?;

        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_LEN,
                got: bytes.len(),
            });
        }

        let mut array = [0u8; ADDRESS_LEN];
        array.copy_from_slice(&bytes);
        Ok(Self(array))
    }
}
