// LedgerStore - Persistent key-value storage using sled
//
// Provides typed access for storing:
// - The funding ledger state
// - Named account keypairs (the CLI's local identities)
// - The configured oracle quote

use crate::identity::Keypair;
use crate::ledger::{LedgerState, StateError};
use crate::oracle::PriceQuote;
use std::path::Path;
use thiserror::Error;

/// Key prefixes for organizing data
mod keys {
    pub const LEDGER_STATE: &[u8] = b"ledger:state";
    pub const KEYPAIR_PREFIX: &[u8] = b"identity:keypair:";
    pub const ORACLE_QUOTE: &[u8] = b"oracle:quote";
}

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Persistent key-value store for ledger data
///
/// Uses sled for crash-safe, embedded storage.
/// All writes are atomic and durable after flush.
pub struct LedgerStore {
    db: sled::Db,
}

impl LedgerStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db })
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.db.is_empty())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    // ========================================================================
    // RAW KEY-VALUE OPERATIONS
    // ========================================================================

    /// Put raw bytes
    pub fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    /// Get raw bytes
    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    // ========================================================================
    // LEDGER STATE PERSISTENCE
    // ========================================================================

    /// Save the ledger state
    pub fn save_state(&self, state: &LedgerState) -> Result<(), StoreError> {
        let bytes = state.to_bytes();
        self.put_raw(keys::LEDGER_STATE, &bytes)
    }

    /// Load the ledger state
    pub fn load_state(&self) -> Result<Option<LedgerState>, StoreError> {
        match self.get_raw(keys::LEDGER_STATE)? {
            Some(bytes) => {
                let state = LedgerState::from_bytes(&bytes)
                    .map_err(|e: StateError| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // IDENTITY PERSISTENCE
    // ========================================================================

    /// Save a keypair under a local name
    pub fn save_keypair(&self, name: &str, keypair: &Keypair) -> Result<(), StoreError> {
        let key = [keys::KEYPAIR_PREFIX, name.as_bytes()].concat();
        self.put_raw(&key, &keypair.to_bytes())
    }

    /// Load a keypair by local name
    pub fn load_keypair(&self, name: &str) -> Result<Option<Keypair>, StoreError> {
        let key = [keys::KEYPAIR_PREFIX, name.as_bytes()].concat();
        match self.get_raw(&key)? {
            Some(bytes) => {
                let keypair = Keypair::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(keypair))
            }
            None => Ok(None),
        }
    }

    /// List the local names of all stored keypairs
    pub fn list_keypairs(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for result in self.db.scan_prefix(keys::KEYPAIR_PREFIX) {
            let (key, _) = result?;
            let name = key[keys::KEYPAIR_PREFIX.len()..].to_vec();
            names.push(String::from_utf8_lossy(&name).into_owned());
        }
        Ok(names)
    }

    // ========================================================================
    // ORACLE CONFIGURATION
    // ========================================================================

    /// Save the configured oracle quote
    pub fn save_quote(&self, quote: &PriceQuote) -> Result<(), StoreError> {
        let bytes = postcard::to_allocvec(quote)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.put_raw(keys::ORACLE_QUOTE, &bytes)
    }

    /// Load the configured oracle quote
    pub fn load_quote(&self) -> Result<Option<PriceQuote>, StoreError> {
        match self.get_raw(keys::ORACLE_QUOTE)? {
            Some(bytes) => {
                let quote = postcard::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(quote))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_basic() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::open(temp_dir.path()).unwrap();

        store.put_raw(b"test", b"value").unwrap();
        let result = store.get_raw(b"test").unwrap();

        assert_eq!(result, Some(b"value".to_vec()));
    }

    #[test]
    fn test_store_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = LedgerStore::open(temp_dir.path()).unwrap();
            store.put_raw(b"persist", b"data").unwrap();
            store.flush().unwrap();
        }

        {
            let store = LedgerStore::open(temp_dir.path()).unwrap();
            let result = store.get_raw(b"persist").unwrap();
            assert_eq!(result, Some(b"data".to_vec()));
        }
    }
}
