// Identity module - accounts are ed25519 keypairs hashed down to 20-byte addresses

mod address;
mod keypair;

pub use address::{Address, AddressError};
pub use keypair::{Keypair, KeypairError, PublicKey};
