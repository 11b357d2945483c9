//! secp256k1 key pairs for external-pubkey invoices and their claims.

use std::str::FromStr;

use secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hex-encoded key pair: 32-byte secret, 33-byte compressed public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub private_key: String,
    pub public_key: String,
}

impl KeyPair {
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut secp256k1::rand::thread_rng());
        Self::from_keys(&secret_key, &public_key)
    }

    /// Rebuild the pair from a hex secret key.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let secret_key = SecretKey::from_str(private_key)
            .map_err(|e| Error::Config(format!("invalid private key: {e}")))?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::new(), &secret_key);
        Ok(Self::from_keys(&secret_key, &public_key))
    }

    fn from_keys(secret_key: &SecretKey, public_key: &PublicKey) -> Self {
        Self {
            private_key: hex::encode(secret_key.secret_bytes()),
            public_key: hex::encode(public_key.serialize()),
        }
    }
}
