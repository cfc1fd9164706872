//! Core types shared by the hashing and diff layers.

/// Hash: BLAKE3 digest used for both metadata and comparison hashes
pub type Hash = [u8; 32];

/// Render a hash for logs and reports
pub fn hash_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Serde adapter rendering hashes as lowercase hex strings
pub mod hex_hash {
    use super::Hash;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected 32-byte hash, got {:?}", text)))
    }
}
