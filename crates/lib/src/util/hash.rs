//! Hashing utilities for synthesized templates.
//!
//! This module provides:
//! - `ObjectHash`: A truncated 20-character hash identifying a serialized value
//! - `Hashable`: content hashing for anything serializable
//! - `short_hash()`: the 8-character suffix used in logical ids

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::{LOGICAL_ID_HASH_LEN, OBJ_HASH_PREFIX_LEN};

pub type HashError = serde_json::Error;

/// A content-addressed hash identifying a serialized value.
///
/// The hash is a 20-character truncated SHA-256 of the JSON-serialized value.
/// Templates use it to tell whether a stack changed between two syntheses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    let full = hex::encode(hasher.finalize());
    Ok(ObjectHash(full[..OBJ_HASH_PREFIX_LEN].to_string()))
  }
}

/// Uppercase 8-character SHA-256 prefix of `input`.
pub fn short_hash(input: &str) -> String {
  let digest = Sha256::digest(input.as_bytes());
  let full = hex::encode_upper(digest);
  full[..LOGICAL_ID_HASH_LEN].to_string()
}
