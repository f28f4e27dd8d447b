use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DiffError;

/// BLAKE3 digest of a [`crate::BranchDiff`]'s canonical JSON form.
///
/// Two diffs with the same fingerprint describe exactly the same changes, so
/// a caller can resolve conflicts against one diff and ask the merge to fail
/// if the branches have moved since.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiffFingerprint([u8; 32]);

impl DiffFingerprint {
    pub(crate) fn of_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, DiffError> {
        let bytes = hex::decode(s).map_err(|e| DiffError::InvalidFingerprint(e.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            DiffError::InvalidFingerprint(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for DiffFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiffFingerprint({})", self.short_hex())
    }
}

impl fmt::Display for DiffFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for DiffFingerprint {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for DiffFingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DiffFingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}
