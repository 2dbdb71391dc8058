use derive_more::Deref;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error as ThisError;

const ID_SIZE: usize = 12;

///
/// IdError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IdError {
    #[error("invalid id string: {0}")]
    InvalidHex(String),

    #[error("invalid id length: {len} bytes (expected {expected})")]
    InvalidSize { len: usize, expected: usize },
}

///
/// Id
///
/// Opaque 12-byte identifier naming one item in one collection.
/// Rendered canonically as 24 lowercase hex characters.
///
/// Layout when built from parts: 4-byte big-endian seconds, 5-byte
/// discriminator, 3-byte big-endian counter. Ordering is byte order.
///

#[derive(Clone, Copy, Deref, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Id([u8; ID_SIZE]);

impl Id {
    pub const STORED_SIZE: usize = ID_SIZE;

    pub const MIN: Self = Self([0x00; Self::STORED_SIZE]);
    pub const MAX: Self = Self([0xFF; Self::STORED_SIZE]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::STORED_SIZE]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::STORED_SIZE] {
        &self.0
    }

    /// Build an identifier from its timestamp, discriminator and counter parts.
    /// Only the low 24 bits of `counter` are kept.
    #[must_use]
    pub const fn from_parts(timestamp_secs: u32, discriminator: [u8; 5], counter: u32) -> Self {
        let ts = timestamp_secs.to_be_bytes();
        let ctr = counter.to_be_bytes();

        Self([
            ts[0],
            ts[1],
            ts[2],
            ts[3],
            discriminator[0],
            discriminator[1],
            discriminator[2],
            discriminator[3],
            discriminator[4],
            ctr[1],
            ctr[2],
            ctr[3],
        ])
    }

    #[must_use]
    pub const fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    #[must_use]
    pub const fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, IdError> {
        let array: [u8; Self::STORED_SIZE] =
            bytes.try_into().map_err(|_| IdError::InvalidSize {
                len: bytes.len(),
                expected: Self::STORED_SIZE,
            })?;

        Ok(Self(array))
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| IdError::InvalidHex(s.to_string()))?;

        Self::try_from_slice(&bytes)
    }
}

impl From<[u8; ID_SIZE]> for Id {
    fn from(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(de::Error::custom)
    }
}
