//! Entity-id codec
//!
//! Entity ids appear in the API as `shard.realm.num` (with the shard and
//! realm parts optional) and in the database as one bit-packed signed 64-bit
//! column: 38 bits of entity number, 16 bits of realm, and the shard above
//! them. The shard is validated to 9 bits so the packed id never sets the
//! sign bit.

use std::fmt;

use thiserror::Error;

const NUM_BITS: u32 = 38;
const REALM_BITS: u32 = 16;
const SHARD_BITS: u32 = 9;

const MAX_NUM: i64 = (1 << NUM_BITS) - 1;
const MAX_REALM: i64 = (1 << REALM_BITS) - 1;
const MAX_SHARD: i64 = (1 << SHARD_BITS) - 1;

const REALM_OFFSET: u32 = NUM_BITS;
const SHARD_OFFSET: u32 = NUM_BITS + REALM_BITS;

/// The value does not parse as an entity id or exceeds a component limit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid entity id {0:?}")]
pub struct InvalidEntityId(pub String);

/// A `shard.realm.num` entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    shard: i64,
    realm: i64,
    num: i64,
}

impl EntityId {
    pub fn new(shard: i64, realm: i64, num: i64) -> Result<Self, InvalidEntityId> {
        if !(0..=MAX_SHARD).contains(&shard)
            || !(0..=MAX_REALM).contains(&realm)
            || !(0..=MAX_NUM).contains(&num)
        {
            return Err(InvalidEntityId(format!("{shard}.{realm}.{num}")));
        }
        Ok(Self { shard, realm, num })
    }

    /// Parse `num`, `realm.num`, or `shard.realm.num`. Missing parts default
    /// to zero.
    pub fn parse(s: &str) -> Result<Self, InvalidEntityId> {
        let part = |p: &str| -> Result<i64, InvalidEntityId> {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                return Err(InvalidEntityId(s.to_string()));
            }
            p.parse().map_err(|_| InvalidEntityId(s.to_string()))
        };
        let parts: Vec<&str> = s.split('.').collect();
        let id = match parts.as_slice() {
            [num] => Self::new(0, 0, part(num)?),
            [realm, num] => Self::new(0, part(realm)?, part(num)?),
            [shard, realm, num] => Self::new(part(shard)?, part(realm)?, part(num)?),
            _ => Err(InvalidEntityId(s.to_string())),
        };
        id.map_err(|_| InvalidEntityId(s.to_string()))
    }

    /// Unpack a database-encoded id.
    pub fn from_encoded(encoded: i64) -> Self {
        Self {
            shard: encoded >> SHARD_OFFSET,
            realm: (encoded >> REALM_OFFSET) & MAX_REALM,
            num: encoded & MAX_NUM,
        }
    }

    /// The bit-packed database form.
    pub fn encoded(&self) -> i64 {
        (self.shard << SHARD_OFFSET) | (self.realm << REALM_OFFSET) | self.num
    }

    pub fn shard(&self) -> i64 {
        self.shard
    }

    pub fn realm(&self) -> i64 {
        self.realm
    }

    pub fn num(&self) -> i64 {
        self.num
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}
