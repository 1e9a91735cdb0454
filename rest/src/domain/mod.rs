//! Domain value types shared across resources

pub mod entity_id;
pub mod keys;

pub use entity_id::EntityId;
pub use keys::{KeyType, PublicKey, decode_key, is_valid_public_key_query, parse_public_key};
