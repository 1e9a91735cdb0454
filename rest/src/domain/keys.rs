//! Public-key codec
//!
//! Entity keys are stored as serialized protobuf wrappers. The API exposes
//! them as `{_type, key}` with the primitive key bytes hex encoded; wrappers
//! that do not resolve to a recognized primitive pass through as opaque
//! protobuf hex rather than being rejected.

use std::sync::OnceLock;

use prost::Message;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

/// Serialized empty key list, written by the network for immutable entities
const IMMUTABLE_SENTINEL: &[u8] = &[0x32, 0x00];

/// DER wrapper prefix for a raw 32-byte ED25519 public key
const ED25519_DER_PREFIX: &str = "302a300506032b6570032100";

mod proto {
    //! Hand-derived subset of the network key wrapper messages

    /// Protobuf key wrapper
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Key {
        #[prost(oneof = "key::Key", tags = "2, 5, 6, 7")]
        pub key: ::core::option::Option<key::Key>,
    }

    pub mod key {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Key {
            #[prost(bytes, tag = "2")]
            Ed25519(::prost::alloc::vec::Vec<u8>),
            #[prost(message, tag = "5")]
            ThresholdKey(super::ThresholdKey),
            #[prost(message, tag = "6")]
            KeyList(super::KeyList),
            #[prost(bytes, tag = "7")]
            EcdsaSecp256k1(::prost::alloc::vec::Vec<u8>),
        }
    }

    /// List of keys
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct KeyList {
        #[prost(message, repeated, tag = "1")]
        pub keys: ::prost::alloc::vec::Vec<Key>,
    }

    /// M-of-N key list
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ThresholdKey {
        #[prost(uint32, tag = "1")]
        pub threshold: u32,
        #[prost(message, optional, tag = "2")]
        pub keys: ::core::option::Option<KeyList>,
    }
}

/// Key algorithm classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum KeyType {
    #[serde(rename = "ED25519")]
    Ed25519,
    #[serde(rename = "ECDSA_SECP256K1")]
    EcdsaSecp256k1,
    #[serde(rename = "ProtobufEncoded")]
    ProtobufEncoded,
}

/// Canonical, comparison-ready form of a decoded key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PublicKey {
    #[serde(rename = "_type")]
    pub key_type: KeyType,
    pub key: String,
}

impl PublicKey {
    fn protobuf(bytes: &[u8]) -> Self {
        Self {
            key_type: KeyType::ProtobufEncoded,
            key: hex::encode(bytes),
        }
    }
}

/// Decode a serialized key wrapper.
///
/// Returns `None` for the empty-key-list sentinel, which marks an entity as
/// immutable ("no key"). Key lists and threshold keys are unwrapped exactly
/// one level, taking the first inner key; deeper nesting and every other
/// wrapper shape fall back to the protobuf form over the original bytes.
pub fn decode_key(bytes: &[u8]) -> Option<PublicKey> {
    if bytes == IMMUTABLE_SENTINEL {
        return None;
    }
    if bytes.is_empty() {
        return Some(PublicKey {
            key_type: KeyType::ProtobufEncoded,
            key: String::new(),
        });
    }

    let primitive = proto::Key::decode(bytes).ok().and_then(|key| match key.key {
        Some(proto::key::Key::KeyList(list)) => list.keys.into_iter().next().and_then(|k| k.key),
        Some(proto::key::Key::ThresholdKey(threshold)) => threshold
            .keys
            .and_then(|list| list.keys.into_iter().next())
            .and_then(|k| k.key),
        other => other,
    });

    let decoded = match primitive {
        Some(proto::key::Key::Ed25519(raw)) => PublicKey {
            key_type: KeyType::Ed25519,
            key: hex::encode(raw),
        },
        Some(proto::key::Key::EcdsaSecp256k1(raw)) => PublicKey {
            key_type: KeyType::EcdsaSecp256k1,
            key: hex::encode(raw),
        },
        _ => {
            tracing::debug!(len = bytes.len(), "unrecognized key wrapper");
            PublicKey::protobuf(bytes)
        }
    };
    Some(decoded)
}

/// Normalize an externally supplied public-key string for filtering.
///
/// Bare 64- or 66-digit hex (optionally `0x`-prefixed) lowercases, and the
/// fixed ED25519 DER wrapper is stripped to the raw key. Anything else is
/// returned unmodified; callers gate acceptability with
/// [`is_valid_public_key_query`] before using the value in a filter.
pub fn parse_public_key(value: &str) -> String {
    static DER: OnceLock<Regex> = OnceLock::new();
    static BARE: OnceLock<Regex> = OnceLock::new();
    let der = DER.get_or_init(|| {
        Regex::new(&format!("(?i)^{ED25519_DER_PREFIX}[a-f0-9]{{64}}$")).expect("Invalid regex")
    });
    let bare =
        BARE.get_or_init(|| Regex::new(r"(?i)^([a-f0-9]{64}|[a-f0-9]{66})$").expect("Invalid regex"));

    let stripped = value.strip_prefix("0x").unwrap_or(value);
    if der.is_match(stripped) {
        stripped[ED25519_DER_PREFIX.len()..].to_lowercase()
    } else if bare.is_match(stripped) {
        stripped.to_lowercase()
    } else {
        value.to_string()
    }
}

/// True when the value is an acceptable public-key query parameter: 64 or 66
/// hex digits, or the DER-wrapped ED25519 form, each with an optional `0x`
/// prefix.
pub fn is_valid_public_key_query(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(&format!(
            "(?i)^(0x)?({ED25519_DER_PREFIX}[a-f0-9]{{64}}|[a-f0-9]{{64}}|[a-f0-9]{{66}})$"
        ))
        .expect("Invalid regex")
    });
    re.is_match(value)
}
