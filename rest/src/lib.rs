//! # mirror-rest
//!
//! Query-filter and pagination-cursor engine for the ledger mirror REST API.
//!
//! Clients constrain resources with repeated, operator-qualified query
//! parameters (`timestamp=gte:1000&timestamp=lt:2000`). This crate parses and
//! deduplicates those parameters, compiles them into parameterized SQL
//! fragments with an ordered bound-value list, consolidates timestamp bounds
//! into canonical intervals, and derives the keyset-pagination query string
//! for the next page. It also decodes the serialized public-key wrappers
//! stored with entities into their canonical `{_type, key}` form.
//!
//! The surrounding service owns HTTP routing, connection pooling, per-resource
//! query assembly, and response serialization; this crate is pure and
//! stateless, so it can be called from any number of request handlers without
//! synchronization.

pub mod api;
pub mod core;
pub mod domain;
pub mod filters;
pub mod utils;
