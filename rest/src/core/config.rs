//! Engine configuration
//!
//! All values are supplied by the embedding service at startup and read-only
//! afterwards; the engine itself does no file or environment loading.

use serde::Deserialize;

use super::constants::{
    DEFAULT_LIMIT, DEFAULT_MAX_REPEATED_QUERY_PARAMETERS, DEFAULT_MAX_TIMESTAMP_RANGE_NS,
    MAX_LIMIT,
};

/// Limits applied while compiling query-string filters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum number of values accepted for a single repeated parameter
    pub max_repeated_query_parameters: usize,
    /// Maximum width of a consolidated timestamp range, in nanoseconds
    pub max_timestamp_range_ns: i128,
    /// Reject mixed timestamp operator combinations when set
    pub strict_timestamp_param: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_repeated_query_parameters: DEFAULT_MAX_REPEATED_QUERY_PARAMETERS,
            max_timestamp_range_ns: DEFAULT_MAX_TIMESTAMP_RANGE_NS,
            strict_timestamp_param: true,
        }
    }
}

/// Result-set size limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponseLimitConfig {
    /// Page size applied when the client sends no `limit`
    pub default: u32,
    /// Hard cap; larger requested limits are clamped, not rejected
    pub max: u32,
}

impl Default for ResponseLimitConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_LIMIT,
            max: MAX_LIMIT,
        }
    }
}
