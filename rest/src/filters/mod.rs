//! Query filter system
//!
//! Parses operator-qualified query parameters (`timestamp=gte:1000`),
//! deduplicates them, and compiles them into parameterized SQL fragments with
//! strict placeholder/value invariants. Timestamp bounds additionally
//! consolidate into canonical intervals.
//!
//! ## Usage
//!
//! ```no_run
//! use mirror_rest::filters::{QueryParams, parse_timestamp_param};
//!
//! let query: QueryParams = [("timestamp", "gte:1000"), ("timestamp", "lt:2000")]
//!     .into_iter()
//!     .collect();
//! let clause = parse_timestamp_param(&query, "timestamp", &[]).unwrap();
//! assert_eq!(clause.text, "timestamp >= ? and timestamp < ?");
//! ```

pub mod builder;
pub mod parser;
pub mod range;
pub mod types;

pub use builder::{
    parse_account_id_param, parse_balance_param, parse_public_key_param, parse_timestamp_param,
};
pub use parser::{parse_params, split_operator_value, validate_query};
pub use range::{
    Interval, TimestampRange, TimestampRangeOptions, collect_timestamp_filters,
    consolidate_timestamp_filters, timestamp_range_conditions,
};
pub use types::{Clause, Filter, Operator, QueryParams};
