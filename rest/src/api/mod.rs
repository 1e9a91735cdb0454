//! API-facing types
//!
//! The error surface shared with the HTTP layer and the pagination helpers
//! (limit/order parsing, next-page cursor computation).

pub mod error;
pub mod pagination;

pub use error::QueryError;
pub use pagination::{
    LastValue, LimitOrderParams, Order, limit_param_value, next_param_queries,
    parse_limit_and_order_params,
};
