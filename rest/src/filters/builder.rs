//! Per-field query-parameter filters
//!
//! Each resource field pairs a value encoding with an SQL fragment shape.
//! Entity-id fields aggregate equality values into an `IN` list; timestamp,
//! balance, and public-key fields repeat every retained pair, including
//! equality pairs.

use crate::api::error::QueryError;
use crate::domain::entity_id::EntityId;
use crate::domain::keys::parse_public_key;
use crate::utils::number::is_numeric;
use crate::utils::time::parse_timestamp_ns;

use super::parser::parse_params;
use super::types::{Clause, Operator, QueryParams};

/// Compile an entity-id filter for `column`.
///
/// Values are bound in their encoded 64-bit form. Equality values collapse
/// into one `IN (…)` fragment appended after the bound fragments.
pub fn parse_account_id_param(query: &QueryParams, column: &str) -> Result<Clause, QueryError> {
    parse_params(
        query.get(column),
        |value| {
            EntityId::parse(value)
                .map(|id| id.encoded().to_string())
                .map_err(|e| QueryError::invalid_argument(format!("{column}: {e}")))
        },
        |op, values| {
            if op == Operator::Eq {
                let placeholders = vec!["?"; values.len()].join(", ");
                (format!("{column} IN ({placeholders})"), values.to_vec())
            } else {
                (format!("{column}{}?", op.sql()), values.to_vec())
            }
        },
        true,
    )
}

/// Compile a timestamp filter for `column`, binding nanosecond values.
///
/// `op_override` rewrites operators at fragment-build time, e.g. mapping
/// `eq` to `lte` for resources that treat a bare timestamp as an upper
/// bound.
pub fn parse_timestamp_param(
    query: &QueryParams,
    column: &str,
    op_override: &[(Operator, Operator)],
) -> Result<Clause, QueryError> {
    parse_params(
        query.get(column),
        |value| {
            parse_timestamp_ns(value)
                .map(|ns| ns.to_string())
                .ok_or_else(|| {
                    QueryError::invalid_argument(format!("{column}: invalid timestamp {value:?}"))
                })
        },
        |op, values| {
            let op = op_override
                .iter()
                .find(|(from, _)| *from == op)
                .map(|(_, to)| *to)
                .unwrap_or(op);
            (format!("{column}{}?", op.sql()), values.to_vec())
        },
        false,
    )
}

/// Compile a balance filter for `column`.
///
/// Non-numeric values are dropped rather than rejected; request validation
/// has already flagged them, so compilation stays total.
pub fn parse_balance_param(query: &QueryParams, column: &str) -> Result<Clause, QueryError> {
    parse_params(
        query.get(column),
        |value| Ok(value.to_string()),
        |op, values| {
            if values.iter().all(|v| is_numeric(v)) {
                (format!("{column}{}?", op.sql()), values.to_vec())
            } else {
                (String::new(), Vec::new())
            }
        },
        false,
    )
}

/// Compile a public-key filter for `column`.
///
/// DER-wrapped and `0x`-prefixed keys normalize to bare lowercase hex before
/// deduplication, so equivalent spellings collapse.
pub fn parse_public_key_param(query: &QueryParams, column: &str) -> Result<Clause, QueryError> {
    parse_params(
        query.get(column),
        |value| Ok(parse_public_key(value)),
        |op, values| (format!("{column}{}?", op.sql()), values.to_vec()),
        false,
    )
}
