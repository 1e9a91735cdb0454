//! Operator parsing, deduplication, and clause compilation
//!
//! Raw query values carry an optional `op:` prefix. This module tokenizes
//! them, collapses exact duplicates, and compiles the survivors into one
//! AND-joined SQL fragment through a caller-supplied fragment builder. It
//! also validates a whole query-string map against a resource's accepted
//! parameter set before any compilation happens.

use std::collections::HashSet;

use crate::api::error::QueryError;
use crate::api::pagination::Order;
use crate::core::config::QueryConfig;
use crate::core::constants::FilterKey;
use crate::domain::entity_id::EntityId;
use crate::domain::keys::is_valid_public_key_query;
use crate::utils::hex::is_valid_slot;
use crate::utils::number::{is_numeric, is_positive_long};
use crate::utils::time::is_valid_timestamp;

use super::types::{Clause, Operator, QueryParams};

/// Split one raw query value into its operator and payload.
///
/// A token without a recognized `op:` prefix is an equality match on the
/// whole token. Tokenizing never fails; whether the payload is acceptable is
/// the per-field validator's call.
pub fn split_operator_value(token: &str) -> (Operator, &str) {
    if let Some((prefix, rest)) = token.split_once(':') {
        if let Some(op) = Operator::parse(prefix) {
            return (op, rest);
        }
    }
    (Operator::Eq, token)
}

/// Compile deduplicated operator/value pairs into one AND-joined clause.
///
/// `encoder` maps the raw payload to its bound-parameter form; duplicates are
/// detected on `(operator, encoded value)` and the first occurrence keeps its
/// position. `builder` receives the operator and the encoded values (a single
/// value, except for the aggregated equality fragment) and returns the SQL
/// fragment plus the values it binds; it may drop a pair by returning an
/// empty fragment with no values.
///
/// With `aggregate_eq`, equality values collect into a single trailing
/// `IN (…)` fragment. Without it every equality pair produces its own
/// `= ?` fragment, which is the documented "AND of equals" behavior for
/// timestamp, balance, and public-key filters.
pub fn parse_params<E, B>(
    param_values: &[String],
    encoder: E,
    builder: B,
    aggregate_eq: bool,
) -> Result<Clause, QueryError>
where
    E: Fn(&str) -> Result<String, QueryError>,
    B: Fn(Operator, &[String]) -> (String, Vec<String>),
{
    let mut seen = HashSet::new();
    let mut fragments = Vec::new();
    let mut values = Vec::new();
    let mut eq_values: Vec<String> = Vec::new();

    for raw in param_values {
        let (op, raw_value) = split_operator_value(raw);
        let encoded = encoder(raw_value)?;
        if !seen.insert((op, encoded.clone())) {
            continue;
        }
        if aggregate_eq && op == Operator::Eq {
            eq_values.push(encoded);
            continue;
        }
        let (fragment, bound) = builder(op, std::slice::from_ref(&encoded));
        if fragment.is_empty() && bound.is_empty() {
            continue;
        }
        validate_fragment(&fragment, &bound)?;
        fragments.push(fragment);
        values.extend(bound);
    }

    if !eq_values.is_empty() {
        let (fragment, bound) = builder(Operator::Eq, &eq_values);
        validate_fragment(&fragment, &bound)?;
        fragments.push(fragment);
        values.extend(bound);
    }

    Ok(Clause {
        text: fragments.join(" and "),
        values,
    })
}

/// The placeholder count in a fragment must match the values it binds.
fn validate_fragment(fragment: &str, values: &[String]) -> Result<(), QueryError> {
    let placeholders = fragment.matches('?').count();
    if placeholders != values.len() {
        return Err(QueryError::invalid_clause(format!(
            "fragment {fragment:?} has {placeholders} placeholders but binds {} values",
            values.len()
        )));
    }
    Ok(())
}

/// Validate raw query parameters against a resource's accepted key set.
///
/// Every offending parameter is collected so clients see the full list in one
/// response: unknown or unaccepted keys, keys repeated beyond the configured
/// bound, and values that fail their key's shape check.
pub fn validate_query(
    query: &QueryParams,
    accepted: &HashSet<FilterKey>,
    config: &QueryConfig,
) -> Result<(), QueryError> {
    let mut bad: Vec<String> = Vec::new();
    for (key, values) in query.iter() {
        let recognized = FilterKey::parse(key).filter(|k| accepted.contains(k));
        let Some(filter_key) = recognized else {
            bad.push(key.to_string());
            continue;
        };
        if values.len() > config.max_repeated_query_parameters {
            bad.push(key.to_string());
            continue;
        }
        for value in values {
            if !is_valid_param_value(filter_key, value) {
                bad.push(format!("{key}={value}"));
            }
        }
    }
    if bad.is_empty() {
        Ok(())
    } else {
        Err(QueryError::invalid_argument(bad.join(", ")))
    }
}

fn is_valid_param_value(key: FilterKey, raw: &str) -> bool {
    let (op, value) = split_operator_value(raw);
    match key {
        FilterKey::AccountId
        | FilterKey::ContractId
        | FilterKey::ScheduleId
        | FilterKey::SpenderId
        | FilterKey::TokenId => EntityId::parse(value).is_ok(),
        FilterKey::AccountBalance => is_numeric(value),
        FilterKey::AccountPublicKey => is_valid_public_key_query(value),
        FilterKey::BlockNumber | FilterKey::NodeId => is_positive_long(value, true),
        FilterKey::SerialNumber => is_positive_long(value, false),
        FilterKey::Slot => is_valid_slot(value),
        FilterKey::Timestamp => is_valid_timestamp(value),
        FilterKey::Limit => op == Operator::Eq && is_positive_long(value, false),
        FilterKey::Order => op == Operator::Eq && Order::parse(value).is_some(),
    }
}
