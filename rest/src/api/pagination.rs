//! Pagination: limit/order parsing and keyset next-page links
//!
//! Pages advance by keyset: the last row's sort-key values become new filter
//! bounds on the next request, so deep pages stay as cheap as the first. The
//! next-page link is a relative query string rebuilt from the retained
//! filters plus the advanced bounds, or absent entirely when the advanced
//! filter set can match no further rows.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::core::config::ResponseLimitConfig;
use crate::core::constants::FilterKey;
use crate::domain::entity_id::EntityId;
use crate::filters::parser::split_operator_value;
use crate::filters::types::{Clause, Operator, QueryParams};
use crate::utils::hex::parse_hex;
use crate::utils::time::parse_timestamp_ns;

/// Result-set ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled limit/order state for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrderParams {
    pub clause: Clause,
    pub order: Order,
    pub limit: u32,
}

/// Resolve the effective limit from a possibly repeated `limit` parameter.
///
/// The last value wins; values above the configured maximum clamp to it, and
/// anything unparseable falls back to the default.
pub fn limit_param_value(values: &[String], limits: &ResponseLimitConfig) -> u32 {
    values
        .last()
        .and_then(|v| v.parse::<u64>().ok())
        .map(|v| v.min(u64::from(limits.max)) as u32)
        .unwrap_or(limits.default)
}

/// Parse `limit` and `order`, producing the trailing SQL fragment.
pub fn parse_limit_and_order_params(
    query: &QueryParams,
    default_order: Order,
    limits: &ResponseLimitConfig,
) -> LimitOrderParams {
    let limit = limit_param_value(query.get(FilterKey::Limit.as_str()), limits);
    let order = query
        .get(FilterKey::Order.as_str())
        .last()
        .and_then(|v| Order::parse(v))
        .unwrap_or(default_order);
    LimitOrderParams {
        clause: Clause {
            text: "limit ? ".to_string(),
            values: vec![limit.to_string()],
        },
        order,
        limit,
    }
}

/// One sort-key dimension of the last row on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastValue {
    pub value: String,
    /// Carry the boundary inclusively so rows tied on this key continue on
    /// the next page
    pub inclusive: bool,
    /// Marks the primary key of a composite sort
    pub primary: bool,
}

impl LastValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            inclusive: false,
            primary: false,
        }
    }

    pub fn inclusive(mut self) -> Self {
        self.inclusive = true;
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

/// Compute the query string for the next page of results.
///
/// Each field in `last_values` advances past the last row's value: bounds in
/// the advancing direction are replaced, opposite bounds are kept, and a
/// field already pinned by an exact match keeps its filter untouched. A field
/// whose existing entries were all replaced moves to the end of the string in
/// `last_values` order. Non-positional parameters (`limit`, `order`) pass
/// through unchanged.
///
/// Returns `None` when an advanced bound together with a kept opposite bound
/// leaves no representable value, meaning the response should omit its next
/// link.
pub fn next_param_queries(
    order: Order,
    query: &QueryParams,
    last_values: &[(FilterKey, LastValue)],
) -> Option<String> {
    let mut entries: Vec<(String, Vec<String>)> = query
        .iter()
        .map(|(key, values)| (key.to_string(), values.to_vec()))
        .collect();

    for (key, last) in last_values {
        let new_op = match (order, last.inclusive) {
            (Order::Asc, false) => Operator::Gt,
            (Order::Asc, true) => Operator::Gte,
            (Order::Desc, false) => Operator::Lt,
            (Order::Desc, true) => Operator::Lte,
        };
        let new_token = format!("{}:{}", new_op.as_str(), last.value);

        let Some(index) = entries.iter().position(|(k, _)| k == key.as_str()) else {
            entries.push((key.as_str().to_string(), vec![new_token]));
            continue;
        };

        let tokens = &entries[index].1;
        if tokens
            .iter()
            .any(|t| split_operator_value(t).0 == Operator::Eq)
        {
            // already pinned to exact values; nothing to advance
            continue;
        }

        let mut kept = Vec::new();
        for token in tokens {
            let (op, value) = split_operator_value(token);
            if is_advancing(order, op) {
                continue;
            }
            if is_opposing(order, op) && boundary_exhausted(*key, new_op, &last.value, op, value) {
                return None;
            }
            kept.push(token.clone());
        }

        if kept.is_empty() {
            entries.remove(index);
            entries.push((key.as_str().to_string(), vec![new_token]));
        } else {
            kept.push(new_token);
            entries[index].1 = kept;
        }
    }

    let mut parts = Vec::new();
    for (key, tokens) in &entries {
        for token in tokens {
            parts.push(format!("{key}={token}"));
        }
    }
    Some(format!("?{}", parts.join("&")))
}

/// Bounds in the advancing direction are superseded by the new boundary.
fn is_advancing(order: Order, op: Operator) -> bool {
    match order {
        Order::Asc => matches!(op, Operator::Gt | Operator::Gte),
        Order::Desc => matches!(op, Operator::Lt | Operator::Lte),
    }
}

fn is_opposing(order: Order, op: Operator) -> bool {
    match order {
        Order::Asc => matches!(op, Operator::Lt | Operator::Lte),
        Order::Desc => matches!(op, Operator::Gt | Operator::Gte),
    }
}

/// Field value normalized for boundary comparison. Byte values are
/// big-endian with leading zeros stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorValue {
    Int(i128),
    Bytes(Vec<u8>),
}

impl CursorValue {
    fn increment(self) -> CursorValue {
        match self {
            Self::Int(v) => Self::Int(v + 1),
            Self::Bytes(mut bytes) => {
                for byte in bytes.iter_mut().rev() {
                    if *byte == 0xff {
                        *byte = 0;
                    } else {
                        *byte += 1;
                        return Self::Bytes(bytes);
                    }
                }
                bytes.insert(0, 1);
                Self::Bytes(bytes)
            }
        }
    }

    /// `None` when the value is zero and nothing lies below it.
    fn decrement(self) -> Option<CursorValue> {
        match self {
            Self::Int(v) => Some(Self::Int(v - 1)),
            Self::Bytes(mut bytes) => {
                if bytes.is_empty() {
                    return None;
                }
                for i in (0..bytes.len()).rev() {
                    if bytes[i] == 0 {
                        bytes[i] = 0xff;
                    } else {
                        bytes[i] -= 1;
                        break;
                    }
                }
                Some(Self::Bytes(strip_leading_zeros(bytes)))
            }
        }
    }

    fn exceeds(&self, other: &CursorValue) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a > b,
            (Self::Bytes(a), Self::Bytes(b)) => (a.len(), a) > (b.len(), b),
            _ => false,
        }
    }
}

fn strip_leading_zeros(mut bytes: Vec<u8>) -> Vec<u8> {
    let zeros = bytes.iter().take_while(|b| **b == 0).count();
    bytes.drain(..zeros);
    bytes
}

fn cursor_value(key: FilterKey, raw: &str) -> Option<CursorValue> {
    match key {
        FilterKey::AccountId
        | FilterKey::ContractId
        | FilterKey::ScheduleId
        | FilterKey::SpenderId
        | FilterKey::TokenId => EntityId::parse(raw)
            .ok()
            .map(|id| CursorValue::Int(i128::from(id.encoded()))),
        FilterKey::Timestamp => parse_timestamp_ns(raw).map(CursorValue::Int),
        FilterKey::BlockNumber | FilterKey::NodeId | FilterKey::SerialNumber => {
            raw.parse::<i128>().ok().map(CursorValue::Int)
        }
        FilterKey::Slot => parse_hex(raw).map(|b| CursorValue::Bytes(strip_leading_zeros(b))),
        FilterKey::AccountBalance
        | FilterKey::AccountPublicKey
        | FilterKey::Limit
        | FilterKey::Order => None,
    }
}

/// True when the new boundary and a kept opposite bound leave no value in
/// between. Both bounds normalize to closed form before comparing; fields
/// without a comparable encoding are never considered exhausted.
fn boundary_exhausted(
    key: FilterKey,
    new_op: Operator,
    new_value: &str,
    kept_op: Operator,
    kept_value: &str,
) -> bool {
    let Some(new) = cursor_value(key, new_value) else {
        return false;
    };
    let Some(kept) = cursor_value(key, kept_value) else {
        return false;
    };

    let (lower, upper) = if matches!(new_op, Operator::Gt | Operator::Gte) {
        let lower = match new_op {
            Operator::Gt => Some(new.increment()),
            _ => Some(new),
        };
        let upper = match kept_op {
            Operator::Lt => kept.decrement(),
            _ => Some(kept),
        };
        (lower, upper)
    } else {
        let lower = match kept_op {
            Operator::Gt => Some(kept.increment()),
            _ => Some(kept),
        };
        let upper = match new_op {
            Operator::Lt => new.decrement(),
            _ => Some(new),
        };
        (lower, upper)
    };

    match (lower, upper) {
        (Some(lower), Some(upper)) => lower.exceeds(&upper),
        _ => true,
    }
}
