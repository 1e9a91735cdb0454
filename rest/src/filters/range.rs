//! Timestamp range consolidation
//!
//! Multiple boundary filters on one timestamp column collapse into a single
//! canonical interval. Exclusive bounds convert to closed form (`gt x` →
//! `x+1`, `lt x` → `x-1`), the tightest bound per direction wins, and the
//! result is validated for emptiness and width. All arithmetic is `i128`.

use std::fmt;

use crate::api::error::QueryError;
use crate::core::config::QueryConfig;
use crate::core::constants::FilterKey;
use crate::utils::time::parse_timestamp_ns;

use super::parser::split_operator_value;
use super::types::{Filter, Operator, QueryParams};

/// A nanosecond interval; `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub lower: Option<i128>,
    pub upper: Option<i128>,
    pub lower_inclusive: bool,
    pub upper_inclusive: bool,
}

impl Interval {
    /// Closed interval `[lower, upper]`.
    pub fn closed(lower: i128, upper: i128) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            lower_inclusive: true,
            upper_inclusive: true,
        }
    }

    pub fn new(
        lower: Option<i128>,
        upper: Option<i128>,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Self {
        Self {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        }
    }

    /// True when no value can satisfy both bounds.
    pub fn is_empty(&self) -> bool {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => {
                let lower = if self.lower_inclusive { lower } else { lower + 1 };
                let upper = if self.upper_inclusive { upper } else { upper - 1 };
                lower > upper
            }
            _ => false,
        }
    }
}

/// Postgres range literal, e.g. `[100,200]` or `(,200]`.
impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower_inclusive { '[' } else { '(' };
        let close = if self.upper_inclusive { ']' } else { ')' };
        let lower = self.lower.map(|v| v.to_string()).unwrap_or_default();
        let upper = self.upper.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{open}{lower},{upper}{close}")
    }
}

/// Consolidated timestamp filter state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampRange {
    pub range: Option<Interval>,
    /// Strictly increasing, deduplicated equality values
    pub eq_values: Vec<i128>,
    /// Strictly increasing, deduplicated exclusion values
    pub ne_values: Vec<i128>,
}

/// Knobs for [`consolidate_timestamp_filters`]
#[derive(Debug, Clone, Copy)]
pub struct TimestampRangeOptions {
    /// Fail on an empty filter list
    pub required: bool,
    /// Accept `ne` filters
    pub allow_ne: bool,
    /// Accept a lone one-sided bound as a half-open interval
    pub allow_open_range: bool,
    /// Reject mixed operator combinations; ANDed with the config toggle
    pub strict: bool,
    /// Reject empty and over-wide ranges
    pub validate_range: bool,
}

impl Default for TimestampRangeOptions {
    fn default() -> Self {
        Self {
            required: true,
            allow_ne: false,
            allow_open_range: false,
            strict: true,
            validate_range: true,
        }
    }
}

/// Extract `(operator, nanoseconds)` pairs from the raw timestamp parameter.
pub fn collect_timestamp_filters(query: &QueryParams) -> Result<Vec<(Operator, i128)>, QueryError> {
    let key = FilterKey::Timestamp.as_str();
    query
        .get(key)
        .iter()
        .map(|raw| {
            let (op, value) = split_operator_value(raw);
            parse_timestamp_ns(value)
                .map(|ns| (op, ns))
                .ok_or_else(|| {
                    QueryError::invalid_argument(format!("{key}: invalid timestamp {value:?}"))
                })
        })
        .collect()
}

/// Merge timestamp boundary filters into one canonical range.
///
/// In strict mode exactly one of the following may be present: a complete
/// two-sided range (one bound per direction), equality values, or exclusion
/// values. Relaxed mode keeps the tightest bound per direction and returns
/// every populated field together.
pub fn consolidate_timestamp_filters(
    filters: &[(Operator, i128)],
    options: TimestampRangeOptions,
    config: &QueryConfig,
) -> Result<TimestampRange, QueryError> {
    if filters.is_empty() {
        if options.required {
            return Err(QueryError::invalid_range(
                "at least one timestamp filter is required",
            ));
        }
        return Ok(TimestampRange::default());
    }

    let mut eq_values = Vec::new();
    let mut ne_values = Vec::new();
    let mut lowers: Vec<i128> = Vec::new();
    let mut uppers: Vec<i128> = Vec::new();
    for &(op, value) in filters {
        match op {
            Operator::Eq => eq_values.push(value),
            Operator::Ne => ne_values.push(value),
            Operator::Gt => lowers.push(value + 1),
            Operator::Gte => lowers.push(value),
            Operator::Lt => uppers.push(value - 1),
            Operator::Lte => uppers.push(value),
        }
    }
    eq_values.sort_unstable();
    eq_values.dedup();
    ne_values.sort_unstable();
    ne_values.dedup();

    if !ne_values.is_empty() && !options.allow_ne {
        return Err(QueryError::invalid_range(
            "ne timestamp filters are not supported here",
        ));
    }

    let has_bounds = !lowers.is_empty() || !uppers.is_empty();
    if options.strict && config.strict_timestamp_param {
        let populated = usize::from(has_bounds)
            + usize::from(!eq_values.is_empty())
            + usize::from(!ne_values.is_empty());
        if populated > 1 {
            return Err(QueryError::invalid_range(
                "eq, ne, and bound timestamp filters cannot be combined",
            ));
        }
        if lowers.len() > 1 || uppers.len() > 1 {
            return Err(QueryError::invalid_range(
                "only one timestamp bound per direction is supported",
            ));
        }
    }

    let lower = lowers.iter().copied().max();
    let upper = uppers.iter().copied().min();
    let range = match (lower, upper) {
        (Some(lower), Some(upper)) => {
            if options.validate_range {
                if lower > upper {
                    return Err(QueryError::invalid_range("timestamp range is empty"));
                }
                if upper - lower + 1 > config.max_timestamp_range_ns {
                    return Err(QueryError::invalid_range(format!(
                        "timestamp range must be no wider than {} ns",
                        config.max_timestamp_range_ns
                    )));
                }
            }
            Some(Interval::closed(lower, upper))
        }
        (Some(lower), None) => {
            if !options.allow_open_range {
                return Err(QueryError::invalid_range(
                    "a lone one-sided timestamp bound is not supported here",
                ));
            }
            Some(Interval::new(Some(lower), None, true, true))
        }
        (None, Some(upper)) => {
            if !options.allow_open_range {
                return Err(QueryError::invalid_range(
                    "a lone one-sided timestamp bound is not supported here",
                ));
            }
            Some(Interval::new(None, Some(upper), true, true))
        }
        (None, None) => None,
    };

    Ok(TimestampRange {
        range,
        eq_values,
        ne_values,
    })
}

/// Map timestamp filters onto a range-typed column.
///
/// Equality becomes an overlap test against `(,v]` (the entity existed at
/// `v`), bounds become overlap tests against the matching half-open range,
/// and `ne` excludes rows whose range contains the point. Placeholders use
/// the Postgres `$n` form because the bound values are range literals the
/// query layer passes straight through.
pub fn timestamp_range_conditions(filters: &[Filter], column: &str) -> (Vec<String>, Vec<String>) {
    let mut conditions = Vec::new();
    let mut params: Vec<String> = Vec::new();
    for filter in filters {
        if filter.key != FilterKey::Timestamp {
            continue;
        }
        let Ok(value) = filter.value.parse::<i128>() else {
            tracing::warn!(value = %filter.value, "skipping unparseable timestamp filter");
            continue;
        };
        let index = params.len() + 1;
        let (condition, interval) = match filter.operator {
            Operator::Eq => (
                format!("{column} && ${index}"),
                Interval::new(None, Some(value), false, true),
            ),
            Operator::Gt => (
                format!("{column} && ${index}"),
                Interval::new(Some(value), None, false, false),
            ),
            Operator::Gte => (
                format!("{column} && ${index}"),
                Interval::new(Some(value), None, true, false),
            ),
            Operator::Lt => (
                format!("{column} && ${index}"),
                Interval::new(None, Some(value), false, false),
            ),
            Operator::Lte => (
                format!("{column} && ${index}"),
                Interval::new(None, Some(value), false, true),
            ),
            Operator::Ne => (
                format!("not {column} @> ${index}"),
                Interval::closed(value, value),
            ),
        };
        conditions.push(condition);
        params.push(interval.to_string());
    }
    (conditions, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: i128 = 1_000_000_000;

    fn relaxed() -> QueryConfig {
        QueryConfig {
            strict_timestamp_param: false,
            ..QueryConfig::default()
        }
    }

    fn consolidate(
        filters: &[(Operator, i128)],
        options: TimestampRangeOptions,
        config: &QueryConfig,
    ) -> Result<TimestampRange, QueryError> {
        consolidate_timestamp_filters(filters, options, config)
    }

    #[test]
    fn single_eq() {
        let result = consolidate(
            &[(Operator::Eq, 1638921702000000000)],
            TimestampRangeOptions::default(),
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(
            result,
            TimestampRange {
                range: None,
                eq_values: vec![1638921702000000000],
                ne_values: vec![],
            }
        );
    }

    #[test]
    fn two_eq() {
        let result = consolidate(
            &[(Operator::Eq, NS), (Operator::Eq, 1638921702000000000)],
            TimestampRangeOptions::default(),
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(result.eq_values, vec![NS, 1638921702000000000]);
        assert_eq!(result.range, None);
    }

    #[test]
    fn gte_lte_complete_range() {
        let result = consolidate(
            &[(Operator::Gte, NS), (Operator::Lte, 2 * NS)],
            TimestampRangeOptions::default(),
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(result.range, Some(Interval::closed(NS, 2 * NS)));
        assert!(result.eq_values.is_empty());
    }

    #[test]
    fn one_nanosecond_range_from_exclusive_bounds() {
        let result = consolidate(
            &[(Operator::Gt, 1000999999), (Operator::Lt, 1001000001)],
            TimestampRangeOptions::default(),
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(result.range, Some(Interval::closed(1001000000, 1001000000)));
    }

    #[test]
    fn max_width_ranges_accepted() {
        // all four bound spellings of [1000000, 604800001000000)
        for (lower, upper) in [
            ((Operator::Gte, 1000000), (Operator::Lt, 604800001000000)),
            ((Operator::Gt, 999999), (Operator::Lt, 604800001000000)),
            ((Operator::Gt, 999999), (Operator::Lte, 604800000999999)),
            ((Operator::Gte, 1000000), (Operator::Lte, 604800000999999)),
        ] {
            let result = consolidate(
                &[lower, upper],
                TimestampRangeOptions::default(),
                &QueryConfig::default(),
            )
            .unwrap();
            assert_eq!(
                result.range,
                Some(Interval::closed(1000000, 604800000999999)),
                "{lower:?} {upper:?}"
            );
        }
    }

    #[test]
    fn single_ne_when_allowed() {
        let result = consolidate(
            &[(Operator::Ne, 1638921702000000000)],
            TimestampRangeOptions {
                allow_ne: true,
                allow_open_range: true,
                ..TimestampRangeOptions::default()
            },
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(result.ne_values, vec![1638921702000000000]);
        assert_eq!(result.range, None);
    }

    #[test]
    fn ne_with_bounds_in_relaxed_mode() {
        let result = consolidate(
            &[
                (Operator::Ne, 1638921702000000001),
                (Operator::Ne, 1638921702000000001),
                (Operator::Gt, 1638921702000000000),
                (Operator::Lt, 1638921702000000005),
            ],
            TimestampRangeOptions {
                allow_ne: true,
                ..TimestampRangeOptions::default()
            },
            &relaxed(),
        )
        .unwrap();
        assert_eq!(
            result.range,
            Some(Interval::closed(1638921702000000001, 1638921702000000004))
        );
        assert_eq!(result.ne_values, vec![1638921702000000001]);
        assert!(result.eq_values.is_empty());
    }

    #[test]
    fn open_upper_range() {
        let result = consolidate(
            &[(Operator::Lt, 1638921702000000001)],
            TimestampRangeOptions {
                allow_open_range: true,
                ..TimestampRangeOptions::default()
            },
            &relaxed(),
        )
        .unwrap();
        assert_eq!(
            result.range,
            Some(Interval::new(None, Some(1638921702000000000), true, true))
        );
    }

    #[test]
    fn open_lower_range() {
        let result = consolidate(
            &[(Operator::Gt, 1638921702000000000)],
            TimestampRangeOptions {
                allow_open_range: true,
                ..TimestampRangeOptions::default()
            },
            &relaxed(),
        )
        .unwrap();
        assert_eq!(
            result.range,
            Some(Interval::new(Some(1638921702000000001), None, true, true))
        );
    }

    #[test]
    fn relaxed_mode_keeps_eq_and_ne_together() {
        let result = consolidate(
            &[
                (Operator::Ne, 1638921702000000000),
                (Operator::Ne, 1638921702000000000),
                (Operator::Eq, 1638921703000000000),
                (Operator::Eq, 1638921703000000000),
            ],
            TimestampRangeOptions {
                allow_ne: true,
                ..TimestampRangeOptions::default()
            },
            &relaxed(),
        )
        .unwrap();
        assert_eq!(result.range, None);
        assert_eq!(result.eq_values, vec![1638921703000000000]);
        assert_eq!(result.ne_values, vec![1638921702000000000]);
    }

    #[test]
    fn relaxed_mode_tightest_bounds_win() {
        let result = consolidate(
            &[
                (Operator::Ne, 1638921702000000001),
                (Operator::Ne, 1638921702000000002),
                (Operator::Eq, 1638921702000000003),
                (Operator::Eq, 1638921702000000004),
                (Operator::Gt, 1638921702000000005),
                (Operator::Gte, 1638921702000000006),
                (Operator::Lt, 1638921702000000007),
                (Operator::Lte, 1638921702000000008),
            ],
            TimestampRangeOptions {
                allow_ne: true,
                ..TimestampRangeOptions::default()
            },
            &relaxed(),
        )
        .unwrap();
        assert_eq!(
            result.range,
            Some(Interval::closed(1638921702000000006, 1638921702000000006))
        );
        assert_eq!(
            result.eq_values,
            vec![1638921702000000003, 1638921702000000004]
        );
        assert_eq!(
            result.ne_values,
            vec![1638921702000000001, 1638921702000000002]
        );
    }

    #[test]
    fn empty_range_allowed_when_validation_disabled() {
        let result = consolidate(
            &[
                (Operator::Gte, 1638921702000000000),
                (Operator::Lt, 1638921702000000000),
            ],
            TimestampRangeOptions {
                validate_range: false,
                ..TimestampRangeOptions::default()
            },
            &QueryConfig::default(),
        )
        .unwrap();
        let range = result.range.unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn oversized_range_allowed_when_validation_disabled() {
        let result = consolidate(
            &[
                (Operator::Gte, 1638921702000000000),
                (Operator::Lt, 1639526502000000000),
            ],
            TimestampRangeOptions {
                validate_range: false,
                ..TimestampRangeOptions::default()
            },
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(
            result.range,
            Some(Interval::closed(1638921702000000000, 1639526501999999999))
        );
    }

    #[test]
    fn empty_filters_with_required_false() {
        let result = consolidate(
            &[],
            TimestampRangeOptions {
                required: false,
                ..TimestampRangeOptions::default()
            },
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(result, TimestampRange::default());
    }

    #[test]
    fn empty_filters_rejected_when_required() {
        let result = consolidate(
            &[],
            TimestampRangeOptions::default(),
            &QueryConfig::default(),
        );
        assert!(matches!(result, Err(QueryError::InvalidRange(_))));
    }

    #[test]
    fn strict_mode_rejections() {
        let specs: &[&[(Operator, i128)]] = &[
            // lone bound without open ranges
            &[(Operator::Gt, 1638921702000000000)],
            // bound combined with eq
            &[(Operator::Gt, 1638921702000), (Operator::Eq, 1638921702000000000)],
            // two bounds in the same direction
            &[(Operator::Gte, NS), (Operator::Gt, 1638921702000000000)],
            &[(Operator::Lt, NS), (Operator::Lte, 1638921702000000000)],
            // bound range combined with eq
            &[
                (Operator::Lt, NS),
                (Operator::Gte, 2 * NS),
                (Operator::Eq, NS),
            ],
        ];
        for filters in specs {
            let result = consolidate(
                filters,
                TimestampRangeOptions::default(),
                &QueryConfig::default(),
            );
            assert!(
                matches!(result, Err(QueryError::InvalidRange(_))),
                "{filters:?}"
            );
        }
    }

    #[test]
    fn ne_rejected_when_not_allowed() {
        let result = consolidate(
            &[(Operator::Ne, 1638921702000000000)],
            TimestampRangeOptions::default(),
            &QueryConfig::default(),
        );
        assert!(matches!(result, Err(QueryError::InvalidRange(_))));
    }

    #[test]
    fn ne_with_eq_rejected_in_strict_mode() {
        let result = consolidate(
            &[
                (Operator::Ne, 1638921702000000001),
                (Operator::Eq, 1638921702000000003),
            ],
            TimestampRangeOptions {
                allow_ne: true,
                ..TimestampRangeOptions::default()
            },
            &QueryConfig::default(),
        );
        assert!(matches!(result, Err(QueryError::InvalidRange(_))));
    }

    #[test]
    fn inverted_ranges_rejected() {
        let specs: &[&[(Operator, i128)]] = &[
            &[(Operator::Gte, 1000), (Operator::Lte, 999)],
            &[(Operator::Gte, 1000), (Operator::Lt, 1000)],
            &[(Operator::Gt, 999), (Operator::Lte, 999)],
            // (999, 1000) holds no integer nanosecond
            &[(Operator::Gt, 999), (Operator::Lt, 1000)],
        ];
        for filters in specs {
            let result = consolidate(
                filters,
                TimestampRangeOptions::default(),
                &QueryConfig::default(),
            );
            assert!(
                matches!(result, Err(QueryError::InvalidRange(_))),
                "{filters:?}"
            );
        }
    }

    #[test]
    fn oversized_ranges_rejected() {
        // every spelling of [100, 604800000000101), one past the configured max
        let specs: &[&[(Operator, i128)]] = &[
            &[(Operator::Gt, 99), (Operator::Lt, 604800000000101)],
            &[(Operator::Gte, 100), (Operator::Lt, 604800000000101)],
            &[(Operator::Gt, 99), (Operator::Lte, 604800000000100)],
            &[(Operator::Gte, 100), (Operator::Lte, 604800000000100)],
        ];
        for filters in specs {
            let result = consolidate(
                filters,
                TimestampRangeOptions::default(),
                &QueryConfig::default(),
            );
            assert!(
                matches!(result, Err(QueryError::InvalidRange(_))),
                "{filters:?}"
            );
        }
    }

    #[test]
    fn collect_from_query_params() {
        let query: QueryParams = [("timestamp", "gte:1000"), ("timestamp", "lt:2000.222")]
            .into_iter()
            .collect();
        let filters = collect_timestamp_filters(&query).unwrap();
        assert_eq!(
            filters,
            vec![(Operator::Gte, 1000000000000), (Operator::Lt, 2000222000000)]
        );

        let bad: QueryParams = [("timestamp", "gte:x")].into_iter().collect();
        assert!(matches!(
            collect_timestamp_filters(&bad),
            Err(QueryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn interval_display() {
        assert_eq!(Interval::closed(100, 200).to_string(), "[100,200]");
        assert_eq!(
            Interval::new(None, Some(200), false, true).to_string(),
            "(,200]"
        );
        assert_eq!(
            Interval::new(Some(201), None, false, false).to_string(),
            "(201,)"
        );
    }

    #[test]
    fn range_conditions_for_range_column() {
        let filters = vec![
            Filter::new(FilterKey::Timestamp, Operator::Eq, "200"),
            Filter::new(FilterKey::Timestamp, Operator::Gt, "201"),
            Filter::new(FilterKey::Timestamp, Operator::Gte, "202"),
            Filter::new(FilterKey::Timestamp, Operator::Lt, "203"),
            Filter::new(FilterKey::Timestamp, Operator::Lte, "204"),
            Filter::new(FilterKey::Timestamp, Operator::Ne, "205"),
        ];
        let (conditions, params) = timestamp_range_conditions(&filters, "e.timestamp_range");
        assert_eq!(
            conditions,
            vec![
                "e.timestamp_range && $1",
                "e.timestamp_range && $2",
                "e.timestamp_range && $3",
                "e.timestamp_range && $4",
                "e.timestamp_range && $5",
                "not e.timestamp_range @> $6",
            ]
        );
        assert_eq!(
            params,
            vec!["(,200]", "(201,)", "[202,)", "(,203)", "(,204]", "[205,205]"]
        );
    }

    #[test]
    fn range_conditions_skip_other_keys() {
        let filters = vec![Filter::new(FilterKey::Order, Operator::Eq, "asc")];
        let (conditions, params) = timestamp_range_conditions(&filters, "e.timestamp_range");
        assert!(conditions.is_empty());
        assert!(params.is_empty());
    }
}
