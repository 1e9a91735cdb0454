//! SQL placeholder rendering
//!
//! The engine emits `?` placeholders; the Postgres query layer renders them
//! into `$n` form just before execution.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Render `?` placeholders into Postgres `$n` form.
///
/// Supports the named form `?name`: every occurrence of the same name shares
/// the index assigned at its first occurrence, so one bound value can back
/// several comparisons.
pub fn to_postgres_placeholders(sql: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\?([a-zA-Z][a-zA-Z0-9]*)?").expect("Invalid regex"));

    let mut next = 0usize;
    let mut named: HashMap<String, usize> = HashMap::new();
    re.replace_all(sql, |caps: &Captures<'_>| {
        let index = match caps.get(1) {
            Some(name) => *named.entry(name.as_str().to_string()).or_insert_with(|| {
                next += 1;
                next
            }),
            None => {
                next += 1;
                next
            }
        };
        format!("${index}")
    })
    .into_owned()
}
