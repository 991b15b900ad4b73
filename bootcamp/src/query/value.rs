//! Comparison of stored JSON values against each other and against
//! query-string text.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Resolve a dotted field path (`location.state`) inside a document.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Compare a stored scalar with query text, coercing the text to the
/// stored value's type.
///
/// Returns `None` when the two cannot be compared (e.g. a number field
/// against `"abc"`), which never satisfies a condition.
pub fn compare_with_text(stored: &Value, text: &str) -> Option<Ordering> {
    match stored {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs: f64 = text.trim().parse().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::Bool(b) => {
            let rhs = if text.eq_ignore_ascii_case("true") {
                true
            } else if text.eq_ignore_ascii_case("false") {
                false
            } else {
                return None;
            };
            Some(b.cmp(&rhs))
        }
        Value::String(s) => match (parse_timestamp(s), parse_timestamp(text)) {
            (Some(lhs), Some(rhs)) => Some(lhs.cmp(&rhs)),
            _ => Some(s.as_str().cmp(text)),
        },
        _ => None,
    }
}

/// Rank of a value's type in the total order used for sorting.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over optional stored values, used by sorting.
///
/// Missing and `null` values sort first; different types sort by type rank;
/// arrays compare by their first element. Strings that parse as timestamps
/// sort before all other strings and compare chronologically, with equal
/// instants ordered by their text.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (ra, rb) = (type_rank(a), type_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(tx), Some(ty)) => tx.cmp(&ty).then_with(|| x.cmp(y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => compare_values(x.first(), y.first()),
        _ => Ordering::Equal,
    }
}
