//! Translation of URL query parameters into store queries.
//!
//! A listing request such as
//!
//! ```text
//! ?careers[in]=Business,UI/UX&averageCost[lte]=10000&select=name,averageCost&sort=-averageCost&page=2&limit=5
//! ```
//!
//! becomes a [`ListQuery`]: a typed [`Filter`], a [`Projection`], a
//! [`SortSpec`] and a [`PageRequest`].
//!
//! The reserved parameters `select`, `sort`, `page` and `limit` are consumed
//! for their own purpose. Every other parameter is a filter condition:
//!
//! - `field=value` is an exact match;
//! - `field[op]=value` applies `op` (`gt`, `gte`, `lt`, `lte`, `in`, matched
//!   case-insensitively as a whole token);
//! - `field[sub]=value` or `field.sub=value`, where `sub` is not an operator,
//!   matches the nested field `field.sub`;
//! - repeated keys merge: `in` values are unioned (each value is also split on
//!   commas), a repeated plain key becomes `in`, and repeated range operators
//!   all apply.
//!
//! # Example
//!
//! ```
//! use bootcamp::query::{ListQuery, Operator};
//!
//! let query = ListQuery::parse("averageCost[GT]=100&select=name&page=2&limit=10");
//! assert_eq!(query.filter.conditions().len(), 1);
//! assert_eq!(query.projection.fields(), ["name".to_string()]);
//! assert_eq!(query.page.start_index(), 10);
//! ```

pub mod filter;
pub mod pagination;
pub mod projection;
pub mod sort;
pub mod value;

use std::collections::HashMap;

use url::form_urlencoded;

pub use filter::{Comparison, Condition, Filter, FilterValue, Operator, SphereQuery};
pub use pagination::{PageLink, PageRequest, Pagination, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use projection::Projection;
pub use sort::{SortDirection, SortKey, SortSpec, DEFAULT_SORT_FIELD};

/// Store-level query: which documents, in which order, which window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: SortSpec,
    pub skip: u64,
    /// Maximum number of documents; `None` returns all remaining matches.
    pub limit: Option<u64>,
}

impl FindQuery {
    /// All documents matching `filter`, in default order.
    pub fn matching(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }
}

/// A fully translated listing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    pub projection: Projection,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl ListQuery {
    /// Translate a raw (percent-encoded) query string, without the leading `?`.
    pub fn parse(query_string: &str) -> Self {
        let pairs = form_urlencoded::parse(query_string.trim_start_matches('?').as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()));
        Self::from_pairs(pairs)
    }

    /// Translate already-decoded key/value pairs, in request order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut select: Vec<String> = Vec::new();
        let mut sort: Vec<String> = Vec::new();
        let mut page: Option<String> = None;
        let mut limit: Option<String> = None;
        let mut builder = FilterBuilder::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "select" => select.push(value.to_string()),
                "sort" => sort.push(value.to_string()),
                "page" => page = Some(value.to_string()),
                "limit" => limit = Some(value.to_string()),
                _ => builder.add(key, value),
            }
        }

        let query = Self {
            filter: builder.build(),
            projection: Projection::parse(&select.join(",")),
            sort: SortSpec::parse(&sort.join(",")),
            page: PageRequest::parse(page.as_deref(), limit.as_deref()),
        };
        tracing::debug!(
            conditions = query.filter.conditions().len(),
            page = query.page.page,
            limit = query.page.limit,
            "Translated list query"
        );
        query
    }

    /// The store query for this request's page.
    pub fn find_query(&self) -> FindQuery {
        FindQuery {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            skip: self.page.start_index(),
            limit: Some(self.page.limit),
        }
    }
}

/// Split a query key into a field path and an optional operator.
///
/// `averageCost[lte]` → (`averageCost`, `Lte`), `location[state]` →
/// (`location.state`, `Eq`), `careers[]` → (`careers`, `Eq`).
fn parse_key(key: &str) -> (String, Operator) {
    let (base, mut rest) = match key.find('[') {
        Some(idx) if key.ends_with(']') => (&key[..idx], &key[idx..]),
        _ => return (key.to_string(), Operator::Eq),
    };

    let mut segments: Vec<&str> = base.split('.').filter(|s| !s.is_empty()).collect();
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(end) = stripped.find(']') else {
            break;
        };
        let segment = &stripped[..end];
        if !segment.is_empty() {
            segments.push(segment);
        }
        rest = &stripped[end + 1..];
    }

    let operator = match segments.last().and_then(|s| Operator::from_keyword(s)) {
        Some(op) if segments.len() > 1 => {
            segments.pop();
            op
        }
        _ => Operator::Eq,
    };

    (segments.join("."), operator)
}

/// Accumulates conditions, merging repeated keys.
#[derive(Default)]
struct FilterBuilder {
    order: Vec<(String, Operator)>,
    values: HashMap<(String, Operator), Vec<String>>,
}

impl FilterBuilder {
    fn add(&mut self, key: &str, value: &str) {
        let (field, operator) = parse_key(key);
        if field.is_empty() {
            return;
        }
        let slot = (field, operator);
        if !self.values.contains_key(&slot) {
            self.order.push(slot.clone());
        }
        self.values.entry(slot).or_default().push(value.to_string());
    }

    fn build(mut self) -> Filter {
        let mut filter = Filter::new();
        for slot in self.order {
            let values = self.values.remove(&slot).unwrap_or_default();
            let (field, operator) = slot;
            match operator {
                Operator::In => {
                    let list = values
                        .iter()
                        .flat_map(|v| v.split(','))
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                        .collect();
                    filter = filter.compare(field, Operator::In, FilterValue::List(list));
                }
                Operator::Eq if values.len() > 1 => {
                    filter = filter.compare(field, Operator::In, FilterValue::List(values));
                }
                _ => {
                    for value in values {
                        filter = filter.compare(field.clone(), operator, FilterValue::Text(value));
                    }
                }
            }
        }
        filter
    }
}
