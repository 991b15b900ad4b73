//! Sort specifications.

use std::cmp::Ordering;

use serde_json::Value;

use super::value::{compare_values, lookup};

/// Field sorted on when the request does not say otherwise.
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// An ordered list of sort keys; earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl Default for SortSpec {
    /// Newest first.
    fn default() -> Self {
        Self {
            keys: vec![SortKey {
                field: DEFAULT_SORT_FIELD.to_string(),
                direction: SortDirection::Descending,
            }],
        }
    }
}

impl SortSpec {
    /// Parse a comma-separated field list; a leading `-` sorts descending.
    ///
    /// Blank input yields the default sort.
    ///
    /// # Examples
    ///
    /// ```
    /// use bootcamp::query::{SortDirection, SortSpec};
    ///
    /// let spec = SortSpec::parse("-averageCost,name");
    /// assert_eq!(spec.keys()[0].field, "averageCost");
    /// assert_eq!(spec.keys()[0].direction, SortDirection::Descending);
    /// assert_eq!(spec.keys()[1].direction, SortDirection::Ascending);
    /// ```
    pub fn parse(input: &str) -> Self {
        let keys: Vec<SortKey> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "-")
            .map(|s| match s.strip_prefix('-') {
                Some(field) => SortKey {
                    field: field.to_string(),
                    direction: SortDirection::Descending,
                },
                None => SortKey {
                    field: s.strip_prefix('+').unwrap_or(s).to_string(),
                    direction: SortDirection::Ascending,
                },
            })
            .collect();

        if keys.is_empty() {
            Self::default()
        } else {
            Self { keys }
        }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Compare two documents under this specification.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for key in &self.keys {
            let ordering = compare_values(lookup(a, &key.field), lookup(b, &key.field));
            let ordering = match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
