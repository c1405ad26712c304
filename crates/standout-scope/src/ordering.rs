//! Ordering types for sorting query results.
//!
//! Provides [`Dir`] for sort direction and [`OrderBy`] for attribute-based
//! ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScopeError};
use crate::traits::Record;
use crate::value::{sort_cmp, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dir {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Dir::Asc),
            "desc" | "descending" => Ok(Dir::Desc),
            _ => Err(ScopeError::invalid_argument(format!(
                "unknown sort direction {s:?}"
            ))),
        }
    }
}

/// A single ordering clause: an attribute and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The attribute to sort by.
    pub attribute: String,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    /// Creates an ascending ordering on `attribute`.
    pub fn asc(attribute: impl Into<String>) -> Self {
        OrderBy::new(attribute, Dir::Asc)
    }

    /// Creates a descending ordering on `attribute`.
    pub fn desc(attribute: impl Into<String>) -> Self {
        OrderBy::new(attribute, Dir::Desc)
    }

    /// Creates an ordering on `attribute` in direction `dir`.
    pub fn new(attribute: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            attribute: attribute.into(),
            dir,
        }
    }

    /// Compares two attribute values according to this ordering.
    ///
    /// Nulls sort last in either direction. Values of different kinds are
    /// ranked by kind (see [`sort_cmp`]), so the result is a total order
    /// even over mixed attributes.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.dir.apply(sort_cmp(a, b)),
        }
    }
}

impl From<&str> for OrderBy {
    fn from(attribute: &str) -> Self {
        OrderBy::asc(attribute)
    }
}

impl From<String> for OrderBy {
    fn from(attribute: String) -> Self {
        OrderBy::asc(attribute)
    }
}

impl<S: Into<String>> From<(S, Dir)> for OrderBy {
    fn from((attribute, dir): (S, Dir)) -> Self {
        OrderBy::new(attribute, dir)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.dir)
    }
}

/// Compares two records using a list of ordering clauses.
///
/// Uses the first clause as the primary sort key, the second to break ties,
/// and so on. If all clauses compare equal, returns `Equal`.
pub fn compare_records<R: Record + ?Sized>(a: &R, b: &R, orderings: &[OrderBy]) -> Ordering {
    for order_by in orderings {
        let val_a = a.attribute_or_null(&order_by.attribute);
        let val_b = b.attribute_or_null(&order_by.attribute);

        let ordering = order_by.compare(&val_a, &val_b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
