//! The record seam between scopes and the data they filter.
//!
//! The in-memory evaluator reads attributes through [`Record`]. It is
//! implemented for the common map shapes; other types implement it by hand.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::value::Value;

/// Trait for items that can be filtered by a scope.
///
/// # Manual Implementation
///
/// ```
/// use std::borrow::Cow;
/// use standout_scope::{Record, Value};
///
/// struct Book {
///     title: String,
///     series: Option<String>,
/// }
///
/// impl Record for Book {
///     fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
///         match name {
///             "title" => Some(Cow::Owned(Value::from(self.title.as_str()))),
///             "series" => self.series.as_deref().map(|s| Cow::Owned(Value::from(s))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of an attribute, or `None` if the record has no
    /// such attribute. A missing attribute is treated as `null`.
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>>;

    /// Returns the attribute value, substituting `null` when it is missing.
    fn attribute_or_null(&self, name: &str) -> Cow<'_, Value> {
        self.attribute(name).unwrap_or(Cow::Owned(Value::Null))
    }
}

impl Record for serde_json::Map<String, Value> {
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl Record for Value {
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        match self {
            Value::Object(map) => map.attribute(name),
            _ => None,
        }
    }
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl Record for BTreeMap<String, Value> {
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.get(name).map(Cow::Borrowed)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn attribute(&self, name: &str) -> Option<Cow<'_, Value>> {
        (**self).attribute(name)
    }
}
