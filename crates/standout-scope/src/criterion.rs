//! Criterion: one `(attribute, operator, value)` filter term.
//!
//! A [`Criterion`] compares the value of a record attribute against a
//! stored value using one of the registered [`Operator`]s.

use std::fmt;

use crate::error::{Result, ScopeError};
use crate::op::Operator;
use crate::traits::Record;
use crate::value::{compare_values, literal, type_name, values_equal, Value};

/// A single filter predicate.
///
/// A criterion consists of:
/// - An attribute name (the attribute to compare)
/// - An operator (how to compare)
/// - A value (what to compare against)
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_scope::{Criterion, Operator};
///
/// let criterion = Criterion::new("author", Operator::Equal, "Ursula K. LeGuin");
/// assert!(criterion.matches(&json!({"author": "Ursula K. LeGuin"})).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    attribute: String,
    operator: Operator,
    value: Value,
}

impl Criterion {
    /// Creates a new criterion.
    ///
    /// List operators always store a list: a non-list value is wrapped in a
    /// single-element list.
    pub fn new(attribute: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Criterion {
            attribute: attribute.into(),
            operator,
            value: normalize_value(operator, value.into()),
        }
    }

    /// The attribute name to compare.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The comparison operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The value to compare against. Always a list for list operators.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns a criterion with the complement operator, keeping attribute
    /// and value.
    pub fn invert(&self) -> Criterion {
        Criterion {
            attribute: self.attribute.clone(),
            operator: self.operator.complement(),
            value: self.value.clone(),
        }
    }

    /// Evaluates this criterion against a record.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> Result<bool> {
        self.test(&record.attribute_or_null(&self.attribute))
    }

    /// Evaluates this criterion against an attribute value.
    ///
    /// Ordering operators fail with [`ScopeError::IncomparableValues`] when
    /// the attribute value and the criterion value have no common ordering.
    pub fn test(&self, actual: &Value) -> Result<bool> {
        let matched = match self.operator {
            Operator::Equal => values_equal(actual, &self.value),
            Operator::NotEqual => !values_equal(actual, &self.value),
            Operator::OneOf => self.contains(actual),
            Operator::NotOneOf => !self.contains(actual),
            Operator::Null => actual.is_null(),
            Operator::NotNull => !actual.is_null(),
            ordering_op => {
                let ordering = compare_values(actual, &self.value).ok_or_else(|| {
                    ScopeError::IncomparableValues {
                        attribute: self.attribute.clone(),
                        operator: ordering_op.as_str(),
                        actual: type_name(actual),
                        expected: type_name(&self.value),
                    }
                })?;
                ordering_op.eval_ordering(ordering)
            }
        };

        Ok(matched)
    }

    fn contains(&self, actual: &Value) -> bool {
        match &self.value {
            Value::Array(items) => items.iter().any(|item| values_equal(actual, item)),
            single => values_equal(actual, single),
        }
    }

    /// Serializes this criterion as an `[attribute, operator, value]` triple.
    pub fn as_json(&self) -> Value {
        Value::Array(vec![
            Value::from(self.attribute.as_str()),
            Value::from(self.operator.as_str()),
            self.value.clone(),
        ])
    }

    /// Decodes an `[attribute, operator, value]` triple.
    ///
    /// The operator name is resolved through the alias table, so a stored
    /// criterion with an unregistered operator fails with
    /// [`ScopeError::UnknownOperator`].
    pub fn from_json(json: &Value) -> Result<Criterion> {
        let malformed = || {
            ScopeError::MalformedScope(format!(
                "criterion must be an [attribute, operator, value] triple, got {}",
                literal(json)
            ))
        };

        let triple = json.as_array().ok_or_else(malformed)?;
        let [attribute, operator, value] = triple.as_slice() else {
            return Err(malformed());
        };
        let attribute = attribute.as_str().ok_or_else(malformed)?;
        let operator = operator.as_str().ok_or_else(malformed)?.parse::<Operator>()?;

        Ok(Criterion::new(attribute, operator, value.clone()))
    }
}

/// List operators always compare against a list.
pub(crate) fn normalize_value(operator: Operator, value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        other if operator.is_list_op() => Value::Array(vec![other]),
        other => other,
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            Value::from(self.attribute.as_str()),
            self.operator,
            literal(&self.value)
        )
    }
}
