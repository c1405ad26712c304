//! The operator registry.
//!
//! [`Operator`] is the closed set of canonical comparison operators. Every
//! DSL alias resolves through a single table, and every operator has a
//! registered complement used when a criteria scope is inverted.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::{Result, ScopeError};

/// Canonical comparison operator for a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Value equality.
    Equal,
    /// Value inequality.
    NotEqual,
    /// Strictly greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanOrEqualTo,
    /// Strictly less than.
    LessThan,
    /// Less than or equal to.
    LessThanOrEqualTo,
    /// Membership in a list of values.
    OneOf,
    /// Absence from a list of values.
    NotOneOf,
    /// Attribute is null or missing.
    Null,
    /// Attribute is present and not null.
    NotNull,
}

/// Alias table used by the DSL and by name-based lookup.
const ALIASES: &[(&str, Operator)] = &[
    ("eq", Operator::Equal),
    ("equal", Operator::Equal),
    ("equals", Operator::Equal),
    ("ne", Operator::NotEqual),
    ("not_equal", Operator::NotEqual),
    ("gt", Operator::GreaterThan),
    ("greater_than", Operator::GreaterThan),
    ("gte", Operator::GreaterThanOrEqualTo),
    ("greater_than_or_equal_to", Operator::GreaterThanOrEqualTo),
    ("lt", Operator::LessThan),
    ("less_than", Operator::LessThan),
    ("lte", Operator::LessThanOrEqualTo),
    ("less_than_or_equal_to", Operator::LessThanOrEqualTo),
    ("one_of", Operator::OneOf),
    ("not_one_of", Operator::NotOneOf),
    ("null", Operator::Null),
    ("not_null", Operator::NotNull),
];

impl Operator {
    /// Every canonical operator, in registry order.
    pub const ALL: [Operator; 10] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqualTo,
        Operator::LessThan,
        Operator::LessThanOrEqualTo,
        Operator::OneOf,
        Operator::NotOneOf,
        Operator::Null,
        Operator::NotNull,
    ];

    /// Resolves a DSL alias or canonical name to its operator.
    pub fn lookup(name: &str) -> Result<Operator> {
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, op)| *op)
            .ok_or_else(|| ScopeError::unknown_operator(name))
    }

    /// Returns every alias registered for this operator.
    pub fn aliases(self) -> impl Iterator<Item = &'static str> {
        ALIASES
            .iter()
            .filter(move |(_, op)| *op == self)
            .map(|(alias, _)| *alias)
    }

    /// Returns the operator representing the logical negation of this one.
    pub fn complement(self) -> Operator {
        match self {
            Operator::Equal => Operator::NotEqual,
            Operator::NotEqual => Operator::Equal,
            Operator::GreaterThan => Operator::LessThanOrEqualTo,
            Operator::LessThanOrEqualTo => Operator::GreaterThan,
            Operator::GreaterThanOrEqualTo => Operator::LessThan,
            Operator::LessThan => Operator::GreaterThanOrEqualTo,
            Operator::OneOf => Operator::NotOneOf,
            Operator::NotOneOf => Operator::OneOf,
            Operator::Null => Operator::NotNull,
            Operator::NotNull => Operator::Null,
        }
    }

    /// Returns `true` if this operator takes a list of values.
    pub fn is_list_op(self) -> bool {
        matches!(self, Operator::OneOf | Operator::NotOneOf)
    }

    /// Returns `true` if this operator needs an ordered comparison.
    pub fn is_ordering_op(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanOrEqualTo
                | Operator::LessThan
                | Operator::LessThanOrEqualTo
        )
    }

    /// Returns `true` if this operator ignores its value.
    pub fn is_presence_op(self) -> bool {
        matches!(self, Operator::Null | Operator::NotNull)
    }

    /// Evaluates an ordering operator given the ordering of the attribute
    /// value relative to the criterion value.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanOrEqualTo => ordering != Ordering::Less,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanOrEqualTo => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the canonical name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::GreaterThan => "greater_than",
            Operator::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            Operator::LessThan => "less_than",
            Operator::LessThanOrEqualTo => "less_than_or_equal_to",
            Operator::OneOf => "one_of",
            Operator::NotOneOf => "not_one_of",
            Operator::Null => "null",
            Operator::NotNull => "not_null",
        }
    }
}

impl FromStr for Operator {
    type Err = ScopeError;

    fn from_str(name: &str) -> Result<Self> {
        Operator::lookup(name)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("eq", Operator::Equal)]
    #[case("equal", Operator::Equal)]
    #[case("equals", Operator::Equal)]
    #[case("ne", Operator::NotEqual)]
    #[case("not_equal", Operator::NotEqual)]
    #[case("gt", Operator::GreaterThan)]
    #[case("greater_than", Operator::GreaterThan)]
    #[case("gte", Operator::GreaterThanOrEqualTo)]
    #[case("greater_than_or_equal_to", Operator::GreaterThanOrEqualTo)]
    #[case("lt", Operator::LessThan)]
    #[case("less_than", Operator::LessThan)]
    #[case("lte", Operator::LessThanOrEqualTo)]
    #[case("less_than_or_equal_to", Operator::LessThanOrEqualTo)]
    #[case("one_of", Operator::OneOf)]
    #[case("not_one_of", Operator::NotOneOf)]
    #[case("null", Operator::Null)]
    #[case("not_null", Operator::NotNull)]
    fn alias_lookup(#[case] alias: &str, #[case] expected: Operator) {
        assert_eq!(Operator::lookup(alias).unwrap(), expected);
        assert_eq!(alias.parse::<Operator>().unwrap(), expected);
    }

    #[test]
    fn canonical_names_resolve_to_themselves() {
        for op in Operator::ALL {
            assert_eq!(Operator::lookup(op.as_str()).unwrap(), op);
            assert!(op.aliases().any(|alias| alias == op.as_str()));
        }
    }

    #[test]
    fn unknown_alias_fails_lookup() {
        let error = Operator::lookup("random").unwrap_err();
        match error {
            ScopeError::UnknownOperator { name, source } => {
                assert_eq!(name, "random");
                assert_eq!(source.0, "random");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn complements_are_involutions() {
        for op in Operator::ALL {
            assert_ne!(op.complement(), op);
            assert_eq!(op.complement().complement(), op);
        }
        assert_eq!(Operator::GreaterThan.complement(), Operator::LessThanOrEqualTo);
        assert_eq!(Operator::GreaterThanOrEqualTo.complement(), Operator::LessThan);
    }

    #[test]
    fn op_eval_ordering() {
        assert!(Operator::GreaterThan.eval_ordering(Ordering::Greater));
        assert!(!Operator::GreaterThan.eval_ordering(Ordering::Equal));
        assert!(Operator::GreaterThanOrEqualTo.eval_ordering(Ordering::Equal));
        assert!(!Operator::GreaterThanOrEqualTo.eval_ordering(Ordering::Less));
        assert!(Operator::LessThan.eval_ordering(Ordering::Less));
        assert!(!Operator::LessThan.eval_ordering(Ordering::Equal));
        assert!(Operator::LessThanOrEqualTo.eval_ordering(Ordering::Equal));
        assert!(!Operator::LessThanOrEqualTo.eval_ordering(Ordering::Greater));

        // Complements partition every ordering
        for ordering in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
            for op in Operator::ALL.into_iter().filter(|op| op.is_ordering_op()) {
                assert_ne!(
                    op.eval_ordering(ordering),
                    op.complement().eval_ordering(ordering)
                );
            }
        }
    }

    #[test]
    fn op_display() {
        assert_eq!(Operator::Equal.to_string(), "equal");
        assert_eq!(Operator::NotOneOf.to_string(), "not_one_of");
    }
}
