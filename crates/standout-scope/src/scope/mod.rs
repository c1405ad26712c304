//! Scopes: immutable, backend-independent predicates over records.
//!
//! A [`Scope`] is one of a closed set of variants:
//!
//! | Variant | Matches |
//! |---------|---------|
//! | `All` | every record |
//! | `None` | no record |
//! | `Null` | every record (marker for "no scope configured yet") |
//! | `Criteria` | every criterion holds, or any complemented criterion holds when inverted |
//! | `Conjunction` | every child scope matches |
//! | `Disjunction` | any child scope matches |
//!
//! Scopes are cheap to clone: a clone shares the same instance, which is
//! what the identity and absorption shortcuts in [`Scope::and`] and
//! [`Scope::or`] hand back. Use [`Scope::ptr_eq`] to observe that.

mod compose;
mod display;
mod json;

use std::fmt;
use std::sync::Arc;

use crate::criterion::Criterion;
use crate::error::Result;
use crate::evaluator;
use crate::traits::Record;

/// Discriminator tag of a scope variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeType {
    All,
    None,
    Null,
    Criteria,
    Conjunction,
    Disjunction,
}

impl ScopeType {
    /// Returns the serialized tag of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeType::All => "all",
            ScopeType::None => "none",
            ScopeType::Null => "null",
            ScopeType::Criteria => "criteria",
            ScopeType::Conjunction => "conjunction",
            ScopeType::Disjunction => "disjunction",
        }
    }

    /// Returns the type name used in debug output.
    pub fn type_name(self) -> &'static str {
        match self {
            ScopeType::All => "AllScope",
            ScopeType::None => "NoneScope",
            ScopeType::Null => "NullScope",
            ScopeType::Criteria => "CriteriaScope",
            ScopeType::Conjunction => "ConjunctionScope",
            ScopeType::Disjunction => "DisjunctionScope",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered list of criteria combined with AND, or with OR when inverted.
///
/// An inverted criteria scope stores the complement of each original
/// criterion, so inversion is De Morgan pushed down to the criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaScope {
    criteria: Vec<Criterion>,
    inverted: bool,
}

impl CriteriaScope {
    /// Returns the criteria in insertion order.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Returns `true` if the criteria are combined with OR.
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Returns the number of criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns `true` if there are no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// The variant held by a [`Scope`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeKind {
    All,
    None,
    Null,
    Criteria(CriteriaScope),
    Conjunction(Vec<Scope>),
    Disjunction(Vec<Scope>),
}

/// An immutable predicate over records.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_scope::{Criterion, Operator, Scope};
///
/// let by_author = Scope::criteria([Criterion::new("author", Operator::Equal, "Ursula K. LeGuin")]);
/// let in_series = Scope::criteria([Criterion::new("series", Operator::NotNull, json!(null))]);
///
/// let scope = by_author.or(&in_series);
/// assert_eq!(scope.children().map(<[Scope]>::len), Some(2));
///
/// let books = vec![
///     json!({"title": "A Wizard of Earthsea", "author": "Ursula K. LeGuin", "series": "Earthsea"}),
///     json!({"title": "Dune", "author": "Frank Herbert", "series": "Dune"}),
///     json!({"title": "The Word for World is Forest", "author": "Ursula K. LeGuin", "series": null}),
///     json!({"title": "Hyperion", "author": "Dan Simmons", "series": null}),
/// ];
/// assert_eq!(scope.evaluate(&books).unwrap().len(), 3);
/// assert_eq!(scope.invert().evaluate(&books).unwrap(), vec![&books[3]]);
/// ```
#[derive(Clone)]
pub struct Scope {
    node: Arc<ScopeKind>,
}

impl Scope {
    fn from_kind(kind: ScopeKind) -> Self {
        Scope {
            node: Arc::new(kind),
        }
    }

    /// A scope matching every record.
    pub fn all() -> Self {
        Scope::from_kind(ScopeKind::All)
    }

    /// A scope matching no record.
    pub fn none() -> Self {
        Scope::from_kind(ScopeKind::None)
    }

    /// The "no scope configured yet" marker. Evaluates like [`Scope::all`].
    pub fn null() -> Self {
        Scope::from_kind(ScopeKind::Null)
    }

    /// A criteria scope combining the criteria with AND.
    pub fn criteria(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        Scope::from_criteria(criteria, false)
    }

    /// A criteria scope with an explicit inverted flag.
    ///
    /// When `inverted` is `true` the criteria are expected to already carry
    /// complemented operators and are combined with OR.
    pub fn from_criteria(criteria: impl IntoIterator<Item = Criterion>, inverted: bool) -> Self {
        Scope::from_kind(ScopeKind::Criteria(CriteriaScope {
            criteria: criteria.into_iter().collect(),
            inverted,
        }))
    }

    /// A conjunction (AND) of child scopes.
    pub fn conjunction(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Scope::from_kind(ScopeKind::Conjunction(scopes.into_iter().collect()))
    }

    /// A disjunction (OR) of child scopes.
    pub fn disjunction(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Scope::from_kind(ScopeKind::Disjunction(scopes.into_iter().collect()))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the variant of this scope.
    pub fn kind(&self) -> &ScopeKind {
        &self.node
    }

    /// Returns the discriminator tag of this scope.
    pub fn scope_type(&self) -> ScopeType {
        match self.kind() {
            ScopeKind::All => ScopeType::All,
            ScopeKind::None => ScopeType::None,
            ScopeKind::Null => ScopeType::Null,
            ScopeKind::Criteria(_) => ScopeType::Criteria,
            ScopeKind::Conjunction(_) => ScopeType::Conjunction,
            ScopeKind::Disjunction(_) => ScopeType::Disjunction,
        }
    }

    /// Returns `true` if a criteria or composite scope has no criteria or
    /// children. Leaf scopes (`All`, `None`, `Null`) are never empty.
    pub fn is_empty(&self) -> bool {
        match self.kind() {
            ScopeKind::All | ScopeKind::None | ScopeKind::Null => false,
            ScopeKind::Criteria(criteria) => criteria.is_empty(),
            ScopeKind::Conjunction(children) | ScopeKind::Disjunction(children) => {
                children.is_empty()
            }
        }
    }

    /// Returns the criteria of a criteria scope.
    pub fn criteria_list(&self) -> Option<&[Criterion]> {
        match self.kind() {
            ScopeKind::Criteria(criteria) => Some(criteria.criteria()),
            _ => None,
        }
    }

    /// Returns `true` for an inverted criteria scope.
    pub fn is_inverted(&self) -> bool {
        matches!(self.kind(), ScopeKind::Criteria(criteria) if criteria.is_inverted())
    }

    /// Returns the children of a conjunction or disjunction.
    pub fn children(&self) -> Option<&[Scope]> {
        match self.kind() {
            ScopeKind::Conjunction(children) | ScopeKind::Disjunction(children) => Some(children),
            _ => None,
        }
    }

    /// Returns `true` if both handles refer to the same scope instance.
    pub fn ptr_eq(a: &Scope, b: &Scope) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }

    // ========================================================================
    // Inversion
    // ========================================================================

    /// Returns the logical negation of this scope.
    ///
    /// - `All` and `None` swap; `Null` becomes `None`.
    /// - A criteria scope toggles its inverted flag and complements the
    ///   operator of every criterion.
    /// - Conjunctions and disjunctions swap, inverting every child.
    pub fn invert(&self) -> Scope {
        match self.kind() {
            ScopeKind::All | ScopeKind::Null => Scope::none(),
            ScopeKind::None => Scope::all(),
            ScopeKind::Criteria(criteria) => Scope::from_criteria(
                criteria.criteria.iter().map(Criterion::invert),
                !criteria.inverted,
            ),
            ScopeKind::Conjunction(children) => {
                Scope::disjunction(children.iter().map(Scope::invert))
            }
            ScopeKind::Disjunction(children) => {
                Scope::conjunction(children.iter().map(Scope::invert))
            }
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Tests if a single record matches this scope.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> Result<bool> {
        evaluator::matches(self, record)
    }

    /// Returns references to the records matching this scope, in input order.
    pub fn evaluate<'a, T: Record>(&self, records: &'a [T]) -> Result<Vec<&'a T>> {
        evaluator::evaluate(self, records)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::null()
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Scope::ptr_eq(self, other) || self.node == other.node
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.kind(), f)
    }
}
