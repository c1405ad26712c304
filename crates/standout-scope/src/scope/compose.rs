//! Composition of scopes with AND, OR and NOT.
//!
//! Composition never mutates its operands. When one operand is an identity
//! or absorbing element for the combinator, the result is the other
//! operand's exact instance (or the absorbing one), not a copy.
//!
//! Rules for `and`:
//! - `x AND identity → x`, `identity AND x → x`
//! - `x AND absorbing → absorbing`, `absorbing AND x → absorbing`
//! - `criteria AND criteria → criteria` (both non-inverted, lists merged)
//! - `AND(a, b) AND AND(c) → AND(a, b, c)`, and conjunctions absorb a
//!   single non-conjunction operand on either side
//! - otherwise `AND(x, y)`
//!
//! `or` is the dual, merging inverted criteria scopes and flattening
//! disjunctions.

use super::{CriteriaScope, Scope, ScopeKind};
use crate::error::Result;
use crate::query::Filter;

impl Scope {
    /// `true` for scopes that leave the other operand of an AND unchanged.
    fn is_and_identity(&self) -> bool {
        match self.kind() {
            ScopeKind::All | ScopeKind::Null => true,
            ScopeKind::Criteria(criteria) => criteria.is_empty() && !criteria.is_inverted(),
            ScopeKind::Conjunction(children) => children.is_empty(),
            _ => false,
        }
    }

    /// `true` for scopes that match nothing, so they absorb an AND.
    fn is_and_absorbing(&self) -> bool {
        match self.kind() {
            ScopeKind::None => true,
            ScopeKind::Criteria(criteria) => criteria.is_empty() && criteria.is_inverted(),
            ScopeKind::Disjunction(children) => children.is_empty(),
            _ => false,
        }
    }

    fn is_or_identity(&self) -> bool {
        matches!(self.kind(), ScopeKind::Null) || self.is_and_absorbing()
    }

    fn is_or_absorbing(&self) -> bool {
        !matches!(self.kind(), ScopeKind::Null) && self.is_and_identity()
    }

    /// Returns a scope matching records matched by both scopes.
    pub fn and(&self, other: &Scope) -> Scope {
        if other.is_and_identity() {
            return self.clone();
        }
        if self.is_and_identity() {
            return other.clone();
        }
        if other.is_and_absorbing() {
            return other.clone();
        }
        if self.is_and_absorbing() {
            return self.clone();
        }

        match (self.kind(), other.kind()) {
            (ScopeKind::Criteria(left), ScopeKind::Criteria(right))
                if !left.is_inverted() && !right.is_inverted() =>
            {
                merge_criteria(left, right, false)
            }
            (ScopeKind::Conjunction(left), ScopeKind::Conjunction(right)) => {
                Scope::conjunction(left.iter().chain(right).cloned())
            }
            (ScopeKind::Conjunction(left), _) => {
                Scope::conjunction(left.iter().cloned().chain([other.clone()]))
            }
            (_, ScopeKind::Conjunction(right)) => {
                Scope::conjunction([self.clone()].into_iter().chain(right.iter().cloned()))
            }
            _ => Scope::conjunction([self.clone(), other.clone()]),
        }
    }

    /// Returns a scope matching records matched by either scope.
    pub fn or(&self, other: &Scope) -> Scope {
        if other.is_or_identity() {
            return self.clone();
        }
        if self.is_or_identity() {
            return other.clone();
        }
        if other.is_or_absorbing() {
            return other.clone();
        }
        if self.is_or_absorbing() {
            return self.clone();
        }

        match (self.kind(), other.kind()) {
            (ScopeKind::Criteria(left), ScopeKind::Criteria(right))
                if left.is_inverted() && right.is_inverted() =>
            {
                merge_criteria(left, right, true)
            }
            (ScopeKind::Disjunction(left), ScopeKind::Disjunction(right)) => {
                Scope::disjunction(left.iter().chain(right).cloned())
            }
            (ScopeKind::Disjunction(left), _) => {
                Scope::disjunction(left.iter().cloned().chain([other.clone()]))
            }
            (_, ScopeKind::Disjunction(right)) => {
                Scope::disjunction([self.clone()].into_iter().chain(right.iter().cloned()))
            }
            _ => Scope::disjunction([self.clone(), other.clone()]),
        }
    }

    /// Returns a scope matching records matched by this scope but not by
    /// `other`. Equivalent to `self.and(&other.invert())`.
    pub fn not(&self, other: &Scope) -> Scope {
        self.and(&other.invert())
    }

    /// Parses `filter` and ANDs the resulting scope onto this one.
    ///
    /// ```
    /// use standout_scope::{Hash, Scope};
    ///
    /// let scope = Scope::null().and_where(Hash::new().with("title", "Dune")).unwrap();
    /// assert_eq!(scope.to_string(), "CriteriaScope (1):\n- \"title\" equal \"Dune\"");
    /// ```
    pub fn and_where(&self, filter: impl Into<Filter>) -> Result<Scope> {
        Ok(self.and(&filter.into().into_scope()?))
    }

    /// Parses `filter` and ORs the resulting scope onto this one.
    pub fn or_where(&self, filter: impl Into<Filter>) -> Result<Scope> {
        Ok(self.or(&filter.into().into_scope()?))
    }

    /// Parses `filter` and ANDs its inversion onto this one.
    pub fn not_where(&self, filter: impl Into<Filter>) -> Result<Scope> {
        Ok(self.not(&filter.into().into_scope()?))
    }
}

fn merge_criteria(left: &CriteriaScope, right: &CriteriaScope, inverted: bool) -> Scope {
    Scope::from_criteria(
        left.criteria().iter().chain(right.criteria()).cloned(),
        inverted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::Criterion;
    use crate::op::Operator;

    fn criteria(attribute: &str, value: i64) -> Scope {
        Scope::criteria([Criterion::new(attribute, Operator::Equal, value)])
    }

    fn samples() -> Vec<Scope> {
        vec![
            Scope::all(),
            Scope::none(),
            Scope::null(),
            Scope::criteria([]),
            criteria("x", 1),
            criteria("x", 1).invert(),
            Scope::conjunction([criteria("a", 1), criteria("b", 2).invert()]),
            Scope::disjunction([criteria("a", 1), criteria("b", 2).invert()]),
        ]
    }

    #[test]
    fn and_with_identity_returns_same_instance() {
        for scope in samples() {
            assert!(Scope::ptr_eq(&scope.and(&Scope::all()), &scope), "{scope:?}");
            assert!(Scope::ptr_eq(&scope.and(&Scope::null()), &scope), "{scope:?}");
            assert!(Scope::ptr_eq(&scope.and(&Scope::criteria([])), &scope), "{scope:?}");
            assert!(Scope::ptr_eq(&scope.and(&Scope::conjunction([])), &scope), "{scope:?}");
        }
    }

    #[test]
    fn or_with_identity_returns_same_instance() {
        for scope in samples() {
            assert!(Scope::ptr_eq(&scope.or(&Scope::none()), &scope), "{scope:?}");
            assert!(Scope::ptr_eq(&scope.or(&Scope::null()), &scope), "{scope:?}");
            assert!(Scope::ptr_eq(&scope.or(&Scope::disjunction([])), &scope), "{scope:?}");
        }
    }

    #[test]
    fn absorbing_operands() {
        let none = Scope::none();
        let all = Scope::all();

        for scope in samples() {
            if !scope.is_and_identity() {
                assert!(Scope::ptr_eq(&scope.and(&none), &none), "{scope:?}");
            }
            if !scope.is_or_identity() {
                assert!(Scope::ptr_eq(&scope.or(&all), &all), "{scope:?}");
            }
        }

        assert!(Scope::ptr_eq(&Scope::all().and(&none), &none));
        assert!(Scope::ptr_eq(&Scope::none().or(&all), &all));
        assert!(Scope::ptr_eq(&none.and(&criteria("x", 1)), &none));
        assert!(Scope::ptr_eq(&all.or(&criteria("x", 1)), &all));
    }

    #[test]
    fn empty_criteria_is_and_identity() {
        let empty = Scope::criteria([]);
        let scope = criteria("x", 1);

        assert!(Scope::ptr_eq(&empty.and(&scope), &scope));
        assert!(Scope::ptr_eq(&scope.and(&empty), &scope));
        // ... and absorbs an OR
        assert!(Scope::ptr_eq(&scope.or(&empty), &empty));
    }

    #[test]
    fn empty_inverted_criteria_is_or_identity() {
        let empty = Scope::criteria([]).invert();
        let scope = criteria("x", 1);

        assert!(Scope::ptr_eq(&scope.or(&empty), &scope));
        assert!(Scope::ptr_eq(&scope.and(&empty), &empty));
    }

    #[test]
    fn and_merges_criteria() {
        let left = criteria("x", 1);
        let right = criteria("y", 2);

        let merged = left.and(&right);
        assert_eq!(
            merged,
            Scope::criteria([
                Criterion::new("x", Operator::Equal, 1),
                Criterion::new("y", Operator::Equal, 2),
            ])
        );
    }

    #[test]
    fn or_merges_inverted_criteria() {
        let left = criteria("x", 1).invert();
        let right = criteria("y", 2).invert();

        assert_eq!(
            left.or(&right),
            Scope::from_criteria(
                [
                    Criterion::new("x", Operator::NotEqual, 1),
                    Criterion::new("y", Operator::NotEqual, 2),
                ],
                true
            )
        );
    }

    #[test]
    fn mismatched_criteria_are_wrapped() {
        let left = criteria("x", 1);
        let right = criteria("y", 2);

        let or = left.or(&right);
        assert_eq!(or.scope_type(), crate::scope::ScopeType::Disjunction);
        let children = or.children().unwrap();
        assert!(Scope::ptr_eq(&children[0], &left));
        assert!(Scope::ptr_eq(&children[1], &right));

        let inverted = right.invert();
        let and = left.and(&inverted);
        assert_eq!(and, Scope::conjunction([left.clone(), inverted.clone()]));
    }

    #[test]
    fn conjunctions_flatten() {
        let (a, b, c) = (criteria("a", 1), criteria("b", 2), criteria("c", 3));
        let ab = Scope::conjunction([a.clone(), b.clone()]);

        assert_eq!(ab.and(&c), Scope::conjunction([a.clone(), b.clone(), c.clone()]));
        assert_eq!(c.and(&ab), Scope::conjunction([c.clone(), a.clone(), b.clone()]));

        let cd = Scope::conjunction([c.clone(), criteria("d", 4)]);
        assert_eq!(
            ab.and(&cd),
            Scope::conjunction([a, b, c, criteria("d", 4)])
        );
    }

    #[test]
    fn disjunctions_flatten() {
        let (a, b, c) = (criteria("a", 1), criteria("b", 2), criteria("c", 3));
        let ab = Scope::disjunction([a.clone(), b.clone()]);

        assert_eq!(ab.or(&c), Scope::disjunction([a.clone(), b.clone(), c.clone()]));
        assert_eq!(c.or(&ab), Scope::disjunction([c.clone(), a.clone(), b.clone()]));
        assert_eq!(
            ab.or(&Scope::disjunction([c.clone()])),
            Scope::disjunction([a, b, c])
        );
    }

    #[test]
    fn mixed_composites_nest() {
        let (a, b, c) = (criteria("a", 1), criteria("b", 2), criteria("c", 3));
        let ab = Scope::disjunction([a, b]);

        assert_eq!(ab.and(&c), Scope::conjunction([ab.clone(), c.clone()]));
    }

    #[test]
    fn not_ands_the_inversion() {
        let left = criteria("x", 1);
        let right = criteria("y", 2);

        assert_eq!(left.not(&right), left.and(&right.invert()));
        assert_eq!(Scope::all().not(&right), right.invert());
        assert!(Scope::ptr_eq(&left.not(&Scope::none()), &left));
    }

    #[test]
    fn composition_does_not_mutate_operands() {
        let left = criteria("x", 1);
        let right = criteria("y", 2);
        let before = (left.clone(), right.clone());

        let _ = left.and(&right);
        let _ = left.or(&right);
        let _ = left.not(&right);

        assert_eq!((left, right), before);
    }
}
