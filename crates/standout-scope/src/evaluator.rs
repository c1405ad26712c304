//! In-memory evaluation of scopes and queries.
//!
//! Every function here is a pure pass over a record slice. Criteria are
//! tested left to right and composites short-circuit, so the first failing
//! comparison is the error that surfaces.

use std::slice;

use tracing::trace;

use crate::error::Result;
use crate::ordering::compare_records;
use crate::query::Query;
use crate::scope::{Scope, ScopeKind};
use crate::traits::Record;

/// Tests if a single record matches `scope`.
pub fn matches<R: Record + ?Sized>(scope: &Scope, record: &R) -> Result<bool> {
    match scope.kind() {
        ScopeKind::All | ScopeKind::Null => Ok(true),
        ScopeKind::None => Ok(false),
        ScopeKind::Criteria(criteria) if criteria.is_inverted() => {
            any(criteria.criteria(), |criterion| criterion.matches(record))
        }
        ScopeKind::Criteria(criteria) => {
            all(criteria.criteria(), |criterion| criterion.matches(record))
        }
        ScopeKind::Conjunction(children) => all(children, |child| matches(child, record)),
        ScopeKind::Disjunction(children) => any(children, |child| matches(child, record)),
    }
}

fn all<T>(items: &[T], mut test: impl FnMut(&T) -> Result<bool>) -> Result<bool> {
    for item in items {
        if !test(item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any<T>(items: &[T], mut test: impl FnMut(&T) -> Result<bool>) -> Result<bool> {
    for item in items {
        if test(item)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Lazy iterator over the records matching a scope.
///
/// Yields `Err` for a record whose evaluation fails; iteration may continue
/// past it.
#[derive(Debug, Clone)]
pub struct Matching<'a, T> {
    scope: Scope,
    records: slice::Iter<'a, T>,
}

impl<'a, T: Record> Iterator for Matching<'a, T> {
    type Item = Result<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.records.by_ref() {
            match matches(&self.scope, record) {
                Ok(true) => return Some(Ok(record)),
                Ok(false) => continue,
                Err(error) => return Some(Err(error)),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.records.size_hint().1)
    }
}

/// Returns a lazy iterator over the records matching `scope`, in input order.
pub fn filter<'a, T: Record>(scope: &Scope, records: &'a [T]) -> Matching<'a, T> {
    trace!(scope = %scope.scope_type(), records = records.len(), "filtering records");
    Matching {
        scope: scope.clone(),
        records: records.iter(),
    }
}

/// Returns references to the records matching `scope`, in input order.
pub fn evaluate<'a, T: Record>(scope: &Scope, records: &'a [T]) -> Result<Vec<&'a T>> {
    filter(scope, records).collect()
}

/// Counts the records matching `scope`.
pub fn count<T: Record>(scope: &Scope, records: &[T]) -> Result<usize> {
    filter(scope, records).try_fold(0, |count, record| record.map(|_| count + 1))
}

/// Runs a query: filters by its scope, sorts by its ordering, then applies
/// offset and limit.
///
/// Sorting is stable, so records that compare equal keep their input order.
pub fn execute<'a, T: Record>(query: &Query, records: &'a [T]) -> Result<Vec<&'a T>> {
    let mut results = evaluate(query.scope(), records)?;

    if !query.orderings().is_empty() {
        results.sort_by(|a, b| compare_records(*a, *b, query.orderings()));
    }

    let offset = query.get_offset().unwrap_or(0);
    let limit = query.get_limit().unwrap_or(usize::MAX);
    trace!(
        matched = results.len(),
        offset,
        limit = query.get_limit(),
        "paginating results"
    );

    Ok(results.into_iter().skip(offset).take(limit).collect())
}
