//! Queries and the query builder.
//!
//! A [`Query`] is an immutable bundle of a root [`Scope`], an ordering, and
//! optional limit and offset. Every builder call returns a new query.
//! [`QueryBuilder`] classifies the filter a caller passes in, parses it with
//! the matching [`Strategy`], and ANDs the result onto the query's scope.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::criterion::Criterion;
use crate::error::{Result, ScopeError};
use crate::evaluator;
use crate::ordering::OrderBy;
use crate::parser::{self, Block, Hash, Operators};
use crate::scope::Scope;
use crate::traits::Record;
use crate::value::Value;

/// A filter argument, in any of the shapes a query accepts.
pub enum Filter {
    /// An attribute hash built in Rust.
    Hash(Hash),
    /// A JSON object used as an attribute hash.
    Value(Value),
    /// A block that builds an attribute hash with the operator helper.
    Block(Block),
    /// Pre-built criteria, used as is.
    Criteria(Vec<Criterion>),
    /// A pre-built scope, used as is.
    Scope(Scope),
}

impl Filter {
    /// Wraps a closure as a [`Filter::Block`].
    pub fn block<F, I>(f: F) -> Self
    where
        F: FnOnce(&Operators) -> I + 'static,
        I: Into<parser::Input>,
    {
        Filter::Block(parser::block(f))
    }

    /// Returns the parse strategy matching this filter's shape.
    pub fn strategy(&self) -> Strategy {
        match self {
            Filter::Hash(_) | Filter::Value(_) => Strategy::Hash,
            Filter::Block(_) => Strategy::Block,
            Filter::Criteria(_) => Strategy::Criteria,
            Filter::Scope(_) => Strategy::Scope,
        }
    }

    /// Parses this filter into a scope.
    pub fn into_scope(self) -> Result<Scope> {
        match self {
            Filter::Hash(hash) => parser::build(Some(hash.into()), None),
            Filter::Value(value) => parser::build(Some(value.into()), None),
            Filter::Block(block) => parser::build(None, Some(block)),
            Filter::Criteria(criteria) => Ok(Scope::criteria(criteria)),
            Filter::Scope(scope) => Ok(scope),
        }
    }

    /// Parses this filter into a scope with an explicit strategy.
    ///
    /// A JSON value is read according to `strategy`: an attribute hash for
    /// [`Strategy::Hash`], a list of `[attribute, operator, value]` triples
    /// for [`Strategy::Criteria`], or an encoded scope (see
    /// [`Scope::from_json`]) for [`Strategy::Scope`]. Any other shape must
    /// match its own strategy.
    pub fn parse_with(self, strategy: Strategy) -> Result<Scope> {
        match (strategy, self) {
            (Strategy::Criteria, Filter::Value(value)) => criteria_from_json(&value),
            (Strategy::Scope, Filter::Value(value)) => Scope::from_json(&value),
            (strategy, filter) if strategy == filter.strategy() => filter.into_scope(),
            (strategy, filter) => Err(ScopeError::invalid_argument(format!(
                "{strategy} strategy given for a {} filter",
                filter.strategy()
            ))),
        }
    }
}

fn criteria_from_json(value: &Value) -> Result<Scope> {
    let triples = value.as_array().ok_or_else(|| {
        ScopeError::MalformedScope(
            "criteria must be a list of [attribute, operator, value] triples".to_string(),
        )
    })?;
    let criteria = triples
        .iter()
        .map(Criterion::from_json)
        .collect::<Result<Vec<_>>>()?;
    Ok(Scope::criteria(criteria))
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Hash(hash) => f.debug_tuple("Hash").field(hash).finish(),
            Filter::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Filter::Block(_) => f.write_str("Block(..)"),
            Filter::Criteria(criteria) => f.debug_tuple("Criteria").field(criteria).finish(),
            Filter::Scope(scope) => f.debug_tuple("Scope").field(scope).finish(),
        }
    }
}

impl From<Hash> for Filter {
    fn from(hash: Hash) -> Self {
        Filter::Hash(hash)
    }
}

impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        Filter::Value(value)
    }
}

impl From<Block> for Filter {
    fn from(block: Block) -> Self {
        Filter::Block(block)
    }
}

impl From<Vec<Criterion>> for Filter {
    fn from(criteria: Vec<Criterion>) -> Self {
        Filter::Criteria(criteria)
    }
}

impl From<Criterion> for Filter {
    fn from(criterion: Criterion) -> Self {
        Filter::Criteria(vec![criterion])
    }
}

impl From<Scope> for Filter {
    fn from(scope: Scope) -> Self {
        Filter::Scope(scope)
    }
}

impl From<&Scope> for Filter {
    fn from(scope: &Scope) -> Self {
        Filter::Scope(scope.clone())
    }
}

/// How a query builder call parses its filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// An attribute hash, or a JSON object read as one.
    Hash,
    /// A block run with the operator helper.
    Block,
    /// Pre-built criteria, or a JSON list of criteria triples.
    Criteria,
    /// A pre-built scope, or a JSON-encoded scope.
    Scope,
}

impl Strategy {
    /// Returns the strategy name.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Hash => "hash",
            Strategy::Block => "block",
            Strategy::Criteria => "criteria",
            Strategy::Scope => "scope",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hash" => Ok(Strategy::Hash),
            "block" => Ok(Strategy::Block),
            "criteria" => Ok(Strategy::Criteria),
            "scope" => Ok(Strategy::Scope),
            _ => Err(ScopeError::invalid_argument(format!(
                "unknown query strategy {s:?}"
            ))),
        }
    }
}

/// An immutable query: a root scope plus ordering and pagination.
///
/// A new query has a [`Scope::null`] scope, no ordering and no limit or
/// offset. Limit, offset and ordering are metadata for whichever backend
/// runs the query; [`Query::filter`] applies them in memory.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_scope::{Dir, Filter, Hash, Query};
///
/// let books = vec![
///     json!({"title": "A Wizard of Earthsea", "author": "Ursula K. LeGuin", "published_at": "1968-11-01"}),
///     json!({"title": "Dune", "author": "Frank Herbert", "published_at": "1965-08-01"}),
///     json!({"title": "The Word for World is Forest", "author": "Ursula K. LeGuin", "published_at": "1972-03-13"}),
/// ];
///
/// let query = Query::new()
///     .where_(Hash::new().with("author", "Ursula K. LeGuin"))?
///     .where_(Filter::block(|ops| Hash::new().with("published_at", ops.gt("1970-01-01"))))?
///     .order([("published_at", Dir::Desc)])
///     .limit(10)?;
///
/// let results = query.filter(&books)?;
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0]["title"], "The Word for World is Forest");
/// # Ok::<(), standout_scope::ScopeError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    scope: Scope,
    orderings: Vec<OrderBy>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    /// Creates a new query that matches every record.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a query around an existing scope.
    pub fn from_scope(scope: Scope) -> Self {
        Query {
            scope,
            ..Query::default()
        }
    }

    /// Returns a copy of this query with its scope replaced.
    pub fn with_scope(&self, scope: Scope) -> Self {
        Query {
            scope,
            ..self.clone()
        }
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// ANDs `filter` onto the scope, inferring the parse strategy.
    pub fn where_(&self, filter: impl Into<Filter>) -> Result<Self> {
        QueryBuilder::new(self).call(None, filter)
    }

    /// ANDs `filter` onto the scope, parsing it with `strategy`.
    pub fn where_with(&self, strategy: Strategy, filter: impl Into<Filter>) -> Result<Self> {
        QueryBuilder::new(self).call(Some(strategy), filter)
    }

    /// ORs `filter` onto the scope.
    pub fn or_where(&self, filter: impl Into<Filter>) -> Result<Self> {
        let scope = filter.into().into_scope().map_err(ScopeError::into_parse_error)?;
        Ok(self.with_scope(self.scope.or(&scope)))
    }

    /// ANDs the inversion of `filter` onto the scope.
    pub fn not_where(&self, filter: impl Into<Filter>) -> Result<Self> {
        let scope = filter.into().into_scope().map_err(ScopeError::into_parse_error)?;
        Ok(self.with_scope(self.scope.not(&scope)))
    }

    // ========================================================================
    // Ordering and pagination
    // ========================================================================

    /// Replaces the ordering.
    ///
    /// Accepts attribute names (ascending) or `(attribute, Dir)` pairs. A
    /// repeated attribute keeps its first position and takes the last
    /// direction given.
    pub fn order<I, O>(&self, orderings: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OrderBy>,
    {
        let mut merged: Vec<OrderBy> = Vec::new();
        for order_by in orderings.into_iter().map(Into::into) {
            match merged
                .iter_mut()
                .find(|existing| existing.attribute == order_by.attribute)
            {
                Some(existing) => existing.dir = order_by.dir,
                None => merged.push(order_by),
            }
        }

        Query {
            orderings: merged,
            ..self.clone()
        }
    }

    /// Sets the maximum number of results. Negative values are rejected.
    pub fn limit<N: TryInto<usize>>(&self, n: N) -> Result<Self> {
        Ok(Query {
            limit: Some(non_negative("limit", n)?),
            ..self.clone()
        })
    }

    /// Sets the number of results to skip. Negative values are rejected.
    pub fn offset<N: TryInto<usize>>(&self, n: N) -> Result<Self> {
        Ok(Query {
            offset: Some(non_negative("offset", n)?),
            ..self.clone()
        })
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the root scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the ordering clauses, primary key first.
    pub fn orderings(&self) -> &[OrderBy] {
        &self.orderings
    }

    /// Returns the limit, if one was set.
    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the offset, if one was set.
    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests if a single record matches the scope.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> Result<bool> {
        evaluator::matches(&self.scope, record)
    }

    /// Filters, sorts and paginates `records`.
    pub fn filter<'a, T: Record>(&self, records: &'a [T]) -> Result<Vec<&'a T>> {
        evaluator::execute(self, records)
    }

    /// Counts the records matching the scope, ignoring limit and offset.
    pub fn count<T: Record>(&self, records: &[T]) -> Result<usize> {
        evaluator::count(&self.scope, records)
    }
}

fn non_negative<N: TryInto<usize>>(name: &str, n: N) -> Result<usize> {
    n.try_into()
        .map_err(|_| ScopeError::invalid_argument(format!("{name} must be a non-negative integer")))
}

/// Builds a new query from an existing one and a filter argument.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'q> {
    query: &'q Query,
}

impl<'q> QueryBuilder<'q> {
    /// Creates a builder over `query`.
    pub fn new(query: &'q Query) -> Self {
        QueryBuilder { query }
    }

    /// Parses `filter` and returns a new query whose scope is the old scope
    /// ANDed with the parsed one.
    ///
    /// Without an explicit `strategy`, the strategy is inferred from the
    /// filter's shape. An explicit strategy selects how a JSON value filter
    /// is read (see [`Filter::parse_with`]). Every failure surfaces as
    /// [`ScopeError::Parse`], including a `strategy` that does not fit the
    /// filter.
    pub fn call(&self, strategy: Option<Strategy>, filter: impl Into<Filter>) -> Result<Query> {
        let filter = filter.into();
        let strategy = strategy.unwrap_or_else(|| filter.strategy());
        debug!(%strategy, "building query");

        let scope = filter
            .parse_with(strategy)
            .map_err(ScopeError::into_parse_error)?;
        Ok(self.query.with_scope(self.query.scope.and(&scope)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Operator;
    use crate::ordering::Dir;
    use crate::scope::ScopeType;
    use serde_json::json;

    fn books() -> Vec<Value> {
        vec![
            json!({"title": "A Wizard of Earthsea", "author": "Ursula K. LeGuin", "published_at": "1968-11-01"}),
            json!({"title": "Dune", "author": "Frank Herbert", "published_at": "1965-08-01"}),
            json!({"title": "The Word for World is Forest", "author": "Ursula K. LeGuin", "published_at": "1972-03-13"}),
        ]
    }

    fn titles(records: &[&Value]) -> Vec<String> {
        records
            .iter()
            .filter_map(|record| record["title"].as_str().map(String::from))
            .collect()
    }

    #[test]
    fn new_query_is_unfiltered() {
        let query = Query::new();
        assert_eq!(query.scope().scope_type(), ScopeType::Null);
        assert!(query.orderings().is_empty());
        assert_eq!(query.get_limit(), None);
        assert_eq!(query.get_offset(), None);
        assert_eq!(query.filter(&books()).unwrap().len(), 3);
    }

    #[test]
    fn where_parses_hashes() {
        let query = Query::new()
            .where_(Hash::new().with("title", "Dune"))
            .unwrap();

        assert_eq!(
            query.scope(),
            &Scope::criteria([Criterion::new("title", Operator::Equal, "Dune")])
        );
    }

    #[test]
    fn where_parses_json_objects() {
        let query = Query::new().where_(json!({"title": "Dune"})).unwrap();
        assert_eq!(titles(&query.filter(&books()).unwrap()), ["Dune"]);
    }

    #[test]
    fn where_parses_blocks() {
        let query = Query::new()
            .where_(Filter::block(|ops| {
                Hash::new().with("published_at", ops.lt("1967-01-01"))
            }))
            .unwrap();

        assert_eq!(titles(&query.filter(&books()).unwrap()), ["Dune"]);
    }

    #[test]
    fn where_merges_criteria() {
        let query = Query::new()
            .where_(Hash::new().with("author", "Ursula K. LeGuin"))
            .unwrap()
            .where_(Filter::block(|ops| {
                Hash::new().with("published_at", ops.gt("1970-01-01"))
            }))
            .unwrap();

        assert_eq!(query.scope().criteria_list().map(<[Criterion]>::len), Some(2));
        assert_eq!(
            titles(&query.filter(&books()).unwrap()),
            ["The Word for World is Forest"]
        );
    }

    #[test]
    fn where_accepts_scopes_and_criteria() {
        let scope = Scope::criteria([Criterion::new("title", Operator::Equal, "Dune")]);
        let query = Query::new().where_(&scope).unwrap();
        assert!(Scope::ptr_eq(query.scope(), &scope));

        let query = Query::new()
            .where_(vec![Criterion::new("title", Operator::Equal, "Dune")])
            .unwrap();
        assert_eq!(query.scope(), &scope);
    }

    #[test]
    fn where_does_not_modify_the_original() {
        let original = Query::new().limit(5).unwrap();
        let filtered = original.where_(json!({"title": "Dune"})).unwrap();

        assert_eq!(original.scope().scope_type(), ScopeType::Null);
        assert_eq!(filtered.get_limit(), Some(5));
    }

    #[test]
    fn or_and_not_where() {
        let books = books();
        let query = Query::new()
            .where_(json!({"title": "Dune"}))
            .unwrap()
            .or_where(json!({"published_at": "1968-11-01"}))
            .unwrap();
        assert_eq!(
            titles(&query.filter(&books).unwrap()),
            ["A Wizard of Earthsea", "Dune"]
        );

        let query = Query::new()
            .not_where(json!({"author": "Ursula K. LeGuin"}))
            .unwrap();
        assert_eq!(titles(&query.filter(&books).unwrap()), ["Dune"]);
    }

    #[test]
    fn explicit_strategy_must_match() {
        let query = Query::new()
            .where_with(Strategy::Hash, json!({"title": "Dune"}))
            .unwrap();
        assert_eq!(query.scope().scope_type(), ScopeType::Criteria);

        let error = Query::new()
            .where_with(Strategy::Block, json!({"title": "Dune"}))
            .unwrap_err();
        assert!(matches!(error, ScopeError::Parse { .. }));
        assert_eq!(
            error.to_string(),
            "unable to parse query: block strategy given for a hash filter"
        );
    }

    #[test]
    fn explicit_strategy_selects_the_json_reader() {
        let books = books();
        let query = Query::new()
            .where_with(
                Strategy::Criteria,
                json!([
                    ["author", "eq", "Ursula K. LeGuin"],
                    ["published_at", "gt", "1970-01-01"],
                ]),
            )
            .unwrap();
        assert_eq!(
            query.scope(),
            &Scope::criteria([
                Criterion::new("author", Operator::Equal, "Ursula K. LeGuin"),
                Criterion::new("published_at", Operator::GreaterThan, "1970-01-01"),
            ])
        );
        assert_eq!(
            titles(&query.filter(&books).unwrap()),
            ["The Word for World is Forest"]
        );

        let stored = Scope::criteria([Criterion::new("title", Operator::Equal, "Dune")]).invert();
        let query = Query::new()
            .where_with(Strategy::Scope, stored.as_json())
            .unwrap();
        assert_eq!(query.scope(), &stored);

        let error = Query::new()
            .where_with(Strategy::Criteria, json!({"title": "Dune"}))
            .unwrap_err();
        let ScopeError::Parse { source, .. } = error else {
            panic!("expected a parse error");
        };
        assert!(matches!(*source, ScopeError::MalformedScope(_)));

        let error = Query::new()
            .where_with(Strategy::Criteria, json!([["title", "resembles", "Dune"]]))
            .unwrap_err();
        let ScopeError::Parse { source, .. } = error else {
            panic!("expected a parse error");
        };
        assert!(matches!(*source, ScopeError::UnknownOperator { .. }));
    }

    #[test]
    fn parse_failures_are_wrapped() {
        let error = Query::new().where_(json!(["title", "Dune"])).unwrap_err();

        let ScopeError::Parse { message, source } = error else {
            panic!("expected a parse error");
        };
        assert_eq!(message, "value must be a Hash with String or Symbol keys");
        assert!(matches!(*source, ScopeError::InvalidArgument(_)));
    }

    #[test]
    fn limit_and_offset() {
        let query = Query::new().limit(2).unwrap().offset(1u64).unwrap();
        assert_eq!(query.get_limit(), Some(2));
        assert_eq!(query.get_offset(), Some(1));

        assert_eq!(
            titles(&query.filter(&books()).unwrap()),
            ["Dune", "The Word for World is Forest"]
        );
    }

    #[test]
    fn negative_limit_and_offset_are_rejected() {
        let error = Query::new().limit(-1).unwrap_err();
        assert!(matches!(error, ScopeError::InvalidArgument(_)));
        assert_eq!(error.to_string(), "limit must be a non-negative integer");

        let error = Query::new().offset(-5i64).unwrap_err();
        assert_eq!(error.to_string(), "offset must be a non-negative integer");
    }

    #[test]
    fn order_replaces_previous_ordering() {
        let query = Query::new()
            .order(["author"])
            .order([("published_at", Dir::Desc)]);

        assert_eq!(query.orderings(), [OrderBy::desc("published_at")]);
        assert_eq!(
            titles(&query.filter(&books()).unwrap()),
            [
                "The Word for World is Forest",
                "A Wizard of Earthsea",
                "Dune"
            ]
        );
    }

    #[test]
    fn order_keeps_first_position_of_repeated_attributes() {
        let query = Query::new().order([
            OrderBy::asc("author"),
            OrderBy::asc("title"),
            OrderBy::desc("author"),
        ]);

        assert_eq!(
            query.orderings(),
            [OrderBy::desc("author"), OrderBy::asc("title")]
        );
    }

    #[test]
    fn count_ignores_pagination() {
        let query = Query::new()
            .where_(json!({"author": "Ursula K. LeGuin"}))
            .unwrap()
            .limit(1)
            .unwrap();

        assert_eq!(query.count(&books()).unwrap(), 2);
        assert_eq!(query.filter(&books()).unwrap().len(), 1);
        assert!(query.matches(&books()[0]).unwrap());
    }

    #[test]
    fn strategy_names() {
        assert_eq!("block".parse::<Strategy>().unwrap(), Strategy::Block);
        assert_eq!(Strategy::Criteria.to_string(), "criteria");
        assert!("magic".parse::<Strategy>().is_err());

        assert_eq!(Filter::from(Hash::new()).strategy(), Strategy::Hash);
        assert_eq!(Filter::from(json!({})).strategy(), Strategy::Hash);
        assert_eq!(Filter::from(Scope::all()).strategy(), Strategy::Scope);
        assert_eq!(
            format!("{:?}", Filter::block(|_| Hash::new())),
            "Block(..)"
        );
    }
}
