//! A query bound to an in-memory record collection.

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::Result;
use crate::evaluator;
use crate::ordering::OrderBy;
use crate::query::{Filter, Query};
use crate::traits::Record;

/// A [`Query`] bound to a record slice, with memoized results.
///
/// Results are computed on first access and cached. Every refining call
/// returns a new `MemoryQuery` with an empty cache; the receiver keeps its
/// own results.
///
/// ```
/// use serde_json::json;
/// use standout_scope::MemoryQuery;
///
/// let books = vec![
///     json!({"title": "Dune", "series": "Dune"}),
///     json!({"title": "Hyperion", "series": null}),
/// ];
///
/// let standalone = MemoryQuery::new(&books).where_(json!({"series": null}))?;
/// assert_eq!(standalone.count()?, 1);
/// assert_eq!(standalone.first()?.map(|book| &book["title"]), Some(&json!("Hyperion")));
/// # Ok::<(), standout_scope::ScopeError>(())
/// ```
#[derive(Debug)]
pub struct MemoryQuery<'a, T> {
    query: Query,
    records: &'a [T],
    results: OnceCell<Vec<&'a T>>,
}

impl<'a, T: Record> MemoryQuery<'a, T> {
    /// Binds an unfiltered query to `records`.
    pub fn new(records: &'a [T]) -> Self {
        MemoryQuery::with_query(Query::new(), records)
    }

    /// Binds an existing query to `records`.
    pub fn with_query(query: Query, records: &'a [T]) -> Self {
        MemoryQuery {
            query,
            records,
            results: OnceCell::new(),
        }
    }

    /// Returns the underlying query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Refines with [`Query::where_`].
    pub fn where_(&self, filter: impl Into<Filter>) -> Result<Self> {
        Ok(self.rebind(self.query.where_(filter)?))
    }

    /// Refines with [`Query::or_where`].
    pub fn or_where(&self, filter: impl Into<Filter>) -> Result<Self> {
        Ok(self.rebind(self.query.or_where(filter)?))
    }

    /// Refines with [`Query::not_where`].
    pub fn not_where(&self, filter: impl Into<Filter>) -> Result<Self> {
        Ok(self.rebind(self.query.not_where(filter)?))
    }

    /// Replaces the ordering, as [`Query::order`] does.
    pub fn order<I, O>(&self, orderings: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OrderBy>,
    {
        self.rebind(self.query.order(orderings))
    }

    /// Sets the maximum number of results.
    pub fn limit<N: TryInto<usize>>(&self, n: N) -> Result<Self> {
        Ok(self.rebind(self.query.limit(n)?))
    }

    /// Sets the number of results to skip.
    pub fn offset<N: TryInto<usize>>(&self, n: N) -> Result<Self> {
        Ok(self.rebind(self.query.offset(n)?))
    }

    /// Returns the same query with its cached results discarded.
    pub fn reset(&self) -> Self {
        self.rebind(self.query.clone())
    }

    fn rebind(&self, query: Query) -> Self {
        MemoryQuery::with_query(query, self.records)
    }

    /// Returns the matching records, computing them on first access.
    pub fn results(&self) -> Result<&[&'a T]> {
        self.results
            .get_or_try_init(|| {
                let results = evaluator::execute(&self.query, self.records)?;
                debug!(
                    records = self.records.len(),
                    matched = results.len(),
                    "materialized query results"
                );
                Ok(results)
            })
            .map(Vec::as_slice)
    }

    /// Returns an owned copy of the results.
    pub fn to_vec(&self) -> Result<Vec<&'a T>> {
        Ok(self.results()?.to_vec())
    }

    /// Number of records in the (paginated) result.
    pub fn count(&self) -> Result<usize> {
        Ok(self.results()?.len())
    }

    /// Returns the first result, if any.
    pub fn first(&self) -> Result<Option<&'a T>> {
        Ok(self.results()?.first().copied())
    }

    /// Returns `true` if at least one record matches.
    pub fn exists(&self) -> Result<bool> {
        Ok(!self.results()?.is_empty())
    }

    /// Returns `true` once results have been computed and cached.
    pub fn is_materialized(&self) -> bool {
        self.results.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScopeError;
    use crate::ordering::Dir;
    use crate::parser::Hash;
    use serde_json::{json, Value};

    fn books() -> Vec<Value> {
        vec![
            json!({"title": "A Wizard of Earthsea", "author": "Ursula K. LeGuin", "series": "Earthsea"}),
            json!({"title": "Dune", "author": "Frank Herbert", "series": "Dune"}),
            json!({"title": "The Word for World is Forest", "author": "Ursula K. LeGuin", "series": null}),
        ]
    }

    #[test]
    fn results_are_cached() {
        let books = books();
        let query = MemoryQuery::new(&books);

        assert!(!query.is_materialized());
        assert_eq!(query.count().unwrap(), 3);
        assert!(query.is_materialized());

        let first = query.results().unwrap().as_ptr();
        let second = query.results().unwrap().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn refining_returns_a_fresh_query() {
        let books = books();
        let all = MemoryQuery::new(&books);
        assert!(all.exists().unwrap());

        let by_leguin = all.where_(json!({"author": "Ursula K. LeGuin"})).unwrap();
        assert!(!by_leguin.is_materialized());
        assert_eq!(by_leguin.count().unwrap(), 2);
        assert_eq!(all.count().unwrap(), 3);

        let reset = by_leguin.reset();
        assert!(!reset.is_materialized());
        assert_eq!(reset.query(), by_leguin.query());
    }

    #[test]
    fn ordering_and_pagination() {
        let books = books();
        let query = MemoryQuery::new(&books)
            .order([("title", Dir::Desc)])
            .limit(2)
            .unwrap();

        let titles: Vec<&Value> = query
            .to_vec()
            .unwrap()
            .into_iter()
            .map(|book| &book["title"])
            .collect();
        assert_eq!(titles, [&json!("The Word for World is Forest"), &json!("Dune")]);

        let rest = query.offset(2).unwrap();
        assert_eq!(
            rest.first().unwrap().map(|book| &book["title"]),
            Some(&json!("A Wizard of Earthsea"))
        );
    }

    #[test]
    fn or_and_not_where() {
        let books = books();
        let query = MemoryQuery::new(&books)
            .where_(json!({"title": "Dune"}))
            .unwrap()
            .or_where(json!({"series": null}))
            .unwrap();
        assert_eq!(query.count().unwrap(), 2);

        let query = MemoryQuery::new(&books)
            .not_where(json!({"author": "Frank Herbert"}))
            .unwrap();
        assert_eq!(query.count().unwrap(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let books = books();
        let query = MemoryQuery::new(&books)
            .where_(Filter::block(|ops| Hash::new().with("series", ops.gt("A"))))
            .unwrap();

        assert!(matches!(
            query.results(),
            Err(ScopeError::IncomparableValues { .. })
        ));
        assert!(!query.is_materialized());
        assert!(query.exists().is_err());
    }

    #[test]
    fn empty_collection() {
        let books: Vec<Value> = Vec::new();
        let query = MemoryQuery::new(&books);

        assert!(!query.exists().unwrap());
        assert_eq!(query.first().unwrap(), None);
    }
}
