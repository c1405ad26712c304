//! Scope - Backend-independent boolean scopes for filtering record collections.
//!
//! A [`Scope`] is an immutable predicate tree over records. Scopes are built
//! from attribute hashes (or blocks that build them), composed with AND, OR
//! and NOT, inverted with De Morgan, and evaluated in memory or handed to
//! another backend through their JSON form. It supports:
//!
//! - Equality, ordering, membership and presence operators, with aliases
//! - Composition that simplifies identities and flattens nested groups
//! - Exact inversion: `s.invert()` matches precisely what `s` does not
//! - Immutable queries with ordering, limit and offset
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use standout_scope::{Dir, Filter, Hash, Query};
//!
//! let books = vec![
//!     json!({"title": "A Wizard of Earthsea", "author": "Ursula K. LeGuin", "series": "Earthsea"}),
//!     json!({"title": "Dune", "author": "Frank Herbert", "series": "Dune"}),
//!     json!({"title": "The Word for World is Forest", "author": "Ursula K. LeGuin", "series": null}),
//! ];
//!
//! let query = Query::new()
//!     .where_(Hash::new().with("author", "Ursula K. LeGuin"))?
//!     .where_(Filter::block(|ops| Hash::new().with("series", ops.not_null())))?
//!     .order([("title", Dir::Asc)]);
//!
//! let results = query.filter(&books)?;
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0]["title"], "A Wizard of Earthsea");
//!
//! // The inverted scope selects everything else
//! let rest = query.scope().invert().evaluate(&books)?;
//! assert_eq!(rest.len(), 2);
//! # Ok::<(), standout_scope::ScopeError>(())
//! ```
//!
//! # Scope Variants
//!
//! | Variant | Matches | `and` identity | `or` identity |
//! |---------|---------|----------------|---------------|
//! | `All` | every record | yes | absorbing |
//! | `None` | nothing | absorbing | yes |
//! | `Null` | every record | yes | yes |
//! | `Criteria` | all criteria (any, when inverted) | when empty | when empty and inverted |
//! | `Conjunction` | all children | when empty | |
//! | `Disjunction` | any child | | when empty |
//!
//! # Operators
//!
//! | Operator | Aliases | Complement |
//! |----------|---------|------------|
//! | `equal` | `eq`, `equal`, `equals` | `not_equal` |
//! | `not_equal` | `ne`, `not_equal` | `equal` |
//! | `greater_than` | `gt`, `greater_than` | `less_than_or_equal_to` |
//! | `greater_than_or_equal_to` | `gte`, `greater_than_or_equal_to` | `less_than` |
//! | `less_than` | `lt`, `less_than` | `greater_than_or_equal_to` |
//! | `less_than_or_equal_to` | `lte`, `less_than_or_equal_to` | `greater_than` |
//! | `one_of` | `one_of` | `not_one_of` |
//! | `not_one_of` | `not_one_of` | `one_of` |
//! | `null` | `null` | `not_null` |
//! | `not_null` | `not_null` | `null` |
//!
//! Ordering operators compare numbers with numbers, strings with strings,
//! booleans with booleans and lists with lists. Any other pairing, `null`
//! included, is a [`ScopeError::IncomparableValues`] error rather than a
//! silent `false`, so a scope and its inversion always partition the
//! records they can evaluate.

mod criterion;
mod error;
pub mod evaluator;
mod memory;
mod op;
mod ordering;
pub mod parser;
mod query;
mod scope;
mod traits;
mod value;

// Re-export public API
pub use criterion::Criterion;
pub use error::{Result, ScopeError, UnregisteredOperator};
pub use memory::MemoryQuery;
pub use op::Operator;
pub use ordering::{compare_records, Dir, OrderBy};
pub use parser::{Block, Hash, Input, Operation, Operators, Term};
pub use query::{Filter, Query, QueryBuilder, Strategy};
pub use scope::{CriteriaScope, Scope, ScopeKind, ScopeType};
pub use traits::Record;
pub use value::{Number, Value};
