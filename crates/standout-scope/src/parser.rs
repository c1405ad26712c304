//! The criteria parser.
//!
//! Turns a hash of `attribute => term` pairs, or a block that builds one,
//! into an ordered list of [`Criterion`]s. A term is either a literal value
//! (an equality test) or an [`Operation`] built with the [`Operators`]
//! helper:
//!
//! ```
//! use serde_json::json;
//! use standout_scope::parser::{self, Operators};
//! use standout_scope::{Criterion, Hash, Operator};
//!
//! let ops = Operators;
//! let criteria = parser::parse(
//!     Hash::new()
//!         .with("author", "Ursula K. LeGuin")
//!         .with("published_at", ops.greater_than("1970-01-01"))
//!         .with("series", ops.one_of(["Earthsea", "Hainish Cycle"])),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     criteria,
//!     vec![
//!         Criterion::new("author", Operator::Equal, "Ursula K. LeGuin"),
//!         Criterion::new("published_at", Operator::GreaterThan, "1970-01-01"),
//!         Criterion::new("series", Operator::OneOf, json!(["Earthsea", "Hainish Cycle"])),
//!     ]
//! );
//! ```

use crate::criterion::{normalize_value, Criterion};
use crate::error::{Result, ScopeError};
use crate::op::Operator;
use crate::scope::Scope;
use crate::value::Value;

const KEY_TYPE_MESSAGE: &str = "value must be a Hash with String or Symbol keys";
const NO_BLOCK_MESSAGE: &str = "no block given";

/// An operator applied to a value, produced by the [`Operators`] helper.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    operator: Operator,
    value: Value,
}

impl Operation {
    /// Creates an operation, normalizing list operator values to a list.
    pub fn new(operator: Operator, value: impl Into<Value>) -> Self {
        Operation {
            operator,
            value: normalize_value(operator, value.into()),
        }
    }

    /// The operator being applied.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The operand, already normalized for list operators.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// The operator-builder helper handed to parse blocks.
///
/// Each method produces an [`Operation`] for one DSL alias. Name-based
/// dispatch goes through [`Operators::call`], which consults the same alias
/// table as [`Operator::lookup`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Operators;

impl Operators {
    /// Resolves `name` as an operator alias and applies it to `args`.
    ///
    /// List operators take every argument as a list member (a single list
    /// argument is used as the list itself). Presence operators take no
    /// arguments. Every other operator takes exactly one.
    pub fn call(&self, name: &str, args: impl IntoIterator<Item = Value>) -> Result<Operation> {
        let operator = Operator::lookup(name)?;
        let args: Vec<Value> = args.into_iter().collect();

        if operator.is_list_op() {
            return Ok(Operation::new(operator, normalize_list(args)));
        }

        let expected = if operator.is_presence_op() { 0 } else { 1 };
        if args.len() != expected {
            return Err(ScopeError::invalid_argument(format!(
                "wrong number of arguments for {name} (given {}, expected {expected})",
                args.len()
            )));
        }

        Ok(Operation::new(
            operator,
            args.into_iter().next().unwrap_or(Value::Null),
        ))
    }

    /// Equality (`eq`).
    pub fn eq(&self, value: impl Into<Value>) -> Operation {
        Operation::new(Operator::Equal, value)
    }

    /// Alias for [`Operators::eq`].
    pub fn equal(&self, value: impl Into<Value>) -> Operation {
        self.eq(value)
    }

    /// Alias for [`Operators::eq`].
    pub fn equals(&self, value: impl Into<Value>) -> Operation {
        self.eq(value)
    }

    /// Inequality (`ne`).
    pub fn ne(&self, value: impl Into<Value>) -> Operation {
        Operation::new(Operator::NotEqual, value)
    }

    /// Alias for [`Operators::ne`].
    pub fn not_equal(&self, value: impl Into<Value>) -> Operation {
        self.ne(value)
    }

    /// Strictly greater than (`gt`).
    pub fn gt(&self, value: impl Into<Value>) -> Operation {
        Operation::new(Operator::GreaterThan, value)
    }

    /// Alias for [`Operators::gt`].
    pub fn greater_than(&self, value: impl Into<Value>) -> Operation {
        self.gt(value)
    }

    /// Greater than or equal to (`gte`).
    pub fn gte(&self, value: impl Into<Value>) -> Operation {
        Operation::new(Operator::GreaterThanOrEqualTo, value)
    }

    /// Alias for [`Operators::gte`].
    pub fn greater_than_or_equal_to(&self, value: impl Into<Value>) -> Operation {
        self.gte(value)
    }

    /// Strictly less than (`lt`).
    pub fn lt(&self, value: impl Into<Value>) -> Operation {
        Operation::new(Operator::LessThan, value)
    }

    /// Alias for [`Operators::lt`].
    pub fn less_than(&self, value: impl Into<Value>) -> Operation {
        self.lt(value)
    }

    /// Less than or equal to (`lte`).
    pub fn lte(&self, value: impl Into<Value>) -> Operation {
        Operation::new(Operator::LessThanOrEqualTo, value)
    }

    /// Alias for [`Operators::lte`].
    pub fn less_than_or_equal_to(&self, value: impl Into<Value>) -> Operation {
        self.lte(value)
    }

    /// Membership test. Accepts any iterable of values; a single list value
    /// is used as the list itself.
    pub fn one_of<I, V>(&self, values: I) -> Operation
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Operation::new(
            Operator::OneOf,
            normalize_list(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Negated membership test. Takes values the way [`Operators::one_of`] does.
    pub fn not_one_of<I, V>(&self, values: I) -> Operation
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Operation::new(
            Operator::NotOneOf,
            normalize_list(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Matches a null or missing attribute.
    pub fn null(&self) -> Operation {
        Operation::new(Operator::Null, Value::Null)
    }

    /// Matches a present, non-null attribute.
    pub fn not_null(&self) -> Operation {
        Operation::new(Operator::NotNull, Value::Null)
    }
}

fn normalize_list(mut values: Vec<Value>) -> Value {
    if values.len() == 1 && values[0].is_array() {
        return values.remove(0);
    }
    Value::Array(values)
}

/// The right-hand side of a hash entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A plain value, parsed as an equality test.
    Literal(Value),
    /// An operator application.
    Operation(Operation),
}

impl From<Operation> for Term {
    fn from(operation: Operation) -> Self {
        Term::Operation(operation)
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::Literal(value)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::Literal(Value::from(value))
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term::Literal(Value::from(value))
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Term::Literal(Value::from(value))
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Term::Literal(Value::from(value))
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Literal(Value::from(value))
    }
}

impl From<u32> for Term {
    fn from(value: u32) -> Self {
        Term::Literal(Value::from(value))
    }
}

impl From<u64> for Term {
    fn from(value: u64) -> Self {
        Term::Literal(Value::from(value))
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Literal(Value::from(value))
    }
}

impl<T: Into<Term>> From<Option<T>> for Term {
    fn from(value: Option<T>) -> Self {
        value.map_or(Term::Literal(Value::Null), Into::into)
    }
}

/// An insertion-ordered hash of `key => term` pairs.
///
/// Keys are values so that a malformed hash can be represented and
/// rejected by the parser: only string keys name attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hash {
    entries: Vec<(Value, Term)>,
}

impl Hash {
    /// Creates an empty hash.
    pub fn new() -> Self {
        Hash::default()
    }

    /// Adds an entry, returning the extended hash.
    pub fn with(mut self, key: impl Into<Value>, term: impl Into<Term>) -> Self {
        self.insert(key, term);
        self
    }

    /// Adds an entry. A repeated key replaces the earlier term in place.
    pub fn insert(&mut self, key: impl Into<Value>, term: impl Into<Term>) {
        let key = key.into();
        let term = term.into();

        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = term,
            None => self.entries.push((key, term)),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the hash has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Term)> {
        self.entries.iter().map(|(key, term)| (key, term))
    }
}

impl<K: Into<Value>, T: Into<Term>> FromIterator<(K, T)> for Hash {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut hash = Hash::new();
        for (key, term) in iter {
            hash.insert(key, term);
        }
        hash
    }
}

impl From<serde_json::Map<String, Value>> for Hash {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

/// What a parse call receives, or what a block returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// An attribute hash.
    Hash(Hash),
    /// A raw value. Only objects are accepted, as hashes of literals.
    Value(Value),
}

impl From<Hash> for Input {
    fn from(hash: Hash) -> Self {
        Input::Hash(hash)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Value(value)
    }
}

impl From<serde_json::Map<String, Value>> for Input {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Input::Hash(Hash::from(map))
    }
}

impl TryFrom<Input> for Hash {
    type Error = ScopeError;

    fn try_from(input: Input) -> Result<Self> {
        match input {
            Input::Hash(hash) => Ok(hash),
            Input::Value(Value::Object(map)) => Ok(Hash::from(map)),
            Input::Value(_) => Err(ScopeError::invalid_argument(KEY_TYPE_MESSAGE)),
        }
    }
}

/// A parse block: receives the operator helper and returns a hash.
pub type Block = Box<dyn FnOnce(&Operators) -> Input>;

/// Boxes a closure as a parse [`Block`].
pub fn block<F, I>(f: F) -> Block
where
    F: FnOnce(&Operators) -> I + 'static,
    I: Into<Input>,
{
    Box::new(move |ops: &Operators| f(ops).into())
}

/// Parses a hash into criteria, in hash order.
///
/// Literal values become [`Operator::Equal`] criteria; operations keep their
/// operator. Fails with [`ScopeError::InvalidArgument`] if the input is not
/// a hash or has a non-string key.
pub fn parse(input: impl Into<Input>) -> Result<Vec<Criterion>> {
    let hash = Hash::try_from(input.into())?;

    hash.entries
        .into_iter()
        .map(|(key, term)| {
            let Value::String(attribute) = key else {
                return Err(ScopeError::invalid_argument(KEY_TYPE_MESSAGE));
            };
            Ok(match term {
                Term::Literal(value) => Criterion::new(attribute, Operator::Equal, value),
                Term::Operation(operation) => {
                    Criterion::new(attribute, operation.operator, operation.value)
                }
            })
        })
        .collect()
}

/// Invokes `block` with the operator helper and parses the hash it returns.
pub fn parse_block(block: Option<Block>) -> Result<Vec<Criterion>> {
    let block = block.ok_or_else(|| ScopeError::invalid_argument(NO_BLOCK_MESSAGE))?;
    parse(block(&Operators))
}

/// Parses `value`, then `block`, and builds a criteria scope from the
/// concatenated criteria (value's first). Either part may be absent.
pub fn build(value: Option<Input>, block: Option<Block>) -> Result<Scope> {
    let mut criteria = match value {
        Some(value) => parse(value)?,
        None => Vec::new(),
    };
    if block.is_some() {
        criteria.extend(parse_block(block)?);
    }

    Ok(Scope::criteria(criteria))
}
