//! JSON encoding of scopes.
//!
//! ```text
//! criteria:             {"type": "criteria", "criteria": [[attr, op, value], ...], "inverted": bool}
//! conjunction/disjunction: {"type": tag, "scopes": [<scope>, ...]}
//! all/none/null:        {"type": tag}
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map};

use super::{Scope, ScopeKind, ScopeType};
use crate::criterion::Criterion;
use crate::error::{Result, ScopeError};
use crate::value::{literal, Value};

impl Scope {
    /// Encodes this scope as JSON.
    pub fn as_json(&self) -> Value {
        let tag = self.scope_type().as_str();

        match self.kind() {
            ScopeKind::All | ScopeKind::None | ScopeKind::Null => json!({ "type": tag }),
            ScopeKind::Criteria(criteria) => json!({
                "type": tag,
                "criteria": criteria.criteria().iter().map(Criterion::as_json).collect::<Vec<_>>(),
                "inverted": criteria.is_inverted(),
            }),
            ScopeKind::Conjunction(children) | ScopeKind::Disjunction(children) => json!({
                "type": tag,
                "scopes": children.iter().map(Scope::as_json).collect::<Vec<_>>(),
            }),
        }
    }

    /// Decodes a scope encoded by [`Scope::as_json`].
    ///
    /// Operator names are re-validated against the alias table; an
    /// unregistered name fails with [`ScopeError::UnknownOperator`].
    pub fn from_json(json: &Value) -> Result<Scope> {
        let object = json
            .as_object()
            .ok_or_else(|| malformed(format!("expected an object, got {}", literal(json))))?;
        let tag = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing \"type\"".to_string()))?;

        match tag {
            "all" => Ok(Scope::all()),
            "none" => Ok(Scope::none()),
            "null" => Ok(Scope::null()),
            "criteria" => {
                let criteria = list_field(object, "criteria")?
                    .iter()
                    .map(Criterion::from_json)
                    .collect::<Result<Vec<_>>>()?;
                let inverted = match object.get("inverted") {
                    None | Some(Value::Null) => false,
                    Some(Value::Bool(inverted)) => *inverted,
                    Some(other) => {
                        return Err(malformed(format!(
                            "\"inverted\" must be a bool, got {}",
                            literal(other)
                        )))
                    }
                };
                Ok(Scope::from_criteria(criteria, inverted))
            }
            "conjunction" | "disjunction" => {
                let children = list_field(object, "scopes")?
                    .iter()
                    .map(Scope::from_json)
                    .collect::<Result<Vec<_>>>()?;
                if tag == ScopeType::Conjunction.as_str() {
                    Ok(Scope::conjunction(children))
                } else {
                    Ok(Scope::disjunction(children))
                }
            }
            other => Err(malformed(format!("unknown scope type {other:?}"))),
        }
    }
}

fn list_field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a [Value]> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| malformed(format!("{key:?} must be a list")))
}

fn malformed(message: String) -> ScopeError {
    ScopeError::MalformedScope(message)
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Value::deserialize(deserializer)?;
        Scope::from_json(&json).map_err(serde::de::Error::custom)
    }
}
