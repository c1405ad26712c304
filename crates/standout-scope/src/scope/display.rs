//! Debug rendering of scope trees.
//!
//! ```text
//! ConjunctionScope (2):
//! - CriteriaScope (1):
//!   - "author" equal "Ursula K. LeGuin"
//! - CriteriaScope (1) (inverted):
//!   - "series" null null
//! ```

use std::fmt::{self, Write as _};

use super::{Scope, ScopeKind};

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scope(f, self, 0)
    }
}

fn write_scope(f: &mut fmt::Formatter<'_>, scope: &Scope, depth: usize) -> fmt::Result {
    let name = scope.scope_type().type_name();
    let indent = "  ".repeat(depth);

    match scope.kind() {
        ScopeKind::All | ScopeKind::None | ScopeKind::Null => f.write_str(name),
        ScopeKind::Criteria(criteria) => {
            write!(f, "{name} ({})", criteria.len())?;
            if criteria.is_inverted() {
                f.write_str(" (inverted)")?;
            }
            f.write_char(':')?;
            for criterion in criteria.criteria() {
                write!(f, "\n{indent}- {criterion}")?;
            }
            Ok(())
        }
        ScopeKind::Conjunction(children) | ScopeKind::Disjunction(children) => {
            write!(f, "{name} ({}):", children.len())?;
            for child in children {
                write!(f, "\n{indent}- ")?;
                write_scope(f, child, depth + 1)?;
            }
            Ok(())
        }
    }
}
