//! Functions attached to rule tree nodes.
//!
//! Branch nodes hold a [`SchemaFunction`] whose outcome string selects the next edge. Leaf nodes
//! hold a [`ResultFunction`], the only kind of function allowed to mutate the request.

use std::fmt::Debug;

use crate::{RequestWrapper, Result};

pub mod result;
pub mod schema;

/// Outcome string reported by a membership test that matches.
pub const OUTCOME_TRUE: &str = "true";
/// Outcome string reported by a membership test that doesn't match.
pub const OUTCOME_FALSE: &str = "false";
/// Catch-all outcome for requests a schema function cannot classify.
pub const OUTCOME_WILDCARD: &str = "*";

/// Read-only classifier over a request.
///
/// Implementations must not keep per-call state: the same instance is shared by every request
/// evaluated against a tree.
pub trait SchemaFunction: Debug + Send + Sync {
    fn call(&self, request: &RequestWrapper) -> Result<String>;
}

/// Action applied to a request when a rule's conditions are all met.
pub trait ResultFunction: Debug + Send + Sync {
    fn apply(&self, request: &mut RequestWrapper) -> Result<()>;
}

pub(crate) fn bool_outcome(value: bool) -> String {
    let outcome = if value { OUTCOME_TRUE } else { OUTCOME_FALSE };
    outcome.to_owned()
}
