//! Typed failures for catalog and record operations.
//!
//! These travel inside `anyhow::Error`; callers that need to branch on a
//! specific failure use `anyhow::Error::downcast_ref::<Error>()`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A food with this name already exists (Basic and Composite share one
    /// namespace; comparison is case-sensitive).
    #[error("a food named '{0}' already exists")]
    DuplicateName(String),

    /// A composite ingredient names a food the catalog does not know.
    #[error("unknown ingredient '{0}'")]
    UnresolvedIngredient(String),

    /// A composite was saved with no ingredients carrying positive weight.
    #[error("a composite food needs at least one ingredient with a positive quantity")]
    EmptyIngredientList,

    /// A lookup by name matched neither a Basic nor a Composite food.
    #[error("no food named '{0}'")]
    NotFound(String),

    /// A serialized pair-list field failed to parse.
    #[error("malformed record field '{0}'")]
    MalformedRecord(String),
}
