use thiserror::Error;

use crate::{
    data::catalog::SelectionKind,
    tree::OptionId,
};

/// Catalog validation failures.
///
/// All of these are detected before a tree is built, so a catalog that
/// validates always produces a finite, well-keyed tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("invalid code {code:?}: {reason}")]
    InvalidCode { code: String, reason: &'static str },

    #[error("feature `{0}` is defined more than once")]
    DuplicateFeature(String),

    #[error("feature `{feature}` defines option `{option}` more than once")]
    DuplicateOption { feature: String, option: String },

    #[error("`{from}` references feature `{code}` more than once")]
    DuplicateFeatureRef { from: String, code: String },

    #[error("`{from}` references unknown feature `{code}`")]
    UnknownFeatureRef { from: String, code: String },

    #[error("feature `{0}` has no `kind` and cannot be told apart as group or selectOne")]
    AmbiguousSelectionKind(String),

    #[error("feature `{feature}` declares kind `{kind}` but `multiple` says otherwise")]
    ConflictingSelectionKind {
        feature: String,
        kind: SelectionKind,
    },

    /// Two features that share one `next` level of the wire format both
    /// define an option with this code.
    #[error("option code `{code}` appears more than once below `{position}`")]
    AmbiguousOptionCode { position: String, code: String },

    #[error("feature references form a cycle: {}", path.join(" -> "))]
    CyclicReference { path: Vec<String> },
}

/// Errors returned by [`ProductConfiguration`](crate::ProductConfiguration).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("option `{key}` belongs to a {kind} feature and cannot be changed through {operation}")]
    InvalidSelectionKind {
        key: String,
        kind: SelectionKind,
        operation: &'static str,
    },

    #[error("unknown option {0}")]
    UnknownOption(OptionId),
}
