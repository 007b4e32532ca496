//! The closed set of failure categories and their retry semantics.

use serde::{Deserialize, Serialize};

/// The category of a failure, determining how callers should react to it.
///
/// The set is closed: every error classifies into exactly one category,
/// with [`Category::Internal`] as the fallback for unmarked errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Caller-supplied input was invalid. Never retried.
    Validation,
    /// A requested resource does not exist. Never retried.
    NotFound,
    /// The operation is disallowed for the caller. Never retried.
    Permission,
    /// A failure likely to resolve on its own; eligible for retry.
    Transient,
    /// Unclassified or unexpected failure. Surfaced immediately and
    /// logged with full context, never retried.
    Internal,
}

impl Category {
    /// Returns the snake_case name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Validation => "validation",
            Category::NotFound => "not_found",
            Category::Permission => "permission",
            Category::Transient => "transient",
            Category::Internal => "internal",
        }
    }

    /// Returns true if this category describes a transient failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Category::Transient)
    }

    /// Returns true if an unmodified retry of the failed operation may
    /// succeed. Only transient failures qualify.
    pub fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
