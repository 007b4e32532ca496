//! Structured fault type, sentinel markers, and context annotation.
//!
//! A [`Fault`] carries a message, a category-bearing payload, and an
//! optional cause. [`Sentinel`] values are fixed markers recognizable by
//! the classifier regardless of how many context layers wrap them.
//! [`Annotate`] adds such context layers without discarding the cause.

use std::error::Error as StdError;

use thiserror::Error;

use super::Category;
use crate::boundary::CaughtPanic;

type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// The structured payload of a [`Fault`], one variant per category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// Input validation failed on the named field.
    Validation {
        /// The offending field.
        field: String,
    },
    /// The identified resource does not exist.
    NotFound {
        /// Identifier of the missing resource.
        resource: String,
    },
    /// The operation is not permitted.
    Permission,
    /// A failure expected to resolve on retry.
    Transient,
    /// An unexpected failure.
    Internal,
}

impl FaultKind {
    /// Returns the category this payload belongs to.
    pub fn category(&self) -> Category {
        match self {
            FaultKind::Validation { .. } => Category::Validation,
            FaultKind::NotFound { .. } => Category::NotFound,
            FaultKind::Permission => Category::Permission,
            FaultKind::Transient => Category::Transient,
            FaultKind::Internal => Category::Internal,
        }
    }
}

/// A structured error value: message, category-bearing payload, and an
/// optional wrapped cause.
///
/// The cause chain is built once, link by link, and never mutated after
/// construction. Each wrapping step adds exactly one layer.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Fault {
    message: String,
    kind: FaultKind,
    #[source]
    source: Option<BoxedCause>,
}

impl Fault {
    fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            source: None,
        }
    }

    /// Creates a validation fault for the given field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            FaultKind::Validation {
                field: field.into(),
            },
            message,
        )
    }

    /// Creates a not-found fault for the given resource identifier.
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        let message = format!("resource `{resource}` not found");
        Self::new(FaultKind::NotFound { resource }, message)
    }

    /// Creates a permission fault.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Permission, message)
    }

    /// Creates a transient fault.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Transient, message)
    }

    /// Creates an internal fault.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Internal, message)
    }

    /// Attaches the underlying cause, consuming and returning the fault.
    pub fn with_source(mut self, source: impl Into<BoxedCause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the category of this fault.
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Returns the structured payload.
    pub fn kind(&self) -> &FaultKind {
        &self.kind
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CaughtPanic> for Fault {
    fn from(panic: CaughtPanic) -> Self {
        Fault::internal(panic.to_string()).with_source(panic)
    }
}

/// A fixed marker error carrying a category.
///
/// Sentinels are cheap, copyable values meant to be declared as constants
/// and recognized by the classifier through any number of wrapping layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Sentinel {
    category: Category,
    message: &'static str,
}

impl Sentinel {
    /// Creates a new sentinel marker.
    pub const fn new(category: Category, message: &'static str) -> Self {
        Self { category, message }
    }

    /// Returns the category this sentinel marks.
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns the sentinel's message.
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

/// Marks invalid caller-supplied input.
pub const INVALID_INPUT: Sentinel = Sentinel::new(Category::Validation, "invalid input");
/// Marks an absent resource.
pub const NOT_FOUND: Sentinel = Sentinel::new(Category::NotFound, "resource not found");
/// Marks a disallowed operation.
pub const PERMISSION_DENIED: Sentinel = Sentinel::new(Category::Permission, "permission denied");
/// Marks a failure worth retrying.
pub const TRANSIENT: Sentinel = Sentinel::new(Category::Transient, "transient failure");
/// Marks an unexpected failure.
pub const INTERNAL: Sentinel = Sentinel::new(Category::Internal, "internal error");

/// A context layer wrapped around an underlying error.
///
/// Prepends meaning for the reader while keeping the original cause
/// reachable through [`std::error::Error::source`], so classification at
/// any outer layer still sees the innermost marker.
#[derive(Debug, Error)]
#[error("{context}")]
pub struct Annotated {
    context: String,
    #[source]
    source: BoxedCause,
}

impl Annotated {
    /// Wraps `source` with a context message.
    pub fn new(context: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Returns the context message of this layer.
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Extension trait adding context to the error side of a `Result`.
pub trait Annotate<T> {
    /// Wraps the error with a context message.
    fn annotate(self, context: impl Into<String>) -> Result<T, Annotated>;

    /// Wraps the error with a lazily built context message.
    fn annotate_with<F>(self, context: F) -> Result<T, Annotated>
    where
        F: FnOnce() -> String;
}

impl<T, E> Annotate<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn annotate(self, context: impl Into<String>) -> Result<T, Annotated> {
        self.map_err(|e| Annotated::new(context, e))
    }

    fn annotate_with<F>(self, context: F) -> Result<T, Annotated>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Annotated::new(context(), e))
    }
}
