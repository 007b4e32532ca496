//! Chain-walking classification of error values.

use std::error::Error as StdError;

use super::{Category, Fault, Sentinel};

/// An iterator over an error and its chain of causes, outermost first.
#[derive(Clone, Debug)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.source();
        Some(current)
    }
}

/// Returns an iterator over `err` and every cause below it.
pub fn chain<'a>(err: &'a (dyn StdError + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

/// Determines the category of an error by walking its cause chain.
///
/// The outermost link that is a [`Fault`] or a [`Sentinel`] decides the
/// category. Errors carrying no marker anywhere in the chain classify as
/// [`Category::Internal`]. The walk has no side effects and supports
/// arbitrary wrap depth.
pub fn classify(err: &(dyn StdError + 'static)) -> Category {
    for link in chain(err) {
        if let Some(fault) = link.downcast_ref::<Fault>() {
            return fault.category();
        }
        if let Some(sentinel) = link.downcast_ref::<Sentinel>() {
            return sentinel.category();
        }
    }
    Category::Internal
}

/// Logs an error and every layer of its cause chain at error level.
///
/// Intended for internal failures that are about to be surfaced, where the
/// full chain is the diagnostic record.
pub fn log_chain(err: &(dyn StdError + 'static)) {
    tracing::error!(category = %classify(err), error = %err, "operation failed");
    for (depth, cause) in chain(err).skip(1).enumerate() {
        tracing::error!(depth = depth + 1, cause = %cause, "caused by");
    }
}
