//! Write-once cells for decoder output fields.
//!
//! Decoder stages run in a fixed priority order (structured tag → content
//! heuristic → derived → estimated), and the precedence contract is simply
//! "first successful writer wins". `Slot` makes that contract a type rather
//! than a convention: filling an already-set slot is a no-op.

use serde::{Deserialize, Serialize};

/// A write-once cell. The first `fill` wins; later fills are silently
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot<T>(Option<T>);

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot(None)
    }
}

impl<T> Slot<T> {
    /// Fill the slot if it is still empty. Returns whether the value was
    /// accepted.
    pub fn fill(&mut self, value: T) -> bool {
        if self.0.is_none() {
            self.0 = Some(value);
            true
        } else {
            false
        }
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> From<Option<T>> for Slot<T> {
    fn from(value: Option<T>) -> Self {
        Slot(value)
    }
}
