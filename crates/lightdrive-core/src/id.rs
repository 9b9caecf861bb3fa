//! Process-unique handle identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating filter ids
static NEXT_FILTER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a filter registered with a filter chain.
///
/// Two handles wrapping the same filter instance share an id; the chain
/// compares ids, never the filters themselves.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(u64);

impl FilterId {
    /// Allocate a fresh id
    pub fn new() -> Self {
        Self(NEXT_FILTER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create an id from a raw value (for testing)
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for FilterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilterId({})", self.0)
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = FilterId::new();
        let b = FilterId::new();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn from_raw() {
        let id = FilterId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "filter#42");
    }
}
