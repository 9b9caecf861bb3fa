//! Post-processing filter chain
//!
//! Filters are pure, in-place transforms over the rendered frame buffer,
//! applied in insertion order. The chain may be edited from any thread while
//! the loop renders: mutators swap in a new list, and each frame applies the
//! list it snapshotted at the start of its apply step.

use crate::frame_buffer::FrameBuffer;
use lightdrive_core::FilterId;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// A pure transform over a frame buffer.
pub trait Filter: Send + Sync {
    fn apply(&self, buffer: &mut FrameBuffer);

    /// Human-readable name for logs
    fn name(&self) -> &str {
        "filter"
    }
}

/// Shareable handle to a filter with a stable identity.
///
/// Clones refer to the same filter and compare equal; adding and later
/// removing the same handle leaves the chain unchanged.
#[derive(Clone)]
pub struct FilterHandle {
    id: FilterId,
    filter: Arc<dyn Filter>,
}

impl FilterHandle {
    pub fn new(filter: impl Filter + 'static) -> Self {
        Self::from_arc(Arc::new(filter))
    }

    pub fn from_arc(filter: Arc<dyn Filter>) -> Self {
        Self {
            id: FilterId::new(),
            filter,
        }
    }

    pub fn id(&self) -> FilterId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.filter.name()
    }

    pub fn apply(&self, buffer: &mut FrameBuffer) {
        self.filter.apply(buffer);
    }
}

impl PartialEq for FilterHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FilterHandle {}

impl fmt::Debug for FilterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterHandle")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

/// Immutable list of filters captured for one frame
pub type FilterSnapshot = Arc<[FilterHandle]>;

/// Ordered, thread-safe list of filters.
pub struct FilterChain {
    filters: Mutex<FilterSnapshot>,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterChain {
    pub fn new() -> Self {
        Self {
            filters: Mutex::new(Arc::from(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FilterSnapshot> {
        // The guarded value is replaced whole, so a poisoned lock still holds a valid list.
        self.filters.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a filter; it runs after every filter already in the chain
    pub fn add(&self, filter: FilterHandle) {
        let mut guard = self.lock();
        let mut next: Vec<FilterHandle> = guard.to_vec();
        next.push(filter);
        *guard = next.into();
    }

    /// Remove the first occurrence of `filter`. Absent handles are ignored.
    pub fn remove(&self, filter: &FilterHandle) -> bool {
        let mut guard = self.lock();
        let Some(pos) = guard.iter().position(|f| f == filter) else {
            return false;
        };
        let mut next: Vec<FilterHandle> = guard.to_vec();
        next.remove(pos);
        *guard = next.into();
        true
    }

    pub fn clear(&self) {
        *self.lock() = Arc::from(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The current list, unaffected by later edits
    pub fn snapshot(&self) -> FilterSnapshot {
        let guard = self.lock();
        Arc::clone(&*guard)
    }

    /// Apply every filter of the current snapshot in order.
    /// Returns the number of filters applied.
    pub fn apply_all(&self, buffer: &mut FrameBuffer) -> usize {
        let snapshot = self.snapshot();
        for filter in snapshot.iter() {
            filter.apply(buffer);
        }
        snapshot.len()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot().iter()).finish()
    }
}
