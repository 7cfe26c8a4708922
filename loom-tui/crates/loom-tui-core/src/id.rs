//! Instance identifier types for Loom TUI.

/// A unique identifier for a persistent instance in the widget tree.
///
/// `InstanceId` is a lightweight, copy-able handle. Values are handed out by an
/// [`InstanceIdAllocator`] and are never reused while that allocator lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Returns the underlying u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Creates an InstanceId from a raw u64 value.
    ///
    /// This should only be used for deserialization or testing purposes.
    /// Using arbitrary values may lead to ID collisions.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of fresh instance ids.
///
/// The allocator is an explicit value passed into every reconciliation call
/// rather than a process-wide counter, so tests can seed it deterministically.
#[derive(Debug, Clone)]
pub struct InstanceIdAllocator {
    next: u64,
}

impl InstanceIdAllocator {
    /// Creates an allocator whose first id is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Creates an allocator whose first id is `first`.
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Hands out the next id.
    pub fn allocate(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Returns the id the next call to [`allocate`](Self::allocate) will produce.
    #[must_use]
    pub const fn peek(&self) -> InstanceId {
        InstanceId(self.next)
    }
}

impl Default for InstanceIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids() {
        let mut alloc = InstanceIdAllocator::new();
        let id1 = alloc.allocate();
        let id2 = alloc.allocate();
        let id3 = alloc.allocate();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
        assert!(id1 < id2 && id2 < id3);
    }

    #[test]
    fn test_seeded_allocator() {
        let mut alloc = InstanceIdAllocator::starting_at(100);
        assert_eq!(alloc.peek().as_u64(), 100);
        assert_eq!(alloc.allocate().as_u64(), 100);
        assert_eq!(alloc.allocate().as_u64(), 101);
    }

    #[test]
    fn test_from_raw() {
        let id = InstanceId::from_raw(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(id.to_string(), "42");
    }
}
