//! Fixed-capacity ring buffer with push-with-eviction semantics.

/// Fixed-capacity circular window that always holds exactly `capacity`
/// entries.
///
/// The window starts filled with `T::default()`. Each [`push`](Self::push)
/// overwrites the oldest entry at the write pointer and advances the pointer
/// modulo the capacity, so no allocation happens after construction.
#[derive(Debug, Clone)]
pub struct RingWindow<T> {
    slots: Vec<T>,
    head: usize,
    pushed: u64,
}

impl<T: Copy + Default> RingWindow<T> {
    /// Create a window of `capacity` default-valued slots.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity.max(1)],
            head: 0,
            pushed: 0,
        }
    }

    /// Overwrite the oldest slot with `value` and return the evicted entry.
    pub fn push(&mut self, value: T) -> T {
        let evicted = std::mem::replace(&mut self.slots[self.head], value);
        self.head = (self.head + 1) % self.slots.len();
        self.pushed += 1;
        evicted
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// The most recently pushed entry, if any push has happened.
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        if self.pushed == 0 {
            return None;
        }
        let idx = (self.head + self.slots.len() - 1) % self.slots.len();
        Some(self.slots[idx])
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot the next push will overwrite.
    #[must_use]
    pub fn write_position(&self) -> usize {
        self.head
    }

    /// Total pushes since construction.
    #[must_use]
    pub fn pushed(&self) -> u64 {
        self.pushed
    }
}
