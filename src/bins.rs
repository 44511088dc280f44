//! Bins

/// A capacity-limited container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bin {
    capacity: u64,
}

impl Bin {
    /// Creates a new bin with the given capacity.
    pub fn new(capacity: u64) -> Self {
        Self { capacity }
    }

    /// Returns the capacity of the bin
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns true if an item of the given weight could fit in the empty bin.
    pub fn admits(&self, weight: u64) -> bool {
        weight <= self.capacity
    }
}
