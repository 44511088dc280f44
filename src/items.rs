//! Items

/// An item with a weight and a value that may be packed into at most one bin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Item {
    weight: u64,
    value: u64,
}

impl Item {
    /// Creates a new item with the given weight and value.
    pub fn new(weight: u64, value: u64) -> Self {
        Self { weight, value }
    }

    /// Returns the weight of the item
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Returns the value of the item
    pub fn value(&self) -> u64 {
        self.value
    }
}
