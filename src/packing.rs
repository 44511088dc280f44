//! Packing
//!
//! The interpreted result of a solve: which items went into which bin, the per-bin
//! and overall totals, and the outcome status.

use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::{items::Item, problem::Instance, solvers::SolveStatus};

/// A packing that breaks one of the packing invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackingViolation {
    /// A bin holds more weight than its capacity.
    #[error("bin {bin_idx} holds weight {weight}, exceeding its capacity {capacity}")]
    CapacityExceeded {
        /// Bin index
        bin_idx: usize,
        /// Packed weight
        weight: u64,
        /// Bin capacity
        capacity: u64,
    },

    /// An item appears in more than one bin.
    #[error("item {item_idx} is assigned to more than one bin")]
    ItemAssignedTwice {
        /// Item index
        item_idx: usize,
    },

    /// A packed item is not part of the instance.
    #[error("item {0} is not part of the instance")]
    UnknownItem(usize),

    /// The packing does not list exactly one load per active bin, in order.
    #[error("packing bins do not match the {expected} active bins")]
    BinMismatch {
        /// Number of active bins in the instance
        expected: usize,
    },

    /// A bin's recorded totals disagree with its items.
    #[error("bin {bin_idx} totals do not match its items")]
    BinTotalsMismatch {
        /// Bin index
        bin_idx: usize,
    },

    /// The reported total value disagrees with the sum over all bins.
    #[error("total value {reported} does not match recomputed value {recomputed}")]
    ValueMismatch {
        /// Reported total value
        reported: u64,
        /// Total recomputed from the packed items
        recomputed: u64,
    },

    /// A total does not fit in a `u64`.
    #[error("packing totals overflow")]
    Overflow,
}

/// An item placed in a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedItem {
    /// Index of the item in the instance
    pub item_idx: usize,

    /// Item weight
    pub weight: u64,

    /// Item value
    pub value: u64,
}

/// The items packed into one bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinLoad {
    bin_idx: usize,
    capacity: u64,
    items: SmallVec<[PackedItem; 10]>,
    weight: u64,
    value: u64,
}

impl BinLoad {
    /// Create an empty load for a bin.
    pub fn new(bin_idx: usize, capacity: u64) -> Self {
        Self {
            bin_idx,
            capacity,
            items: SmallVec::new(),
            weight: 0,
            value: 0,
        }
    }

    /// Add an item to the load.
    ///
    /// Capacity is not checked here; [`Packing::validate`] does that for the whole packing.
    ///
    /// # Errors
    ///
    /// Returns [`PackingViolation::Overflow`] if the bin totals overflow.
    pub fn push(&mut self, item_idx: usize, item: &Item) -> Result<(), PackingViolation> {
        self.weight = self
            .weight
            .checked_add(item.weight())
            .ok_or(PackingViolation::Overflow)?;

        self.value = self
            .value
            .checked_add(item.value())
            .ok_or(PackingViolation::Overflow)?;

        self.items.push(PackedItem {
            item_idx,
            weight: item.weight(),
            value: item.value(),
        });

        Ok(())
    }

    /// Index of the bin
    pub fn bin_idx(&self) -> usize {
        self.bin_idx
    }

    /// Capacity of the bin
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Items packed into the bin, in ascending item order
    pub fn items(&self) -> &[PackedItem] {
        &self.items
    }

    /// Indexes of the items packed into the bin
    pub fn item_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.items.iter().map(|packed| packed.item_idx)
    }

    /// Total weight packed into the bin
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Total value packed into the bin
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Capacity left unused
    pub fn remaining_capacity(&self) -> u64 {
        self.capacity.saturating_sub(self.weight)
    }
}

/// One item drawn as a segment of a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSegment {
    /// Index of the item
    pub item_idx: usize,

    /// Weight already drawn before this segment
    pub offset: u64,

    /// Item weight (segment width)
    pub weight: u64,

    /// Item value
    pub value: u64,
}

/// Drawing data for one bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinLayout {
    /// Index of the bin
    pub bin_idx: usize,

    /// Capacity of the bin
    pub capacity: u64,

    /// Value packed into the bin
    pub value: u64,

    /// Consecutive item segments
    pub segments: SmallVec<[ItemSegment; 10]>,

    /// Capacity left after the last segment
    pub unused: u64,
}

/// Result of packing an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packing {
    status: SolveStatus,
    bins: Vec<BinLoad>,
    unassigned_items: SmallVec<[usize; 10]>,
    total_weight: u64,
    total_value: u64,
    variable_count: usize,
    detail: Option<String>,
}

impl Packing {
    /// Build a packing from one load per active bin and validate it.
    ///
    /// # Errors
    ///
    /// Returns a [`PackingViolation`] if the loads break a packing invariant.
    pub fn from_bin_loads(
        status: SolveStatus,
        instance: &Instance<'_>,
        bins: Vec<BinLoad>,
        variable_count: usize,
    ) -> Result<Self, PackingViolation> {
        let mut assigned: SmallVec<[bool; 16]> = smallvec![false; instance.item_count()];

        for item_idx in bins.iter().flat_map(BinLoad::item_indices) {
            if let Some(flag) = assigned.get_mut(item_idx) {
                *flag = true;
            }
        }

        let unassigned_items = assigned
            .iter()
            .enumerate()
            .filter_map(|(item_idx, assigned)| (!assigned).then_some(item_idx))
            .collect();

        let total_weight = checked_sum(bins.iter().map(BinLoad::weight))?;
        let total_value = checked_sum(bins.iter().map(BinLoad::value))?;

        let packing = Self {
            status,
            bins,
            unassigned_items,
            total_weight,
            total_value,
            variable_count,
            detail: None,
        };

        packing.validate(instance)?;

        Ok(packing)
    }

    /// A packing for an outcome that has no assignment.
    pub fn without_assignment(
        status: SolveStatus,
        variable_count: usize,
        detail: Option<String>,
    ) -> Self {
        Self {
            status,
            bins: Vec::new(),
            unassigned_items: SmallVec::new(),
            total_weight: 0,
            total_value: 0,
            variable_count,
            detail,
        }
    }

    /// Check every packing invariant against the instance, recomputing all totals
    /// from the instance's items.
    ///
    /// Packings without an assignment are always valid.
    ///
    /// # Errors
    ///
    /// Returns the first [`PackingViolation`] found.
    pub fn validate(&self, instance: &Instance<'_>) -> Result<(), PackingViolation> {
        if !self.status.has_assignment() {
            return Ok(());
        }

        let mismatch = PackingViolation::BinMismatch {
            expected: instance.bin_count(),
        };

        if self.bins.len() != instance.bin_count() {
            return Err(mismatch);
        }

        let mut seen: SmallVec<[bool; 16]> = smallvec![false; instance.item_count()];
        let mut recomputed_total: u64 = 0;

        for (bin_idx, (load, bin)) in self.bins.iter().zip(instance.bins()).enumerate() {
            if load.bin_idx != bin_idx || load.capacity != bin.capacity() {
                return Err(mismatch);
            }

            let mut weight: u64 = 0;
            let mut value: u64 = 0;

            for item_idx in load.item_indices() {
                let item = instance
                    .items()
                    .get(item_idx)
                    .ok_or(PackingViolation::UnknownItem(item_idx))?;

                let flag = seen
                    .get_mut(item_idx)
                    .ok_or(PackingViolation::UnknownItem(item_idx))?;

                if *flag {
                    return Err(PackingViolation::ItemAssignedTwice { item_idx });
                }

                *flag = true;

                weight = weight
                    .checked_add(item.weight())
                    .ok_or(PackingViolation::Overflow)?;
                value = value
                    .checked_add(item.value())
                    .ok_or(PackingViolation::Overflow)?;
            }

            if weight != load.weight || value != load.value {
                return Err(PackingViolation::BinTotalsMismatch {
                    bin_idx: load.bin_idx,
                });
            }

            if weight > bin.capacity() {
                return Err(PackingViolation::CapacityExceeded {
                    bin_idx: load.bin_idx,
                    weight,
                    capacity: bin.capacity(),
                });
            }

            recomputed_total = recomputed_total
                .checked_add(value)
                .ok_or(PackingViolation::Overflow)?;
        }

        if recomputed_total != self.total_value {
            return Err(PackingViolation::ValueMismatch {
                reported: self.total_value,
                recomputed: recomputed_total,
            });
        }

        Ok(())
    }

    /// Outcome of the solve
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Returns true if the packing has an assignment worth reporting or plotting.
    pub fn is_plottable(&self) -> bool {
        self.status.has_assignment()
    }

    /// One load per active bin; empty when there is no assignment.
    pub fn bins(&self) -> &[BinLoad] {
        &self.bins
    }

    /// Load of a single bin
    pub fn bin(&self, bin_idx: usize) -> Option<&BinLoad> {
        self.bins.get(bin_idx)
    }

    /// Bin holding the given item, if any
    pub fn bin_of(&self, item_idx: usize) -> Option<usize> {
        self.bins
            .iter()
            .find(|load| load.item_indices().any(|idx| idx == item_idx))
            .map(BinLoad::bin_idx)
    }

    /// Items left out of every bin; empty when there is no assignment.
    pub fn unassigned_items(&self) -> &[usize] {
        &self.unassigned_items
    }

    /// Total packed weight
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Total packed value
    pub fn total_value(&self) -> u64 {
        self.total_value
    }

    /// Number of decision variables in the formulation that produced this packing
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Diagnostic from the backend when the solve failed
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Drawing data for each bin, ordered by ascending packed value.
    pub fn layout(&self) -> Vec<BinLayout> {
        let mut layouts: Vec<BinLayout> = self
            .bins
            .iter()
            .map(|load| {
                let mut offset = 0;
                let segments = load
                    .items
                    .iter()
                    .map(|packed| {
                        let segment = ItemSegment {
                            item_idx: packed.item_idx,
                            offset,
                            weight: packed.weight,
                            value: packed.value,
                        };

                        offset += packed.weight;

                        segment
                    })
                    .collect();

                BinLayout {
                    bin_idx: load.bin_idx,
                    capacity: load.capacity,
                    value: load.value,
                    segments,
                    unused: load.remaining_capacity(),
                }
            })
            .collect();

        layouts.sort_by_key(|layout| layout.value);

        layouts
    }
}

fn checked_sum(mut values: impl Iterator<Item = u64>) -> Result<u64, PackingViolation> {
    values.try_fold(0_u64, |acc, value| {
        acc.checked_add(value).ok_or(PackingViolation::Overflow)
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{bins::Bin, problem::Problem};

    use super::*;

    fn test_problem() -> Result<Problem, crate::problem::ProblemError> {
        Problem::new(
            [Item::new(2, 3), Item::new(3, 5), Item::new(4, 6)],
            [Bin::new(5), Bin::new(4)],
        )
    }

    fn load(
        instance: &Instance<'_>,
        bin_idx: usize,
        items: &[usize],
    ) -> Result<BinLoad, Box<dyn std::error::Error>> {
        let bin = instance.bins().get(bin_idx).ok_or("missing bin")?;
        let mut load = BinLoad::new(bin_idx, bin.capacity());

        for &item_idx in items {
            load.push(item_idx, instance.items().get(item_idx).ok_or("missing item")?)?;
        }

        Ok(load)
    }

    #[test]
    fn from_bin_loads_computes_totals_and_unassigned() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;

        let packing = Packing::from_bin_loads(
            SolveStatus::Optimal,
            &instance,
            vec![load(&instance, 0, &[0, 1])?, load(&instance, 1, &[2])?],
            6,
        )?;

        assert_eq!(packing.total_value(), 14);
        assert_eq!(packing.total_weight(), 9);
        assert!(packing.unassigned_items().is_empty());
        assert_eq!(packing.bin_of(2), Some(1));
        assert_eq!(packing.bin(0).map(BinLoad::remaining_capacity), Some(0));
        assert_eq!(packing.variable_count(), 6);
        assert!(packing.is_plottable());

        Ok(())
    }

    #[test]
    fn total_value_overflow_across_bins_is_rejected() -> TestResult {
        let half = u64::MAX / 2 + 1;
        let problem = Problem::new(
            [Item::new(1, half), Item::new(1, half)],
            [Bin::new(1), Bin::new(1)],
        )?;
        let instance = problem.instance(2)?;

        let result = Packing::from_bin_loads(
            SolveStatus::Optimal,
            &instance,
            vec![load(&instance, 0, &[0])?, load(&instance, 1, &[1])?],
            4,
        );

        assert_eq!(result.err(), Some(PackingViolation::Overflow));

        Ok(())
    }

    #[test]
    fn over_capacity_load_is_rejected() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;

        let result = Packing::from_bin_loads(
            SolveStatus::Optimal,
            &instance,
            vec![load(&instance, 0, &[0, 2])?, load(&instance, 1, &[])?],
            6,
        );

        assert_eq!(
            result.err(),
            Some(PackingViolation::CapacityExceeded {
                bin_idx: 0,
                weight: 6,
                capacity: 5
            })
        );

        Ok(())
    }

    #[test]
    fn item_in_two_bins_is_rejected() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;

        let result = Packing::from_bin_loads(
            SolveStatus::Feasible,
            &instance,
            vec![load(&instance, 0, &[0])?, load(&instance, 1, &[0])?],
            6,
        );

        assert_eq!(
            result.err(),
            Some(PackingViolation::ItemAssignedTwice { item_idx: 0 })
        );

        Ok(())
    }

    #[test]
    fn missing_bin_load_is_rejected() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;

        let result = Packing::from_bin_loads(
            SolveStatus::Optimal,
            &instance,
            vec![load(&instance, 0, &[1])?],
            6,
        );

        assert_eq!(
            result.err(),
            Some(PackingViolation::BinMismatch { expected: 2 })
        );

        Ok(())
    }

    #[test]
    fn unknown_item_is_rejected() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(1)?;

        let mut bogus = BinLoad::new(0, 5);
        bogus.push(7, &Item::new(1, 1))?;

        let result = Packing::from_bin_loads(SolveStatus::Optimal, &instance, vec![bogus], 3);

        assert_eq!(result.err(), Some(PackingViolation::UnknownItem(7)));

        Ok(())
    }

    #[test]
    fn packing_without_assignment_is_empty_and_not_plottable() {
        let packing =
            Packing::without_assignment(SolveStatus::Unknown, 6, Some("solver crashed".into()));

        assert!(!packing.is_plottable());
        assert!(packing.bins().is_empty());
        assert_eq!(packing.total_value(), 0);
        assert_eq!(packing.detail(), Some("solver crashed"));
    }

    #[test]
    fn layout_orders_bins_by_value_and_stacks_segments() -> TestResult {
        let problem = test_problem()?;
        let instance = problem.instance(2)?;

        let packing = Packing::from_bin_loads(
            SolveStatus::Optimal,
            &instance,
            vec![load(&instance, 0, &[0, 1])?, load(&instance, 1, &[2])?],
            6,
        )?;

        let layout = packing.layout();

        let order: Vec<usize> = layout.iter().map(|bin| bin.bin_idx).collect();
        assert_eq!(order, vec![1, 0]);

        let bin_0 = layout.get(1).ok_or("missing bin 0 layout")?;
        let offsets: Vec<u64> = bin_0.segments.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 2]);
        assert_eq!(bin_0.unused, 0);

        let bin_1 = layout.first().ok_or("missing bin 1 layout")?;
        assert_eq!(bin_1.unused, 0);
        assert_eq!(bin_1.value, 6);

        Ok(())
    }
}
