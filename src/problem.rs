//! Problem
//!
//! A [`Problem`] holds every loaded item and the full pool of bins. Solving works on an
//! [`Instance`]: the same items with the first `M` bins of the pool, where `M` has been
//! validated against the pool size.

use thiserror::Error;

use crate::{bins::Bin, items::Item};

/// Errors related to problem construction and bin selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
    /// The bin pool has no bins, so no bin count can be valid.
    #[error("bin pool is empty")]
    NoBins,

    /// The requested number of bins is outside `1..=pool`.
    #[error("number of bins must be between 1 and {pool}, got {requested}")]
    BinCountOutOfRange {
        /// Number of bins requested
        requested: usize,
        /// Number of bins in the pool
        pool: usize,
    },

    /// The requested number of bins is not an integer.
    #[error("number of bins is not a valid integer: {0:?}")]
    InvalidBinCount(String),
}

/// Loaded items and the pool of available bins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    items: Vec<Item>,
    bins: Vec<Bin>,
}

impl Problem {
    /// Create a problem from items and the bin pool.
    ///
    /// An empty item list is allowed; it packs to an empty solution.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::NoBins`] if the bin pool is empty.
    pub fn new(
        items: impl IntoIterator<Item = Item>,
        bins: impl IntoIterator<Item = Bin>,
    ) -> Result<Self, ProblemError> {
        let items: Vec<Item> = items.into_iter().collect();
        let bins: Vec<Bin> = bins.into_iter().collect();

        if bins.is_empty() {
            return Err(ProblemError::NoBins);
        }

        Ok(Self { items, bins })
    }

    /// All items, indexed from zero.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The full bin pool, indexed from zero.
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Number of bins in the pool.
    pub fn pool_size(&self) -> usize {
        self.bins.len()
    }

    /// Select the first `bins_to_use` bins of the pool.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::BinCountOutOfRange`] unless `1 <= bins_to_use <= pool_size`.
    pub fn instance(&self, bins_to_use: usize) -> Result<Instance<'_>, ProblemError> {
        let out_of_range = || ProblemError::BinCountOutOfRange {
            requested: bins_to_use,
            pool: self.pool_size(),
        };

        if bins_to_use == 0 {
            return Err(out_of_range());
        }

        let bins = self.bins.get(..bins_to_use).ok_or_else(out_of_range)?;

        Ok(Instance {
            items: &self.items,
            bins,
        })
    }

    /// Parse and validate a bin count typed by a user.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::InvalidBinCount`] if the input is not an integer and
    /// [`ProblemError::BinCountOutOfRange`] if it is outside `1..=pool_size`.
    pub fn parse_bin_count(&self, input: &str) -> Result<usize, ProblemError> {
        let trimmed = input.trim();

        let requested: usize = trimmed
            .parse()
            .map_err(|_err| ProblemError::InvalidBinCount(trimmed.to_string()))?;

        // Validate without keeping the borrow.
        self.instance(requested).map(|_instance| requested)
    }
}

/// The items of a problem together with the active bins.
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    items: &'a [Item],
    bins: &'a [Bin],
}

impl<'a> Instance<'a> {
    /// Items to pack.
    pub fn items(&self) -> &'a [Item] {
        self.items
    }

    /// Active bins.
    pub fn bins(&self) -> &'a [Bin] {
        self.bins
    }

    /// Number of items (`N`).
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of active bins (`M`).
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Indices of items that no active bin can hold. These are never packed.
    pub fn oversized_items(self) -> impl Iterator<Item = usize> + 'a {
        let bins = self.bins;

        self.items
            .iter()
            .enumerate()
            .filter(move |(_, item)| !bins.iter().any(|bin| bin.admits(item.weight())))
            .map(|(item_idx, _)| item_idx)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn test_problem() -> Result<Problem, ProblemError> {
        Problem::new(
            [Item::new(2, 3), Item::new(3, 5)],
            [Bin::new(5), Bin::new(8), Bin::new(13)],
        )
    }

    #[test]
    fn new_rejects_empty_bin_pool() {
        let result = Problem::new([Item::new(1, 1)], []);

        assert_eq!(result, Err(ProblemError::NoBins));
    }

    #[test]
    fn new_accepts_empty_items() -> TestResult {
        let problem = Problem::new([], [Bin::new(5)])?;

        assert!(problem.items().is_empty());
        assert_eq!(problem.pool_size(), 1);

        Ok(())
    }

    #[test]
    fn instance_uses_leading_bins_of_pool() -> TestResult {
        let problem = test_problem()?;

        let instance = problem.instance(2)?;

        assert_eq!(instance.item_count(), 2);
        assert_eq!(instance.bin_count(), 2);
        assert_eq!(instance.bins(), &[Bin::new(5), Bin::new(8)]);
        assert_eq!(instance.bins().get(1).map(Bin::capacity), Some(8));

        Ok(())
    }

    #[test]
    fn instance_accepts_whole_pool() -> TestResult {
        let problem = test_problem()?;

        assert_eq!(problem.instance(3)?.bin_count(), 3);

        Ok(())
    }

    #[test]
    fn instance_rejects_zero_and_oversized_counts() -> TestResult {
        let problem = test_problem()?;

        assert!(matches!(
            problem.instance(0),
            Err(ProblemError::BinCountOutOfRange {
                requested: 0,
                pool: 3
            })
        ));
        assert!(matches!(
            problem.instance(4),
            Err(ProblemError::BinCountOutOfRange {
                requested: 4,
                pool: 3
            })
        ));

        Ok(())
    }

    #[test]
    fn parse_bin_count_trims_and_validates() -> TestResult {
        let problem = test_problem()?;

        assert_eq!(problem.parse_bin_count(" 2\n")?, 2);
        assert_eq!(
            problem.parse_bin_count("two"),
            Err(ProblemError::InvalidBinCount("two".to_string()))
        );
        assert_eq!(
            problem.parse_bin_count("-1"),
            Err(ProblemError::InvalidBinCount("-1".to_string()))
        );
        assert_eq!(
            problem.parse_bin_count("7"),
            Err(ProblemError::BinCountOutOfRange {
                requested: 7,
                pool: 3
            })
        );

        Ok(())
    }

    #[test]
    fn oversized_items_fit_no_active_bin() -> TestResult {
        let problem = Problem::new(
            [Item::new(6, 1), Item::new(2, 1), Item::new(9, 1)],
            [Bin::new(5), Bin::new(8)],
        )?;

        let one_bin: Vec<usize> = problem.instance(1)?.oversized_items().collect();
        let two_bins: Vec<usize> = problem.instance(2)?.oversized_items().collect();

        assert_eq!(one_bin, vec![0, 2]);
        assert_eq!(two_bins, vec![2]);

        Ok(())
    }
}
