//! Datasets
//!
//! Items and bins are read from CSV tables. The items table has `weight` and `value`
//! columns and the bins table a `capacity` column; other columns are ignored.

use std::{fs::File, io, path::Path, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    bins::Bin,
    items::Item,
    problem::{Problem, ProblemError},
};

/// Dataset Parsing Errors
#[derive(Debug, Error)]
pub enum DatasetError {
    /// IO error reading a dataset file
    #[error("Failed to read dataset file {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// Malformed CSV or a field that is not a non-negative integer
    #[error("Failed to parse {table} table: {source}")]
    Csv {
        /// Table being parsed
        table: &'static str,
        /// Underlying CSV error
        source: csv::Error,
    },

    /// The table has a header but no rows
    #[error("The {0} table is empty")]
    EmptyTable(&'static str),

    /// The parsed tables do not form a valid problem
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

#[derive(Debug, Deserialize)]
struct ItemRecord {
    weight: u64,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct BinRecord {
    capacity: u64,
}

fn read_records<T, R: io::Read>(reader: R, table: &'static str) -> Result<Vec<T>, DatasetError>
where
    for<'de> T: Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| DatasetError::Csv { table, source })?;

    if records.is_empty() {
        return Err(DatasetError::EmptyTable(table));
    }

    Ok(records)
}

/// Read an items table (`weight,value`).
///
/// # Errors
///
/// Returns a [`DatasetError`] if the CSV is malformed, a field is not a non-negative
/// integer, or the table has no rows.
pub fn read_items<R: io::Read>(reader: R) -> Result<Vec<Item>, DatasetError> {
    Ok(read_records::<ItemRecord, _>(reader, "items")?
        .into_iter()
        .map(|record| Item::new(record.weight, record.value))
        .collect())
}

/// Read a bins table (`capacity`).
///
/// # Errors
///
/// Returns a [`DatasetError`] if the CSV is malformed, a field is not a non-negative
/// integer, or the table has no rows.
pub fn read_bins<R: io::Read>(reader: R) -> Result<Vec<Bin>, DatasetError> {
    Ok(read_records::<BinRecord, _>(reader, "bins")?
        .into_iter()
        .map(|record| Bin::new(record.capacity))
        .collect())
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a problem from an items CSV file and a bins CSV file.
///
/// # Errors
///
/// Returns a [`DatasetError`] if either file cannot be read or parsed.
pub fn load_problem(
    items_path: impl AsRef<Path>,
    bins_path: impl AsRef<Path>,
) -> Result<Problem, DatasetError> {
    let items = read_items(open(items_path.as_ref())?)?;
    let bins = read_bins(open(bins_path.as_ref())?)?;

    Ok(Problem::new(items, bins)?)
}

/// Named dataset sets stored as `<base>/items/<name>.csv` and `<base>/bins/<name>.csv`.
#[derive(Debug)]
pub struct Dataset {
    base_path: PathBuf,
    items: Vec<Item>,
    bins: Vec<Bin>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl Dataset {
    /// Create a new empty dataset with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty dataset with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            items: Vec::new(),
            bins: Vec::new(),
        }
    }

    /// Load items from `<base>/items/<name>.csv`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_items(&mut self, name: &str) -> Result<&mut Self, DatasetError> {
        let file_path = self.base_path.join("items").join(format!("{name}.csv"));

        self.items.extend(read_items(open(&file_path)?)?);

        Ok(self)
    }

    /// Load the bin pool from `<base>/bins/<name>.csv`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_bins(&mut self, name: &str) -> Result<&mut Self, DatasetError> {
        let file_path = self.base_path.join("bins").join(format!("{name}.csv"));

        self.bins.extend(read_bins(open(&file_path)?)?);

        Ok(self)
    }

    /// Load a complete dataset set (items and bins with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the dataset files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, DatasetError> {
        let mut dataset = Self::new();

        dataset.load_items(name)?.load_bins(name)?;

        Ok(dataset)
    }

    /// Build a problem from the loaded tables.
    ///
    /// # Errors
    ///
    /// Returns an error if no bins have been loaded.
    pub fn problem(&self) -> Result<Problem, DatasetError> {
        Ok(Problem::new(
            self.items.iter().copied(),
            self.bins.iter().copied(),
        )?)
    }
}
