//! Dataset — a DataFrame plus an index-column designation.
//!
//! Polars has no native row index, so a dataset's "index" is an ordered list
//! of column names designated as the sortable composite key. The designated
//! columns remain physically ordinary columns; formats that cannot carry the
//! designation (csv, feather) rely on the metadata record to re-designate
//! them on load.

use crate::error::DataError;
use polars::prelude::*;

/// A named table: a polars DataFrame and the columns forming its index.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    index: Vec<String>,
}

impl Dataset {
    /// A dataset with no index designation.
    pub fn new(frame: DataFrame) -> Self {
        Self {
            frame,
            index: Vec::new(),
        }
    }

    /// A dataset with the given columns designated as its index.
    pub fn with_index(frame: DataFrame, index: Vec<String>) -> Result<Self, DataError> {
        let mut ds = Self::new(frame);
        ds.set_index(index)?;
        Ok(ds)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Columns designated as the composite index, in order. Empty when the
    /// dataset has a plain positional index.
    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Designate existing columns as the composite index.
    ///
    /// Every named column must be present; the frame itself is not reordered.
    pub fn set_index(&mut self, columns: Vec<String>) -> Result<(), DataError> {
        for name in &columns {
            if self.frame.column(name).is_err() {
                return Err(DataError::MissingColumn {
                    column: name.clone(),
                });
            }
        }
        self.index = columns;
        Ok(())
    }

    /// Clear the index designation, leaving the former index columns as
    /// ordinary columns.
    pub fn reset_index(&mut self) {
        self.index.clear();
    }

    /// Drop a stray unnamed positional-index column left over from a writer
    /// that serialized a plain row index as a column.
    pub fn strip_positional_column(&mut self) {
        for name in ["", "Unnamed: 0"] {
            if self.frame.column(name).is_ok() {
                let _ = self.frame.drop_in_place(name);
            }
        }
    }

    /// Content equality: same index designation and same column values,
    /// nulls comparing equal. Used by the round-trip tests.
    pub fn content_eq(&self, other: &Dataset) -> bool {
        self.index == other.index && self.frame.equals_missing(&other.frame)
    }
}
