use std::ops::Range;
use std::sync::Arc;

use crate::data::datatable::{DataRow, DataTable};
use crate::data::filter::RowFilter;
use crate::data::sort::{sort_row_indices, SortState};

/// A view over a DataTable that can filter and sort rows
/// without modifying the underlying data
#[derive(Clone)]
pub struct DataView {
    /// The underlying immutable data source
    source: Arc<DataTable>,

    /// Row indices that are visible, in display order
    visible_rows: Vec<usize>,
}

impl DataView {
    /// Create a new view showing all rows in load order
    pub fn new(source: Arc<DataTable>) -> Self {
        let row_count = source.row_count();
        Self {
            source,
            visible_rows: (0..row_count).collect(),
        }
    }

    /// Create a view with specific rows
    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.visible_rows = rows;
        self
    }

    /// Keep only rows accepted by the filter
    pub fn filter(mut self, row_filter: &RowFilter<'_>) -> Self {
        if row_filter.is_inert() {
            return self;
        }
        let source = &self.source;
        self.visible_rows
            .retain(|&row_idx| source.row(row_idx).is_some_and(|row| row_filter.matches(row)));
        self
    }

    /// Order the visible rows by the sort state
    pub fn sort_by(mut self, sort: &SortState) -> Self {
        sort_row_indices(&self.source, &mut self.visible_rows, sort);
        self
    }

    /// Get the number of visible rows
    pub fn row_count(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_rows.is_empty()
    }

    /// Get a visible row by display index
    pub fn get_row(&self, index: usize) -> Option<&DataRow> {
        let row_idx = *self.visible_rows.get(index)?;
        self.source.row(row_idx)
    }

    /// Get all visible rows in display order
    pub fn rows(&self) -> Vec<&DataRow> {
        self.visible_rows
            .iter()
            .filter_map(|&idx| self.source.row(idx))
            .collect()
    }

    /// Clone out the rows of one display range, clamped to the view
    pub fn slice(&self, range: Range<usize>) -> Vec<DataRow> {
        let end = range.end.min(self.visible_rows.len());
        let start = range.start.min(end);
        self.visible_rows[start..end]
            .iter()
            .filter_map(|&idx| self.source.row(idx).cloned())
            .collect()
    }

    /// Get the source DataTable
    pub fn source(&self) -> &DataTable {
        &self.source
    }

    /// Get visible row indices
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }
}
