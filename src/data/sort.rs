use std::fmt;

use crate::data::cell_compare::SortKey;
use crate::data::datatable::DataTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// Which column the rows are ordered by. `None` keeps load order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<usize>,
    pub direction: SortDirection,
}

impl SortState {
    /// Header click: the sorted column flips direction, any other column
    /// becomes the sort column in ascending order
    pub fn click(&mut self, column: usize) {
        if self.column == Some(column) {
            self.direction = self.direction.toggle();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Ascending;
        }
    }

    /// Direction when `column` is the sort column
    pub fn direction_for(&self, column: usize) -> Option<SortDirection> {
        (self.column == Some(column)).then_some(self.direction)
    }
}

/// Stable sort of row indices by the sort column.
///
/// Keys are parsed once per row before sorting. Rows with equal keys keep
/// their relative input order in both directions.
pub fn sort_row_indices(table: &DataTable, rows: &mut [usize], state: &SortState) {
    let Some(column_index) = state.column else {
        return;
    };
    let Some(column) = table.column(column_index) else {
        return;
    };

    let mut keyed: Vec<(SortKey, usize)> = rows
        .iter()
        .map(|&row| {
            let text = table.get_value(row, column_index).unwrap_or("");
            (SortKey::from_cell(text, column.data_type), row)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = a.compare(b);
        if state.direction.is_ascending() {
            ordering
        } else {
            ordering.reverse()
        }
    });

    for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
        *slot = row;
    }
}
