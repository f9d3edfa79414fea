//! Row filtering: free-text search, per-column select filters and a date range
//!
//! Filter controls are declared by column name and resolved against the table
//! schema once. A control whose column cannot be resolved stays inert for the
//! lifetime of the table instead of failing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::data::cell_parse::parse_date;
use crate::data::datatable::{DataRow, DataTable};

/// What the date range filter does with a cell that does not parse as a date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidDatePolicy {
    /// Keep the row
    #[default]
    Pass,
    /// Drop the row whenever a bound is set
    Exclude,
}

/// The filter controls a hosting page declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterControls {
    /// Whether a search box is present
    pub search: bool,

    /// Columns that get a select (dropdown) filter
    pub selects: Vec<String>,

    /// Column the start/end date pickers apply to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_column: Option<String>,
}

impl Default for FilterControls {
    fn default() -> Self {
        Self {
            search: true,
            selects: Vec::new(),
            date_column: None,
        }
    }
}

/// Filter controls resolved to column indices
#[derive(Debug, Clone, Default)]
pub struct FilterBindings {
    search: bool,
    selects: BTreeMap<String, usize>,
    date_column: Option<usize>,
    invalid_dates: InvalidDatePolicy,
}

impl FilterBindings {
    pub fn resolve(
        table: &DataTable,
        controls: &FilterControls,
        invalid_dates: InvalidDatePolicy,
    ) -> Self {
        let mut selects = BTreeMap::new();
        for name in &controls.selects {
            match table.get_column_index(name) {
                Some(index) => {
                    selects.insert(name.clone(), index);
                }
                None => {
                    warn!(target: "filter", "Select filter '{}' has no matching column, leaving it inert", name);
                }
            }
        }

        let date_column = controls.date_column.as_deref().and_then(|name| {
            let index = table.get_column_index(name);
            if index.is_none() {
                warn!(target: "filter", "Date range column '{}' not found, leaving date filter inert", name);
            }
            index
        });

        debug!(
            target: "filter",
            "Resolved filters: search={}, selects={:?}, date_column={:?}",
            controls.search, selects, date_column
        );

        Self {
            search: controls.search,
            selects,
            date_column,
            invalid_dates,
        }
    }

    pub fn has_search(&self) -> bool {
        self.search
    }

    /// Column index behind a declared select filter
    pub fn select_column(&self, name: &str) -> Option<usize> {
        self.selects.get(name).copied().or_else(|| {
            self.selects
                .iter()
                .find(|(declared, _)| declared.eq_ignore_ascii_case(name))
                .map(|(_, index)| *index)
        })
    }

    /// Declared select filter names that resolved to a column
    pub fn select_names(&self) -> Vec<String> {
        self.selects.keys().cloned().collect()
    }

    pub fn has_date_range(&self) -> bool {
        self.date_column.is_some()
    }

    pub fn invalid_dates(&self) -> InvalidDatePolicy {
        self.invalid_dates
    }
}

/// Inclusive date bounds; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Current values of the filter controls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    /// Keyed by the declared select filter name
    pub selects: BTreeMap<String, String>,
    pub date_range: DateRange,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || self.selects.values().any(|v| !v.trim().is_empty())
            || self.date_range.is_active()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A filter state compiled against its bindings, ready to test rows
pub struct RowFilter<'a> {
    bindings: &'a FilterBindings,
    needle: Option<String>,
    selects: Vec<(usize, String)>,
    date_range: Option<DateRange>,
}

impl<'a> RowFilter<'a> {
    pub fn new(bindings: &'a FilterBindings, state: &FilterState) -> Self {
        let needle = (bindings.search && !state.search.is_empty())
            .then(|| state.search.to_lowercase());

        let selects = state
            .selects
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .filter_map(|(name, value)| {
                bindings
                    .select_column(name)
                    .map(|index| (index, value.trim().to_lowercase()))
            })
            .collect();

        let date_range = (bindings.date_column.is_some() && state.date_range.is_active())
            .then_some(state.date_range);

        Self {
            bindings,
            needle,
            selects,
            date_range,
        }
    }

    /// True when no predicate is active
    pub fn is_inert(&self) -> bool {
        self.needle.is_none() && self.selects.is_empty() && self.date_range.is_none()
    }

    pub fn matches(&self, row: &DataRow) -> bool {
        self.matches_search(row) && self.matches_selects(row) && self.matches_date_range(row)
    }

    fn matches_search(&self, row: &DataRow) -> bool {
        match &self.needle {
            Some(needle) => row.text().to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    fn matches_selects(&self, row: &DataRow) -> bool {
        self.selects.iter().all(|(index, expected)| {
            row.get(*index)
                .map_or(false, |cell| cell.trim().to_lowercase() == *expected)
        })
    }

    fn matches_date_range(&self, row: &DataRow) -> bool {
        let (Some(range), Some(index)) = (self.date_range, self.bindings.date_column) else {
            return true;
        };

        match row.get(index).and_then(parse_date) {
            Some(dt) => range.contains(dt.date()),
            None => self.bindings.invalid_dates == InvalidDatePolicy::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::data_view::DataView;
    use crate::data::datatable::{ColumnType, DataColumn};
    use std::sync::Arc;

    fn sample_table() -> Arc<DataTable> {
        let rows = vec![
            vec!["Tomatoes", "Published", "2024-01-10"],
            vec!["Onions", "Draft", "2024-02-15"],
            vec!["Cabbage", "published ", "not a date"],
            vec!["Maize", "Archived", "2024-03-01"],
        ];
        DataTable::from_parts(
            "products",
            vec![
                DataColumn::new("name"),
                DataColumn::new("status"),
                DataColumn::new("created").with_type(ColumnType::Date),
            ],
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
        .map(Arc::new)
        .unwrap()
    }

    fn visible(table: &Arc<DataTable>, bindings: &FilterBindings, state: &FilterState) -> Vec<usize> {
        DataView::new(Arc::clone(table))
            .filter(&RowFilter::new(bindings, state))
            .visible_row_indices()
            .to_vec()
    }

    fn bindings(table: &DataTable, policy: InvalidDatePolicy) -> FilterBindings {
        let controls = FilterControls {
            search: true,
            selects: vec!["status".to_string()],
            date_column: Some("created".to_string()),
        };
        FilterBindings::resolve(table, &controls, policy)
    }

    #[test]
    fn test_empty_state_keeps_everything() {
        let table = sample_table();
        let bindings = bindings(&table, InvalidDatePolicy::Pass);
        let state = FilterState::default();
        assert_eq!(visible(&table, &bindings, &state), vec![0, 1, 2, 3]);
        assert!(!state.is_active());
    }

    #[test]
    fn test_search_spans_all_cells() {
        let table = sample_table();
        let bindings = bindings(&table, InvalidDatePolicy::Pass);
        let mut state = FilterState::default();
        state.search = "ONI".to_string();
        assert_eq!(visible(&table, &bindings, &state), vec![1]);

        state.search = "2024-0".to_string();
        assert_eq!(visible(&table, &bindings, &state), vec![0, 1, 3]);
    }

    #[test]
    fn test_select_is_trimmed_case_insensitive_equality() {
        let table = sample_table();
        let bindings = bindings(&table, InvalidDatePolicy::Pass);
        let mut state = FilterState::default();
        state
            .selects
            .insert("status".to_string(), "PUBLISHED".to_string());
        assert_eq!(visible(&table, &bindings, &state), vec![0, 2]);

        // Equality, not substring
        state.selects.insert("status".to_string(), "Pub".to_string());
        assert!(visible(&table, &bindings, &state).is_empty());

        // Blank value is inert
        state.selects.insert("status".to_string(), "  ".to_string());
        assert_eq!(visible(&table, &bindings, &state).len(), 4);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let table = sample_table();
        let bindings = bindings(&table, InvalidDatePolicy::Pass);
        let mut state = FilterState::default();
        state.date_range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 10),
            end: NaiveDate::from_ymd_opt(2024, 2, 15),
        };
        // Row 2 has an unparseable date and passes under the default policy
        assert_eq!(visible(&table, &bindings, &state), vec![0, 1, 2]);
    }

    #[test]
    fn test_invalid_dates_can_be_excluded() {
        let table = sample_table();
        let bindings = bindings(&table, InvalidDatePolicy::Exclude);
        let mut state = FilterState::default();
        state.date_range.start = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert_eq!(visible(&table, &bindings, &state), vec![1, 3]);
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let table = sample_table();
        let bindings = bindings(&table, InvalidDatePolicy::Pass);
        let mut state = FilterState::default();
        state
            .selects
            .insert("status".to_string(), "published".to_string());
        state.search = "cab".to_string();
        assert_eq!(visible(&table, &bindings, &state), vec![2]);
    }

    #[test]
    fn test_unresolved_controls_are_inert() {
        let table = sample_table();
        let controls = FilterControls {
            search: false,
            selects: vec!["category".to_string()],
            date_column: Some("shipped".to_string()),
        };
        let bindings = FilterBindings::resolve(&table, &controls, InvalidDatePolicy::Exclude);
        assert!(!bindings.has_date_range());
        assert!(bindings.select_names().is_empty());

        let mut state = FilterState::default();
        state.search = "zzz".to_string();
        state
            .selects
            .insert("category".to_string(), "veg".to_string());
        state.date_range.start = NaiveDate::from_ymd_opt(2030, 1, 1);
        assert_eq!(visible(&table, &bindings, &state).len(), 4);
    }
}
