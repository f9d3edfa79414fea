//! The table engine: filter, sort and paginate a fixed row set in response to
//! control actions.
//!
//! The engine owns its filter, sort and pagination state. Every render starts
//! again from the full row set: filter, then sort, then take the page slice.
//! Filter edits send the view back to page 1; sort changes keep the current
//! page.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use crate::data::control_action::{ColumnRef, ControlAction, PageAction};
use crate::data::data_view::DataView;
use crate::data::datatable::{DataColumn, DataRow, DataTable};
use crate::data::filter::{FilterBindings, FilterControls, FilterState, InvalidDatePolicy, RowFilter};
use crate::data::pagination::{page_count, PageInfo, PaginationState};
use crate::data::sort::SortState;

/// Construction-time settings for a table engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub rows_per_page: usize,
    pub filters: FilterControls,
    pub invalid_dates: InvalidDatePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            rows_per_page: 10,
            filters: FilterControls::default(),
            invalid_dates: InvalidDatePolicy::default(),
        }
    }
}

/// Everything a front end needs to draw the table once
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub columns: Vec<DataColumn>,
    /// Rows of the current page, in display order
    pub rows: Vec<DataRow>,
    pub page: PageInfo,
    pub sort: SortState,
    pub filters_active: bool,
}

impl TableSnapshot {
    /// The "no rows" state
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct TableEngine {
    table: Arc<DataTable>,
    bindings: FilterBindings,
    filters: FilterState,
    sort: SortState,
    pagination: PaginationState,
}

impl TableEngine {
    pub fn new(table: Arc<DataTable>, options: EngineOptions) -> Result<Self> {
        if table.column_count() == 0 {
            return Err(anyhow!("Table '{}' has no columns", table.name));
        }
        let pagination = PaginationState::new(options.rows_per_page)
            .with_context(|| format!("Invalid pagination for table '{}'", table.name))?;
        let bindings = FilterBindings::resolve(&table, &options.filters, options.invalid_dates);

        info!(
            target: "table_engine",
            "Table '{}' ready: {} rows, {} columns, {} rows per page",
            table.name,
            table.row_count(),
            table.column_count(),
            options.rows_per_page
        );

        Ok(Self {
            table,
            bindings,
            filters: FilterState::default(),
            sort: SortState::default(),
            pagination,
        })
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn bindings(&self) -> &FilterBindings {
        &self.bindings
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn pagination_state(&self) -> &PaginationState {
        &self.pagination
    }

    /// Single entry point for every control. Returns the fresh render.
    ///
    /// An applied filter edit sends the view back to page 1.
    pub fn dispatch(&mut self, action: ControlAction) -> TableSnapshot {
        debug!(target: "table_engine", "Dispatch: {}", action);
        let resets_page = action.is_filter_change();
        let applied = match action {
            ControlAction::Search(text) => self.set_search(text),
            ControlAction::Select { column, value } => self.set_select(&column, value),
            ControlAction::DateFrom(date) => self.set_date_from(date),
            ControlAction::DateTo(date) => self.set_date_to(date),
            ControlAction::Sort(ColumnRef::Index(index)) => self.click_header(index),
            ControlAction::Sort(ColumnRef::Name(name)) => match self.table.get_column_index(&name) {
                Some(index) => self.click_header(index),
                None => false,
            },
            ControlAction::Page(page) => {
                self.click_page(page);
                true
            }
            ControlAction::Reset => {
                self.clear_filters();
                true
            }
        };
        if !applied {
            debug!(target: "table_engine", "Action had no bound control, ignored");
        } else if resets_page {
            self.pagination.reset();
        }
        self.render()
    }

    /// Returns false when the table has no search box
    fn set_search(&mut self, text: String) -> bool {
        if !self.bindings.has_search() {
            return false;
        }
        self.filters.search = text;
        true
    }

    /// Returns false when no select filter is bound for `column`
    fn set_select(&mut self, column: &str, value: String) -> bool {
        if self.bindings.select_column(column).is_none() {
            return false;
        }
        let key = self
            .bindings
            .select_names()
            .into_iter()
            .find(|name| name == column || name.eq_ignore_ascii_case(column))
            .unwrap_or_else(|| column.to_string());
        self.filters.selects.insert(key, value);
        true
    }

    fn set_date_from(&mut self, date: Option<NaiveDate>) -> bool {
        if !self.bindings.has_date_range() {
            return false;
        }
        self.filters.date_range.start = date;
        true
    }

    fn set_date_to(&mut self, date: Option<NaiveDate>) -> bool {
        if !self.bindings.has_date_range() {
            return false;
        }
        self.filters.date_range.end = date;
        true
    }

    fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Header click. Non-sortable or unknown columns are ignored.
    fn click_header(&mut self, column: usize) -> bool {
        match self.table.column(column) {
            Some(descriptor) if descriptor.sortable => {
                self.sort.click(column);
                debug!(
                    target: "table_engine",
                    "Sorting by '{}' {}",
                    descriptor.name, self.sort.direction
                );
                true
            }
            _ => false,
        }
    }

    fn click_page(&mut self, action: PageAction) {
        let pages = page_count(self.filtered_view().row_count(), self.pagination.rows_per_page());
        self.pagination.apply(action, pages);
        debug!(target: "table_engine", "Page {} of {}", self.pagination.current_page(), pages);
    }

    fn filtered_view(&self) -> DataView {
        let row_filter = RowFilter::new(&self.bindings, &self.filters);
        DataView::new(Arc::clone(&self.table)).filter(&row_filter)
    }

    /// Filtered and sorted view over the whole row set
    pub fn view(&self) -> DataView {
        self.filtered_view().sort_by(&self.sort)
    }

    /// Recompute the visible page from the full row set
    pub fn render(&self) -> TableSnapshot {
        let view = self.view();
        let page = PageInfo::compute(view.row_count(), &self.pagination);
        let rows = view.slice(page.range.clone());

        TableSnapshot {
            columns: self.table.columns().to_vec(),
            rows,
            page,
            sort: self.sort,
            filters_active: self.filters.is_active(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::ColumnType;

    fn engine(rows_per_page: usize) -> TableEngine {
        let rows = [
            ["Bob", "$20.00", "Published"],
            ["Amy", "$5.00", "Draft"],
            ["Cid", "$100.00", "Published"],
        ];
        let table = DataTable::from_parts(
            "payouts",
            vec![
                DataColumn::new("name"),
                DataColumn::new("amount").with_type(ColumnType::Currency),
                DataColumn::new("status").with_sortable(false),
            ],
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap();
        let options = EngineOptions {
            rows_per_page,
            filters: FilterControls {
                search: true,
                selects: vec!["status".to_string()],
                date_column: None,
            },
            ..EngineOptions::default()
        };
        TableEngine::new(Arc::new(table), options).unwrap()
    }

    fn names(snapshot: &TableSnapshot) -> Vec<String> {
        snapshot
            .rows
            .iter()
            .map(|row| row.get(0).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let engine = engine(10);
        assert_eq!(engine.sort_state(), &SortState::default());
        assert_eq!(engine.pagination_state().current_page(), 1);
        assert!(!engine.filter_state().is_active());
        assert_eq!(names(&engine.render()), vec!["Bob", "Amy", "Cid"]);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let table = DataTable::from_parts("t", vec![DataColumn::new("a")], vec![]).unwrap();
        let options = EngineOptions {
            rows_per_page: 0,
            ..EngineOptions::default()
        };
        assert!(TableEngine::new(Arc::new(table), options).is_err());
    }

    #[test]
    fn test_filter_change_resets_page_but_sort_does_not() {
        let mut engine = engine(1);
        engine.dispatch(ControlAction::Page(PageAction::Goto(3)));
        assert_eq!(engine.pagination_state().current_page(), 3);

        let snapshot = engine.dispatch(ControlAction::Sort(ColumnRef::Index(1)));
        assert_eq!(snapshot.page.current_page, 3);
        assert_eq!(names(&snapshot), vec!["Cid"]);

        let snapshot = engine.dispatch(ControlAction::Search("CID".to_string()));
        assert_eq!(snapshot.page.current_page, 1);
        assert_eq!(snapshot.page.total, 1);
    }

    #[test]
    fn test_only_applied_filter_edits_reset_page() {
        let mut engine = engine(1);
        engine.dispatch(ControlAction::Page(PageAction::Goto(3)));

        // "name" has no select filter, so nothing changes
        let snapshot = engine.dispatch(ControlAction::Select {
            column: "name".to_string(),
            value: "Amy".to_string(),
        });
        assert_eq!(snapshot.page.current_page, 3);

        let snapshot = engine.dispatch(ControlAction::Page(PageAction::Previous));
        assert_eq!(snapshot.page.current_page, 2);

        let snapshot = engine.dispatch(ControlAction::Reset);
        assert_eq!(snapshot.page.current_page, 1);
    }

    #[test]
    fn test_non_sortable_header_is_ignored() {
        let mut engine = engine(10);
        let snapshot = engine.dispatch(ControlAction::Sort(ColumnRef::Name("status".into())));
        assert_eq!(snapshot.sort.column, None);
        assert_eq!(names(&snapshot), vec!["Bob", "Amy", "Cid"]);
    }

    #[test]
    fn test_unbound_select_is_inert() {
        let mut engine = engine(10);
        let snapshot = engine.dispatch(ControlAction::Select {
            column: "name".to_string(),
            value: "Amy".to_string(),
        });
        assert_eq!(snapshot.page.total, 3);
        assert!(!snapshot.filters_active);
    }

    #[test]
    fn test_reset_clears_filters_and_keeps_sort() {
        let mut engine = engine(10);
        engine.dispatch(ControlAction::Sort(ColumnRef::Index(1)));
        engine.dispatch(ControlAction::Select {
            column: "Status".to_string(),
            value: "published".to_string(),
        });
        assert_eq!(engine.render().page.total, 2);

        let snapshot = engine.dispatch(ControlAction::Reset);
        assert_eq!(snapshot.page.total, 3);
        assert_eq!(names(&snapshot), vec!["Amy", "Bob", "Cid"]);
    }
}
