use anyhow::{anyhow, Result};
use std::ops::Range;

use crate::data::control_action::PageAction;

/// Current page and the fixed page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: usize,
    rows_per_page: usize,
}

impl PaginationState {
    pub fn new(rows_per_page: usize) -> Result<Self> {
        if rows_per_page == 0 {
            return Err(anyhow!("rows_per_page must be at least 1"));
        }
        Ok(Self {
            current_page: 1,
            rows_per_page,
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Apply a page button. Numbered pages are taken literally; the result is
    /// clamped against `page_count` so a stale or disabled click cannot leave
    /// the valid range.
    pub fn apply(&mut self, action: PageAction, page_count: usize) {
        self.current_page = match action {
            PageAction::Previous => self.current_page.saturating_sub(1),
            PageAction::Next => self.current_page.saturating_add(1),
            PageAction::Goto(page) => page,
        };
        self.clamp(page_count);
    }

    /// Keep `1 <= current_page <= max(1, page_count)`
    pub fn clamp(&mut self, page_count: usize) {
        self.current_page = self.current_page.clamp(1, page_count.max(1));
    }
}

/// Number of pages for `total` rows; zero when there are no rows
pub fn page_count(total: usize, rows_per_page: usize) -> usize {
    total.div_ceil(rows_per_page.max(1))
}

/// One affordance of the pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Previous { disabled: bool },
    Page { number: usize, active: bool },
    Next { disabled: bool },
}

impl PageControl {
    /// The action a click on this control dispatches, if it is enabled
    pub fn action(&self) -> Option<PageAction> {
        match *self {
            PageControl::Previous { disabled: false } => Some(PageAction::Previous),
            PageControl::Next { disabled: false } => Some(PageAction::Next),
            PageControl::Page { number, .. } => Some(PageAction::Goto(number)),
            _ => None,
        }
    }
}

/// Pagination metadata for one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: usize,
    pub page_count: usize,
    pub rows_per_page: usize,
    pub total: usize,
    /// 1-based first item on the page, 0 when there are no rows
    pub start_item: usize,
    /// 1-based last item on the page, clamped to `total`
    pub end_item: usize,
    /// Slice of the filtered and sorted rows shown on this page
    pub range: Range<usize>,
}

impl PageInfo {
    pub fn compute(total: usize, state: &PaginationState) -> Self {
        let rows_per_page = state.rows_per_page();
        let page_count = page_count(total, rows_per_page);
        let current_page = state.current_page().clamp(1, page_count.max(1));

        let start = ((current_page - 1) * rows_per_page).min(total);
        let end = (current_page * rows_per_page).min(total);

        Self {
            current_page,
            page_count,
            rows_per_page,
            total,
            start_item: if total == 0 { 0 } else { start + 1 },
            end_item: end,
            range: start..end,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count
    }

    /// The control is only shown when there is more than one page
    pub fn shows_controls(&self) -> bool {
        self.page_count > 1
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {}",
            self.start_item, self.end_item, self.total
        )
    }

    /// Previous, one button per page, Next; empty when the control is hidden
    pub fn controls(&self) -> Vec<PageControl> {
        if !self.shows_controls() {
            return Vec::new();
        }

        let mut controls = Vec::with_capacity(self.page_count + 2);
        controls.push(PageControl::Previous {
            disabled: !self.has_previous(),
        });
        controls.extend((1..=self.page_count).map(|number| PageControl::Page {
            number,
            active: number == self.current_page,
        }));
        controls.push(PageControl::Next {
            disabled: !self.has_next(),
        });
        controls
    }
}
