use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::config::config::DisplayConfig;
use crate::data::pagination::{PageControl, PageInfo};
use crate::data::sort::SortDirection;
use crate::data::table_engine::TableSnapshot;

pub const NO_RESULTS: &str = "No results found.";

struct Markers {
    ascending: &'static str,
    descending: &'static str,
    sortable: &'static str,
}

const GLYPH_MARKERS: Markers = Markers {
    ascending: "▲",
    descending: "▼",
    sortable: "⇅",
};

const ASCII_MARKERS: Markers = Markers {
    ascending: "^",
    descending: "v",
    sortable: "*",
};

/// Draw the current page as a table, or the "no results" line
pub fn render_table(snapshot: &TableSnapshot, display: &DisplayConfig) -> String {
    if snapshot.is_empty() {
        return NO_RESULTS.to_string();
    }

    let markers = if display.use_glyphs {
        &GLYPH_MARKERS
    } else {
        &ASCII_MARKERS
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers: Vec<Cell> = Vec::with_capacity(snapshot.columns.len() + 1);
    if display.show_row_numbers {
        headers.push(Cell::new("#").add_attribute(Attribute::Bold));
    }
    for (index, column) in snapshot.columns.iter().enumerate() {
        let marker = match snapshot.sort.direction_for(index) {
            Some(SortDirection::Ascending) => markers.ascending,
            Some(SortDirection::Descending) => markers.descending,
            None if column.sortable => markers.sortable,
            None => "",
        };
        let label = if marker.is_empty() {
            format!("{}:{}", index, column.name)
        } else {
            format!("{}:{} {}", index, column.name, marker)
        };
        headers.push(Cell::new(label).add_attribute(Attribute::Bold));
    }
    table.set_header(headers);

    for row in &snapshot.rows {
        let mut cells: Vec<String> = Vec::with_capacity(row.len() + 1);
        if display.show_row_numbers {
            cells.push((row.position() + 1).to_string());
        }
        cells.extend(row.values().iter().cloned());
        table.add_row(cells);
    }

    table.to_string()
}

/// One line per control, e.g. `[Prev] [1] *2* [3] [Next]`; disabled
/// controls are shown in parentheses
pub fn render_page_controls(controls: &[PageControl]) -> String {
    controls
        .iter()
        .map(|control| match *control {
            PageControl::Previous { disabled: true } => "(Prev)".to_string(),
            PageControl::Previous { disabled: false } => "[Prev]".to_string(),
            PageControl::Page { number, active: true } => format!("*{}*", number),
            PageControl::Page { number, active: false } => format!("[{}]", number),
            PageControl::Next { disabled: true } => "(Next)".to_string(),
            PageControl::Next { disabled: false } => "[Next]".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Summary line plus controls; `None` for an empty result set
pub fn render_pagination(page: &PageInfo) -> Option<String> {
    if page.total == 0 {
        return None;
    }
    if page.shows_controls() {
        Some(format!(
            "{}    {}",
            page.summary(),
            render_page_controls(&page.controls())
        ))
    } else {
        Some(page.summary())
    }
}
