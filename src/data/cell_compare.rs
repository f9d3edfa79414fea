use chrono::NaiveDateTime;
use std::cmp::Ordering;

use crate::data::cell_parse::{parse_currency, parse_date};
use crate::data::datatable::ColumnType;

/// The comparable value behind a cell, derived from the column type.
///
/// A date or currency cell that fails to parse becomes `Unparsed`, which
/// orders before every parsed value and equal to other unparsed values.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Unparsed,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl SortKey {
    pub fn from_cell(text: &str, data_type: ColumnType) -> Self {
        match data_type {
            ColumnType::String => SortKey::Text(text.trim().to_string()),
            ColumnType::Currency => parse_currency(text)
                .map(SortKey::Number)
                .unwrap_or(SortKey::Unparsed),
            ColumnType::Date => parse_date(text)
                .map(SortKey::Date)
                .unwrap_or(SortKey::Unparsed),
        }
    }

    /// Total order over keys of one column
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Unparsed, SortKey::Unparsed) => Ordering::Equal,
            (SortKey::Unparsed, _) => Ordering::Less,
            (_, SortKey::Unparsed) => Ordering::Greater,

            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Parsed amounts are always finite
            (SortKey::Number(a), SortKey::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),

            // Keys of one column share a variant; keep mixed input deterministic
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Unparsed => 0,
            SortKey::Number(_) => 1,
            SortKey::Date(_) => 2,
            SortKey::Text(_) => 3,
        }
    }
}
