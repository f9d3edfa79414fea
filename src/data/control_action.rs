//! Encoded control actions.
//!
//! Every interaction with a table (typing in a filter, clicking a header or a
//! page button) is expressed as one `ControlAction`. Front ends bind a single
//! handler that parses the encoded form of the clicked control and hands it to
//! `TableEngine::dispatch`.
//!
//! Encoded forms:
//!
//! ```text
//! search:<text>            select:<column>=<value>
//! date-from:<date>         date-to:<date>          (empty date clears the bound)
//! sort:<index or name>     page:prev | page:next | page:<n>
//! reset
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::data::cell_parse::parse_date_bound;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Previous,
    Next,
    Goto(usize),
}

/// A column addressed by header position or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    Search(String),
    Select { column: String, value: String },
    DateFrom(Option<NaiveDate>),
    DateTo(Option<NaiveDate>),
    Sort(ColumnRef),
    Page(PageAction),
    Reset,
}

impl ControlAction {
    /// Whether the action edits the filter state (and so resets the page)
    pub fn is_filter_change(&self) -> bool {
        matches!(
            self,
            ControlAction::Search(_)
                | ControlAction::Select { .. }
                | ControlAction::DateFrom(_)
                | ControlAction::DateTo(_)
                | ControlAction::Reset
        )
    }
}

fn parse_bound(text: &str) -> Result<Option<NaiveDate>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    parse_date_bound(text)
        .map(Some)
        .ok_or_else(|| anyhow!("'{}' is not a recognised date", text))
}

impl FromStr for PageAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "prev" | "previous" => Ok(PageAction::Previous),
            "next" => Ok(PageAction::Next),
            other => other
                .parse::<usize>()
                .map(PageAction::Goto)
                .with_context(|| format!("Invalid page '{}'", other)),
        }
    }
}

impl FromStr for ColumnRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("Missing column"));
        }
        Ok(s.parse::<usize>()
            .map(ColumnRef::Index)
            .unwrap_or_else(|_| ColumnRef::Name(s.to_string())))
    }
}

impl FromStr for ControlAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim() == "reset" {
            return Ok(ControlAction::Reset);
        }

        let (kind, payload) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Unknown action '{}'", s.trim()))?;

        match kind.trim() {
            // Search text is kept verbatim, spaces included
            "search" => Ok(ControlAction::Search(payload.to_string())),
            "select" => {
                let (column, value) = payload
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Expected select:<column>=<value>"))?;
                let column = column.trim();
                if column.is_empty() {
                    return Err(anyhow!("Missing select column"));
                }
                Ok(ControlAction::Select {
                    column: column.to_string(),
                    value: value.to_string(),
                })
            }
            "date-from" => Ok(ControlAction::DateFrom(parse_bound(payload)?)),
            "date-to" => Ok(ControlAction::DateTo(parse_bound(payload)?)),
            "sort" => Ok(ControlAction::Sort(payload.parse()?)),
            "page" => Ok(ControlAction::Page(payload.parse()?)),
            other => Err(anyhow!("Unknown action '{}'", other)),
        }
    }
}

impl fmt::Display for PageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageAction::Previous => write!(f, "prev"),
            PageAction::Next => write!(f, "next"),
            PageAction::Goto(page) => write!(f, "{}", page),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(index) => write!(f, "{}", index),
            ColumnRef::Name(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = |d: &Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        match self {
            ControlAction::Search(text) => write!(f, "search:{}", text),
            ControlAction::Select { column, value } => write!(f, "select:{}={}", column, value),
            ControlAction::DateFrom(d) => write!(f, "date-from:{}", date(d)),
            ControlAction::DateTo(d) => write!(f, "date-to:{}", date(d)),
            ControlAction::Sort(column) => write!(f, "sort:{}", column),
            ControlAction::Page(page) => write!(f, "page:{}", page),
            ControlAction::Reset => write!(f, "reset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!(
            "search:green beans".parse::<ControlAction>().unwrap(),
            ControlAction::Search("green beans".to_string())
        );
        assert_eq!(
            "select:status=Published".parse::<ControlAction>().unwrap(),
            ControlAction::Select {
                column: "status".to_string(),
                value: "Published".to_string()
            }
        );
        assert_eq!(
            "date-from:2024-01-31".parse::<ControlAction>().unwrap(),
            ControlAction::DateFrom(NaiveDate::from_ymd_opt(2024, 1, 31))
        );
        assert_eq!(
            "date-to:".parse::<ControlAction>().unwrap(),
            ControlAction::DateTo(None)
        );
        assert_eq!(
            "sort:2".parse::<ControlAction>().unwrap(),
            ControlAction::Sort(ColumnRef::Index(2))
        );
        assert_eq!(
            "sort:amount".parse::<ControlAction>().unwrap(),
            ControlAction::Sort(ColumnRef::Name("amount".to_string()))
        );
        assert_eq!(
            "page:prev".parse::<ControlAction>().unwrap(),
            ControlAction::Page(PageAction::Previous)
        );
        assert_eq!(
            "page:4".parse::<ControlAction>().unwrap(),
            ControlAction::Page(PageAction::Goto(4))
        );
        assert_eq!(
            " reset ".parse::<ControlAction>().unwrap(),
            ControlAction::Reset
        );
    }

    #[test]
    fn test_rejects_malformed_actions() {
        for input in [
            "",
            "search",
            "select:status",
            "select:=x",
            "date-from:someday",
            "sort:",
            "page:last",
            "zoom:2",
        ] {
            assert!(
                input.parse::<ControlAction>().is_err(),
                "'{}' should not parse",
                input
            );
        }
    }

    #[test]
    fn test_display_is_parseable() {
        let action = ControlAction::DateTo(NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(action.to_string(), "date-to:2024-06-01");
        assert_eq!(action.to_string().parse::<ControlAction>().unwrap(), action);
    }

    #[test]
    fn test_filter_changes() {
        assert!(ControlAction::Search(String::new()).is_filter_change());
        assert!(ControlAction::Reset.is_filter_change());
        assert!(!ControlAction::Sort(ColumnRef::Index(0)).is_filter_change());
        assert!(!ControlAction::Page(PageAction::Next).is_filter_change());
    }
}
