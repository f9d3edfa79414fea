//! Client-side table engine for the AgriMeet seller and admin dashboards:
//! filter, sort and paginate a fixed set of rendered rows.

pub mod config;
pub mod data;
pub mod table_display;
pub mod utils;

pub use data::control_action::{ColumnRef, ControlAction, PageAction};
pub use data::datatable::{ColumnType, DataColumn, DataRow, DataTable};
pub use data::table_engine::{EngineOptions, TableEngine, TableSnapshot};
