//! Data layer for the table engine
//!
//! This module separates the immutable row set (`DataTable`) from the
//! filtered, sorted and paginated views the engine derives from it.

// Core data modules
pub mod data_view;
pub mod datatable;

// Cell interpretation
pub mod cell_compare;
pub mod cell_parse;

// View state
pub mod control_action;
pub mod filter;
pub mod pagination;
pub mod sort;
pub mod table_engine;

// Data sources and sinks
pub mod data_exporter;
pub mod loaders;
