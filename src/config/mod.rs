//! Configuration module
//!
//! File-backed settings for display, pagination, filter controls and the
//! declared column schema.

pub mod config;
