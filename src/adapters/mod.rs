//! Concrete adapter implementations for ports.

pub mod console_snapshot_adapter;
pub mod csv_quote_adapter;
pub mod file_config_adapter;
pub mod json_store;
