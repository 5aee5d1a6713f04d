//! Concrete port implementations.

pub mod file_config_adapter;
pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod json_store_adapter;
pub mod console_notify_adapter;
pub mod file_universe_adapter;
