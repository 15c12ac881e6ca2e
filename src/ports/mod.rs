//! Port traits at the application's seams.

pub mod config_port;
pub mod quote_port;
pub mod snapshot_port;
