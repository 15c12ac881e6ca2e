//! Core domain types and logic.

pub mod analysis;
pub mod error;
pub mod indicator;
pub mod market;
pub mod ohlcv;
pub mod order;
pub mod portfolio;
pub mod stock;
pub mod universe;
