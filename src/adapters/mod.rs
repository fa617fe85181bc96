//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_export;
pub mod file_config_adapter;
pub mod text_report;
pub mod crossover_strategy;
pub mod rsi_strategy;
