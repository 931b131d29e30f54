//! Core domain types and logic.

pub mod backtest;
pub mod combination;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod frequency;
pub mod grid_search;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod portfolio;
pub mod position;
pub mod price_series;
pub mod selection;
pub mod signal;
pub mod simulator;
