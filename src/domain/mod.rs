//! Core domain types and logic.

pub mod market_bar;
pub mod news;
pub mod earnings;
pub mod indicator;
pub mod indicator_helpers;
pub mod indicator_engine;
pub mod sentiment;
pub mod features;
pub mod model;
pub mod signal;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod strategy;
pub mod config_validation;
pub mod pipeline;
pub mod error;
