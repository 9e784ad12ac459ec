//! Finance Dashboard - synthetic key financial metrics with trend forecasts
//!
//! The library holds the data pipeline (generation, caching, forecasting,
//! composition, export); the binary wraps it in an egui window.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod forecast;
pub mod gui;
pub mod view;
