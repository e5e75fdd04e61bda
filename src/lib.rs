//! Nutrack Library
//!
//! Nutrition tracking storage and the analytics pipeline over it.

pub mod analytics;
pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod store;
pub mod tools;
