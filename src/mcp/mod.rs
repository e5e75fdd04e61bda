//! MCP Server module

mod server;

pub use server::NutrackService;
