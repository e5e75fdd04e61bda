//! Data models
//!
//! Rust structs representing database entities.

mod daily_log;
mod day_metrics;
mod exercise;
mod macros;
mod meal;
mod profile;

pub use daily_log::{DailyLog, ExerciseSummary, MealSummary};
pub use day_metrics::{DayMetrics, DayMetricsUpdate};
pub use exercise::{Exercise, ExerciseCreate};
pub use macros::Macros;
pub use meal::{Meal, MealCreate, MealType};
pub use profile::{GoalType, UserProfile};
