//! Nutrack MCP Server Implementation
//!
//! Implements the MCP server with all Nutrack tools.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::analytics::AnalyticsEngine;
use crate::config::Config;
use crate::models::DayMetricsUpdate;
use crate::store::SqliteStore;
use crate::tools::status::StatusTracker;
use crate::tools::{analytics, logging, user_or_default};

/// Nutrack MCP Service
#[derive(Clone)]
pub struct NutrackService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    store: SqliteStore,
    engine: AnalyticsEngine,
    default_user_id: String,
    tool_router: ToolRouter<NutrackService>,
}

impl NutrackService {
    pub fn new(config: &Config, store: SqliteStore, engine: AnalyticsEngine) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                config.database_path.clone(),
                config.default_user_id.clone(),
            ))),
            store,
            engine,
            default_user_id: config.default_user_id.clone(),
            tool_router: Self::tool_router(),
        }
    }

    fn user<'a>(&'a self, user_id: &'a Option<String>) -> &'a str {
        user_or_default(user_id.as_deref(), &self.default_user_id)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Analytics Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RangeParams {
    /// User to report on (defaults to the configured user)
    pub user_id: Option<String>,
    /// 7d, 30d, 3m, 1y or custom
    #[serde(default = "default_range")]
    pub range: String,
    /// Custom range start (YYYY-MM-DD)
    pub start: Option<String>,
    /// Custom range end (YYYY-MM-DD)
    pub end: Option<String>,
}

fn default_range() -> String { "7d".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDailyLogParams {
    pub user_id: Option<String>,
    /// Date (YYYY-MM-DD)
    pub date: String,
}

// ============================================================================
// Logging Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    pub user_id: Option<String>,
    pub date: String,
    pub name: String,
    #[serde(default = "default_meal_type")]
    pub meal_type: String,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

fn default_meal_type() -> String { "unspecified".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteMealParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogExerciseParams {
    pub user_id: Option<String>,
    pub date: String,
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecordDayMetricsParams {
    pub user_id: Option<String>,
    pub date: String,
    pub water_glasses: Option<f64>,
    pub alcohol_drinks: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetGoalsParams {
    pub user_id: Option<String>,
    pub calorie_target: Option<f64>,
    /// Grams per day
    pub protein_target: Option<f64>,
    /// Glasses per day
    pub water_target: Option<f64>,
    /// deficit, maintenance or surplus
    pub goal_type: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetGoalsParams {
    pub user_id: Option<String>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl NutrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the Nutrack service including build info, database status, cache size, and process information")]
    async fn nutrack_status(&self) -> Result<CallToolResult, McpError> {
        let cached = self.engine.cached_reports().await;
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status(cached))
    }

    #[tool(description = "Get instructions for logging data and reading analytics reports. Call this before the first analytics query of a session.")]
    fn analytics_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ANALYTICS_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ANALYTICS_INSTRUCTIONS)]))
    }

    // --- Analytics ---

    #[tool(description = "Full analytics report for a time range (7d, 30d, 3m, 1y, custom): per-day or per-month buckets, averages and trends, goal achievement, weekly pattern, correlations and impact estimates")]
    async fn get_analytics(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        let query = analytics::build_query(&p.range, p.start.clone(), p.end.clone())
            .map_err(|e| McpError::invalid_params(e, None))?;
        let report = analytics::get_analytics(&self.engine, self.user(&p.user_id), &query, today())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(report.as_ref())
    }

    #[tool(description = "Get everything logged on one date: meals, exercises, water, alcohol, sleep, weight, and calorie totals")]
    async fn get_daily_log(&self, Parameters(p): Parameters<GetDailyLogParams>) -> Result<CallToolResult, McpError> {
        let log = analytics::get_daily_log(&self.engine, self.user(&p.user_id), &p.date, today())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&log)
    }

    #[tool(description = "Correlations (weight vs calories, alcohol vs weight, sleep vs calories) plus weight prediction and goal-aware alcohol and sleep impact for a time range")]
    async fn get_correlations(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        let query = analytics::build_query(&p.range, p.start.clone(), p.end.clone())
            .map_err(|e| McpError::invalid_params(e, None))?;
        let result = analytics::get_correlations(&self.engine, self.user(&p.user_id), &query, today())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Goal achievement rates (calories, protein, water) and weekly pattern for a time range")]
    async fn get_goal_achievement(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        let query = analytics::build_query(&p.range, p.start.clone(), p.end.clone())
            .map_err(|e| McpError::invalid_params(e, None))?;
        let result = analytics::get_goal_achievement(&self.engine, self.user(&p.user_id), &query, today())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Logging ---

    #[tool(description = "Log a meal with its calories and macros")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let result = logging::log_meal(
            &self.store,
            self.user(&p.user_id),
            &p.date,
            &p.name,
            &p.meal_type,
            p.calories,
            p.protein,
            p.carbs,
            p.fats,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a logged meal by ID")]
    fn delete_meal(&self, Parameters(p): Parameters<DeleteMealParams>) -> Result<CallToolResult, McpError> {
        let result = logging::delete_meal(&self.store, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Log an exercise session with duration and calories burned")]
    fn log_exercise(&self, Parameters(p): Parameters<LogExerciseParams>) -> Result<CallToolResult, McpError> {
        let result = logging::log_exercise(
            &self.store,
            self.user(&p.user_id),
            &p.date,
            &p.name,
            p.duration_minutes,
            p.calories_burned,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Record water glasses, alcohol drinks, sleep hours, or body weight for a date. Omitted values are left unchanged.")]
    fn record_day_metrics(&self, Parameters(p): Parameters<RecordDayMetricsParams>) -> Result<CallToolResult, McpError> {
        let update = DayMetricsUpdate {
            water_glasses: p.water_glasses,
            alcohol_drinks: p.alcohol_drinks,
            sleep_hours: p.sleep_hours,
            weight_kg: p.weight_kg,
        };
        let result = logging::record_day_metrics(&self.store, self.user(&p.user_id), &p.date, update)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Goals ---

    #[tool(description = "Set daily targets (calories, protein, water) and goal type (deficit, maintenance, surplus). Omitted values keep their current setting.")]
    fn set_goals(&self, Parameters(p): Parameters<SetGoalsParams>) -> Result<CallToolResult, McpError> {
        let result = logging::set_goals(
            &self.store,
            self.user(&p.user_id),
            p.calorie_target,
            p.protein_target,
            p.water_target,
            p.goal_type.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the current daily targets and goal type")]
    fn get_goals(&self, Parameters(p): Parameters<GetGoalsParams>) -> Result<CallToolResult, McpError> {
        let result = logging::get_goals(&self.store, self.user(&p.user_id))
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Nutrack Nutrition Analytics".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nutrack - Nutrition tracking and analytics. \
                 IMPORTANT: Call analytics_instructions before the first analytics query. \
                 Logging: log_meal/delete_meal, log_exercise, record_day_metrics. \
                 Goals: set_goals/get_goals. \
                 Analytics: get_analytics, get_goal_achievement, get_correlations, get_daily_log. \
                 Ranges: 7d, 30d, 3m, 1y, or custom with start and end dates."
                    .into(),
            ),
        }
    }
}
