//! Nutrack Tools module
//!
//! MCP tool implementations: analytics queries, the logging write path, and
//! service status.

pub mod analytics;
pub mod logging;
pub mod status;

use chrono::NaiveDate;

/// Parse a YYYY-MM-DD date argument
pub(crate) fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", date))
}

/// Resolve the user a tool call acts for
pub(crate) fn user_or_default<'a>(user_id: Option<&'a str>, default: &'a str) -> &'a str {
    user_id
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(" 2026-10-16 ").unwrap(), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert!(parse_date("16/10/2026").is_err());
    }

    #[test]
    fn test_user_or_default() {
        assert_eq!(user_or_default(None, "local"), "local");
        assert_eq!(user_or_default(Some("  "), "local"), "local");
        assert_eq!(user_or_default(Some("ana"), "local"), "ana");
    }
}
