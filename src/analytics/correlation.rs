//! Correlation and impact estimates
//!
//! Pearson correlation between paired daily series, least-squares weight
//! projection, and goal-aware narratives for alcohol and sleep.

use serde::Serialize;

use crate::models::{DailyLog, GoalType, UserProfile};
use super::aggregate::{mean, recorded_sleep, round2, round_int};

/// Pairs needed before a coefficient is trusted in messaging
pub const MIN_CORRELATION_POINTS: usize = 5;
/// Rough energy of one standard drink
pub const KCAL_PER_DRINK: f64 = 120.0;
/// Nights shorter than this count as short sleep
pub const SHORT_SLEEP_HOURS: f64 = 7.0;

// ============================================================================
// Pearson correlation
// ============================================================================

/// Pearson correlation coefficient.
///
/// `None` for mismatched lengths, fewer than two points, or a series with
/// zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mean_x = mean(xs.iter().copied());
    let mean_y = mean(ys.iter().copied());

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        return None;
    }

    Some((covariance / denominator).clamp(-1.0, 1.0))
}

/// Qualitative strength of a coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    None,
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    pub fn of(coefficient: f64) -> Self {
        let r = coefficient.abs();
        if r >= 0.7 {
            Strength::Strong
        } else if r >= 0.4 {
            Strength::Moderate
        } else if r >= 0.2 {
            Strength::Weak
        } else {
            Strength::None
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Strength::None => "no",
            Strength::Weak => "weak",
            Strength::Moderate => "moderate",
            Strength::Strong => "strong",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    /// Pearson r in [-1, 1]; 0 when undefined
    pub coefficient: f64,
    pub strength: Strength,
    /// (x, y) observations
    pub pairs: Vec<(f64, f64)>,
    pub sample_size: usize,
    /// False below [`MIN_CORRELATION_POINTS`]; the coefficient is then not used in the insight
    pub sufficient_data: bool,
    pub insight: String,
}

/// Correlate paired observations and describe the result
pub fn correlate(x_label: &str, y_label: &str, pairs: Vec<(f64, f64)>) -> CorrelationResult {
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
    let coefficient = pearson(&xs, &ys).map(round2).unwrap_or(0.0);
    let sample_size = pairs.len();
    let sufficient_data = sample_size >= MIN_CORRELATION_POINTS;
    let strength = Strength::of(coefficient);

    let insight = if !sufficient_data {
        format!(
            "Not enough data to relate {} and {} yet: {} paired days, need at least {}.",
            x_label, y_label, sample_size, MIN_CORRELATION_POINTS
        )
    } else if strength == Strength::None {
        format!(
            "No clear relationship between {} and {} (r = {:.2}).",
            x_label, y_label, coefficient
        )
    } else {
        format!(
            "{} {} relationship: higher {} goes with {} {} (r = {:.2}).",
            capitalize(strength.as_str()),
            if coefficient > 0.0 { "positive" } else { "negative" },
            x_label,
            if coefficient > 0.0 { "higher" } else { "lower" },
            y_label,
            coefficient
        )
    };

    CorrelationResult {
        coefficient,
        strength,
        pairs,
        sample_size,
        sufficient_data,
        insight,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The standard correlations shown with a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlations {
    pub weight_vs_calories: CorrelationResult,
    pub alcohol_vs_weight: CorrelationResult,
    pub sleep_vs_calories: CorrelationResult,
}

pub fn correlations(days: &[DailyLog]) -> Correlations {
    let weight_vs_calories: Vec<(f64, f64)> = days
        .iter()
        .filter(|d| d.calories_consumed > 0.0)
        .filter_map(|d| d.weight_kg.map(|w| (d.calories_consumed, w)))
        .collect();

    let alcohol_vs_weight: Vec<(f64, f64)> = days
        .iter()
        .filter_map(|d| d.weight_kg.map(|w| (d.alcohol_drinks.unwrap_or(0.0), w)))
        .collect();

    let sleep_vs_calories: Vec<(f64, f64)> = days
        .iter()
        .filter(|d| d.calories_consumed > 0.0)
        .filter_map(|d| recorded_sleep(d).map(|s| (s, d.calories_consumed)))
        .collect();

    Correlations {
        weight_vs_calories: correlate("calories", "weight", weight_vs_calories),
        alcohol_vs_weight: correlate("alcohol", "weight", alcohol_vs_weight),
        sleep_vs_calories: correlate("sleep", "calories", sleep_vs_calories),
    }
}

// ============================================================================
// Linear fit and weight projection
// ============================================================================

/// Least-squares line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }
}

/// `None` with fewer than two points or no spread in x
pub fn linear_fit(pairs: &[(f64, f64)]) -> Option<LinearFit> {
    if pairs.len() < 2 {
        return None;
    }
    let mean_x = mean(pairs.iter().map(|p| p.0));
    let mean_y = mean(pairs.iter().map(|p| p.1));

    let (numerator, denominator) = pairs.iter().fold((0.0, 0.0), |(num, den), (x, y)| {
        (num + (x - mean_x) * (y - mean_y), den + (x - mean_x).powi(2))
    });
    if denominator == 0.0 {
        return None;
    }

    let slope = numerator / denominator;
    Some(LinearFit {
        slope,
        intercept: slope.mul_add(-mean_x, mean_y),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightPrediction {
    pub current_weight: f64,
    pub kg_per_week: f64,
    pub projected_in_30_days: f64,
    pub sample_size: usize,
    pub sufficient_data: bool,
    pub insight: String,
}

/// Weekly change below this reads as stable
const STABLE_KG_PER_WEEK: f64 = 0.1;

/// Project weight 30 days past the last weigh-in
pub fn predict_weight(days: &[DailyLog], goal: GoalType) -> Option<WeightPrediction> {
    let first = days.first()?.date;
    let pairs: Vec<(f64, f64)> = days
        .iter()
        .filter_map(|d| d.weight_kg.map(|w| ((d.date - first).num_days() as f64, w)))
        .collect();
    let fit = linear_fit(&pairs)?;
    let &(_, current_weight) = pairs.last()?;

    let kg_per_week = round2(fit.slope * 7.0);
    let projected = round2(current_weight + fit.slope * 30.0);
    let sufficient_data = pairs.len() >= MIN_CORRELATION_POINTS;

    let direction = if kg_per_week.abs() < STABLE_KG_PER_WEEK {
        "holding steady"
    } else if kg_per_week < 0.0 {
        "trending down"
    } else {
        "trending up"
    };

    let framing = match goal {
        GoalType::Deficit if kg_per_week <= -STABLE_KG_PER_WEEK => "on track for your deficit goal",
        GoalType::Deficit => "not yet moving in the direction of your deficit goal",
        GoalType::Surplus if kg_per_week >= STABLE_KG_PER_WEEK => "on track for your surplus goal",
        GoalType::Surplus => "not yet moving in the direction of your surplus goal",
        GoalType::Maintenance if kg_per_week.abs() < STABLE_KG_PER_WEEK => "right where maintenance should be",
        GoalType::Maintenance => "drifting away from maintenance",
    };

    let mut insight = format!(
        "Weight is {} ({:+.2} kg/week), {}; about {:.1} kg in 30 days at this rate.",
        direction, kg_per_week, framing, projected
    );
    if !sufficient_data {
        insight.push_str(" Based on few weigh-ins, so treat this as a rough estimate.");
    }

    Some(WeightPrediction {
        current_weight,
        kg_per_week,
        projected_in_30_days: projected,
        sample_size: pairs.len(),
        sufficient_data,
        insight,
    })
}

// ============================================================================
// Alcohol and sleep impact
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlcoholImpact {
    pub avg_drinks_per_day: f64,
    pub drinking_days: usize,
    pub weekly_alcohol_calories: i64,
    /// Alcohol energy as a percentage of average intake
    pub share_of_intake: f64,
    pub insight: String,
}

pub fn alcohol_impact(days: &[DailyLog], profile: &UserProfile) -> Option<AlcoholImpact> {
    if days.is_empty() {
        return None;
    }

    let avg_drinks = mean(days.iter().map(|d| d.alcohol_drinks.unwrap_or(0.0)));
    let drinking_days = days
        .iter()
        .filter(|d| d.alcohol_drinks.unwrap_or(0.0) > 0.0)
        .count();
    let weekly_kcal = avg_drinks * 7.0 * KCAL_PER_DRINK;
    let avg_intake = mean(days.iter().map(|d| d.calories_consumed));
    let share = if avg_intake > 0.0 {
        round2(avg_drinks * KCAL_PER_DRINK / avg_intake * 100.0)
    } else {
        0.0
    };
    let weekly = round_int(weekly_kcal);

    let insight = if drinking_days == 0 {
        "No alcohol logged in this period.".to_string()
    } else {
        match profile.goal_type {
            GoalType::Deficit => format!(
                "Alcohol adds about {} kcal a week ({:.1}% of intake), working against your deficit.",
                weekly, share
            ),
            GoalType::Surplus => format!(
                "Alcohol adds about {} kcal a week toward your surplus, though none of it supports muscle gain.",
                weekly
            ),
            GoalType::Maintenance => format!(
                "Alcohol accounts for about {} kcal a week ({:.1}% of intake).",
                weekly, share
            ),
        }
    };

    Some(AlcoholImpact {
        avg_drinks_per_day: round2(avg_drinks),
        drinking_days,
        weekly_alcohol_calories: weekly,
        share_of_intake: share,
        insight,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepImpact {
    pub avg_sleep: f64,
    pub short_nights: usize,
    pub rested_nights: usize,
    pub avg_calories_short: Option<i64>,
    pub avg_calories_rested: Option<i64>,
    /// Short-night intake minus rested-night intake
    pub calorie_difference: Option<i64>,
    pub insight: String,
}

pub fn sleep_impact(days: &[DailyLog], profile: &UserProfile) -> Option<SleepImpact> {
    let slept: Vec<(f64, f64)> = days
        .iter()
        .filter_map(|d| recorded_sleep(d).map(|s| (s, d.calories_consumed)))
        .collect();
    if slept.is_empty() {
        return None;
    }

    let avg_sleep = round2(mean(slept.iter().map(|p| p.0)));
    let short: Vec<f64> = slept.iter().filter(|p| p.0 < SHORT_SLEEP_HOURS).map(|p| p.1).collect();
    let rested: Vec<f64> = slept.iter().filter(|p| p.0 >= SHORT_SLEEP_HOURS).map(|p| p.1).collect();

    let avg_short = (!short.is_empty()).then(|| round_int(mean(short.iter().copied())));
    let avg_rested = (!rested.is_empty()).then(|| round_int(mean(rested.iter().copied())));
    let difference = avg_short.zip(avg_rested).map(|(s, r)| s - r);

    let insight = match difference {
        None => format!(
            "Average sleep {:.1} h. Log nights both under and over {} h to compare intake.",
            avg_sleep, SHORT_SLEEP_HOURS
        ),
        Some(diff) => match profile.goal_type {
            GoalType::Deficit if diff > 0 => format!(
                "After nights under {} h you eat about {} kcal more, which works against your deficit.",
                SHORT_SLEEP_HOURS, diff
            ),
            GoalType::Deficit => format!(
                "Short nights don't raise your intake ({:+} kcal), but sleep still matters for recovery.",
                diff
            ),
            GoalType::Surplus if diff < 0 => format!(
                "After nights under {} h you eat about {} kcal less, which makes the surplus harder to reach.",
                SHORT_SLEEP_HOURS,
                diff.abs()
            ),
            GoalType::Surplus => format!(
                "Short nights come with {:+} kcal, which helps the surplus, but recovery still needs sleep.",
                diff
            ),
            GoalType::Maintenance => format!(
                "Intake differs by {:+} kcal after nights under {} h.",
                diff, SHORT_SLEEP_HOURS
            ),
        },
    };

    Some(SleepImpact {
        avg_sleep,
        short_nights: short.len(),
        rested_nights: rested.len(),
        avg_calories_short: avg_short,
        avg_calories_rested: avg_rested,
        calorie_difference: difference,
        insight,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Impacts {
    pub weight: Option<WeightPrediction>,
    pub alcohol: Option<AlcoholImpact>,
    pub sleep: Option<SleepImpact>,
}

pub fn impacts(days: &[DailyLog], profile: &UserProfile) -> Impacts {
    Impacts {
        weight: predict_weight(days, profile.goal_type),
        alcohol: alcohol_impact(days, profile),
        sleep: sleep_impact(days, profile),
    }
}
