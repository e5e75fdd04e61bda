//! Shared macronutrient totals
//!
//! Used by meals and the assembled daily log.

use serde::{Deserialize, Serialize};

/// Calories and macronutrients.
///
/// Carbs and fats are optional because not every meal tracks them; adding two
/// totals keeps `None` only when both sides are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,       // grams
    pub carbs: Option<f64>, // grams
    pub fats: Option<f64>,  // grams
}

impl Macros {
    pub fn zero() -> Self {
        Self::default()
    }
}

fn add_optional(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

impl std::ops::Add for Macros {
    type Output = Macros;

    fn add(self, other: Macros) -> Macros {
        Macros {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: add_optional(self.carbs, other.carbs),
            fats: add_optional(self.fats, other.fats),
        }
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Macros::zero(), |acc, m| acc + m)
    }
}
