//! Weight/calorie history and dual-axis chart normalization.
//!
//! The history scan and the chart series both walk the full record set in
//! ascending date order; presentation reverses rows for newest-first display.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::engine;
use crate::models::PROTEIN_PER_KG_THRESHOLD;

/// Headroom applied above the tallest weight when framing the chart.
const Y_AXIS_HEADROOM: f64 = 1.1;

/// One row of the history table.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub calories_in: f64,
    pub calories_out: f64,
    pub protein: f64,
    /// Weight change against the most recent prior day that had a weight.
    pub prior_delta: Option<f64>,
    /// Weight minus the configured goal weight.
    pub goal_delta: Option<f64>,
    /// True when protein intake fell below 0.8 g per kg of body weight.
    pub protein_low: bool,
}

/// Full history, oldest first. Days without a weight produce `None` deltas
/// and carry the previous weight forward, so the next weighted day still
/// compares against the last known weight.
pub fn build_history(db: &Database, goal_weight: f64) -> Result<Vec<HistoryRow>> {
    let mut rows = Vec::new();
    let mut previous_weight: Option<f64> = None;
    for record in db.all_days_ordered()? {
        let totals = engine::aggregate_record(db, &record)?;
        let prior_delta = match (record.weight, previous_weight) {
            (Some(current), Some(previous)) => Some(current - previous),
            _ => None,
        };
        let goal_delta = record.weight.map(|w| w - goal_weight);
        let protein_low = record
            .weight
            .is_some_and(|w| totals.protein < PROTEIN_PER_KG_THRESHOLD * w);
        if record.weight.is_some() {
            previous_weight = record.weight;
        }
        rows.push(HistoryRow {
            date: record.date,
            weight: record.weight,
            calories_in: totals.calories_in,
            calories_out: totals.calories_out,
            protein: totals.protein,
            prior_delta,
            goal_delta,
            protein_low,
        });
    }
    Ok(rows)
}

/// The scalar mapping calorie values onto the weight axis's visual scale.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Normalization {
    pub max_weight: f64,
    pub max_calories: f64,
    pub factor: f64,
}

/// Maxima over the series (0 when a series is empty or all-`None`);
/// `factor = max_weight / max_calories`, or 1 when there are no calories.
#[must_use]
pub fn compute_normalization(
    weights: &[Option<f64>],
    calories_in: &[f64],
    calories_out: &[f64],
) -> Normalization {
    let max_weight = weights.iter().flatten().copied().fold(0.0_f64, f64::max);
    let max_calories = calories_in
        .iter()
        .chain(calories_out)
        .copied()
        .fold(0.0_f64, f64::max);
    let factor = if max_calories > 0.0 {
        max_weight / max_calories
    } else {
        1.0
    };
    Normalization {
        max_weight,
        max_calories,
        factor,
    }
}

/// Map a calorie series onto the primary (weight) scale.
#[must_use]
pub fn scale_series(values: &[f64], factor: f64) -> Vec<f64> {
    values.iter().map(|v| v * factor).collect()
}

/// One tick on the secondary (calorie) axis.
#[derive(Debug, Clone, Serialize)]
pub struct AxisTick {
    /// Position in primary-axis (weight) coordinates.
    pub position: f64,
    /// True calorie value displayed at that position.
    pub label: String,
}

/// Ticks for the secondary axis over the primary visible range `[low, high]`:
/// divide the bounds by the factor, floor the low end to a multiple of 100,
/// push the high end up to the next multiple of 100, then one tick per 100
/// with its geometry mapped back through the factor.
#[must_use]
pub fn secondary_axis_ticks(low: f64, high: f64, factor: f64) -> Vec<AxisTick> {
    if factor <= 0.0 || high < low {
        return Vec::new();
    }
    let start = ((low / factor) as i64).div_euclid(100) * 100;
    let end = (((high / factor) as i64).div_euclid(100) + 1) * 100;
    let mut ticks = Vec::new();
    let mut value = start;
    while value <= end {
        #[allow(clippy::cast_precision_loss)]
        ticks.push(AxisTick {
            position: value as f64 * factor,
            label: value.to_string(),
        });
        value += 100;
    }
    ticks
}

/// Everything the chart widget needs, aligned by x slot and oldest first.
/// Weightless days hold `None` in `weights` but keep their slot, so dates
/// stay aligned across all three series.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub dates: Vec<NaiveDate>,
    pub weights: Vec<Option<f64>>,
    pub calories_in: Vec<f64>,
    pub calories_out: Vec<f64>,
    pub normalization: Normalization,
    pub scaled_calories_in: Vec<f64>,
    pub scaled_calories_out: Vec<f64>,
    /// Primary-axis visible range the ticks were generated for.
    pub y_range: (f64, f64),
    pub secondary_ticks: Vec<AxisTick>,
}

pub fn build_chart(db: &Database) -> Result<ChartData> {
    let mut dates = Vec::new();
    let mut weights = Vec::new();
    let mut calories_in = Vec::new();
    let mut calories_out = Vec::new();
    for record in db.all_days_ordered()? {
        let totals = engine::aggregate_record(db, &record)?;
        dates.push(record.date);
        weights.push(record.weight);
        calories_in.push(totals.calories_in);
        calories_out.push(totals.calories_out);
    }

    let normalization = compute_normalization(&weights, &calories_in, &calories_out);
    let scaled_calories_in = scale_series(&calories_in, normalization.factor);
    let scaled_calories_out = scale_series(&calories_out, normalization.factor);
    let y_high = normalization.max_weight * Y_AXIS_HEADROOM;
    let secondary_ticks = if normalization.max_weight > 0.0 && normalization.max_calories > 0.0 {
        secondary_axis_ticks(0.0, y_high, normalization.factor)
    } else {
        Vec::new()
    };

    Ok(ChartData {
        dates,
        weights,
        calories_in,
        calories_out,
        normalization,
        scaled_calories_in,
        scaled_calories_out,
        y_range: (0.0, y_high),
        secondary_ticks,
    })
}
