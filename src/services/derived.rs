//! Values a record derives from its operator-entered measurements.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::completion::{compute_actual_quantity, parse_quantity, round_half_up};

/// The measurement columns of a record, as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Measurements {
    pub theoretical_runtime: String,
    pub actual_runtime: String,
    pub single_time: String,
    pub theoretical_qty: String,
    pub actual_qty: String,
    pub total_weight: String,
    pub unit_weight: String,
    pub tare_weight: String,
    pub capacity_rate: String,
    pub time_rate: String,
    pub downtime_duration: String,
    pub adjustment_time: String,
}

/// Recomputes every derived column in place.
///
/// `shift_minutes` is the length of a standard shift. Blank or malformed
/// inputs count as zero; results that cannot be computed are left blank.
/// `actual_qty` is only overwritten when a unit weight has been entered.
pub fn apply_derived_fields(values: &mut Measurements, shift_minutes: i64) {
    let adjustment = parse_quantity(&values.adjustment_time).unwrap_or(Decimal::ZERO);
    let theoretical_runtime = Decimal::from(shift_minutes)
        .saturating_sub(adjustment)
        .max(Decimal::ZERO);
    values.theoretical_runtime = render_number(theoretical_runtime);

    let downtime = parse_quantity(&values.downtime_duration).unwrap_or(Decimal::ZERO);
    let actual_runtime = theoretical_runtime
        .saturating_sub(downtime)
        .max(Decimal::ZERO);
    values.actual_runtime = render_number(actual_runtime);

    let single_time = parse_quantity(&values.single_time).unwrap_or(Decimal::ZERO);
    let theoretical_qty = if single_time > Decimal::ZERO {
        actual_runtime
            .checked_mul(dec!(60))
            .and_then(|seconds| seconds.checked_div(single_time))
            .map(round_half_up)
    } else {
        None
    };
    values.theoretical_qty = theoretical_qty.map(render_number).unwrap_or_default();

    if !values.unit_weight.trim().is_empty() {
        let total = parse_quantity(&values.total_weight).unwrap_or(Decimal::ZERO);
        let tare = parse_quantity(&values.tare_weight).unwrap_or(Decimal::ZERO);
        let unit = parse_quantity(&values.unit_weight).unwrap_or(Decimal::ZERO);
        values.actual_qty = compute_actual_quantity(total, tare, unit)
            .map(|qty| qty.to_string())
            .unwrap_or_default();
    }

    let actual_qty = parse_quantity(&values.actual_qty);
    values.capacity_rate = match (actual_qty, theoretical_qty) {
        (Some(actual), Some(theoretical)) if theoretical > Decimal::ZERO => {
            percentage(actual, theoretical)
        }
        _ => String::new(),
    };

    values.time_rate = if theoretical_runtime > Decimal::ZERO {
        percentage(actual_runtime, theoretical_runtime)
    } else {
        String::new()
    };
}

/// Renders `part / whole` as `"NN.NN%"`.
pub fn percentage(part: Decimal, whole: Decimal) -> String {
    part.checked_mul(dec!(100))
        .and_then(|scaled| scaled.checked_div(whole))
        .map(|rate| {
            let rate = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.2}%", rate)
        })
        .unwrap_or_default()
}

/// Parses a `"NN.NN%"` rate back into a number.
pub fn parse_percentage(raw: &str) -> Option<Decimal> {
    parse_quantity(raw.trim().trim_end_matches('%'))
}

fn render_number(value: Decimal) -> String {
    value.normalize().to_string()
}
