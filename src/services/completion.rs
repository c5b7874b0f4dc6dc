//! Completion engine.
//!
//! Maps the output recorded against a product onto that product's production
//! plan. Everything here is synchronous and side-effect free: callers fetch
//! the plan and the matching records, then hand both over.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::entities::production_record;

/// Number of process slots a stored plan can carry.
pub const PLAN_SLOT_LIMIT: usize = 4;

/// One planned process step with its target quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanSlot {
    pub process: String,
    pub qty: i64,
}

/// A product's plan as an ordered list of slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductionPlan {
    pub product: String,
    pub slots: Vec<PlanSlot>,
}

impl ProductionPlan {
    pub fn new(product: impl Into<String>, slots: Vec<PlanSlot>) -> Self {
        Self {
            product: product.into(),
            slots,
        }
    }
}

impl From<&crate::entities::production_plan::Model> for ProductionPlan {
    fn from(model: &crate::entities::production_plan::Model) -> Self {
        let slots = model
            .slot_pairs()
            .into_iter()
            .filter_map(|(process, qty)| {
                let process = process.map(str::trim).filter(|p| !p.is_empty())?;
                Some(PlanSlot {
                    process: process.to_string(),
                    qty: i64::from(qty),
                })
            })
            .collect();
        Self::new(model.product.clone(), slots)
    }
}

/// Anything that reports output against a process.
pub trait RecordedOutput {
    fn process(&self) -> &str;
    /// Raw quantity as entered; may be blank or malformed.
    fn actual_qty(&self) -> &str;
}

impl RecordedOutput for production_record::Model {
    fn process(&self) -> &str {
        &self.process
    }

    fn actual_qty(&self) -> &str {
        &self.actual_qty
    }
}

impl<T: RecordedOutput + ?Sized> RecordedOutput for &T {
    fn process(&self) -> &str {
        (**self).process()
    }

    fn actual_qty(&self) -> &str {
        (**self).actual_qty()
    }
}

/// Completion for one configured slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProcessCompletion {
    pub process: String,
    pub planned_qty: i64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub actual_qty: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub completion_rate: Decimal,
}

impl ProcessCompletion {
    pub fn band(&self) -> CompletionBand {
        CompletionBand::for_rate(self.completion_rate)
    }

    pub fn progress_width(&self) -> Decimal {
        progress_width(self.completion_rate)
    }
}

/// Display band for a completion rate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CompletionBand {
    Behind,
    OnTrack,
    Complete,
}

impl CompletionBand {
    const COMPLETE_AT: Decimal = dec!(100);
    const ON_TRACK_AT: Decimal = dec!(51);

    pub fn for_rate(rate: Decimal) -> Self {
        if rate >= Self::COMPLETE_AT {
            CompletionBand::Complete
        } else if rate >= Self::ON_TRACK_AT {
            CompletionBand::OnTrack
        } else {
            CompletionBand::Behind
        }
    }
}

/// Parses an entered quantity, tolerating surrounding whitespace.
pub fn parse_quantity(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// Computes per-slot completion in slot order.
///
/// `records` must already be restricted to the plan's product. A missing plan
/// yields an empty report. Blank process slots produce no entry, and
/// malformed quantities contribute zero.
pub fn compute_completion<R, I>(plan: Option<&ProductionPlan>, records: I) -> Vec<ProcessCompletion>
where
    R: RecordedOutput,
    I: IntoIterator<Item = R>,
{
    let Some(plan) = plan else {
        return Vec::new();
    };

    let slots: Vec<&PlanSlot> = plan
        .slots
        .iter()
        .filter(|slot| !slot.process.trim().is_empty())
        .collect();
    if slots.is_empty() {
        return Vec::new();
    }

    let mut totals = vec![Decimal::ZERO; slots.len()];
    for record in records {
        let quantity = parse_quantity(record.actual_qty()).unwrap_or(Decimal::ZERO);
        for (index, slot) in slots.iter().enumerate() {
            if slot.process == record.process() {
                totals[index] = totals[index].saturating_add(quantity);
            }
        }
    }

    slots
        .into_iter()
        .zip(totals)
        .map(|(slot, actual_qty)| ProcessCompletion {
            process: slot.process.clone(),
            planned_qty: slot.qty,
            actual_qty: actual_qty.normalize(),
            completion_rate: completion_rate(actual_qty, slot.qty),
        })
        .collect()
}

/// `actual / planned * 100` to two places; zero when nothing is planned.
pub fn completion_rate(actual_qty: Decimal, planned_qty: i64) -> Decimal {
    if planned_qty <= 0 {
        return Decimal::ZERO;
    }
    actual_qty
        .checked_mul(dec!(100))
        .and_then(|scaled| scaled.checked_div(Decimal::from(planned_qty)))
        .map(|rate| {
            rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        })
        .unwrap_or(Decimal::ZERO)
}

/// Width of a progress bar for `rate`, kept within 0..=100.
///
/// The rate itself is never clamped.
pub fn progress_width(rate: Decimal) -> Decimal {
    rate.min(dec!(100)).max(Decimal::ZERO)
}

/// Producible count from weights: `round((total - tare) / unit)`.
///
/// Returns `None` when the unit weight is not positive, which leaves the
/// quantity blank. Halves round upward and negative results pass through.
pub fn compute_actual_quantity(
    total_weight: Decimal,
    tare_weight: Decimal,
    unit_weight: Decimal,
) -> Option<i64> {
    if unit_weight <= Decimal::ZERO {
        return None;
    }
    let net = total_weight.checked_sub(tare_weight)?;
    let units = net.checked_div(unit_weight)?;
    round_half_up(units).to_i64()
}

/// Rounds to the nearest integer with ties toward positive infinity.
pub(crate) fn round_half_up(value: Decimal) -> Decimal {
    value.saturating_add(dec!(0.5)).floor()
}
