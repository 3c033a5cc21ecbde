//! Tax-inclusive/exclusive conversion and discount display.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::aggregates::{Product, Variant};

/// Distance from a whole number inside which inclusive prices snap to it.
const SNAP_TOLERANCE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// How prices are stored in the catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    #[default]
    TaxExclusive,
    TaxInclusive,
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn effective_rate(tax_rate_percent: Option<Decimal>) -> Option<Decimal> {
    tax_rate_percent.filter(|rate| rate.is_sign_positive() && !rate.is_zero())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("{amount} at {rate}% tax is outside the representable range")]
    Overflow { amount: Decimal, rate: Decimal },
}

fn tax_factor(amount: Decimal, rate: Decimal) -> Result<Decimal, PricingError> {
    rate.checked_div(HUNDRED)
        .and_then(|fraction| Decimal::ONE.checked_add(fraction))
        .ok_or(PricingError::Overflow { amount, rate })
}

/// Strips tax from a tax-inclusive amount, rounded to cents.
///
/// A zero amount yields zero; a missing or non-positive rate returns the amount unchanged.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when the arithmetic leaves `Decimal`'s range.
pub fn try_to_exclusive(inclusive: Decimal, tax_rate_percent: Option<Decimal>) -> Result<Decimal, PricingError> {
    if inclusive.is_zero() { return Ok(Decimal::ZERO); }
    let Some(rate) = effective_rate(tax_rate_percent) else { return Ok(inclusive) };
    let factor = tax_factor(inclusive, rate)?;
    inclusive.checked_div(factor).map(round_cents).ok_or(PricingError::Overflow { amount: inclusive, rate })
}

/// Adds tax to a tax-exclusive amount, rounded to cents.
///
/// Results within 0.02 of a whole number snap to it, recovering retail prices
/// that were whole before being stored tax-exclusive. [`try_to_exclusive`] does not snap.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when the arithmetic leaves `Decimal`'s range.
pub fn try_to_inclusive(exclusive: Decimal, tax_rate_percent: Option<Decimal>) -> Result<Decimal, PricingError> {
    if exclusive.is_zero() { return Ok(Decimal::ZERO); }
    let Some(rate) = effective_rate(tax_rate_percent) else { return Ok(exclusive) };
    let factor = tax_factor(exclusive, rate)?;
    let rounded = exclusive.checked_mul(factor).map(round_cents).ok_or(PricingError::Overflow { amount: exclusive, rate })?;
    let nearest = rounded.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    Ok(if (rounded - nearest).abs() <= SNAP_TOLERANCE { nearest } else { rounded })
}

/// [`try_to_exclusive`], keeping the amount unchanged when the conversion overflows.
pub fn to_exclusive(inclusive: Decimal, tax_rate_percent: Option<Decimal>) -> Decimal {
    try_to_exclusive(inclusive, tax_rate_percent).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "tax conversion out of range; showing the stored amount");
        inclusive
    })
}

/// [`try_to_inclusive`], keeping the amount unchanged when the conversion overflows.
pub fn to_inclusive(exclusive: Decimal, tax_rate_percent: Option<Decimal>) -> Decimal {
    try_to_inclusive(exclusive, tax_rate_percent).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "tax conversion out of range; showing the stored amount");
        exclusive
    })
}

/// Whole-percent discount of `price` against `mrp`; zero unless `mrp > price`.
pub fn discount_percentage(mrp: Option<Decimal>, price: Decimal) -> u32 {
    let Some(mrp) = mrp.filter(|mrp| *mrp > price && mrp.is_sign_positive()) else { return 0 };
    let Some(saving) = mrp.checked_sub(price) else { return 0 };
    let percent = (saving / mrp * HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    percent.to_u32().unwrap_or(0)
}

/// Display prices for one variant or one base product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    /// Selling price as stored.
    pub price: Decimal,
    /// Reference price, present only when it exceeds `price`.
    pub mrp: Option<Decimal>,
    pub exclusive: Decimal,
    pub inclusive: Decimal,
    pub discount_percentage: u32,
    pub tax_rate: Option<Decimal>,
}

impl PriceSummary {
    pub fn new(price: Decimal, mrp: Option<Decimal>, tax_rate: Option<Decimal>, basis: PriceBasis) -> Self {
        let (exclusive, inclusive) = match basis {
            PriceBasis::TaxExclusive => (price, to_inclusive(price, tax_rate)),
            PriceBasis::TaxInclusive => (to_exclusive(price, tax_rate), price),
        };
        Self {
            price,
            mrp: mrp.filter(|m| *m > price),
            exclusive,
            inclusive,
            discount_percentage: discount_percentage(mrp, price),
            tax_rate: effective_rate(tax_rate),
        }
    }

    pub fn for_variant(variant: &Variant, product: &Product, basis: PriceBasis) -> Self {
        Self::new(variant.price, variant.mrp, product.tax_rate, basis)
    }

    pub fn for_product(product: &Product, basis: PriceBasis) -> Self {
        Self::new(product.base_price, product.mrp, product.tax_rate, basis)
    }

    pub fn has_discount(&self) -> bool { self.discount_percentage > 0 }
}
