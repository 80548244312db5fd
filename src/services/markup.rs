//! Markup calculator
//!
//! `suggested = reference * (1 + percentage / 100) + flat_fee`, in decimal arithmetic.
//!
//! Prices and markups are stored as `NUMERIC(38, 10)`; inputs with more
//! fractional digits are rejected and suggested prices are rounded to that
//! scale, so every backend holds the same value.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{PricingError, PricingResult};
use crate::models::settings::MarkupSettings;

/// Fractional digits kept for every stored price and markup
pub const PRICE_SCALE: u32 = 10;

/// Reject negative amounts and amounts finer than `PRICE_SCALE` with `InvalidArgument`
pub fn ensure_valid_amount(field: &str, value: Decimal) -> PricingResult<()> {
    if value < Decimal::ZERO {
        return Err(PricingError::InvalidArgument(format!(
            "{} must be >= 0, got {}",
            field, value
        )));
    }
    if value.normalize().scale() > PRICE_SCALE {
        return Err(PricingError::InvalidArgument(format!(
            "{} has more than {} decimal places: {}",
            field, PRICE_SCALE, value
        )));
    }
    Ok(())
}

/// Apply a percentage and flat-fee markup to a reference price
pub fn apply_markup(
    reference_price: Decimal,
    percentage_markup: Decimal,
    flat_fee_markup: Decimal,
) -> PricingResult<Decimal> {
    ensure_valid_amount("reference price", reference_price)?;
    ensure_valid_amount("percentage markup", percentage_markup)?;
    ensure_valid_amount("flat fee markup", flat_fee_markup)?;

    let multiplier = Decimal::ONE + percentage_markup / Decimal::ONE_HUNDRED;

    reference_price
        .checked_mul(multiplier)
        .and_then(|marked_up| marked_up.checked_add(flat_fee_markup))
        .map(|price| price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| {
            PricingError::InvalidArgument(format!(
                "markup overflow for reference price {}",
                reference_price
            ))
        })
}

/// Suggested price for `reference_price` under `settings`
pub fn suggested_price(reference_price: Decimal, settings: &MarkupSettings) -> PricingResult<Decimal> {
    apply_markup(
        reference_price,
        settings.percentage_markup,
        settings.flat_fee_markup,
    )
}
