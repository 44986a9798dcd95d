//! VAT arithmetic
//!
//! Invoice totals are entered including VAT. The base amount is derived as
//! `total / (1 + rate / 100)` and the VAT amount as the remainder, both
//! rounded to cents so that `base + vat == total` on paper.

use crate::currency::round_cents;
use crate::{FormatError, Result};

/// A total split into its base and VAT parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VatSplit {
    /// Amount excluding VAT
    pub base: f64,
    /// VAT amount
    pub vat: f64,
    /// Amount including VAT
    pub total: f64,
}

/// Split a VAT-inclusive total
///
/// # Errors
/// Fails for a non-finite total and for a rate that is not finite or
/// would make the divisor non-positive (`rate <= -100`).
pub fn split_vat(total: f64, rate_percent: f64) -> Result<VatSplit> {
    if !total.is_finite() {
        return Err(FormatError::InvalidAmount(total));
    }
    if !rate_percent.is_finite() || rate_percent <= -100.0 {
        return Err(FormatError::InvalidVatRate(rate_percent));
    }

    let total = round_cents(total);
    let base = round_cents(total / (1.0 + rate_percent / 100.0));
    let vat = round_cents(total - base);

    Ok(VatSplit { base, vat, total })
}
