use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Percent, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

/// Convert a nominal annual rate quoted in percent into the monthly rate.
pub fn monthly_rate(annual_rate: Percent) -> Rate {
    annual_rate / HUNDRED / MONTHS_PER_YEAR
}

/// Level annuity payment (Price / French amortization).
///
/// `payment = pv * r * (1+r)^n / ((1+r)^n - 1)`, or `pv / n` at a zero rate.
/// Returns `None` when the payment is not representable: zero periods,
/// overflow of the compounding factor, or a vanishing denominator.
pub fn pmt(rate: Rate, nper: u32, present_value: Money) -> Option<Money> {
    if nper == 0 {
        return None;
    }

    if rate.is_zero() {
        return present_value.checked_div(Decimal::from(nper));
    }

    let factor = (Decimal::ONE + rate).checked_powu(u64::from(nper))?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return None;
    }

    present_value
        .checked_mul(rate)?
        .checked_mul(factor)?
        .checked_div(denominator)
}

/// Closed-form outstanding balance of a level annuity after `k` payments.
///
/// `B_k = pv * (1+r)^k - payment * ((1+r)^k - 1) / r`
pub fn annuity_balance(rate: Rate, payment: Money, present_value: Money, k: u32) -> Option<Money> {
    if rate.is_zero() {
        return Some(present_value - payment * Decimal::from(k));
    }

    let growth = (Decimal::ONE + rate).checked_powu(u64::from(k))?;
    let accrued = present_value.checked_mul(growth)?;
    let repaid = payment.checked_mul(growth - Decimal::ONE)?.checked_div(rate)?;
    Some(accrued - repaid)
}
