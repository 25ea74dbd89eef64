use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ProjectFinanceError;
use crate::types::{Money, Rate};
use crate::PfResult;

/// Absolute NPV below which the IRR iteration is considered converged.
const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
/// Newton-Raphson iteration cap before reporting a convergence failure.
const MAX_IRR_ITERATIONS: u32 = 100;

/// Net Present Value of a series of cash flows, with period 0 undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> PfResult<Money> {
    if rate <= dec!(-1) {
        return Err(ProjectFinanceError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(ProjectFinanceError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Requires at least one sign change in the series; a series that is all
/// outflows or all inflows has no real economic return and is rejected as
/// degenerate rather than iterated on. A series with several sign changes
/// may have several roots; the one reached from `guess` is returned.
/// Converges when |NPV| falls below `CONVERGENCE_THRESHOLD` (1e-7); gives
/// up after `MAX_IRR_ITERATIONS`.
pub fn irr(cash_flows: &[Money], guess: Rate) -> PfResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(ProjectFinanceError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    if !has_sign_change(cash_flows) {
        return Err(ProjectFinanceError::DegenerateSeries(
            "IRR requires a series with at least one sign change".into(),
        ));
    }

    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;

        for (t, cf) in cash_flows.iter().enumerate() {
            let t_dec = Decimal::from(t as i64);
            let discount = one_plus_r.powd(t_dec);
            if discount.is_zero() {
                continue;
            }
            npv_val += cf / discount;
            if t > 0 {
                dnpv -= t_dec * cf / (one_plus_r.powd(t_dec + Decimal::ONE));
            }
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(ProjectFinanceError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }
    }

    Err(ProjectFinanceError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv(rate, cash_flows).unwrap_or(Decimal::MAX),
    })
}

/// True when the series contains both a strictly negative and a strictly
/// positive flow. Zero entries carry no sign.
fn has_sign_change(cash_flows: &[Money]) -> bool {
    let any_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    let any_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    any_negative && any_positive
}
