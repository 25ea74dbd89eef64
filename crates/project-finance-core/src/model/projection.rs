use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::types::{Money, Period};
use crate::PfResult;

use super::params::ProjectParameters;

/// Unlevered financial statement for a single period. Outflows (capex, opex,
/// tax) are stored signed negative so that FCF is a plain sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRow {
    pub period: Period,
    pub revenue: Money,
    pub capex: Money,
    pub opex: Money,
    pub ebit: Money,
    pub tax: Money,
    pub nopat: Money,
    pub fcf: Money,
    /// Set on the last modeled period only, by `with_terminal_value`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_value: Option<Money>,
}

/// Project the unlevered statement, one row per period in ascending order.
///
/// Period 0 is pure construction: no revenue, no opex, no tax. Operating
/// periods earn the flat annual revenue and opex; losses earn no tax benefit.
pub fn project_cash_flows(params: &ProjectParameters) -> Vec<CashFlowRow> {
    let annual_revenue = params.revenue.annual_revenue();

    params
        .timeline
        .iter()
        .map(|&period| {
            let capex = -params.capex.get(&period).copied().unwrap_or(Decimal::ZERO);
            let (revenue, opex) = if period >= 1 {
                (annual_revenue, -params.opex_per_period)
            } else {
                (Decimal::ZERO, Decimal::ZERO)
            };

            let ebit = revenue + opex;
            let tax = -(ebit.max(Decimal::ZERO) * params.tax_rate);
            let nopat = ebit + tax;
            let fcf = nopat + capex;

            CashFlowRow {
                period,
                revenue,
                capex,
                opex,
                ebit,
                tax,
                nopat,
                fcf,
                terminal_value: None,
            }
        })
        .collect()
}

/// Attach a perpetuity-growth terminal value to the final period.
///
/// Pure transform: returns a new vector with the last row's
/// `terminal_value` set and every base figure untouched.
pub fn with_terminal_value(
    rows: Vec<CashFlowRow>,
    params: &ProjectParameters,
) -> PfResult<Vec<CashFlowRow>> {
    let denominator = params.discount_rate - params.terminal_growth_rate;
    if denominator <= Decimal::ZERO {
        return Err(ProjectFinanceError::FinancialImpossibility(format!(
            "Discount rate ({}) must exceed terminal growth rate ({}) for a finite terminal value",
            params.discount_rate, params.terminal_growth_rate
        )));
    }

    let last_nopat = rows
        .last()
        .map(|row| row.nopat)
        .ok_or_else(|| ProjectFinanceError::InsufficientData("No cash-flow rows projected".into()))?;

    let tv = last_nopat * (Decimal::ONE + params.terminal_growth_rate) / denominator;

    let last_idx = rows.len() - 1;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, mut row)| {
            if i == last_idx {
                row.terminal_value = Some(tv);
            }
            row
        })
        .collect())
}
