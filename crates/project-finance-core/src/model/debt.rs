use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::types::{Money, Period};
use crate::PfResult;

use super::params::{AmortizationPolicy, FinancingStructure};

/// One period of a single tranche's amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheScheduleRow {
    pub period: Period,
    pub balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub payment: Money,
}

/// Full bullet schedule for one tranche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheSchedule {
    pub name: String,
    pub rows: Vec<TrancheScheduleRow>,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
}

/// Debt service summed across tranches for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateDebtRow {
    pub period: Period,
    pub total_payment: Money,
}

/// Per-tranche schedules plus the aggregated total-debt-service series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub tranches: Vec<TrancheSchedule>,
    pub aggregate: Vec<AggregateDebtRow>,
}

/// Build the combined debt schedule over the modeled timeline.
///
/// Each tranche follows the bullet recurrence in strictly ascending period
/// order: interest-only until tenor, full principal at tenor, all-zero rows
/// after retirement. A tenor beyond the modeled horizon is legal and leaves
/// the balance outstanding at the final period; a warning records it.
pub fn build_debt_schedule(
    total_capex: Money,
    financing: &FinancingStructure,
    timeline: &[Period],
    warnings: &mut Vec<String>,
) -> PfResult<DebtSchedule> {
    if financing.tenor == 0 {
        return Err(ProjectFinanceError::InvalidInput {
            field: "financing.tenor".into(),
            reason: "Tenor must be at least 1 period".into(),
        });
    }
    // Single policy today; the match keeps any future variant an explicit decision.
    match financing.amortization {
        AmortizationPolicy::Bullet => {}
    }

    let horizon = timeline.last().copied().unwrap_or(0);

    let mut tranches = Vec::with_capacity(financing.tranches.len());
    for terms in &financing.tranches {
        let principal_amount = total_capex * terms.ratio;

        if financing.tenor > horizon {
            warnings.push(format!(
                "Tranche '{}': tenor {} exceeds modeled horizon {}; {} remains outstanding at period {}",
                terms.name, financing.tenor, horizon, principal_amount, horizon
            ));
        }

        let mut rows = Vec::with_capacity(timeline.len());
        let mut balance = principal_amount;
        let mut total_interest_paid = Decimal::ZERO;
        let mut total_principal_paid = Decimal::ZERO;

        for &period in timeline {
            let row = if period == 0 {
                TrancheScheduleRow {
                    period,
                    balance,
                    interest: Decimal::ZERO,
                    principal: Decimal::ZERO,
                    payment: Decimal::ZERO,
                }
            } else if period < financing.tenor {
                let interest = balance * terms.rate;
                TrancheScheduleRow {
                    period,
                    balance,
                    interest,
                    principal: Decimal::ZERO,
                    payment: interest,
                }
            } else if period == financing.tenor {
                let interest = balance * terms.rate;
                let principal = balance;
                balance = Decimal::ZERO;
                TrancheScheduleRow {
                    period,
                    balance,
                    interest,
                    principal,
                    payment: interest + principal,
                }
            } else {
                // Debt fully retired
                TrancheScheduleRow {
                    period,
                    balance: Decimal::ZERO,
                    interest: Decimal::ZERO,
                    principal: Decimal::ZERO,
                    payment: Decimal::ZERO,
                }
            };

            total_interest_paid += row.interest;
            total_principal_paid += row.principal;
            rows.push(row);
        }

        tranches.push(TrancheSchedule {
            name: terms.name.clone(),
            rows,
            total_interest_paid,
            total_principal_paid,
        });
    }

    let aggregate = timeline
        .iter()
        .enumerate()
        .map(|(i, &period)| AggregateDebtRow {
            period,
            total_payment: tranches.iter().map(|t| t.rows[i].payment).sum(),
        })
        .collect();

    Ok(DebtSchedule {
        tranches,
        aggregate,
    })
}
