pub mod debt;
pub mod levered;
pub mod params;
pub mod projection;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PfResult;

pub use debt::{AggregateDebtRow, DebtSchedule, TrancheSchedule, TrancheScheduleRow};
pub use levered::{LeveredOutput, LeveredRow};
pub use params::{
    AmortizationPolicy, FinancingStructure, ProjectParameters, RevenueDrivers, TrancheTerms,
};
pub use projection::CashFlowRow;

/// Full result of a model run: every per-period table plus the valuation
/// summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModelOutput {
    pub cash_flows: Vec<CashFlowRow>,
    pub debt: DebtSchedule,
    pub levered: Vec<LeveredRow>,
    pub equity_series: Vec<Money>,
    pub unlevered_npv: Money,
    pub unlevered_irr: Rate,
    pub equity_irr: Rate,
    pub total_equity_outlay: Money,
}

/// Run the full pipeline: validate, project, attach terminal value, build
/// the debt schedule, compose levered flows, compute NPV and IRRs.
///
/// Pure and deterministic: the same parameters always produce the same
/// `result` (envelope timing metadata aside), so a failed run fails
/// identically on retry.
pub fn run_model(
    params: &ProjectParameters,
) -> PfResult<ComputationOutput<ProjectModelOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    params.validate()?;

    let rows = projection::project_cash_flows(params);
    let rows = projection::with_terminal_value(rows, params)?;

    let schedule = debt::build_debt_schedule(
        params.total_capex(),
        &params.financing,
        &params.timeline,
        &mut warnings,
    )?;

    let levered = levered::compose_levered(&rows, &schedule, params)?;

    // Unlevered series with the terminal value folded into the final entry
    let mut unlevered_series: Vec<Money> = rows.iter().map(|r| r.fcf).collect();
    if let (Some(last), Some(row)) = (unlevered_series.last_mut(), rows.last()) {
        if let Some(tv) = row.terminal_value {
            *last += tv;
        }
    }

    let unlevered_npv = time_value::npv(params.discount_rate, &unlevered_series)?;
    let unlevered_irr = time_value::irr(&unlevered_series, dec!(0.10))?;
    let equity_irr = time_value::irr(&levered.equity_series, dec!(0.10))?;

    let output = ProjectModelOutput {
        cash_flows: rows,
        debt: schedule,
        levered: levered.rows,
        equity_series: levered.equity_series,
        unlevered_npv,
        unlevered_irr,
        equity_irr,
        total_equity_outlay: levered.total_equity_outlay,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Project-finance DCF with multi-tranche bullet debt schedule",
        params,
        warnings,
        elapsed,
        output,
    ))
}
