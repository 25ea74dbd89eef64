use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::types::{Money, Period, Rate};
use crate::PfResult;

use super::debt::DebtSchedule;
use super::params::ProjectParameters;
use super::projection::CashFlowRow;

/// Unlevered FCF joined with total debt service for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeveredRow {
    pub period: Period,
    pub fcf: Money,
    pub total_payment: Money,
    /// FCF / total debt service; `None` where no debt service is due
    /// (period 0 and periods past tenor), never a division fault.
    pub dscr: Option<Rate>,
    pub levered_fcf: Money,
}

/// Levered view of the project: per-period rows plus the equity cash-flow
/// series used for the equity IRR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeveredOutput {
    pub rows: Vec<LeveredRow>,
    /// Entry 0 is the equity outlay (negative); entries 1..N are levered FCF
    /// with the terminal value folded into the final entry.
    pub equity_series: Vec<Money>,
    pub total_equity_outlay: Money,
}

/// Join the unlevered statement with the aggregate debt schedule.
///
/// Both sequences must cover the identical period set; a mismatch is a
/// construction bug upstream and fails the join rather than silently
/// aligning by position.
pub fn compose_levered(
    cash_flows: &[CashFlowRow],
    debt: &DebtSchedule,
    params: &ProjectParameters,
) -> PfResult<LeveredOutput> {
    if cash_flows.is_empty() {
        return Err(ProjectFinanceError::InsufficientData(
            "No cash-flow rows to compose".into(),
        ));
    }

    let cash_periods: Vec<Period> = cash_flows.iter().map(|r| r.period).collect();
    let debt_periods: Vec<Period> = debt.aggregate.iter().map(|r| r.period).collect();
    if cash_periods != debt_periods {
        return Err(ProjectFinanceError::PeriodMismatch {
            expected: format!("{cash_periods:?}"),
            found: format!("{debt_periods:?}"),
        });
    }

    let rows: Vec<LeveredRow> = cash_flows
        .iter()
        .zip(&debt.aggregate)
        .map(|(cf, service)| {
            let dscr = if service.total_payment.is_zero() {
                None
            } else {
                Some(cf.fcf / service.total_payment)
            };
            LeveredRow {
                period: cf.period,
                fcf: cf.fcf,
                total_payment: service.total_payment,
                dscr,
                levered_fcf: cf.fcf - service.total_payment,
            }
        })
        .collect();

    let total_equity_outlay = params.equity_ratio() * params.total_capex();

    let mut equity_series = Vec::with_capacity(rows.len());
    equity_series.push(-total_equity_outlay);
    for row in &rows[1..] {
        equity_series.push(row.levered_fcf);
    }
    if let Some(last) = equity_series.last_mut() {
        let terminal = cash_flows
            .last()
            .and_then(|r| r.terminal_value)
            .unwrap_or(Decimal::ZERO);
        *last += terminal;
    }

    Ok(LeveredOutput {
        rows,
        equity_series,
        total_equity_outlay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::debt::build_debt_schedule;
    use crate::model::params::fixtures::station_parameters;
    use crate::model::projection::{project_cash_flows, with_terminal_value};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn station_levered() -> (LeveredOutput, ProjectParameters) {
        let params = station_parameters();
        let rows = with_terminal_value(project_cash_flows(&params), &params).unwrap();
        let debt = build_debt_schedule(
            params.total_capex(),
            &params.financing,
            &params.timeline,
            &mut Vec::new(),
        )
        .unwrap();
        (compose_levered(&rows, &debt, &params).unwrap(), params)
    }

    #[test]
    fn test_dscr_sentinel_where_no_service_due() {
        let (levered, _) = station_levered();
        assert_eq!(levered.rows[0].dscr, None);
    }

    #[test]
    fn test_dscr_on_operating_periods() {
        let (levered, _) = station_levered();
        // 17,380,000 / 18,500,000
        let y2 = levered.rows[2].dscr.unwrap();
        assert_eq!(y2, dec!(17_380_000) / dec!(18_500_000));
        assert!(y2 < Decimal::ONE); // coverage short of service here
    }

    #[test]
    fn test_levered_fcf_nets_debt_service() {
        let (levered, _) = station_levered();
        assert_eq!(levered.rows[1].levered_fcf, dec!(-51_120_000));
        assert_eq!(levered.rows[2].levered_fcf, dec!(-1_120_000));
    }

    #[test]
    fn test_equity_series_shape() {
        let (levered, params) = station_levered();
        assert_eq!(levered.equity_series.len(), params.timeline.len());

        // 15% of 250M
        assert_eq!(levered.total_equity_outlay, dec!(37_500_000));
        assert_eq!(levered.equity_series[0], dec!(-37_500_000));

        // Final entry: levered FCF + terminal value
        assert_eq!(
            levered.equity_series[3],
            dec!(-1_120_000) + dec!(221_595_000)
        );
        // Terminal value folded into the last entry only
        assert_eq!(levered.equity_series[2], levered.rows[2].levered_fcf);
    }

    #[test]
    fn test_join_rejects_mismatched_period_sets() {
        let params = station_parameters();
        let rows = with_terminal_value(project_cash_flows(&params), &params).unwrap();

        let short_timeline = [0, 1, 2];
        let debt = build_debt_schedule(
            params.total_capex(),
            &params.financing,
            &short_timeline,
            &mut Vec::new(),
        )
        .unwrap();

        match compose_levered(&rows, &debt, &params) {
            Err(ProjectFinanceError::PeriodMismatch { .. }) => {}
            other => panic!("expected PeriodMismatch, got {other:?}"),
        }
    }
}
