use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::types::{Money, Period, Rate};
use crate::PfResult;

/// Amortization policy for the debt stack. Bullet (interest-only with full
/// principal at tenor) is the only structure modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmortizationPolicy {
    Bullet,
}

/// Terms for a single debt tranche, sized as a ratio of total project capex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrancheTerms {
    pub name: String,
    /// Fraction of total project capex funded by this tranche
    pub ratio: Rate,
    /// Annual interest rate
    pub rate: Rate,
}

/// Debt stack shared terms: ordered tranches, a common tenor, and the
/// amortization policy applied to every tranche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingStructure {
    pub tranches: Vec<TrancheTerms>,
    /// Periods over which interest accrues; principal falls due at this period
    pub tenor: Period,
    pub amortization: AmortizationPolicy,
}

/// Drivers combined into a single annual revenue figure for operating periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueDrivers {
    /// Fee per module-month
    pub monthly_fee: Money,
    /// Utilization fraction applied to the fee stream
    pub utilization: Rate,
    /// Price per ticket
    pub ticket_price: Money,
    /// Tickets sold per year
    pub annual_volume: Decimal,
}

impl RevenueDrivers {
    /// Annual revenue for any operating period (period >= 1).
    pub fn annual_revenue(&self) -> Money {
        self.monthly_fee * dec!(12) * self.utilization + self.ticket_price * self.annual_volume
    }
}

/// Immutable assumption set for a single model run.
///
/// Constructed once, validated up front, and passed by reference into every
/// computation entry point. There is no ambient configuration: conflicting
/// redefinitions are impossible because the financing structure is a single
/// explicit value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectParameters {
    /// Contiguous period indices starting at 0 (the construction year)
    pub timeline: Vec<Period>,
    /// Capital expenditure by period; absent periods imply zero
    pub capex: BTreeMap<Period, Money>,
    /// Flat operating expenditure applied from period 1 onward
    pub opex_per_period: Money,
    pub revenue: RevenueDrivers,
    pub financing: FinancingStructure,
    pub discount_rate: Rate,
    pub tax_rate: Rate,
    pub terminal_growth_rate: Rate,
}

impl ProjectParameters {
    /// Total project capex across the modeled timeline.
    pub fn total_capex(&self) -> Money {
        self.timeline
            .iter()
            .filter_map(|p| self.capex.get(p))
            .copied()
            .sum()
    }

    /// Fraction of total capex funded by equity: 1 - sum of tranche ratios.
    pub fn equity_ratio(&self) -> Rate {
        Decimal::ONE
            - self
                .financing
                .tranches
                .iter()
                .map(|t| t.ratio)
                .sum::<Decimal>()
    }

    /// Last modeled period.
    pub fn horizon(&self) -> Period {
        self.timeline.last().copied().unwrap_or(0)
    }

    /// Validate the assumption set before any computation.
    ///
    /// Misconfiguration is rejected here rather than clamped or defaulted:
    /// a parameter set that passes validation produces a finite, meaningful
    /// model on every downstream path.
    pub fn validate(&self) -> PfResult<()> {
        if self.timeline.is_empty() {
            return Err(ProjectFinanceError::InvalidInput {
                field: "timeline".into(),
                reason: "Timeline must contain at least one period".into(),
            });
        }
        for (i, &p) in self.timeline.iter().enumerate() {
            if p != i as Period {
                return Err(ProjectFinanceError::InvalidInput {
                    field: "timeline".into(),
                    reason: format!(
                        "Periods must be contiguous from 0; found {p} at position {i}"
                    ),
                });
            }
        }

        if self.financing.tenor == 0 {
            return Err(ProjectFinanceError::InvalidInput {
                field: "financing.tenor".into(),
                reason: "Tenor must be at least 1 period".into(),
            });
        }

        let mut ratio_sum = Decimal::ZERO;
        for tranche in &self.financing.tranches {
            if tranche.ratio < Decimal::ZERO {
                return Err(ProjectFinanceError::InvalidInput {
                    field: "financing.tranches".into(),
                    reason: format!("Tranche '{}' has a negative ratio", tranche.name),
                });
            }
            if tranche.rate < Decimal::ZERO {
                return Err(ProjectFinanceError::InvalidInput {
                    field: "financing.tranches".into(),
                    reason: format!("Tranche '{}' has a negative rate", tranche.name),
                });
            }
            ratio_sum += tranche.ratio;
        }
        if ratio_sum > Decimal::ONE {
            return Err(ProjectFinanceError::InvalidInput {
                field: "financing.tranches".into(),
                reason: format!("Tranche ratios sum to {ratio_sum}, which exceeds 1"),
            });
        }

        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(ProjectFinanceError::InvalidInput {
                field: "tax_rate".into(),
                reason: "Tax rate must be between 0 and 1".into(),
            });
        }

        // Gordon growth constraint: required for a finite, positive terminal value
        if self.discount_rate <= self.terminal_growth_rate {
            return Err(ProjectFinanceError::FinancialImpossibility(format!(
                "Discount rate ({}) must exceed terminal growth rate ({})",
                self.discount_rate, self.terminal_growth_rate
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal_macros::dec;

    /// The orbital-station scenario: 250M capex, senior/mezzanine/equity
    /// 70/15/15 stack, 5-period bullet tenor over a 3-period horizon.
    pub fn station_parameters() -> ProjectParameters {
        ProjectParameters {
            timeline: vec![0, 1, 2, 3],
            capex: BTreeMap::from([(0, dec!(200_000_000)), (1, dec!(50_000_000))]),
            opex_per_period: dec!(10_000_000),
            revenue: RevenueDrivers {
                monthly_fee: dec!(2_000_000),
                utilization: dec!(0.5),
                ticket_price: dec!(5_000_000),
                annual_volume: dec!(4),
            },
            financing: FinancingStructure {
                tranches: vec![
                    TrancheTerms {
                        name: "Senior".into(),
                        ratio: dec!(0.70),
                        rate: dec!(0.08),
                    },
                    TrancheTerms {
                        name: "Mezzanine".into(),
                        ratio: dec!(0.15),
                        rate: dec!(0.12),
                    },
                ],
                tenor: 5,
                amortization: AmortizationPolicy::Bullet,
            },
            discount_rate: dec!(0.10),
            tax_rate: dec!(0.21),
            terminal_growth_rate: dec!(0.02),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::station_parameters;
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_station_parameters_are_valid() {
        assert!(station_parameters().validate().is_ok());
    }

    #[test]
    fn test_total_capex_sums_configured_periods() {
        assert_eq!(station_parameters().total_capex(), dec!(250_000_000));
    }

    #[test]
    fn test_equity_ratio_is_residual() {
        assert_eq!(station_parameters().equity_ratio(), dec!(0.15));
    }

    #[test]
    fn test_annual_revenue_combines_drivers() {
        // 2M * 12 * 0.5 + 5M * 4 = 12M + 20M = 32M
        assert_eq!(
            station_parameters().revenue.annual_revenue(),
            dec!(32_000_000)
        );
    }

    #[test]
    fn test_zero_tenor_rejected() {
        let mut params = station_parameters();
        params.financing.tenor = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_ratio_sum_above_one_rejected() {
        let mut params = station_parameters();
        params.financing.tranches[0].ratio = dec!(0.90);
        // 0.90 + 0.15 = 1.05 > 1: flagged, not clamped
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_discount_rate_must_exceed_terminal_growth() {
        let mut params = station_parameters();
        params.terminal_growth_rate = dec!(0.10);
        match params.validate() {
            Err(ProjectFinanceError::FinancialImpossibility(_)) => {}
            other => panic!("expected FinancialImpossibility, got {other:?}"),
        }
    }

    #[test]
    fn test_non_contiguous_timeline_rejected() {
        let mut params = station_parameters();
        params.timeline = vec![0, 1, 3];
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_timeline_must_start_at_zero() {
        let mut params = station_parameters();
        params.timeline = vec![1, 2, 3];
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_unsupported_amortization_rejected_at_parse() {
        let json = serde_json::to_string(&station_parameters())
            .unwrap()
            .replace("Bullet", "Annuity");
        assert!(serde_json::from_str::<ProjectParameters>(&json).is_err());
    }

    #[test]
    fn test_single_tranche_stack_is_expressible() {
        let mut params = station_parameters();
        params.financing.tranches = vec![TrancheTerms {
            name: "Debt".into(),
            ratio: dec!(0.70),
            rate: dec!(0.08),
        }];
        params.financing.tenor = 3;
        assert!(params.validate().is_ok());
        assert_eq!(params.equity_ratio(), dec!(0.30));
    }
}
