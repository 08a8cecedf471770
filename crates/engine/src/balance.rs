//! Balance report types and the running-balance projection.
//!
//! A [`BalanceReport`] is derived, never stored: it combines the totals of a
//! date window (the period) with the totals of everything before it (the
//! cumulative part).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EntryRow, Money, ResultEngine};

/// Sums and count over a set of entries, already decoded into minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub entry_count: u64,
    pub total_debit: Money,
    pub total_credit: Money,
}

impl Totals {
    pub fn balance(&self) -> ResultEngine<Money> {
        Money::net(self.total_debit, self.total_credit)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub entry_count: u64,
    pub total_debit: Money,
    pub total_credit: Money,
    pub period_balance: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeAggregate {
    pub total_debit_before: Money,
    pub total_credit_before: Money,
    pub cumulative_balance: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub period: PeriodAggregate,
    pub cumulative: CumulativeAggregate,
    pub final_balance: Money,
}

impl BalanceReport {
    /// Builds the report from the period totals and the totals strictly
    /// before `date_start`.
    ///
    /// Fails with [`crate::EngineError::Computation`] instead of returning a
    /// wrapped-around figure.
    pub fn from_totals(
        date_start: NaiveDate,
        date_end: NaiveDate,
        period: Totals,
        before: Totals,
    ) -> ResultEngine<Self> {
        let period_balance = period.balance()?;
        let cumulative_balance = before.balance()?;
        let final_balance = cumulative_balance.try_add(period_balance)?;
        Ok(Self {
            period: PeriodAggregate {
                date_start,
                date_end,
                entry_count: period.entry_count,
                total_debit: period.total_debit,
                total_credit: period.total_credit,
                period_balance,
            },
            cumulative: CumulativeAggregate {
                total_debit_before: before.total_debit,
                total_credit_before: before.total_credit,
                cumulative_balance,
            },
            final_balance,
        })
    }
}

/// An entry row annotated with the balance right after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedRow {
    #[serde(flatten)]
    pub row: EntryRow,
    pub running_balance: Money,
}

/// Annotates chronologically ordered rows with their running balance,
/// starting from `opening`.
///
/// `rows` must be ordered by `entry_date`, then creation order.
pub fn project_running_balance(
    rows: Vec<EntryRow>,
    opening: Money,
) -> ResultEngine<Vec<ProjectedRow>> {
    let mut running = opening;
    rows.into_iter()
        .map(|row| -> ResultEngine<ProjectedRow> {
            running = running.try_add(row.entry.net()?)?;
            Ok(ProjectedRow {
                row,
                running_balance: running,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Entry, EngineError};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn row(id: i64, debit: i64, credit: i64) -> EntryRow {
        EntryRow {
            entry: Entry {
                id,
                owner_id: "alice".to_string(),
                counterparty_id: 1,
                entry_date: date(id as u32),
                label: format!("entry {id}"),
                debit: Money::new(debit),
                credit: Money::new(credit),
                created_at: Utc::now(),
            },
            counterparty_name: Some("ACME".to_string()),
            counterparty_kind: None,
        }
    }

    fn totals(count: u64, debit: i64, credit: i64) -> Totals {
        Totals {
            entry_count: count,
            total_debit: Money::new(debit),
            total_credit: Money::new(credit),
        }
    }

    #[test]
    fn five_entry_scenario() {
        let rows = vec![
            row(1, 1000, 0),
            row(2, 0, 600),
            row(3, 500, 0),
            row(4, 0, 800),
            row(5, 1200, 0),
        ];
        let report =
            BalanceReport::from_totals(date(1), date(5), totals(5, 2700, 1400), Totals::default())
                .unwrap();
        assert_eq!(report.period.period_balance, Money::new(1300));
        assert_eq!(report.cumulative.cumulative_balance, Money::ZERO);
        assert_eq!(report.final_balance, Money::new(1300));

        let projected =
            project_running_balance(rows, report.cumulative.cumulative_balance).unwrap();
        let running: Vec<i64> = projected.iter().map(|r| r.running_balance.minor()).collect();
        assert_eq!(running, vec![1000, 400, 900, 100, 1300]);
        assert_eq!(
            projected.last().map(|r| r.running_balance),
            Some(report.final_balance)
        );
    }

    #[test]
    fn negative_cumulative_cancels_period() {
        let report = BalanceReport::from_totals(
            date(10),
            date(20),
            totals(1, 10_000, 0),
            totals(1, 0, 10_000),
        )
        .unwrap();
        assert_eq!(report.cumulative.cumulative_balance, Money::new(-10_000));
        assert_eq!(report.period.period_balance, Money::new(10_000));
        assert_eq!(report.final_balance, Money::ZERO);
    }

    #[test]
    fn empty_period_is_all_zero() {
        let report =
            BalanceReport::from_totals(date(1), date(31), Totals::default(), Totals::default())
                .unwrap();
        assert_eq!(report.period.entry_count, 0);
        assert_eq!(report.period.total_debit, Money::ZERO);
        assert_eq!(report.period.period_balance, Money::ZERO);
        assert_eq!(report.final_balance, Money::ZERO);
    }

    #[test]
    fn overflowing_final_balance_fails_loudly() {
        let err = BalanceReport::from_totals(
            date(1),
            date(2),
            totals(1, i64::MAX, 0),
            totals(1, 1, 0),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Computation(_)));
    }

    #[test]
    fn projection_starts_from_opening_and_tolerates_both_positive() {
        let projected =
            project_running_balance(vec![row(1, 300, 100), row(2, 0, 50)], Money::new(-100))
                .unwrap();
        assert_eq!(projected[0].running_balance, Money::new(100));
        assert_eq!(projected[1].running_balance, Money::new(50));
        assert!(
            project_running_balance(Vec::new(), Money::new(5))
                .unwrap()
                .is_empty()
        );
    }
}
