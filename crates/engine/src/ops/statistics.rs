use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CounterpartyKind, DateRange, EntryFilter, Money, ResultEngine, Totals};

use super::{Engine, balances::aggregate, require_owner};

/// Owner-wide totals, optionally restricted to a date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub entry_count: u64,
    pub total_debit: Money,
    pub total_credit: Money,
    pub balance: Money,
}

/// Totals of one day for one counterparty kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub entry_count: u64,
    pub total_debit: Money,
    pub total_credit: Money,
    pub net_balance: Money,
}

impl TryFrom<Totals> for DailyStats {
    type Error = crate::EngineError;

    fn try_from(totals: Totals) -> Result<Self, Self::Error> {
        Ok(Self {
            entry_count: totals.entry_count,
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            net_balance: totals.balance()?,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    pub client: DailyStats,
    pub supplier: DailyStats,
}

impl Engine {
    #[tracing::instrument(name = "engine.summary", skip(self), err)]
    pub async fn summary(
        &self,
        owner_id: &str,
        range: Option<DateRange>,
    ) -> ResultEngine<Summary> {
        let owner_id = require_owner(owner_id)?;
        let mut filters = vec![EntryFilter::Owner(owner_id.to_string())];
        if let Some(range) = range {
            filters.push(EntryFilter::DateBetween(range));
        }

        let totals = aggregate(&self.database, &filters).await?;
        Ok(Summary {
            entry_count: totals.entry_count,
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            balance: totals.balance()?,
        })
    }

    /// Entries of `date`, split by the kind of their counterparty.
    #[tracing::instrument(name = "engine.daily_stats", skip(self), err)]
    pub async fn daily_stats_by_kind(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> ResultEngine<KindStats> {
        let owner_id = require_owner(owner_id)?;
        let day = |kind| {
            vec![
                EntryFilter::Owner(owner_id.to_string()),
                EntryFilter::OnDate(date),
                EntryFilter::CounterpartyKind(kind),
            ]
        };

        let client = aggregate(&self.database, &day(CounterpartyKind::Client)).await?;
        let supplier = aggregate(&self.database, &day(CounterpartyKind::Supplier)).await?;
        Ok(KindStats {
            client: DailyStats::try_from(client)?,
            supplier: DailyStats::try_from(supplier)?,
        })
    }
}
