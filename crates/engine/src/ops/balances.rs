use sea_orm::{ConnectionTrait, FromQueryResult, JoinType, QueryFilter, QuerySelect, prelude::*};

use crate::{
    BalanceReport, DateRange, EngineError, EntryFilter, Money, ResultEngine, Totals, entries,
    query::{EntryOrder, entry_condition},
};

use super::{Engine, require_owner};

/// Raw aggregate row as returned by the store.
///
/// `SUM` over no rows is `NULL`, hence the options; the row is turned into
/// [`Totals`] right here so no caller ever sees an untyped aggregate.
#[derive(Debug, FromQueryResult)]
struct AggregateRow {
    entry_count: i64,
    total_debit: Option<i64>,
    total_credit: Option<i64>,
}

impl TryFrom<AggregateRow> for Totals {
    type Error = EngineError;

    fn try_from(row: AggregateRow) -> Result<Self, Self::Error> {
        let entry_count = u64::try_from(row.entry_count).map_err(|_| {
            EngineError::Computation(format!("invalid entry count: {}", row.entry_count))
        })?;
        Ok(Self {
            entry_count,
            total_debit: Money::new(row.total_debit.unwrap_or(0)),
            total_credit: Money::new(row.total_credit.unwrap_or(0)),
        })
    }
}

/// SQLite aborts a `SUM` that leaves the `i64` range; that is a balance
/// computation failure, not a storage one.
pub(super) fn sum_error(err: DbErr) -> EngineError {
    if err.to_string().contains("integer overflow") {
        EngineError::Computation(format!("sum out of range: {err}"))
    } else {
        EngineError::Database(err)
    }
}

/// `COUNT`/`SUM(debit)`/`SUM(credit)` over the entries matching `filters`.
pub(super) async fn aggregate<C: ConnectionTrait>(
    db: &C,
    filters: &[EntryFilter],
) -> ResultEngine<Totals> {
    let row = entries::Entity::find()
        .select_only()
        .column_as(entries::Column::Id.count(), "entry_count")
        .column_as(entries::Column::Debit.sum(), "total_debit")
        .column_as(entries::Column::Credit.sum(), "total_credit")
        .join(JoinType::LeftJoin, entries::Relation::Counterparties.def())
        .filter(entry_condition(filters))
        .into_model::<AggregateRow>()
        .one(db)
        .await
        .map_err(sum_error)?;

    match row {
        Some(row) => Totals::try_from(row),
        None => Ok(Totals::default()),
    }
}

fn scope(owner_id: &str, counterparty_id: Option<i64>, window: EntryFilter) -> Vec<EntryFilter> {
    let mut filters = vec![EntryFilter::Owner(owner_id.to_string()), window];
    if let Some(id) = counterparty_id {
        filters.push(EntryFilter::Counterparty(id));
    }
    filters
}

impl Engine {
    /// Computes the balance report of `range`, optionally scoped to one
    /// counterparty.
    ///
    /// Runs two independent aggregate queries: one over `range` and one over
    /// every entry strictly before `range.start`.
    #[tracing::instrument(name = "engine.balance_report", skip(self), err)]
    pub async fn balance_report(
        &self,
        owner_id: &str,
        range: DateRange,
        counterparty_id: Option<i64>,
    ) -> ResultEngine<BalanceReport> {
        let owner_id = require_owner(owner_id)?;

        let period = aggregate(
            &self.database,
            &scope(owner_id, counterparty_id, EntryFilter::DateBetween(range)),
        )
        .await?;
        let before = aggregate(
            &self.database,
            &scope(owner_id, counterparty_id, EntryFilter::DateBefore(range.start)),
        )
        .await?;

        BalanceReport::from_totals(range.start, range.end, period, before).inspect_err(|err| {
            tracing::error!(%owner_id, ?counterparty_id, "balance report aborted: {err}");
        })
    }

    /// Balance right before the first row of a chronological page: the
    /// cumulative balance plus every in-range entry preceding `offset`.
    ///
    /// A page past every addressable row opens on the closing balance.
    pub(super) async fn page_opening_balance(
        &self,
        filters: &[EntryFilter],
        cumulative_balance: Money,
        offset: Option<u64>,
    ) -> ResultEngine<Money> {
        let offset = match offset {
            Some(0) => return Ok(cumulative_balance),
            Some(offset) => offset,
            None => {
                let totals = aggregate(&self.database, filters).await?;
                return cumulative_balance.try_add(totals.balance()?);
            }
        };

        let preceding: Vec<(i64, i64)> = EntryOrder::Chronological
            .apply(
                entries::Entity::find()
                    .select_only()
                    .column(entries::Column::Debit)
                    .column(entries::Column::Credit)
                    .join(JoinType::LeftJoin, entries::Relation::Counterparties.def())
                    .filter(entry_condition(filters)),
            )
            .limit(offset)
            .into_tuple()
            .all(&self.database)
            .await?;

        preceding
            .into_iter()
            .try_fold(cumulative_balance, |running, (debit, credit)| {
                running.try_add(Money::net(Money::new(debit), Money::new(credit))?)
            })
    }
}
