use std::cmp::Ordering;

use chrono::Utc;
use sea_orm::{
    ActiveValue, JoinType, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    BalanceReport, EngineError, Entry, EntryPatch, EntryQuery, EntryRow, LedgerRequest, Money,
    NewEntry, Page, Pagination, ProjectedRow, RecentRequest, ResultEngine, SortColumn,
    SortDirection, StatementRequest, counterparties, entries, project_running_balance,
    query::{EntryOrder, entry_condition},
};

use super::{Engine, require_owner, with_tx};

/// A plain page of entry rows (no balances).
pub type EntryPage = Page<EntryRow>;

/// Rows annotated with running balances, plus the balance report of the
/// window they were taken from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerView {
    pub rows: Vec<ProjectedRow>,
    pub pagination: Pagination,
    pub balance_report: BalanceReport,
}

/// Reorders projected rows for display, the same way the store would order
/// them for `order`. Running balances stay attached to their rows.
fn sort_for_display(rows: &mut [ProjectedRow], order: EntryOrder) {
    let EntryOrder::By(column, direction) = order else {
        return;
    };
    rows.sort_by(|a, b| {
        let (a, b) = (&a.row.entry, &b.row.entry);
        let ordering = match column {
            SortColumn::Id => Ordering::Equal,
            SortColumn::EntryDate => a.entry_date.cmp(&b.entry_date),
            SortColumn::Label => a.label.cmp(&b.label),
            SortColumn::Debit => a.debit.cmp(&b.debit),
            SortColumn::Credit => a.credit.cmp(&b.credit),
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        }
        .then(a.id.cmp(&b.id));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

impl Engine {
    /// Records a new entry against one of the owner's counterparties.
    pub async fn create_entry(&self, owner_id: &str, new: NewEntry) -> ResultEngine<Entry> {
        let owner_id = require_owner(owner_id)?;
        new.validate()?;
        with_tx!(self, |db_tx| {
            self.require_counterparty_owned(&db_tx, owner_id, new.counterparty_id)
                .await?;

            let model = entries::ActiveModel {
                id: ActiveValue::NotSet,
                owner_id: ActiveValue::Set(owner_id.to_string()),
                counterparty_id: ActiveValue::Set(new.counterparty_id),
                entry_date: ActiveValue::Set(new.entry_date),
                label: ActiveValue::Set(new.label.trim().to_string()),
                debit: ActiveValue::Set(new.debit.minor()),
                credit: ActiveValue::Set(new.credit.minor()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            tracing::debug!(entry_id = model.id, %owner_id, "entry created");
            Ok(Entry::from(model))
        })
    }

    /// Return the entry `entry_id` of `owner_id`, joined with its counterparty.
    pub async fn entry(&self, entry_id: i64, owner_id: &str) -> ResultEngine<Option<EntryRow>> {
        let owner_id = require_owner(owner_id)?;
        entries::Entity::find_by_id(entry_id)
            .filter(entries::Column::OwnerId.eq(owner_id))
            .find_also_related(counterparties::Entity)
            .one(&self.database)
            .await?
            .map(EntryRow::try_from)
            .transpose()
    }

    /// Applies `patch` to an entry of `owner_id`.
    ///
    /// The patched entry must still carry a non-zero amount. Returns `false`
    /// when no such entry exists.
    pub async fn update_entry(
        &self,
        owner_id: &str,
        entry_id: i64,
        patch: EntryPatch,
    ) -> ResultEngine<bool> {
        let owner_id = require_owner(owner_id)?;
        patch.validate()?;
        with_tx!(self, |db_tx| {
            let Some(current) = entries::Entity::find_by_id(entry_id)
                .filter(entries::Column::OwnerId.eq(owner_id))
                .one(&db_tx)
                .await?
            else {
                return Ok(false);
            };

            let debit = patch.debit.unwrap_or(Money::new(current.debit));
            let credit = patch.credit.unwrap_or(Money::new(current.credit));
            if debit.is_zero() && credit.is_zero() {
                return Err(EngineError::InvalidAmount(
                    "at least one of debit or credit must be greater than 0".to_string(),
                ));
            }
            if let Some(counterparty_id) = patch.counterparty_id {
                self.require_counterparty_owned(&db_tx, owner_id, counterparty_id)
                    .await?;
            }

            let mut active = <entries::ActiveModel as ActiveModelTrait>::default();
            if let Some(counterparty_id) = patch.counterparty_id {
                active.counterparty_id = ActiveValue::Set(counterparty_id);
            }
            if let Some(entry_date) = patch.entry_date {
                active.entry_date = ActiveValue::Set(entry_date);
            }
            if let Some(label) = patch.label.as_deref() {
                active.label = ActiveValue::Set(label.trim().to_string());
            }
            if let Some(debit) = patch.debit {
                active.debit = ActiveValue::Set(debit.minor());
            }
            if let Some(credit) = patch.credit {
                active.credit = ActiveValue::Set(credit.minor());
            }

            let result = entries::Entity::update_many()
                .set(active)
                .filter(entries::Column::Id.eq(entry_id))
                .filter(entries::Column::OwnerId.eq(owner_id))
                .exec(&db_tx)
                .await?;
            Ok(result.rows_affected > 0)
        })
    }

    /// Deletes an entry of `owner_id`. Returns whether a row existed.
    pub async fn delete_entry(&self, owner_id: &str, entry_id: i64) -> ResultEngine<bool> {
        let owner_id = require_owner(owner_id)?;
        let result = entries::Entity::delete_many()
            .filter(entries::Column::Id.eq(entry_id))
            .filter(entries::Column::OwnerId.eq(owner_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected > 0 {
            tracing::debug!(entry_id, %owner_id, "entry deleted");
        }
        Ok(result.rows_affected > 0)
    }

    /// Runs an entry query: the matching rows (ordered and paged as asked)
    /// and the total number of matches ignoring the page.
    pub async fn fetch_entries(&self, query: &EntryQuery) -> ResultEngine<(Vec<EntryRow>, u64)> {
        let base = entries::Entity::find()
            .join(JoinType::LeftJoin, entries::Relation::Counterparties.def())
            .filter(entry_condition(&query.filters));
        let total = base.clone().count(&self.database).await?;

        let mut select = query
            .order
            .apply(base.select_also(counterparties::Entity));
        if let Some(page) = query.page {
            let Some(offset) = page.offset() else {
                return Ok((Vec::new(), total));
            };
            select = select.limit(page.page_size).offset(offset);
        }

        let rows = select
            .all(&self.database)
            .await?
            .into_iter()
            .map(EntryRow::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok((rows, total))
    }

    /// Scoped ledger view: every entry of one counterparty in a date window,
    /// with running balances and the window's balance report.
    ///
    /// Running balances are computed chronologically from the cumulative
    /// balance; rows are then returned in the requested display order.
    #[tracing::instrument(name = "engine.ledger", skip(self), err)]
    pub async fn ledger(&self, request: &LedgerRequest) -> ResultEngine<LedgerView> {
        let spec = request.build()?;
        let (rows, total) = self.fetch_entries(&spec.query()).await?;
        let balance_report = self
            .balance_report(&spec.owner_id, spec.range, Some(spec.counterparty_id))
            .await?;

        let mut rows = project_running_balance(rows, balance_report.cumulative.cumulative_balance)?;
        sort_for_display(&mut rows, spec.display_order);

        Ok(LedgerView {
            rows,
            pagination: Pagination::single_page(total),
            balance_report,
        })
    }

    /// Paginated chronological statement of one counterparty.
    ///
    /// The first row of page `p` continues from the last row of page `p - 1`.
    #[tracing::instrument(name = "engine.counterparty_statement", skip(self), err)]
    pub async fn counterparty_statement(
        &self,
        request: &StatementRequest,
    ) -> ResultEngine<LedgerView> {
        let spec = request.build()?;
        let query = spec.query();
        let (rows, total) = self.fetch_entries(&query).await?;
        let balance_report = self
            .balance_report(&spec.owner_id, spec.range, Some(spec.counterparty_id))
            .await?;

        let opening = self
            .page_opening_balance(
                &query.filters,
                balance_report.cumulative.cumulative_balance,
                spec.page.offset(),
            )
            .await?;
        let rows = project_running_balance(rows, opening)?;

        Ok(LedgerView {
            rows,
            pagination: Pagination::compute(total, spec.page),
            balance_report,
        })
    }

    /// Unscoped recent view over every counterparty, newest first unless
    /// asked otherwise. No balances.
    pub async fn recent_entries(&self, request: &RecentRequest) -> ResultEngine<EntryPage> {
        let query = request.build()?;
        let page = query.page.unwrap_or_default();
        let (rows, total) = self.fetch_entries(&query).await?;
        Ok(Page {
            rows,
            pagination: Pagination::compute(total, page),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    fn projected(id: i64, day: u32, label: &str, debit: i64, running: i64) -> ProjectedRow {
        ProjectedRow {
            row: EntryRow {
                entry: Entry {
                    id,
                    owner_id: "alice".to_string(),
                    counterparty_id: 1,
                    entry_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                    label: label.to_string(),
                    debit: Money::new(debit),
                    credit: Money::ZERO,
                    created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
                },
                counterparty_name: None,
                counterparty_kind: None,
            },
            running_balance: Money::new(running),
        }
    }

    #[test]
    fn display_sort_keeps_running_balances() {
        let mut rows = vec![
            projected(1, 1, "b", 300, 300),
            projected(2, 2, "a", 100, 400),
            projected(3, 2, "c", 200, 600),
        ];
        sort_for_display(
            &mut rows,
            EntryOrder::By(SortColumn::Debit, SortDirection::Desc),
        );
        let ids: Vec<i64> = rows.iter().map(|r| r.row.entry.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(rows[1].running_balance, Money::new(600));

        sort_for_display(
            &mut rows,
            EntryOrder::By(SortColumn::EntryDate, SortDirection::Desc),
        );
        let ids: Vec<i64> = rows.iter().map(|r| r.row.entry.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        sort_for_display(
            &mut rows,
            EntryOrder::By(SortColumn::Label, SortDirection::Asc),
        );
        let ids: Vec<i64> = rows.iter().map(|r| r.row.entry.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn chronological_order_is_left_untouched() {
        let mut rows = vec![projected(2, 5, "x", 1, 1), projected(1, 1, "y", 1, 2)];
        sort_for_display(&mut rows, EntryOrder::Chronological);
        assert_eq!(rows[0].row.entry.id, 2);
    }
}
