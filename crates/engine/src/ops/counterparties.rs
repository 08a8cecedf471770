use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    BalancesRequest, Counterparty, CounterpartyBalance, CounterpartyKind, CounterpartyPatch,
    CounterpartyRequest, EngineError, Money, NewCounterparty, Page, Pagination, ResultEngine,
    counterparties, entries,
    query::{CounterpartySortColumn, counterparty_condition},
};

use super::{
    Engine, balances::sum_error, normalize_optional_text, normalize_required_text, require_owner,
    with_tx,
};

#[derive(Debug, FromQueryResult)]
struct BalanceRow {
    id: i64,
    name: String,
    kind: String,
    email: Option<String>,
    phone: Option<String>,
    total_debit: Option<i64>,
    total_credit: Option<i64>,
}

impl TryFrom<BalanceRow> for CounterpartyBalance {
    type Error = EngineError;

    fn try_from(row: BalanceRow) -> Result<Self, Self::Error> {
        let total_debit = Money::new(row.total_debit.unwrap_or(0));
        let total_credit = Money::new(row.total_credit.unwrap_or(0));
        Ok(Self {
            id: row.id,
            name: row.name,
            kind: CounterpartyKind::try_from(row.kind.as_str())?,
            email: row.email,
            phone: row.phone,
            total_debit,
            total_credit,
            balance: Money::net(total_debit, total_credit)?,
        })
    }
}

impl Engine {
    /// Fails with `KeyNotFound` unless `counterparty_id` belongs to `owner_id`.
    pub(super) async fn require_counterparty_owned(
        &self,
        db: &DatabaseTransaction,
        owner_id: &str,
        counterparty_id: i64,
    ) -> ResultEngine<counterparties::Model> {
        counterparties::Entity::find_by_id(counterparty_id)
            .filter(counterparties::Column::OwnerId.eq(owner_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("counterparty not exists".to_string()))
    }

    /// Registers a new client or supplier for `owner_id`.
    pub async fn create_counterparty(
        &self,
        owner_id: &str,
        new: NewCounterparty,
    ) -> ResultEngine<Counterparty> {
        let owner_id = require_owner(owner_id)?;
        let name = normalize_required_text(&new.name, "name")?;

        let model = counterparties::ActiveModel {
            id: ActiveValue::NotSet,
            owner_id: ActiveValue::Set(owner_id.to_string()),
            name: ActiveValue::Set(name),
            kind: ActiveValue::Set(new.kind.as_str().to_string()),
            email: ActiveValue::Set(normalize_optional_text(new.email.as_deref())),
            phone: ActiveValue::Set(normalize_optional_text(new.phone.as_deref())),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;

        tracing::debug!(counterparty_id = model.id, %owner_id, "counterparty created");
        Counterparty::try_from(model)
    }

    /// Return the counterparty `counterparty_id` if it belongs to `owner_id`.
    pub async fn counterparty(
        &self,
        counterparty_id: i64,
        owner_id: &str,
    ) -> ResultEngine<Option<Counterparty>> {
        let owner_id = require_owner(owner_id)?;
        counterparties::Entity::find_by_id(counterparty_id)
            .filter(counterparties::Column::OwnerId.eq(owner_id))
            .one(&self.database)
            .await?
            .map(Counterparty::try_from)
            .transpose()
    }

    /// Lists counterparties matching `request`, one page at a time.
    pub async fn list_counterparties(
        &self,
        request: &CounterpartyRequest,
    ) -> ResultEngine<Page<Counterparty>> {
        let query = request.build()?;
        let base =
            counterparties::Entity::find().filter(counterparty_condition(&query.filters));
        let total = base.clone().count(&self.database).await?;

        let Some(offset) = query.page.offset() else {
            return Ok(Page {
                rows: Vec::new(),
                pagination: Pagination::compute(total, query.page),
            });
        };

        let (column, direction) = query.sort;
        let mut select = base.order_by(column.column(), direction.order());
        if column != CounterpartySortColumn::Id {
            select = select.order_by(counterparties::Column::Id, direction.order());
        }
        let rows = select
            .limit(query.page.page_size)
            .offset(offset)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Counterparty::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Page {
            rows,
            pagination: Pagination::compute(total, query.page),
        })
    }

    /// Applies `patch` to a counterparty of `owner_id`.
    ///
    /// Returns `false` when no such counterparty exists.
    pub async fn update_counterparty(
        &self,
        owner_id: &str,
        counterparty_id: i64,
        patch: CounterpartyPatch,
    ) -> ResultEngine<bool> {
        let owner_id = require_owner(owner_id)?;
        if patch.is_empty() {
            return Err(EngineError::InvalidInput(
                "no valid fields to update".to_string(),
            ));
        }

        let mut active = <counterparties::ActiveModel as ActiveModelTrait>::default();
        if let Some(name) = patch.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_text(name, "name")?);
        }
        if let Some(kind) = patch.kind {
            active.kind = ActiveValue::Set(kind.as_str().to_string());
        }
        if let Some(email) = patch.email.as_ref() {
            active.email = ActiveValue::Set(normalize_optional_text(email.as_deref()));
        }
        if let Some(phone) = patch.phone.as_ref() {
            active.phone = ActiveValue::Set(normalize_optional_text(phone.as_deref()));
        }

        let result = counterparties::Entity::update_many()
            .set(active)
            .filter(counterparties::Column::Id.eq(counterparty_id))
            .filter(counterparties::Column::OwnerId.eq(owner_id))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Deletes a counterparty of `owner_id` together with its entries.
    pub async fn delete_counterparty(
        &self,
        owner_id: &str,
        counterparty_id: i64,
    ) -> ResultEngine<bool> {
        let owner_id = require_owner(owner_id)?;
        with_tx!(self, |db_tx| {
            entries::Entity::delete_many()
                .filter(entries::Column::CounterpartyId.eq(counterparty_id))
                .filter(entries::Column::OwnerId.eq(owner_id))
                .exec(&db_tx)
                .await?;
            let result = counterparties::Entity::delete_many()
                .filter(counterparties::Column::Id.eq(counterparty_id))
                .filter(counterparties::Column::OwnerId.eq(owner_id))
                .exec(&db_tx)
                .await?;
            if result.rows_affected > 0 {
                tracing::debug!(counterparty_id, %owner_id, "counterparty deleted");
            }
            Ok(result.rows_affected > 0)
        })
    }

    /// Every counterparty of the owner with the totals of all its entries,
    /// ordered by name.
    #[tracing::instrument(name = "engine.counterparty_balances", skip(self), err)]
    pub async fn counterparty_balances(
        &self,
        request: &BalancesRequest,
    ) -> ResultEngine<Page<CounterpartyBalance>> {
        let (filters, page) = request.build()?;
        let condition = counterparty_condition(&filters);

        let total = counterparties::Entity::find()
            .filter(condition.clone())
            .count(&self.database)
            .await?;
        let Some(offset) = page.offset() else {
            return Ok(Page {
                rows: Vec::new(),
                pagination: Pagination::compute(total, page),
            });
        };

        let rows = counterparties::Entity::find()
            .select_only()
            .columns([
                counterparties::Column::Id,
                counterparties::Column::Name,
                counterparties::Column::Kind,
                counterparties::Column::Email,
                counterparties::Column::Phone,
            ])
            .column_as(entries::Column::Debit.sum(), "total_debit")
            .column_as(entries::Column::Credit.sum(), "total_credit")
            .join(JoinType::LeftJoin, counterparties::Relation::Entries.def())
            .filter(condition)
            .group_by(counterparties::Column::Id)
            .order_by_asc(counterparties::Column::Name)
            .order_by_asc(counterparties::Column::Id)
            .limit(page.page_size)
            .offset(offset)
            .into_model::<BalanceRow>()
            .all(&self.database)
            .await
            .map_err(sum_error)?
            .into_iter()
            .map(CounterpartyBalance::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Page {
            rows,
            pagination: Pagination::compute(total, page),
        })
    }
}
