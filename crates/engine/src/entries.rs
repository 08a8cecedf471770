//! The module contains the `Entry` type, a dated debit or credit line recorded
//! against a counterparty.
//!
//! Amounts are stored as non-negative minor units in two columns (`debit`,
//! `credit`). An accepted entry has exactly one of them positive; entries where
//! both are positive may exist in storage and are aggregated as they are.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{CounterpartyKind, EngineError, Money, ResultEngine, counterparties};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub owner_id: String,
    pub counterparty_id: i64,
    pub entry_date: NaiveDate,
    pub label: String,
    pub debit: Money,
    pub credit: Money,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Signed effect of the entry on a balance (`debit - credit`).
    pub fn net(&self) -> ResultEngine<Money> {
        Money::net(self.debit, self.credit)
    }
}

/// An entry joined with the display fields of its counterparty.
///
/// The counterparty fields are optional because the join is a left join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRow {
    #[serde(flatten)]
    pub entry: Entry,
    pub counterparty_name: Option<String>,
    pub counterparty_kind: Option<CounterpartyKind>,
}

/// Fields of a new entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEntry {
    pub counterparty_id: i64,
    pub entry_date: NaiveDate,
    pub label: String,
    pub debit: Money,
    pub credit: Money,
}

impl NewEntry {
    /// Rejects negative amounts and zero entries.
    ///
    /// An entry with both amounts positive is accepted.
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.label.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "label must not be empty".to_string(),
            ));
        }
        if self.debit.is_negative() || self.credit.is_negative() {
            return Err(EngineError::InvalidAmount(
                "debit and credit amounts must be positive".to_string(),
            ));
        }
        if self.debit.is_zero() && self.credit.is_zero() {
            return Err(EngineError::InvalidAmount(
                "at least one of debit or credit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update of an entry. Only these fields can ever be changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub counterparty_id: Option<i64>,
    pub entry_date: Option<NaiveDate>,
    pub label: Option<String>,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.counterparty_id.is_none()
            && self.entry_date.is_none()
            && self.label.is_none()
            && self.debit.is_none()
            && self.credit.is_none()
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.is_empty() {
            return Err(EngineError::InvalidInput(
                "no valid fields to update".to_string(),
            ));
        }
        if self.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(EngineError::InvalidInput(
                "label must not be empty".to_string(),
            ));
        }
        if self.debit.is_some_and(Money::is_negative) || self.credit.is_some_and(Money::is_negative)
        {
            return Err(EngineError::InvalidAmount(
                "debit and credit amounts must be positive".to_string(),
            ));
        }
        if self.debit == Some(Money::ZERO) && self.credit == Some(Money::ZERO) {
            return Err(EngineError::InvalidAmount(
                "at least one of debit or credit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: String,
    pub counterparty_id: i64,
    pub entry_date: Date,
    pub label: String,
    pub debit: i64,
    pub credit: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::counterparties::Entity",
        from = "Column::CounterpartyId",
        to = "super::counterparties::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Counterparties,
}

impl Related<super::counterparties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counterparties.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Entry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            counterparty_id: model.counterparty_id,
            entry_date: model.entry_date,
            label: model.label,
            debit: Money::new(model.debit),
            credit: Money::new(model.credit),
            created_at: model.created_at,
        }
    }
}

impl TryFrom<(Model, Option<counterparties::Model>)> for EntryRow {
    type Error = EngineError;

    fn try_from(
        (model, counterparty): (Model, Option<counterparties::Model>),
    ) -> Result<Self, Self::Error> {
        let (counterparty_name, counterparty_kind) = match counterparty {
            Some(c) => (
                Some(c.name),
                Some(CounterpartyKind::try_from(c.kind.as_str())?),
            ),
            None => (None, None),
        };
        Ok(Self {
            entry: Entry::from(model),
            counterparty_name,
            counterparty_kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(debit: i64, credit: i64) -> NewEntry {
        NewEntry {
            counterparty_id: 1,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            label: "invoice".to_string(),
            debit: Money::new(debit),
            credit: Money::new(credit),
        }
    }

    #[test]
    fn zero_entry_is_rejected() {
        assert!(matches!(
            new_entry(0, 0).validate(),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert!(new_entry(-1, 0).validate().is_err());
        assert!(new_entry(0, -1).validate().is_err());
    }

    #[test]
    fn both_positive_is_tolerated() {
        assert!(new_entry(100, 50).validate().is_ok());
    }

    #[test]
    fn blank_label_is_rejected() {
        let mut entry = new_entry(100, 0);
        entry.label = "   ".to_string();
        assert!(matches!(entry.validate(), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn patch_rules() {
        assert!(EntryPatch::default().validate().is_err());

        let zeroes = EntryPatch {
            debit: Some(Money::ZERO),
            credit: Some(Money::ZERO),
            ..Default::default()
        };
        assert!(zeroes.validate().is_err());

        let only_debit_zero = EntryPatch {
            debit: Some(Money::ZERO),
            ..Default::default()
        };
        assert!(only_debit_zero.validate().is_ok());
    }
}
