//! Counterparty primitives.
//!
//! A `Counterparty` is a client or a supplier owned by a single user. Entries
//! are always recorded against one counterparty.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartyKind {
    Client,
    Supplier,
}

impl CounterpartyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Supplier => "supplier",
        }
    }
}

impl TryFrom<&str> for CounterpartyKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "client" => Ok(Self::Client),
            "supplier" => Ok(Self::Supplier),
            other => Err(EngineError::InvalidInput(format!(
                "invalid counterparty kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub kind: CounterpartyKind,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to register a new counterparty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCounterparty {
    pub name: String,
    pub kind: CounterpartyKind,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Partial update of a counterparty.
///
/// `email`/`phone` use a nested option: `Some(None)` clears the field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterpartyPatch {
    pub name: Option<String>,
    pub kind: Option<CounterpartyKind>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
}

impl CounterpartyPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// A counterparty with the totals of every entry recorded against it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyBalance {
    pub id: i64,
    pub name: String,
    pub kind: CounterpartyKind,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub total_debit: Money,
    pub total_credit: Money,
    pub balance: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "counterparties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub kind: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Counterparty {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            kind: CounterpartyKind::try_from(model.kind.as_str())?,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_storage_string() {
        for kind in [CounterpartyKind::Client, CounterpartyKind::Supplier] {
            assert_eq!(CounterpartyKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(CounterpartyKind::try_from("fournisseur").is_err());
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(CounterpartyPatch::default().is_empty());
        let patch = CounterpartyPatch {
            email: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
