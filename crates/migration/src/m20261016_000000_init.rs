//! Initial schema.
//!
//! - `users`: authentication, the username is the owner id of every row below
//! - `counterparties`: clients and suppliers of an owner
//! - `entries`: dated debit/credit lines recorded against a counterparty

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Counterparties {
    Table,
    Id,
    OwnerId,
    Name,
    Kind,
    Email,
    Phone,
    CreatedAt,
}

#[derive(Iden)]
enum Entries {
    Table,
    Id,
    OwnerId,
    CounterpartyId,
    EntryDate,
    Label,
    Debit,
    Credit,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Counterparties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Counterparties::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Counterparties::OwnerId).string().not_null())
                    .col(ColumnDef::new(Counterparties::Name).string().not_null())
                    .col(ColumnDef::new(Counterparties::Kind).string().not_null())
                    .col(ColumnDef::new(Counterparties::Email).string())
                    .col(ColumnDef::new(Counterparties::Phone).string())
                    .col(
                        ColumnDef::new(Counterparties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-counterparties-owner_id")
                            .from(Counterparties::Table, Counterparties::OwnerId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-counterparties-owner_id-name")
                    .table(Counterparties::Table)
                    .col(Counterparties::OwnerId)
                    .col(Counterparties::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entries::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Entries::CounterpartyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::EntryDate).date().not_null())
                    .col(ColumnDef::new(Entries::Label).string().not_null())
                    .col(
                        ColumnDef::new(Entries::Debit)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Entries::Credit)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Entries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-owner_id")
                            .from(Entries::Table, Entries::OwnerId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-counterparty_id")
                            .from(Entries::Table, Entries::CounterpartyId)
                            .to(Counterparties::Table, Counterparties::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Serves the scoped views and both balance aggregates.
        manager
            .create_index(
                Index::create()
                    .name("idx-entries-owner_id-counterparty_id-entry_date")
                    .table(Entries::Table)
                    .col(Entries::OwnerId)
                    .col(Entries::CounterpartyId)
                    .col(Entries::EntryDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-owner_id-entry_date")
                    .table(Entries::Table)
                    .col(Entries::OwnerId)
                    .col(Entries::EntryDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Counterparties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
