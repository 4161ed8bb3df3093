//! Create `departement` table.
//!
//! Parent aggregate; `ville` rows reference it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Departement::Table)
                    .if_not_exists()
                    .col(pk_auto(Departement::Id))
                    .col(string_len(Departement::Nom, 50))
                    .col(string_len(Departement::Code, 5))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Departement::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Departement { Table, Id, Nom, Code }
