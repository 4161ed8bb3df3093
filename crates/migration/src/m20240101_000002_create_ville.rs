//! Create `ville` table.
//! A city optionally belongs to one department; removing the department
//! removes its cities.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ville::Table)
                    .if_not_exists()
                    .col(pk_auto(Ville::Id))
                    .col(string_len(Ville::Nom, 50))
                    .col(integer(Ville::NbHabitants))
                    .col(integer_null(Ville::DepartementId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ville_departement")
                            .from(Ville::Table, Ville::DepartementId)
                            .to(Departement::Table, Departement::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Ville::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Ville {
    Table,
    Id,
    Nom,
    NbHabitants,
    DepartementId,
}

#[derive(DeriveIden)]
enum Departement { Table, Id }
