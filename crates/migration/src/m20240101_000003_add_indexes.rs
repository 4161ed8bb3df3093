use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Ville: lookups of a department's cities
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ville_departement")
                    .table(Ville::Table)
                    .col(Ville::DepartementId)
                    .to_owned(),
            )
            .await?;

        // Ville: population threshold and range filters
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ville_nb_habitants")
                    .table(Ville::Table)
                    .col(Ville::NbHabitants)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_ville_departement").table(Ville::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ville_nb_habitants").table(Ville::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Ville { Table, DepartementId, NbHabitants }
