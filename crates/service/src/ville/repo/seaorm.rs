use sea_orm::sea_query::LikeExpr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set};

use models::ville;

use crate::domain::{Ville, VilleDraft};
use crate::errors::ServiceError;
use crate::ville::repository::VilleRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmVilleRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmVilleRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn list(&self, query: Select<ville::Entity>) -> Result<Vec<Ville>, ServiceError> {
        let rows = query
            .order_by_asc(ville::Column::Id)
            .all(&self.db)
            .await
            .map_err(ServiceError::db)?;
        Ok(rows.into_iter().map(Ville::from).collect())
    }
}

#[async_trait::async_trait]
impl VilleRepository for SeaOrmVilleRepository {
    async fn find_all(&self) -> Result<Vec<Ville>, ServiceError> {
        self.list(ville::Entity::find()).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ville>, ServiceError> {
        let found = ville::Entity::find_by_id(id).one(&self.db).await.map_err(ServiceError::db)?;
        Ok(found.map(Ville::from))
    }

    async fn save(&self, draft: VilleDraft) -> Result<Ville, ServiceError> {
        let am = ville::ActiveModel {
            nom: Set(draft.nom),
            nb_habitants: Set(draft.nb_habitants),
            departement_id: Set(draft.departement_id),
            ..Default::default()
        };
        let saved = match draft.id {
            None => am.insert(&self.db).await,
            Some(id) => ville::ActiveModel { id: Set(id), ..am }.update(&self.db).await,
        };
        saved.map(Ville::from).map_err(ServiceError::db)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        ville::Entity::delete_by_id(id).exec(&self.db).await.map_err(ServiceError::db)?;
        Ok(())
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    async fn find_by_nom_like(&self, pattern: &str) -> Result<Vec<Ville>, ServiceError> {
        let like = LikeExpr::new(pattern).escape('\\');
        self.list(ville::Entity::find().filter(ville::Column::Nom.like(like))).await
    }

    async fn find_by_nb_habitants_greater_than(&self, threshold: i32) -> Result<Vec<Ville>, ServiceError> {
        self.list(ville::Entity::find().filter(ville::Column::NbHabitants.gt(threshold))).await
    }

    async fn find_by_nb_habitants_between(&self, min: i32, max: i32) -> Result<Vec<Ville>, ServiceError> {
        self.list(ville::Entity::find().filter(ville::Column::NbHabitants.between(min, max))).await
    }
}
