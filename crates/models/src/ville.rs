use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{departement, errors::ModelError};

pub const NOM_MIN: usize = 3;
pub const NOM_MAX: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ville")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nom: String,
    pub nb_habitants: i32,
    pub departement_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Departement }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Departement => Entity::belongs_to(departement::Entity)
                .from(Column::DepartementId)
                .to(departement::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<departement::Entity> for Entity {
    fn to() -> RelationDef { Relation::Departement.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_nom(nom: &str) -> Result<(), ModelError> {
    if nom.trim().is_empty() {
        return Err(ModelError::Validation("Le nom de la ville ne peut pas être vide".into()));
    }
    let len = nom.chars().count();
    if !(NOM_MIN..=NOM_MAX).contains(&len) {
        return Err(ModelError::Validation(format!(
            "Le nom de la ville doit contenir entre {NOM_MIN} et {NOM_MAX} caractères"
        )));
    }
    Ok(())
}

pub fn validate_nb_habitants(nb_habitants: i32) -> Result<(), ModelError> {
    if nb_habitants < 0 {
        return Err(ModelError::Validation(
            "Le nombre d'habitants de la ville doit être positif ou nul".into(),
        ));
    }
    Ok(())
}

/// Validates every field, reporting the first violation.
pub fn validate(nom: &str, nb_habitants: i32) -> Result<(), ModelError> {
    validate_nom(nom)?;
    validate_nb_habitants(nb_habitants)
}
