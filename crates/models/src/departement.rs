use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, ville};

pub const NOM_MIN: usize = 3;
pub const NOM_MAX: usize = 50;
pub const CODE_MIN: usize = 2;
pub const CODE_MAX: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departement")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nom: String,
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Villes }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Villes => Entity::has_many(ville::Entity).into(),
        }
    }
}

impl Related<ville::Entity> for Entity {
    fn to() -> RelationDef { Relation::Villes.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_nom(nom: &str) -> Result<(), ModelError> {
    if nom.trim().is_empty() {
        return Err(ModelError::Validation("Le nom du département ne peut pas être vide".into()));
    }
    let len = nom.chars().count();
    if !(NOM_MIN..=NOM_MAX).contains(&len) {
        return Err(ModelError::Validation(format!(
            "Le nom du département doit contenir entre {NOM_MIN} et {NOM_MAX} caractères"
        )));
    }
    Ok(())
}

pub fn validate_code(code: &str) -> Result<(), ModelError> {
    if code.trim().is_empty() {
        return Err(ModelError::Validation("Le code du département ne peut pas être vide".into()));
    }
    let len = code.chars().count();
    if !(CODE_MIN..=CODE_MAX).contains(&len) {
        return Err(ModelError::Validation(format!(
            "Le code du département doit contenir entre {CODE_MIN} et {CODE_MAX} caractères"
        )));
    }
    Ok(())
}

/// Validates every field, reporting the first violation.
pub fn validate(nom: &str, code: &str) -> Result<(), ModelError> {
    validate_nom(nom)?;
    validate_code(code)
}
