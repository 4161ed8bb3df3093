//! Business view of the two entities.
//!
//! A [`Departement`] owns its [`Ville`] collection; a city only keeps the id of
//! its department, never the department itself, so serialization cannot cycle.
//! Persisted values carry concrete ids, drafts carry optional ids and are what
//! repositories accept for inserts and full replaces.

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departement {
    pub id: i32,
    pub nom: String,
    pub code: String,
    pub villes: Vec<Ville>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ville {
    pub id: i32,
    pub nom: String,
    pub nb_habitants: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departement_id: Option<i32>,
}

impl From<models::ville::Model> for Ville {
    fn from(m: models::ville::Model) -> Self {
        Self { id: m.id, nom: m.nom, nb_habitants: m.nb_habitants, departement_id: m.departement_id }
    }
}

impl Departement {
    pub fn from_parts(m: models::departement::Model, villes: Vec<Ville>) -> Self {
        Self { id: m.id, nom: m.nom, code: m.code, villes }
    }

    /// Linear scan of the owned collection.
    pub fn ville(&self, ville_id: i32) -> Option<&Ville> {
        self.villes.iter().find(|v| v.id == ville_id)
    }

    pub fn into_draft(self) -> DepartementDraft {
        DepartementDraft {
            id: Some(self.id),
            nom: self.nom,
            code: self.code,
            villes: self.villes.into_iter().map(Ville::into_draft).collect(),
        }
    }
}

impl Ville {
    pub fn into_draft(self) -> VilleDraft {
        VilleDraft {
            id: Some(self.id),
            nom: self.nom,
            nb_habitants: self.nb_habitants,
            departement_id: self.departement_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartementDraft {
    pub id: Option<i32>,
    pub nom: String,
    pub code: String,
    pub villes: Vec<VilleDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VilleDraft {
    pub id: Option<i32>,
    pub nom: String,
    pub nb_habitants: i32,
    pub departement_id: Option<i32>,
}

impl DepartementDraft {
    pub fn new(nom: impl Into<String>, code: impl Into<String>) -> Self {
        Self { id: None, nom: nom.into(), code: code.into(), villes: Vec::new() }
    }

    /// Appends a city and points its back-reference at this department.
    pub fn add_ville(&mut self, mut ville: VilleDraft) {
        ville.departement_id = self.id;
        self.villes.push(ville);
    }

    /// Detaches the city with `ville_id`; returns whether anything was removed.
    pub fn remove_ville(&mut self, ville_id: i32) -> bool {
        let before = self.villes.len();
        self.villes.retain(|v| v.id != Some(ville_id));
        self.villes.len() != before
    }

    pub fn ville_mut(&mut self, ville_id: i32) -> Option<&mut VilleDraft> {
        self.villes.iter_mut().find(|v| v.id == Some(ville_id))
    }
}

impl VilleDraft {
    pub fn new(nom: impl Into<String>, nb_habitants: i32) -> Self {
        Self { id: None, nom: nom.into(), nb_habitants, departement_id: None }
    }
}

/// Request body for creating or replacing a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartementInput {
    #[serde(default)]
    pub id: Option<i32>,
    pub nom: String,
    pub code: String,
}

impl DepartementInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        models::departement::validate(&self.nom, &self.code)?;
        Ok(())
    }
}

/// Request body for creating or updating a city.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VilleInput {
    pub nom: String,
    pub nb_habitants: i32,
    #[serde(default)]
    pub departement_id: Option<i32>,
}

impl VilleInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        models::ville::validate(&self.nom, self.nb_habitants)?;
        Ok(())
    }

    pub fn into_draft(self) -> VilleDraft {
        VilleDraft { id: None, nom: self.nom, nb_habitants: self.nb_habitants, departement_id: self.departement_id }
    }
}
