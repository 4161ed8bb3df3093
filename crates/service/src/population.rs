//! In-memory ordering and filtering of an already fetched city list.
//! Nothing here touches storage.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::{domain::Ville, errors::ServiceError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Inclusive population bounds with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationRange {
    min: i32,
    max: i32,
}

impl PopulationRange {
    pub fn new(min: i32, max: i32) -> Result<Self, ServiceError> {
        if min > max {
            return Err(ServiceError::Validation(format!(
                "Le minimum ({min}) doit être inférieur ou égal au maximum ({max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 { self.min }

    pub fn max(&self) -> i32 { self.max }

    pub fn contains(&self, nb_habitants: i32) -> bool {
        (self.min..=self.max).contains(&nb_habitants)
    }
}

/// Stable sort: cities with equal population keep their relative order.
pub fn sort_by_population(mut villes: Vec<Ville>, order: SortOrder) -> Vec<Ville> {
    match order {
        SortOrder::Asc => villes.sort_by_key(|v| v.nb_habitants),
        SortOrder::Desc => villes.sort_by_key(|v| Reverse(v.nb_habitants)),
    }
    villes
}

pub fn filter_by_population(villes: Vec<Ville>, range: PopulationRange) -> Vec<Ville> {
    villes.into_iter().filter(|v| range.contains(v.nb_habitants)).collect()
}

/// The `limit` most populous cities, largest first.
pub fn most_populous(villes: Vec<Ville>, limit: usize) -> Vec<Ville> {
    let mut sorted = sort_by_population(villes, SortOrder::Desc);
    sorted.truncate(limit);
    sorted
}
