//! Service layer for the département / ville registry.
//! - Repository traits per aggregate with SeaORM implementations.
//! - Domain services enforcing validation, not-found and masking rules.
//! - Population views and CSV export over fetched data.

pub mod errors;
pub mod domain;
pub mod population;
pub mod export;
pub mod locks;
pub mod departement;
pub mod ville;
pub mod memory;
#[cfg(test)]
pub mod test_support;

pub use departement::DepartementService;
pub use ville::VilleService;
