//! Department aggregate: repository contract, SeaORM storage and the
//! service enforcing the parent/child rules.

pub mod repository;
pub mod repo;
pub mod service;

pub use service::DepartementService;
