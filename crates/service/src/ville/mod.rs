//! Department-independent access to cities.

pub mod repository;
pub mod repo;
pub mod service;

pub use service::VilleService;
