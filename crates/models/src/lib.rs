pub mod errors;
pub mod db;
pub mod departement;
pub mod ville;
