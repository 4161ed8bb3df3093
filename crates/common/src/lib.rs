//! Shared plumbing used by every crate of the workspace: logging setup and
//! small wire types that do not belong to the domain.

pub mod types;
pub mod utils;
