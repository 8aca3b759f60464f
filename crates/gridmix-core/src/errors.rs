//! ---
//! ems_section: "02-generation-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Generation-mix derivation pipeline and shared series types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown range selector '{0}' (expected 24h, 48h or 7d)")]
    UnknownRange(String),
    #[error("unknown generation source '{0}'")]
    UnknownSource(String),
}
