//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the core runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the gridmix workspace: configuration loading and
//! tracing initialisation consumed by the source adapters and the CLI.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, EirGridConfig, EntsoeConfig, LoadedAppConfig, LoggingConfig, SourcesConfig,
};
pub use logging::{init_tracing, LogFormat};
