//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data source adapters and fallback policy."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Source adapter boundary for gridmix.
//!
//! [`SourceAdapter`] turns a [`DataSource`] and a range into a
//! [`gridmix_core::SeriesBundle`]. Configuration problems and unimplemented
//! sources are surfaced as errors; transient live-fetch failures fall back to
//! the synthetic series.

pub mod adapter;
pub mod eirgrid;
pub mod entsoe;
pub mod error;
pub mod feed;
pub mod sequence;
pub mod source;

pub use adapter::{GenerationReport, SourceAdapter};
pub use eirgrid::HttpEirGridFeed;
pub use entsoe::EntsoeFeed;
pub use error::{FetchError, Result, SourceError};
pub use feed::{coerce_payload, FeedRequest, GenerationFeed, RawGenerationRecord};
pub use sequence::{RequestSequencer, RequestTicket, TrackedSeries};
pub use source::DataSource;
