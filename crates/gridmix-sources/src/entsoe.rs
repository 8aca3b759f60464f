//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data source adapters and fallback policy."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use chrono::SecondsFormat;
use gridmix_common::EntsoeConfig;
use tracing::debug;
use url::Url;

use crate::error::SourceError;
use crate::feed::{FeedRequest, RawGenerationRecord};

/// ENTSO-E transparency platform source.
///
/// Configuration is validated and the request is fully described, but the
/// platform's generation document is not parsed yet, so every fetch reports
/// [`SourceError::NotImplemented`].
#[derive(Debug, Clone)]
pub struct EntsoeFeed {
    config: EntsoeConfig,
    token: String,
}

impl EntsoeFeed {
    /// Validate that the source is enabled and carries a security token.
    pub fn new(config: &EntsoeConfig) -> Result<Self, SourceError> {
        if !config.enabled {
            return Err(SourceError::Configuration(
                "ENTSO-E integration is disabled".to_owned(),
            ));
        }
        let Some(token) = config.api_key() else {
            return Err(SourceError::Configuration(
                "ENTSO-E API key required".to_owned(),
            ));
        };
        Ok(Self {
            token: token.to_owned(),
            config: config.clone(),
        })
    }

    /// Query URL for the generation document covering `request`.
    pub fn request_url(&self, request: &FeedRequest) -> Result<Url, SourceError> {
        let start = request.start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let end = request.end.to_rfc3339_opts(SecondsFormat::Millis, true);
        Url::parse_with_params(
            &self.config.base_url,
            &[
                ("securityToken", self.token.as_str()),
                ("documentType", self.config.document_type.as_str()),
                ("in_Domain", self.config.domain.as_str()),
                ("out_Domain", self.config.domain.as_str()),
                ("periodStart", start.as_str()),
                ("periodEnd", end.as_str()),
                ("format", "json"),
            ],
        )
        .map_err(|err| {
            SourceError::Configuration(format!(
                "invalid ENTSO-E base url '{}': {err}",
                self.config.base_url
            ))
        })
    }

    /// Attempt to fetch generation records.
    pub fn fetch(&self, request: &FeedRequest) -> Result<Vec<RawGenerationRecord>, SourceError> {
        let url = self.request_url(request)?;
        debug!(
            host = url.host_str().unwrap_or_default(),
            domain = %self.config.domain,
            document_type = %self.config.document_type,
            range = %request.range,
            timeout_ms = self.config.timeout.as_millis() as u64,
            refresh_interval_secs = self.config.refresh_interval.as_secs(),
            "ENTSO-E request prepared"
        );
        Err(SourceError::NotImplemented(
            "ENTSO-E generation data processing".to_owned(),
        ))
    }
}
