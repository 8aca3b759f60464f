//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data source adapters and fallback policy."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use gridmix_common::EirGridConfig;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{FetchError, SourceError};
use crate::feed::{coerce_payload, FeedRequest, GenerationFeed, RawGenerationRecord};
use crate::source::DataSource;

/// EirGrid generation report client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEirGridFeed {
    client: Client,
    config: EirGridConfig,
}

impl HttpEirGridFeed {
    /// Build the HTTP client for the configured endpoint. The client enforces
    /// the configured timeout on its own, so the feed is bounded even when
    /// called outside the adapter.
    pub fn new(config: EirGridConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|err| {
                SourceError::Configuration(format!("unable to build EirGrid http client: {err}"))
            })?;
        Ok(Self { client, config })
    }

    /// Report URL for the requested window: `{base}{path}{start}/{end}`.
    pub fn request_url(&self, request: &FeedRequest) -> String {
        format!(
            "{}{}{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.generation_path,
            iso_timestamp(&request.start),
            iso_timestamp(&request.end)
        )
    }
}

fn iso_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn transport_error(config: &EirGridConfig, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            data_source: DataSource::EirGrid,
            after: config.timeout,
        }
    } else {
        FetchError::Network {
            data_source: DataSource::EirGrid,
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl GenerationFeed for HttpEirGridFeed {
    fn data_source(&self) -> DataSource {
        DataSource::EirGrid
    }

    async fn fetch(&self, request: &FeedRequest) -> Result<Vec<RawGenerationRecord>, FetchError> {
        let url = self.request_url(request);
        debug!(%url, range = %request.range, "requesting EirGrid generation report");

        let mut builder = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(key) = self.config.api_key() {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| transport_error(&self.config, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                data_source: DataSource::EirGrid,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(&self.config, err))?;
        let payload: Value =
            serde_json::from_slice(&body).map_err(|err| FetchError::MalformedPayload {
                data_source: DataSource::EirGrid,
                reason: format!("invalid JSON: {err}"),
            })?;
        coerce_payload(DataSource::EirGrid, payload, request.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gridmix_core::RangeSelector;

    #[test]
    fn request_url_embeds_window_in_path() {
        let config = EirGridConfig {
            base_url: "https://example.invalid/library/".into(),
            generation_path: "/Generation%20-%20".into(),
            ..EirGridConfig::default()
        };
        let feed = HttpEirGridFeed::new(config).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        let url = feed.request_url(&FeedRequest::for_range(RangeSelector::Day, now));
        assert_eq!(
            url,
            "https://example.invalid/library/Generation%20-%202024-02-02T04:05:06.000Z/2024-02-03T04:05:06.000Z"
        );
    }

    #[test]
    fn default_configuration_targets_eirgrid_library() {
        let feed = HttpEirGridFeed::new(EirGridConfig::default()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap();
        let url = feed.request_url(&FeedRequest::for_range(RangeSelector::Day, now));
        assert!(url.starts_with(
            "https://www.eirgridgroup.com/site-files/library/EirGrid/All-Island%20Generation%20Output%20Report%20-%20"
        ));
        assert_eq!(feed.data_source(), DataSource::EirGrid);
    }
}
