//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Data source adapters and fallback policy."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gridmix_common::SourcesConfig;
use gridmix_core::{Clock, RangeSelector, SeriesBundle, SeriesOrigin, SystemClock};
use tracing::{error, info, instrument, warn};

use crate::eirgrid::HttpEirGridFeed;
use crate::entsoe::EntsoeFeed;
use crate::error::{FetchError, Result, SourceError};
use crate::feed::{FeedRequest, GenerationFeed, RawGenerationRecord};
use crate::sequence::{RequestTicket, TrackedSeries};
use crate::source::DataSource;

const LOG_TARGET: &str = "gridmix::sources::adapter";

/// Outcome of one generation request, including why live data was not used.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Source that was requested.
    pub source: DataSource,
    /// Range that was requested.
    pub range: RangeSelector,
    /// Intensity and generation series.
    pub series: SeriesBundle,
    /// Live fetch failure that triggered the synthetic fallback, if any.
    pub fallback_cause: Option<FetchError>,
}

/// Uniform entry point producing series for any [`DataSource`].
///
/// Holds no mutable state: concurrent requests each derive their own axis and
/// series.
#[derive(Clone)]
pub struct SourceAdapter {
    config: SourcesConfig,
    clock: Arc<dyn Clock>,
    eirgrid_feed: Option<Arc<dyn GenerationFeed>>,
}

impl fmt::Debug for SourceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceAdapter")
            .field("clock", &self.clock)
            .field("eirgrid_enabled", &self.config.eirgrid.enabled)
            .field("entsoe_enabled", &self.config.entsoe.enabled)
            .field("eirgrid_feed", &self.eirgrid_feed.is_some())
            .finish()
    }
}

impl SourceAdapter {
    /// Build an adapter from explicit source configuration, using the system
    /// clock and the HTTP EirGrid feed when that source is enabled.
    pub fn new(config: SourcesConfig) -> Result<Self> {
        let eirgrid_feed: Option<Arc<dyn GenerationFeed>> = if config.eirgrid.enabled {
            Some(Arc::new(HttpEirGridFeed::new(config.eirgrid.clone())?))
        } else {
            None
        };
        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
            eirgrid_feed,
        })
    }

    /// Replace the clock providing the reference "now".
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the live EirGrid feed.
    pub fn with_eirgrid_feed(mut self, feed: Arc<dyn GenerationFeed>) -> Self {
        self.eirgrid_feed = Some(feed);
        self
    }

    /// Configuration the adapter was built with.
    pub fn config(&self) -> &SourcesConfig {
        &self.config
    }

    /// Request timeout and refresh interval for a live source; `None` for mock.
    pub fn timing(&self, source: DataSource) -> Option<(Duration, Duration)> {
        let config = self.config();
        match source {
            DataSource::Mock => None,
            DataSource::EirGrid => Some((config.eirgrid.timeout, config.eirgrid.refresh_interval)),
            DataSource::Entsoe => Some((config.entsoe.timeout, config.entsoe.refresh_interval)),
        }
    }

    /// Whether `source` can be requested without a configuration error.
    pub fn is_enabled(&self, source: DataSource) -> bool {
        match source {
            DataSource::Mock => true,
            DataSource::EirGrid => self.config.eirgrid.enabled,
            DataSource::Entsoe => {
                self.config.entsoe.enabled && self.config.entsoe.api_key().is_some()
            }
        }
    }

    /// Produce both series for `range` from `source`.
    pub async fn generate(&self, source: DataSource, range: RangeSelector) -> Result<SeriesBundle> {
        self.generate_report(source, range)
            .await
            .map(|report| report.series)
    }

    /// Run a request issued through a [`crate::RequestSequencer`].
    pub async fn generate_tracked(&self, ticket: RequestTicket) -> TrackedSeries {
        let result = self.generate(ticket.source, ticket.range).await;
        TrackedSeries { ticket, result }
    }

    /// Produce both series together with the fallback cause, if any.
    #[instrument(skip_all, fields(source = %source, range = %range))]
    pub async fn generate_report(
        &self,
        source: DataSource,
        range: RangeSelector,
    ) -> Result<GenerationReport> {
        let now = self.clock.now();
        let outcome = match source {
            DataSource::Mock => Ok((SeriesBundle::synthetic(range, now), None)),
            DataSource::EirGrid => self.generate_eirgrid(range, now).await,
            DataSource::Entsoe => self.generate_entsoe(range, now),
        };

        match outcome {
            Ok((series, fallback_cause)) => {
                info!(
                    target: LOG_TARGET,
                    source = %source,
                    range = %range,
                    points = series.len(),
                    origin = series.origin.as_str(),
                    "generation series ready"
                );
                Ok(GenerationReport {
                    source,
                    range,
                    series,
                    fallback_cause,
                })
            }
            Err(err) => {
                error!(
                    target: LOG_TARGET,
                    source = %source,
                    range = %range,
                    fatal = err.is_fatal(),
                    error = %err,
                    "generation request failed"
                );
                Err(err)
            }
        }
    }

    async fn generate_eirgrid(
        &self,
        range: RangeSelector,
        now: DateTime<Utc>,
    ) -> Result<(SeriesBundle, Option<FetchError>)> {
        let settings = &self.config.eirgrid;
        if !settings.enabled {
            return Err(SourceError::Configuration(
                "EirGrid integration is disabled".to_owned(),
            ));
        }
        let feed = self.eirgrid_feed.as_ref().ok_or_else(|| {
            SourceError::Configuration("EirGrid feed is not configured".to_owned())
        })?;

        let request = FeedRequest::for_range(range, now);
        match fetch_with_timeout(feed.as_ref(), &request, settings.timeout).await {
            Ok(records) => Ok((live_series(records), None)),
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    source = %err.data_source(),
                    range = %range,
                    kind = err.kind(),
                    timed_out = err.is_timeout(),
                    error = %err,
                    "live fetch failed, falling back to synthetic series"
                );
                let series = SeriesBundle::synthetic(range, now).with_origin(SeriesOrigin::Fallback);
                Ok((series, Some(err)))
            }
        }
    }

    fn generate_entsoe(
        &self,
        range: RangeSelector,
        now: DateTime<Utc>,
    ) -> Result<(SeriesBundle, Option<FetchError>)> {
        let feed = EntsoeFeed::new(&self.config.entsoe)?;
        let records = feed.fetch(&FeedRequest::for_range(range, now))?;
        Ok((live_series(records), None))
    }
}

fn live_series(mut records: Vec<RawGenerationRecord>) -> SeriesBundle {
    records.sort_by_key(|record| record.timestamp);
    SeriesBundle::from_raw(
        records.iter().map(|record| (record.timestamp, record.mix)),
        SeriesOrigin::Live,
    )
}

async fn fetch_with_timeout(
    feed: &dyn GenerationFeed,
    request: &FeedRequest,
    timeout: Duration,
) -> std::result::Result<Vec<RawGenerationRecord>, FetchError> {
    match tokio::time::timeout(timeout, feed.fetch(request)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            data_source: feed.data_source(),
            after: timeout,
        }),
    }
}
