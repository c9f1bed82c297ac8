//! Upstream schedule event sources.

use std::future::Future;
use std::time::Duration;

use almanac_core::config::FeedConfig;
use almanac_engine::model::decode_event_array;
use almanac_engine::{ScheduleEvent, ViewWindow};
use reqwest::Url;

use crate::error::{ServiceError, ServiceResult};

/// Anything that can deliver the schedule events relevant to a window.
pub trait EventSource: Send + Sync + 'static {
    /// ## Summary
    /// Fetches the events that may produce occurrences inside `window`.
    ///
    /// ## Errors
    /// Returns a `ServiceError` when the events cannot be obtained.
    fn fetch(
        &self,
        window: ViewWindow,
    ) -> impl Future<Output = ServiceResult<Vec<ScheduleEvent>>> + Send;
}

/// JSON feed queried with `?from=<ms>&to=<ms>`.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    url: Url,
}

impl HttpFeed {
    /// ## Summary
    /// Creates a feed client for `url` with a per-request timeout.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidFeedUrl` for unparsable URLs and
    /// `ServiceError::Transport` if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> ServiceResult<Self> {
        let url = Url::parse(url).map_err(|err| ServiceError::InvalidFeedUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// ## Summary
    /// Builds the configured feed, if any.
    ///
    /// ## Errors
    /// Returns an error if the configured URL is invalid.
    pub fn from_settings(settings: &FeedConfig) -> ServiceResult<Option<Self>> {
        settings
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| Self::new(url, Duration::from_secs(settings.timeout_secs)))
            .transpose()
    }

    /// Request URL for a window, keeping any query the base URL already has.
    #[must_use]
    pub fn request_url(&self, window: ViewWindow) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("from", &window.start_ms().to_string())
            .append_pair("to", &window.end_ms().to_string());
        url
    }
}

impl EventSource for HttpFeed {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self, window: ViewWindow) -> ServiceResult<Vec<ScheduleEvent>> {
        tracing::debug!("Requesting schedule events");

        let response = self.client.get(self.request_url(window)).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Event feed returned an error status");
            return Err(ServiceError::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let events = decode_event_array(&body)?;
        tracing::debug!(count = events.len(), "Received schedule events");
        Ok(events)
    }
}
