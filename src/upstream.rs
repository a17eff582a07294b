//! The upstream REST client.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::FetchError;

/// Issues the single upstream GET per resolution.
///
/// No retries and no timeout beyond transport defaults: callers must not
/// assume bounded latency.
#[derive(Clone, Debug)]
pub(crate) struct UpstreamClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    /// Construct a new upstream fetcher that will fetch from the supplied
    /// base URL, with the entity id appended as the final path segment.
    pub(crate) fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .tcp_keepalive(Some(Duration::from_secs(5)))
            .build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Fetch the raw upstream representation of one entity.
    pub(crate) async fn fetch(&self, id: i32) -> Result<Bytes, FetchError> {
        let url = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), id);
        tracing::debug!(%url, "fetching upstream entity");

        let response = self
            .http_client
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|err| FetchError::UpstreamHttpError {
                status_code: None,
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamHttpError {
                status_code: Some(status.as_u16()),
                reason: format!("upstream responded with {status}"),
            });
        }

        response
            .bytes()
            .await
            .map_err(|err| FetchError::UpstreamHttpError {
                status_code: Some(status.as_u16()),
                reason: err.to_string(),
            })
    }
}
