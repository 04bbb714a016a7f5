//! Readings endpoints of the flood-monitoring API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use riverdata_core::{
    parse_readings, parse_response_body, to_time_parameter, ParseError, RawReadingEvent,
    ReadingSource, RiverDataResult, Series, Timestamp,
};

use crate::error::ClientError;

/// Public flood-monitoring API root.
pub const DEFAULT_BASE_URL: &str = "https://environment.data.gov.uk/flood-monitoring";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`FloodMonitoringClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the readings endpoints.
///
/// Every request asks for sorted results (`_sorted`), which the API returns
/// newest first. No retries are attempted.
#[derive(Debug, Clone)]
pub struct FloodMonitoringClient {
    client: reqwest::Client,
    base_url: String,
}

impl FloodMonitoringClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client for the public API with default settings.
    pub fn with_defaults() -> Result<Self, ClientError> {
        Self::new(&ClientConfig::default())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn measure_readings_url(&self, measure_id: &str) -> String {
        format!("{}/id/measures/{}/readings", self.base_url, measure_id)
    }

    pub fn station_readings_url(&self, station_id: &str) -> String {
        format!("{}/id/stations/{}/readings", self.base_url, station_id)
    }

    /// Raw events for one measure, newest first.
    pub async fn measure_events(
        &self,
        measure_id: &str,
        since: Option<Timestamp>,
    ) -> Result<Vec<RawReadingEvent>, ClientError> {
        let url = self.measure_readings_url(measure_id);
        let query = readings_query(since, None)?;
        self.get_events(&url, &query).await
    }

    /// Readings for every measure at a station, optionally limited to one
    /// parameter such as `flow` or `level`. Not cached.
    pub async fn station_readings(
        &self,
        station_id: &str,
        since: Option<Timestamp>,
        parameter: Option<&str>,
    ) -> Result<BTreeMap<String, Series>, ClientError> {
        let url = self.station_readings_url(station_id);
        let query = readings_query(since, parameter)?;
        let events = self.get_events(&url, &query).await?;
        Ok(parse_readings(&events))
    }

    async fn get_events(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<RawReadingEvent>, ClientError> {
        tracing::debug!(url, ?query, "Requesting readings");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;
        decode_events(&body, url)
    }
}

#[async_trait]
impl ReadingSource for FloodMonitoringClient {
    async fn fetch_measure_readings(
        &self,
        measure_id: &str,
        since: Option<Timestamp>,
    ) -> RiverDataResult<Vec<RawReadingEvent>> {
        Ok(self.measure_events(measure_id, since).await?)
    }
}

/// Query parameters for a readings request.
pub fn readings_query(
    since: Option<Timestamp>,
    parameter: Option<&str>,
) -> Result<Vec<(&'static str, String)>, ParseError> {
    let mut query = vec![("_sorted", String::new())];
    if let Some(since) = since {
        query.push(("since", to_time_parameter(since)?));
    }
    if let Some(parameter) = parameter {
        query.push(("parameter", parameter.to_string()));
    }
    Ok(query)
}

/// Decode a response body into its raw events.
pub fn decode_events(body: &[u8], url: &str) -> Result<Vec<RawReadingEvent>, ClientError> {
    Ok(parse_response_body(body, url)?.items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use riverdata_core::RiverDataError;
    use riverdata_test_utils::fixtures::{sample_response_body, FLOW_MEASURE, SAMPLE_TIME};

    fn client(base_url: &str) -> FloodMonitoringClient {
        FloodMonitoringClient::new(&ClientConfig {
            base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = client("https://example.test/flood-monitoring/");
        assert_eq!(client.base_url(), "https://example.test/flood-monitoring");
        assert_eq!(
            client.measure_readings_url(FLOW_MEASURE),
            "https://example.test/flood-monitoring/id/measures/3400TH-flow--i-15_min-m3_s/readings"
        );
        assert_eq!(
            client.station_readings_url("3400TH"),
            "https://example.test/flood-monitoring/id/stations/3400TH/readings"
        );
    }

    #[test]
    fn test_query_without_since_only_sorts() {
        assert_eq!(
            readings_query(None, None).unwrap(),
            vec![("_sorted", String::new())]
        );
    }

    #[test]
    fn test_query_with_since_and_parameter() {
        let query = readings_query(Some(SAMPLE_TIME), Some("flow")).unwrap();
        assert_eq!(
            query,
            vec![
                ("_sorted", String::new()),
                ("since", "2023-05-13T09:00:00Z".to_string()),
                ("parameter", "flow".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_rejects_out_of_range_since() {
        assert!(readings_query(Some(i64::MAX), None).is_err());
    }

    #[test]
    fn test_query_string_encoding() {
        let client = client(DEFAULT_BASE_URL);
        let request = client
            .client
            .get(client.measure_readings_url(FLOW_MEASURE))
            .query(&readings_query(Some(SAMPLE_TIME), None).unwrap())
            .build()
            .unwrap();
        assert_eq!(
            request.url().query(),
            Some("_sorted=&since=2023-05-13T09%3A00%3A00Z")
        );
    }

    #[test]
    fn test_decode_sample_body() {
        let events = decode_events(sample_response_body().as_bytes(), "test").unwrap();
        assert_eq!(events.len(), 3);

        let parsed = parse_readings(&events);
        let series = &parsed[FLOW_MEASURE];
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().timestamp, SAMPLE_TIME);
        assert_eq!(series.first().unwrap().value, 41.2);
    }

    #[test]
    fn test_decode_garbage_is_parse_error() {
        let err = decode_events(b"<html>Service Unavailable</html>", "https://example.test")
            .unwrap_err();
        let err: RiverDataError = err.into();
        assert!(matches!(err, RiverDataError::Parse(ParseError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Nothing listens on port 9 locally.
        let client = client("http://127.0.0.1:9");
        let err = client
            .fetch_measure_readings(FLOW_MEASURE, None)
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
