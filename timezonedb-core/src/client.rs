use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{CityRequest, CoordinateRequest, GetTimeZoneResponse};
use crate::translate::Translator;
use crate::wire::GetTimeZoneDto;

const BASE_URL: &str = "http://api.timezonedb.com/v2.1";

/// The HTTP seam. The client talks to the service through this trait so
/// tests can swap in a canned transport.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Perform a GET against `url` with `query` appended, returning the
    /// response body of a successful status.
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String>;
}

/// Default transport over a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| Error::Transport(format!("failed to send request: {err}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|err| Error::Transport(format!("failed to read response body: {err}")))?;

        if !status.is_success() {
            return Err(Error::Transport(format!(
                "request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        Ok(body)
    }
}

/// Client for the TimeZoneDB `get-time-zone` endpoint.
///
/// Holds no per-call state; concurrent lookups on one instance are safe as
/// long as the transport is (true for the default [`HttpTransport`]).
#[derive(Debug, Clone)]
pub struct TimeZoneDbClient {
    api_key: String,
    base_url: String,
    translator: Translator,
    transport: Arc<dyn Transport>,
}

impl TimeZoneDbClient {
    /// Create a client with the default HTTP transport. The API key must
    /// not be blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_transport(api_key, Arc::new(HttpTransport::new()))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(
        api_key: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "API key must not be blank".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            base_url: BASE_URL.to_string(),
            translator: Translator::default(),
            transport,
        })
    }

    /// Point the client at a different endpoint, e.g. a local test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the default translation policy.
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = translator;
        self
    }

    /// Look up the time zone at a geographic coordinate.
    pub async fn get_time_zone_by_coordinate(
        &self,
        request: &CoordinateRequest,
    ) -> Result<GetTimeZoneResponse> {
        self.lookup(Self::position_query(request), None).await
    }

    /// Like [`Self::get_time_zone_by_coordinate`], aborting with
    /// [`Error::Cancelled`] when the token fires first.
    pub async fn get_time_zone_by_coordinate_with_cancel(
        &self,
        request: &CoordinateRequest,
        cancel: &CancellationToken,
    ) -> Result<GetTimeZoneResponse> {
        self.lookup(Self::position_query(request), Some(cancel)).await
    }

    /// Look up the time zone of a city.
    pub async fn get_time_zone_by_city(
        &self,
        request: &CityRequest,
    ) -> Result<GetTimeZoneResponse> {
        self.lookup(Self::city_query(request), None).await
    }

    /// Like [`Self::get_time_zone_by_city`], aborting with
    /// [`Error::Cancelled`] when the token fires first.
    pub async fn get_time_zone_by_city_with_cancel(
        &self,
        request: &CityRequest,
        cancel: &CancellationToken,
    ) -> Result<GetTimeZoneResponse> {
        self.lookup(Self::city_query(request), Some(cancel)).await
    }

    fn position_query(request: &CoordinateRequest) -> Vec<(&'static str, String)> {
        vec![
            ("by", "position".to_string()),
            ("lat", request.latitude().to_string()),
            ("lng", request.longitude().to_string()),
        ]
    }

    fn city_query(request: &CityRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("by", "city".to_string()),
            ("city", request.city().to_string()),
            ("country", request.country().to_string()),
        ];
        if let Some(region) = request.region() {
            query.push(("region", region.to_string()));
        }
        query
    }

    async fn lookup(
        &self,
        params: Vec<(&'static str, String)>,
        cancel: Option<&CancellationToken>,
    ) -> Result<GetTimeZoneResponse> {
        let url = format!("{}/get-time-zone", self.base_url);

        let mut query = vec![
            ("key", self.api_key.clone()),
            ("format", "json".to_string()),
        ];
        query.extend(params);

        debug!(%url, "issuing get-time-zone request");

        let body = match cancel {
            Some(token) => {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                tokio::select! {
                    _ = token.cancelled() => return Err(Error::Cancelled),
                    result = self.transport.get(&url, &query) => result?,
                }
            }
            None => self.transport.get(&url, &query).await?,
        };

        debug!(bytes = body.len(), "received response body");

        let dto: GetTimeZoneDto =
            serde_json::from_str(&body).map_err(|err| Error::EmptyResponse(err.to_string()))?;

        self.translator.to_model(&dto)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResponseStatus;
    use std::sync::Mutex;

    /// Transport returning a canned body and recording every request.
    #[derive(Debug)]
    struct MockTransport {
        body: String,
        seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl MockTransport {
        fn new(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
            let pairs = query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            self.seen.lock().unwrap().push((url.to_string(), pairs));
            Ok(self.body.clone())
        }
    }

    const OK_BODY: &str = r#"{
        "status": "OK",
        "countryCode": "DE",
        "zoneName": "Europe/Berlin",
        "gmtOffset": "3600",
        "dst": "0"
    }"#;

    #[test]
    fn blank_api_key_is_rejected_before_any_request() {
        for key in ["", "   ", "\t"] {
            let err = TimeZoneDbClient::new(key).unwrap_err();
            assert!(matches!(err, Error::InvalidConfiguration(_)), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn coordinate_lookup_sends_position_query() {
        let transport = MockTransport::new(OK_BODY);
        let client = TimeZoneDbClient::with_transport("KEY", transport.clone()).unwrap();

        let request = CoordinateRequest::new(52.52, 13.405).unwrap();
        let response = client.get_time_zone_by_coordinate(&request).await.unwrap();
        assert_eq!(response.status, ResponseStatus::Ok);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let (url, query) = &requests[0];
        assert_eq!(url, "http://api.timezonedb.com/v2.1/get-time-zone");
        assert_eq!(
            query,
            &vec![
                ("key".to_string(), "KEY".to_string()),
                ("format".to_string(), "json".to_string()),
                ("by".to_string(), "position".to_string()),
                ("lat".to_string(), "52.52".to_string()),
                ("lng".to_string(), "13.405".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn city_lookup_omits_absent_region() {
        let transport = MockTransport::new(OK_BODY);
        let client = TimeZoneDbClient::with_transport("KEY", transport.clone()).unwrap();

        let request = CityRequest::new("Berlin", "DE").unwrap();
        client.get_time_zone_by_city(&request).await.unwrap();

        let (_, query) = &transport.requests()[0];
        assert!(query.iter().any(|(k, v)| k == "by" && v == "city"));
        assert!(query.iter().any(|(k, v)| k == "city" && v == "Berlin"));
        assert!(query.iter().any(|(k, v)| k == "country" && v == "DE"));
        assert!(!query.iter().any(|(k, _)| k == "region"));
    }

    #[tokio::test]
    async fn city_lookup_includes_region_when_present() {
        let transport = MockTransport::new(OK_BODY);
        let client = TimeZoneDbClient::with_transport("KEY", transport.clone()).unwrap();

        let request = CityRequest::new("Berlin", "DE")
            .unwrap()
            .with_region("Brandenburg");
        client.get_time_zone_by_city(&request).await.unwrap();

        let (_, query) = &transport.requests()[0];
        assert!(query.iter().any(|(k, v)| k == "region" && v == "Brandenburg"));
    }

    #[tokio::test]
    async fn unparseable_body_surfaces_as_empty_response() {
        let transport = MockTransport::new("<html>oops</html>");
        let client = TimeZoneDbClient::with_transport("KEY", transport).unwrap();

        let request = CityRequest::new("Berlin", "DE").unwrap();
        let err = client.get_time_zone_by_city(&request).await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn failed_payload_translates_to_failed_response() {
        let transport =
            MockTransport::new(r#"{"status":"FAILED","message":"x","errorMessage":"Invalid API key"}"#);
        let client = TimeZoneDbClient::with_transport("KEY", transport).unwrap();

        let request = CityRequest::new("Berlin", "DE").unwrap();
        let response = client.get_time_zone_by_city(&request).await.unwrap();
        assert!(!response.is_successful());
        assert_eq!(response.error_message.as_deref(), Some("Invalid API key"));
        assert_eq!(response.result, None);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_the_transport_is_used() {
        let transport = MockTransport::new(OK_BODY);
        let client = TimeZoneDbClient::with_transport("KEY", transport.clone()).unwrap();

        let token = CancellationToken::new();
        token.cancel();

        let request = CoordinateRequest::new(0.0, 0.0).unwrap();
        let err = client
            .get_time_zone_by_coordinate_with_cancel(&request, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn truncate_body_keeps_short_bodies_and_caps_long_ones() {
        assert_eq!(truncate_body("short"), "short");

        let long = "x".repeat(300);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }
}
