//! HTTP-level tests of the client against a local mock server, covering the
//! full path from query assembly through transport to translation.

use std::time::Duration;

use timezonedb_core::{
    CancellationToken, CityRequest, CoordinateRequest, Error, TimeZoneDbClient, Tz,
};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BERLIN_BODY: &str = r#"{
    "status": "OK",
    "message": "",
    "countryCode": "DE",
    "countryName": "Germany",
    "regionName": "Land Berlin",
    "cityName": "Berlin",
    "zoneName": "Europe/Berlin",
    "abbreviation": "CET",
    "gmtOffset": "3600",
    "dst": "0",
    "zoneStart": "1700000000",
    "zoneEnd": "1710000000",
    "timestamp": "1700003600",
    "formatted": "2023-11-14 23:13:20"
}"#;

fn client_for(server: &MockServer) -> TimeZoneDbClient {
    TimeZoneDbClient::new("KEY")
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn coordinate_lookup_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get-time-zone"))
        .and(query_param("key", "KEY"))
        .and(query_param("format", "json"))
        .and(query_param("by", "position"))
        .and(query_param("lat", "52.52"))
        .and(query_param("lng", "13.405"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BERLIN_BODY, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let request = CoordinateRequest::new(52.52, 13.405).unwrap();
    let response = client_for(&server)
        .get_time_zone_by_coordinate(&request)
        .await
        .unwrap();

    assert!(response.is_successful());
    let result = response.result.unwrap();
    assert_eq!(result.time_zone, Tz::Europe__Berlin);
    assert_eq!(result.gmt_offset.num_seconds(), 3600);
    assert_eq!(result.dst, Some(false));
    assert_eq!(result.country_code.as_deref(), Some("DE"));
}

#[tokio::test]
async fn city_lookup_percent_encodes_and_omits_blank_region() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get-time-zone"))
        .and(query_param("by", "city"))
        .and(query_param("city", "São Paulo"))
        .and(query_param("country", "BR"))
        .and(query_param_is_missing("region"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"status":"OK","zoneName":"America/Sao_Paulo","gmtOffset":"-10800","dst":"0"}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    // Region set to blank must be left out of the query entirely.
    let request = CityRequest::new("São Paulo", "BR").unwrap().with_region("");
    let response = client_for(&server)
        .get_time_zone_by_city(&request)
        .await
        .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result.time_zone, Tz::America__Sao_Paulo);
    assert_eq!(result.gmt_offset.num_seconds(), -10800);
}

#[tokio::test]
async fn city_lookup_sends_region_when_present() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get-time-zone"))
        .and(query_param("by", "city"))
        .and(query_param("region", "California"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"status":"OK","zoneName":"America/Los_Angeles","gmtOffset":"-28800","dst":"0"}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = CityRequest::new("Los Angeles", "US")
        .unwrap()
        .with_region("California");
    let response = client_for(&server)
        .get_time_zone_by_city(&request)
        .await
        .unwrap();

    assert!(response.is_successful());
}

#[tokio::test]
async fn non_success_status_surfaces_as_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let request = CityRequest::new("Berlin", "DE").unwrap();
    let err = client_for(&server)
        .get_time_zone_by_city(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn unparseable_body_surfaces_as_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let request = CityRequest::new("Berlin", "DE").unwrap();
    let err = client_for(&server)
        .get_time_zone_by_city(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn cancellation_aborts_an_in_flight_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(BERLIN_BODY, "application/json")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        trigger.cancel();
    });

    let request = CoordinateRequest::new(52.52, 13.405).unwrap();
    let err = client_for(&server)
        .get_time_zone_by_coordinate_with_cancel(&request, &token)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled), "got {err:?}");
}
