use httpmock::prelude::*;
use macro_viz::api::{Client, Fetch};
use macro_viz::{FetchError, SeriesKey};

fn key(iso3: &str) -> SeriesKey {
    SeriesKey {
        iso3: iso3.into(),
        indicator: "SP.POP.TOTL".into(),
        start: 2000,
        end: 2002,
    }
}

fn client_for(server: &MockServer) -> Client {
    Client::with_base_url(server.url("/v2")).unwrap()
}

#[test]
fn json_payload_is_normalized() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/country/DEU/indicator/SP.POP.TOTL")
            .query_param("format", "json")
            .query_param("per_page", "2000")
            .query_param("date", "2000:2002");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"[{"page":1,"pages":1,"per_page":"2000","total":2},
                   [{"date":"2001","value":2.0,"country":{"id":"DE","value":"Germany"},"indicator":{"id":"SP.POP.TOTL"}},
                    {"date":"2000","value":1.0,"country":{"id":"DE","value":"Germany"},"indicator":{"id":"SP.POP.TOTL"}}]]"#,
            );
    });

    let rows = client_for(&server).fetch_series(&key("DEU")).unwrap();
    mock.assert();
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2000, 2001]);
    assert_eq!(rows[0].country, "Germany");
}

#[test]
fn html_body_on_200_is_a_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v2/country/BRA/indicator/SP.POP.TOTL");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><body>Service temporarily down</body></html>");
    });

    let err = client_for(&server).fetch_series(&key("BRA")).unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
    assert!(err.to_string().starts_with("decode json:"));
}

#[test]
fn non_success_status_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v2/country/USA/indicator/SP.POP.TOTL");
        then.status(503).body("unavailable");
    });

    let err = client_for(&server).fetch_series(&key("USA")).unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503 }), "got {err:?}");
    assert_eq!(err.to_string(), "request failed with HTTP 503");
}
