use std::time::Duration;

use httpmock::Method::GET;
use httpmock::MockServer;
use owui_mcp::client::{ClientError, OpenWebUi};
use owui_mcp::discover;
use owui_mcp::options::{ClientOptions, TransportOptions, DEFAULT_API_URL};
use serde_json::json;

#[test]
fn test_client_options_carry_transport() {
    let options = ClientOptions::new("https://chat.example.com/api").with_transport(
        TransportOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_header("X-Tenant", "red")
            .with_header("X-Tenant", "blue"),
    );

    let TransportOptions::Http {
        timeout,
        proxy,
        headers,
    } = options.transport;
    assert_eq!(timeout, Some(Duration::from_secs(5)));
    assert_eq!(proxy, None);
    let headers = headers.unwrap();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers.get("X-Tenant").map(String::as_str), Some("blue"));
}

#[test]
fn test_invalid_proxy_is_a_configuration_error() {
    let options = ClientOptions::default().with_transport(TransportOptions::new().with_proxy("::not a url"));

    match OpenWebUi::new(options) {
        Err(err @ ClientError::Config(_)) => assert_eq!(err.kind(), "ConfigurationError"),
        Err(err) => panic!("expected a configuration error, got {:?}", err),
        Ok(_) => panic!("expected a configuration error"),
    }
}

#[test]
fn test_client_options_default() {
    let options = ClientOptions::default();

    assert_eq!(options.api_url, DEFAULT_API_URL);
    assert_eq!(options.api_key, None);
}

#[test]
fn test_client_options_custom() {
    let options = ClientOptions::new("https://chat.example.com/api").with_api_key("sk-123");

    assert_eq!(options.api_url, "https://chat.example.com/api");
    assert_eq!(options.api_key, Some("sk-123".to_string()));
}

#[tokio::test]
async fn test_extra_headers_are_sent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/memories/")
                .header("x-tenant", "blue");
            then.status(200).json_body(json!([]));
        })
        .await;

    let options = ClientOptions::new(server.url("/api")).with_transport(
        TransportOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_header("X-Tenant", "blue"),
    );
    let client = OpenWebUi::new(options).unwrap();
    let (_, registry) = discover(&client);

    let payload = registry.invoke("memories__get_memories", None).await;

    mock.assert_async().await;
    assert_eq!(payload, "[]");
}

#[tokio::test]
async fn test_requests_without_key_are_unauthenticated() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/files/").header_missing("authorization");
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = OpenWebUi::new(ClientOptions::new(server.url("/api"))).unwrap();
    let (_, registry) = discover(&client);

    let payload = registry.invoke("files__get_files", None).await;

    mock.assert_async().await;
    assert_eq!(payload, "[]");
}
