//! Tests for the Sheets client and queue table against a mock server.

use std::time::Duration;

use serde_json::json;
use serial_test::serial;
use tsync_models::{RowStatus, RowUpdate};
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{token_source_from_env, SheetsClient, SheetsConfig};
use crate::error::SheetsError;
use crate::retry::RetryConfig;
use crate::table::{QueueTable, SheetsQueueTable};
use crate::token_cache::TokenSource;
use crate::types::ValueRange;

// =============================================================================
// Test Helpers
// =============================================================================

const SHEET: &str = "sheet123";
const READ_PATH: &str = r"^/spreadsheets/sheet123/values/.+Ingest_Queue.+$";
const WRITE_PATH: &str = "/spreadsheets/sheet123/values:batchUpdate";

fn test_config(base_url: &str) -> SheetsConfig {
    SheetsConfig {
        spreadsheet_id: SHEET.to_string(),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
    }
}

fn test_client(server: &MockServer) -> SheetsClient {
    SheetsClient::with_token_source(
        test_config(&server.uri()),
        TokenSource::Static("test-token".to_string()),
    )
    .unwrap()
}

fn queue_values() -> serde_json::Value {
    json!({
        "range": "'Ingest_Queue'!A1:D5",
        "majorDimension": "ROWS",
        "values": [
            ["Video ID", "Title", "Status", "Transcript"],
            ["abc123", "First", "Pending"],
            ["def456", "Second", "Ready for AI (en)", "text"],
            [],
            ["ghi789", "Fourth", "Transcript Failed x2"]
        ]
    })
}

// =============================================================================
// Error Type Tests
// =============================================================================

#[test]
fn test_error_from_http_status() {
    assert!(matches!(
        SheetsError::from_http_status(429, "slow down"),
        SheetsError::RateLimited(1000)
    ));
    assert!(matches!(
        SheetsError::from_http_status(503, "unavailable"),
        SheetsError::ServerError(503, _)
    ));
    assert!(matches!(
        SheetsError::from_http_status(401, "expired"),
        SheetsError::AuthError(_)
    ));
    assert!(matches!(
        SheetsError::from_http_status(403, "denied"),
        SheetsError::PermissionDenied(_)
    ));
    assert!(matches!(
        SheetsError::from_http_status(404, "missing"),
        SheetsError::NotFound(_)
    ));
    assert!(matches!(
        SheetsError::from_http_status(400, "bad range"),
        SheetsError::RequestFailed(_)
    ));
}

#[test]
fn test_error_retryability() {
    assert!(SheetsError::from_http_status(429, "").is_retryable());
    assert!(SheetsError::from_http_status(500, "").is_retryable());
    assert!(!SheetsError::from_http_status(400, "").is_retryable());
    assert!(!SheetsError::from_http_status(403, "").is_retryable());
    assert!(!SheetsError::missing_column("Q", "Status").is_retryable());
}

#[test]
fn test_error_retry_after_ms() {
    let err = SheetsError::from_http_status_with_retry_after(429, "", Some(2000));
    assert_eq!(err.retry_after_ms(), Some(2000));
    assert_eq!(SheetsError::ServerError(500, "x".into()).retry_after_ms(), None);
    assert_eq!(crate::error::parse_retry_after(Some("3")), Some(3000));
    assert_eq!(crate::error::parse_retry_after(Some("soon")), None);
}

#[test]
fn test_error_http_status_getter() {
    assert_eq!(SheetsError::RateLimited(10).http_status(), Some(429));
    assert_eq!(SheetsError::ServerError(502, "x".into()).http_status(), Some(502));
    assert_eq!(SheetsError::invalid_response("x").http_status(), None);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
#[serial]
fn test_config_requires_sheet_key() {
    std::env::remove_var("SHEET_KEY");
    assert!(matches!(SheetsConfig::from_env(), Err(SheetsError::Config(_))));

    std::env::set_var("SHEET_KEY", "   ");
    assert!(matches!(SheetsConfig::from_env(), Err(SheetsError::Config(_))));
    std::env::remove_var("SHEET_KEY");
}

#[test]
#[serial]
fn test_config_defaults_and_overrides() {
    std::env::set_var("SHEET_KEY", " sheet123 ");
    std::env::remove_var("SHEETS_API_BASE_URL");
    std::env::remove_var("SHEETS_CONNECT_TIMEOUT_SECS");
    std::env::set_var("SHEETS_TIMEOUT_SECS", "not-a-number");

    let config = SheetsConfig::from_env().unwrap();
    assert_eq!(config.spreadsheet_id, "sheet123");
    assert_eq!(config.base_url, "https://sheets.googleapis.com/v4");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.connect_timeout, Duration::from_secs(5));

    std::env::set_var("SHEETS_API_BASE_URL", "http://localhost:9999/");
    let config = SheetsConfig::from_env().unwrap();
    assert_eq!(config.base_url, "http://localhost:9999");

    std::env::remove_var("SHEET_KEY");
    std::env::remove_var("SHEETS_API_BASE_URL");
    std::env::remove_var("SHEETS_TIMEOUT_SECS");
}

#[test]
#[serial]
fn test_token_source_from_env() {
    std::env::remove_var("GOOGLE_CREDENTIALS");
    std::env::remove_var("GOOGLE_APPLICATION_CREDENTIALS");
    std::env::remove_var("SHEETS_ACCESS_TOKEN");
    assert!(matches!(token_source_from_env(), Err(SheetsError::Config(_))));

    std::env::set_var("SHEETS_ACCESS_TOKEN", "ya29.token");
    assert!(matches!(
        token_source_from_env(),
        Ok(TokenSource::Static(t)) if t == "ya29.token"
    ));

    std::env::set_var("GOOGLE_CREDENTIALS", "{not json");
    assert!(matches!(token_source_from_env(), Err(SheetsError::AuthError(_))));

    std::env::remove_var("GOOGLE_CREDENTIALS");
    std::env::remove_var("SHEETS_ACCESS_TOKEN");
}

// =============================================================================
// Client Tests
// =============================================================================

#[tokio::test]
async fn test_read_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(READ_PATH))
        .and(query_param("majorDimension", "ROWS"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(queue_values()))
        .expect(1)
        .mount(&server)
        .await;

    let rows = test_client(&server)
        .read_values("'Ingest_Queue'")
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1], vec!["abc123", "First", "Pending"]);
    assert!(rows[3].is_empty());
}

#[tokio::test]
async fn test_read_retries_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(READ_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(READ_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(queue_values()))
        .expect(1)
        .mount(&server)
        .await;

    let rows = test_client(&server)
        .read_values("'Ingest_Queue'")
        .await
        .unwrap();
    assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn test_permission_denied_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(READ_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .read_values("'Ingest_Queue'")
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::PermissionDenied(msg) if msg.contains("PERMISSION_DENIED")));
}

#[tokio::test]
async fn test_unauthorized_static_token_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(READ_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("UNAUTHENTICATED"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .read_values("'Ingest_Queue'")
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::AuthError(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_batch_update_sends_raw_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WRITE_PATH))
        .and(body_json(json!({
            "valueInputOption": "RAW",
            "data": [
                {"range": "'Ingest_Queue'!D2", "majorDimension": "ROWS", "values": [["=not a formula"]]},
                {"range": "'Ingest_Queue'!C2", "majorDimension": "ROWS", "values": [["Ready for AI (en)"]]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": SHEET,
            "totalUpdatedRows": 1,
            "totalUpdatedCells": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .batch_update(vec![
            ValueRange::cell("'Ingest_Queue'!D2", "=not a formula"),
            ValueRange::cell("'Ingest_Queue'!C2", "Ready for AI (en)"),
        ])
        .await
        .unwrap();
    assert_eq!(response.total_updated_cells, Some(2));
}

// =============================================================================
// Queue Table Tests
// =============================================================================

#[tokio::test]
async fn test_table_read_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(READ_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(queue_values()))
        .mount(&server)
        .await;

    let table = SheetsQueueTable::new(test_client(&server), "Ingest_Queue");
    let rows = table.read_rows().await.unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].row_position, 2);
    assert_eq!(rows[0].item_id.as_str(), "abc123");
    assert_eq!(rows[0].status, RowStatus::Pending);
    assert_eq!(rows[1].status, RowStatus::ready("en"));
    assert_eq!(rows[2].row_position, 4);
    assert!(rows[2].item_id.is_empty());
    assert_eq!(rows[3].row_position, 5);
    assert_eq!(rows[3].status, RowStatus::failed(2));
}

#[tokio::test]
async fn test_table_missing_header_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(READ_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["Video ID", "Status"], ["abc123", "Pending"]]
        })))
        .mount(&server)
        .await;

    let table = SheetsQueueTable::new(test_client(&server), "Ingest_Queue");
    let err = table.read_rows().await.unwrap_err();
    assert!(matches!(err, SheetsError::MissingColumn { ref column, .. } if column == "Transcript"));
}

#[tokio::test]
async fn test_table_apply_writes_payload_before_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(READ_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(queue_values()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(WRITE_PATH))
        .and(body_json(json!({
            "valueInputOption": "RAW",
            "data": [
                {"range": "'Ingest_Queue'!D2", "majorDimension": "ROWS", "values": [["hello world"]]},
                {"range": "'Ingest_Queue'!C2", "majorDimension": "ROWS", "values": [["Ready for AI (en)"]]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalUpdatedCells": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let table = SheetsQueueTable::new(test_client(&server), "Ingest_Queue");
    table.read_rows().await.unwrap();
    table
        .apply(&RowUpdate::with_payload(2, RowStatus::ready("en"), "hello world"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_table_apply_status_only_reads_header_when_needed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/spreadsheets/sheet123/values/.+1.+1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["Video ID", "Title", "Status", "Transcript"]]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(WRITE_PATH))
        .and(body_json(json!({
            "valueInputOption": "RAW",
            "data": [
                {"range": "'Ingest_Queue'!C5", "majorDimension": "ROWS", "values": [["TranscriptFailed x3"]]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalUpdatedCells": 1})))
        .expect(2)
        .mount(&server)
        .await;

    let table = SheetsQueueTable::new(test_client(&server), "Ingest_Queue");
    let update = RowUpdate::status(5, RowStatus::failed(3));
    table.apply(&update).await.unwrap();
    table.apply(&update).await.unwrap();
}
