//! Tests for body extraction errors.

use actix_web::error::PayloadError;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{memory_state, test_app};

#[rstest]
#[case(JsonPayloadError::OverflowKnownLength { length: 3_000_000, limit: 2_097_152 }, BodyFault::TooLarge)]
#[case(JsonPayloadError::Overflow { limit: 2_097_152 }, BodyFault::TooLarge)]
#[case(JsonPayloadError::ContentType, BodyFault::ContentType)]
#[case(
    JsonPayloadError::Deserialize(
        serde_json::from_str::<Value>("{").expect_err("truncated json")
    ),
    BodyFault::Syntax
)]
#[case(JsonPayloadError::Payload(PayloadError::Incomplete(None)), BodyFault::Unreadable)]
fn payload_errors_keep_their_cause(#[case] err: JsonPayloadError, #[case] expected: BodyFault) {
    assert_eq!(body_fault(&err), expected);
}

#[rstest]
#[actix_web::test]
async fn missing_content_type_is_reported_as_such() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_payload(r#"{"email":"ada@example.com","password":"Abc12345"}"#)
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let problem: Value = actix_test::read_body_json(res).await;
    assert_eq!(problem["issues"][0]["name"], json!("BodyMalformed"));
    assert_eq!(
        problem["issues"][0]["message"],
        json!("Content-Type must be application/json")
    );
}

#[rstest]
#[actix_web::test]
async fn oversized_body_is_reported_as_too_large() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let padding = "a".repeat(3 * 1024 * 1024);
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({ "email": "ada@example.com", "password": "Abc12345", "pad": padding }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let problem: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        problem["issues"][0]["message"],
        json!("Request body exceeds the size limit")
    );
}
