//! Tests for error construction and serialisation.

use super::*;
use rstest::rstest;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("no session"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("denied"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn single_message_errors_expose_their_message() {
    let error = Error::forbidden("denied");
    assert_eq!(error.messages(), vec!["denied"]);
}

#[rstest]
fn message_list_is_preserved_in_order() {
    let error = Error::with_messages(
        ErrorCode::NotFound,
        vec!["no listing with id 1".to_owned(), "title is required".to_owned()],
    );
    assert_eq!(error.message(), "no listing with id 1, title is required");
    assert_eq!(
        error.messages(),
        vec!["no listing with id 1", "title is required"]
    );
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn trace_id_is_captured_in_scope() {
    let id = TraceId::generate();
    let error = TraceId::scope(id, async { Error::invalid_request("bad") }).await;
    assert_eq!(error.trace_id(), Some(id.to_string().as_str()));
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields() {
    let value = serde_json::to_value(Error::not_found("missing")).expect("serialise");
    assert_eq!(value, json!({ "code": "not_found", "message": "missing" }));

    let traced = Error::invalid_request("bad").with_trace_id("abc");
    let value = serde_json::to_value(traced).expect("serialise");
    assert_eq!(value.get("traceId"), Some(&json!("abc")));
}
