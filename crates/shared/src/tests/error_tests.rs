use super::*;

#[test]
fn nested_body_message_wins() {
    let failure = json!({ "body": { "message": "X" }, "message": "outer" });
    assert_eq!(error_message_from_value(&failure), "X");
}

#[test]
fn top_level_message_used_without_body() {
    assert_eq!(error_message_from_value(&json!({ "message": "Y" })), "Y");
}

#[test]
fn body_without_message_falls_back_to_top_level() {
    let failure = json!({ "body": { "code": 500 }, "message": "Y" });
    assert_eq!(error_message_from_value(&failure), "Y");
}

#[test]
fn bare_string_used_verbatim() {
    assert_eq!(error_message_from_value(&json!("Z")), "Z");
}

#[test]
fn unrecognized_shapes_use_generic_message() {
    for failure in [
        json!({}),
        json!(null),
        json!(42),
        json!(""),
        json!({ "message": "" }),
        json!({ "body": "not an object" }),
        json!(["a", "b"]),
    ] {
        assert_eq!(error_message_from_value(&failure), UNKNOWN_ERROR_MESSAGE);
    }
}

#[test]
fn constructors_round_through_display_message() {
    assert_eq!(ReportFailure::message("boom").display_message(), "boom");
    assert_eq!(ReportFailure::text("plain").display_message(), "plain");
    assert_eq!(
        ReportFailure::http(500, json!({ "message": "server exploded" })).display_message(),
        "server exploded"
    );
    assert_eq!(
        ReportFailure::http(502, Value::Null).display_message(),
        UNKNOWN_ERROR_MESSAGE
    );
}

#[test]
fn failure_display_includes_payload() {
    let failure = ReportFailure::message("bad id");
    assert_eq!(failure.to_string(), r#"report failure: {"message":"bad id"}"#);
}
