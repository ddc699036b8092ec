//! Classification of Strava upload replies into an [`UploadOutcome`].
//!
//! Only the first line of the body is considered; Strava answers with a
//! single-line JSON object. The classifier is total: every input produces
//! an outcome and nothing here can panic or return an error.

use serde_json::Value;

use super::model::UploadOutcome;

pub const COMPLETED_MESSAGE: &str = "Completed.";
pub const PARSE_ERROR_MESSAGE: &str = "invalid response or parser error.";
/// Used when the transport failed without describing why.
pub const TRANSPORT_ERROR_MESSAGE: &str = "network error.";

/// What the network layer reports once an upload has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportReply {
    /// First line of the response body, if any body was received.
    pub first_line: Option<String>,
    /// Network-level failure, including non-2xx statuses.
    pub error: Option<String>,
}

impl TransportReply {
    pub fn ok(body: &str) -> Self {
        Self {
            first_line: Some(first_line(body).to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            first_line: None,
            error: Some(error.into()),
        }
    }

    pub fn with_error(body: &str, error: impl Into<String>) -> Self {
        Self {
            first_line: Some(first_line(body).to_string()),
            error: Some(error.into()),
        }
    }
}

/// The first line of `body`, without its line terminator.
pub fn first_line(body: &str) -> &str {
    body.lines().next().unwrap_or("")
}

/// Fields pulled out of a well-formed reply.
#[derive(Debug, Default, PartialEq, Eq)]
struct ParsedReply {
    error: String,
    upload_id: Option<u64>,
}

fn parse_reply(line: Option<&str>) -> Option<ParsedReply> {
    let line = line?.trim();
    if line.is_empty() {
        return None;
    }
    let object = match serde_json::from_str::<Value>(line).ok()? {
        Value::Object(object) => object,
        _ => return None,
    };

    let error = match object.get("error") {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    let upload_id = object
        .get("upload_id")
        .and_then(Value::as_u64)
        .or_else(|| object.get("id").and_then(Value::as_u64));

    Some(ParsedReply { error, upload_id })
}

/// `none` and `null` are not real errors, whatever their case.
fn normalize_error(error: String) -> String {
    let lower = error.to_lowercase();
    if lower == "none" || lower == "null" {
        String::new()
    } else {
        error
    }
}

/// Turn a transport reply into the outcome delivered to the caller.
pub fn classify(reply: &TransportReply) -> UploadOutcome {
    let (error, upload_id) = match parse_reply(reply.first_line.as_deref()) {
        Some(parsed) => (normalize_error(parsed.error), parsed.upload_id),
        None => (PARSE_ERROR_MESSAGE.to_string(), None),
    };

    match (&reply.error, error.is_empty()) {
        (None, true) => UploadOutcome {
            success: true,
            message: COMPLETED_MESSAGE.into(),
            upload_id,
        },
        (Some(transport), true) => UploadOutcome {
            success: false,
            message: if transport.trim().is_empty() {
                TRANSPORT_ERROR_MESSAGE.into()
            } else {
                transport.clone()
            },
            upload_id,
        },
        (_, false) => UploadOutcome {
            success: false,
            message: error,
            upload_id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_error_is_success() {
        let outcome = classify(&TransportReply::ok(r#"{"error":""}"#));
        assert!(outcome.success);
        assert_eq!(outcome.message, "Completed.");
    }

    #[test]
    fn test_missing_error_field_is_success() {
        let outcome = classify(&TransportReply::ok(
            r#"{"id":16486788,"status":"Your activity is still being processed."}"#,
        ));
        assert!(outcome.success);
        assert_eq!(outcome.message, COMPLETED_MESSAGE);
        assert_eq!(outcome.upload_id, Some(16486788));
    }

    #[test]
    fn test_upload_id_preferred_over_id() {
        let outcome = classify(&TransportReply::ok(r#"{"upload_id":7,"id":9}"#));
        assert_eq!(outcome.upload_id, Some(7));
    }

    #[test]
    fn test_none_and_null_are_not_errors() {
        for body in [
            r#"{"error":"none"}"#,
            r#"{"error":"NULL"}"#,
            r#"{"error":"None"}"#,
            r#"{"error":null}"#,
        ] {
            let outcome = classify(&TransportReply::ok(body));
            assert!(outcome.success, "{body}");
            assert_eq!(outcome.message, "Completed.");
        }
    }

    #[test]
    fn test_application_error_is_verbatim() {
        let outcome = classify(&TransportReply::ok(r#"{"error":"rate limit exceeded"}"#));
        assert!(!outcome.success);
        assert_eq!(outcome.message, "rate limit exceeded");
    }

    #[test]
    fn test_non_string_error_is_rendered() {
        let outcome = classify(&TransportReply::ok(r#"{"error":42}"#));
        assert!(!outcome.success);
        assert_eq!(outcome.message, "42");
    }

    #[test]
    fn test_malformed_bodies_are_parse_errors() {
        for body in ["", "   ", "{", r#"{"error":"x""#, "[]", "\"error\"", "42", "<html>"] {
            let outcome = classify(&TransportReply::ok(body));
            assert!(!outcome.success, "{body:?}");
            assert_eq!(outcome.message, PARSE_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_absent_body_is_parse_error() {
        let outcome = classify(&TransportReply::failed("connection refused"));
        assert!(!outcome.success);
        assert_eq!(outcome.message, PARSE_ERROR_MESSAGE);
    }

    #[test]
    fn test_transport_error_fails_clean_body() {
        let outcome = classify(&TransportReply::with_error(
            r#"{"message":"Authorization Error"}"#,
            "HTTP 401 Unauthorized",
        ));
        assert!(!outcome.success);
        assert_eq!(outcome.message, "HTTP 401 Unauthorized");
    }

    #[test]
    fn test_blank_transport_error_still_has_message() {
        for err in ["", "  "] {
            let outcome = classify(&TransportReply::with_error("{}", err));
            assert!(!outcome.success);
            assert_eq!(outcome.message, TRANSPORT_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_application_error_wins_over_transport_error() {
        let outcome = classify(&TransportReply::with_error(
            r#"{"error":"duplicate of activity 123"}"#,
            "HTTP 400 Bad Request",
        ));
        assert!(!outcome.success);
        assert_eq!(outcome.message, "duplicate of activity 123");
    }

    #[test]
    fn test_only_first_line_is_read() {
        let body = "{\"error\":\"\"}\n{\"error\":\"ignored\"}";
        assert_eq!(first_line(body), r#"{"error":""}"#);
        assert!(classify(&TransportReply::ok(body)).success);

        // Pretty-printed JSON is cut at the first line and no longer parses.
        let pretty = "{\n  \"error\": \"\"\n}";
        assert_eq!(classify(&TransportReply::ok(pretty)).message, PARSE_ERROR_MESSAGE);
    }

    proptest! {
        #[test]
        fn prop_classify_never_panics(line in ".*", err in proptest::option::of(".*")) {
            let reply = TransportReply { first_line: Some(line), error: err };
            let outcome = classify(&reply);
            prop_assert!(!outcome.message.is_empty());
        }

        #[test]
        fn prop_transport_error_always_fails(body in ".*", err in "[a-z ]{1,20}") {
            let outcome = classify(&TransportReply::with_error(&body, err));
            prop_assert!(!outcome.success);
        }

        #[test]
        fn prop_real_errors_are_verbatim(msg in "[A-Za-z][A-Za-z0-9 ]{0,30}") {
            prop_assume!(!matches!(msg.to_lowercase().as_str(), "none" | "null"));
            let body = serde_json::json!({ "error": msg }).to_string();
            let outcome = classify(&TransportReply::ok(&body));
            prop_assert!(!outcome.success);
            prop_assert_eq!(outcome.message, msg);
        }

        #[test]
        fn prop_none_null_any_case_succeeds(word in "(?i)(none|null)") {
            let body = serde_json::json!({ "error": word }).to_string();
            let outcome = classify(&TransportReply::ok(&body));
            prop_assert!(outcome.success);
            prop_assert_eq!(outcome.message, COMPLETED_MESSAGE);
        }
    }
}
