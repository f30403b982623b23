use thiserror::Error;

/// Errors from talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, connect, TLS, broken body.
    #[error("request failed: {0}")]
    Network(String),
    /// The request could not be assembled (bad multipart content type).
    #[error("failed to build request: {0}")]
    Request(String),
    /// Non-2xx response, or a 2xx the backend itself marked as rejected.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// A 2xx response whose body did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Pulls a human-readable message out of an error body.
///
/// The backend is inconsistent: some endpoints answer `{message}`, some
/// `{error}`, validation failures answer `{errors: [{msg}]}`, and some
/// error paths return no body at all. Fall through them in that order.
pub(crate) fn extract_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for candidate in [&value["message"], &value["error"], &value["errors"][0]["msg"]] {
            if let Some(message) = candidate.as_str() {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }
    format!("server returned status {status}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_field_preferred() {
        let body = r#"{"message":"Room not found","error":"ignored"}"#;
        assert_eq!(extract_message(404, body), "Room not found");
    }

    #[test]
    fn test_error_field_fallback() {
        let body = r#"{"error":"Name already taken"}"#;
        assert_eq!(extract_message(400, body), "Name already taken");
    }

    #[test]
    fn test_validation_errors_fallback() {
        let body = r#"{"errors":[{"msg":"email is required"},{"msg":"second"}]}"#;
        assert_eq!(extract_message(422, body), "email is required");
    }

    #[test]
    fn test_status_fallback_on_empty_body() {
        assert_eq!(extract_message(502, ""), "server returned status 502");
    }

    #[test]
    fn test_status_fallback_on_non_json_body() {
        assert_eq!(
            extract_message(500, "<html>Internal Server Error</html>"),
            "server returned status 500"
        );
    }

    #[test]
    fn test_status_fallback_on_empty_message() {
        let body = r#"{"message":""}"#;
        assert_eq!(extract_message(500, body), "server returned status 500");
    }
}
