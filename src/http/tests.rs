use super::test_support::{OK_RESPONSE, run_async_test, spawn_test_server};
use super::*;
use crate::error::{AppError, ValidationError};

#[test]
fn validate_json_body_accepts_values() -> Result<(), String> {
    for body in [r#"{"a":1}"#, "[1,2,3]", "\"text\"", "42", "null"] {
        validate_json_body(body).map_err(|err| format!("Expected '{}' to be valid: {}", body, err))?;
    }
    Ok(())
}

#[test]
fn validate_json_body_rejects_malformed_input() -> Result<(), String> {
    for body in ["", "{", "{a:1}", "[1,]", "{} {}"] {
        if validate_json_body(body).is_ok() {
            return Err(format!("Expected '{}' to be rejected", body));
        }
    }
    Ok(())
}

#[test]
fn post_json_rejects_invalid_body_before_sending() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_test_server(Some(OK_RESPONSE)).await?;
        let client = FetchClient::new(&TimerConfig::default()).map_err(|err| err.to_string())?;
        match client.post_json(&server.url("/items")?, "{not json").await {
            Err(AppError::Validation(ValidationError::InvalidJsonBody { .. })) => {}
            Err(err) => return Err(format!("Expected invalid JSON error, got {}", err)),
            Ok(_) => return Err("Expected invalid JSON error, got a response".to_owned()),
        }
        if server.hits() != 0 {
            return Err("Invalid body must not reach the server".to_owned());
        }
        Ok(())
    })
}
