use super::*;

#[test]
fn test_provider_error_api_error_display() {
    let err = ProviderError::ApiError {
        status: 500,
        message: "Internal Server Error".to_string(),
    };
    assert!(err.to_string().contains("500"));
    assert!(err.to_string().contains("Internal Server Error"));
}

#[test]
fn test_provider_error_rate_limited_display() {
    let err = ProviderError::RateLimited {
        retry_after_seconds: 60,
    };
    assert!(err.to_string().contains("Rate limited"));
    assert!(err.to_string().contains("60"));
}

#[test]
fn test_from_api_response_auth_failed() {
    let err = ProviderError::from_api_response(401, "invalid x-api-key".to_string());
    assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
}

#[test]
fn test_from_api_response_rate_limited() {
    let err = ProviderError::from_api_response(429, "Rate limit exceeded".to_string());
    assert!(matches!(err, ProviderError::RateLimited { .. }));
}

#[test]
fn test_from_api_response_prompt_too_long() {
    let err = ProviderError::from_api_response(
        400,
        "prompt is too long: 210000 tokens > 200000 maximum".to_string(),
    );
    assert!(matches!(err, ProviderError::ContextLengthExceeded(_)));
}

#[test]
fn test_from_api_response_tokens_exceed() {
    let err = ProviderError::from_api_response(
        400,
        "Total tokens exceed the maximum limit".to_string(),
    );
    assert!(matches!(err, ProviderError::ContextLengthExceeded(_)));
}

#[test]
fn test_from_api_response_content_filtered() {
    let err = ProviderError::from_api_response(400, "Content filter triggered".to_string());
    assert!(matches!(err, ProviderError::ContentFiltered(_)));
}

#[test]
fn test_from_api_response_generic_bad_request() {
    let err = ProviderError::from_api_response(400, "max_tokens: field required".to_string());
    assert!(matches!(err, ProviderError::ApiError { status: 400, .. }));
}

#[test]
fn test_from_api_response_server_error() {
    let err = ProviderError::from_api_response(529, "Overloaded".to_string());
    assert!(matches!(err, ProviderError::ApiError { status: 529, .. }));
    assert!(err.is_transient());
}

#[test]
fn test_is_transient() {
    assert!(ProviderError::RateLimited { retry_after_seconds: 5 }.is_transient());
    assert!(ProviderError::Network("reset".to_string()).is_transient());
    assert!(!ProviderError::AuthenticationFailed("bad".to_string()).is_transient());
    assert!(!ProviderError::ApiError { status: 400, message: "bad".to_string() }.is_transient());
}
