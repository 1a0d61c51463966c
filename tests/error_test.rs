use std::time::Duration;

use larder::{LarderError, Result};

#[test]
fn test_error_display() {
    let err = LarderError::Api {
        status: 503,
        message: "Unsplash API error: 503".to_string(),
    };
    assert!(err.to_string().contains("503"));

    let err = LarderError::Timeout(Duration::from_secs(10));
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(LarderError::NoProvider)
    }
    assert!(returns_error().is_err());
}

#[test]
fn test_json_error_conversion() {
    fn parse() -> Result<serde_json::Value> {
        Ok(serde_json::from_str("{not json")?)
    }
    assert!(matches!(parse(), Err(LarderError::Json(_))));
}

// ============================================================================
// Upstream error classification
// ============================================================================

#[test]
fn upstream_errors() {
    assert!(LarderError::Http("connection reset".into()).is_upstream());
    assert!(
        LarderError::Api {
            status: 500,
            message: "boom".into()
        }
        .is_upstream()
    );
    assert!(LarderError::RateLimited { retry_after: None }.is_upstream());
    assert!(
        LarderError::RateLimited {
            retry_after: Some(Duration::from_secs(60))
        }
        .is_upstream()
    );
    assert!(LarderError::AuthenticationFailed.is_upstream());
    assert!(LarderError::Timeout(Duration::from_secs(1)).is_upstream());
    assert!(LarderError::EmptyResponse.is_upstream());
    assert!(LarderError::NoProvider.is_upstream());
}

#[test]
fn non_upstream_errors() {
    assert!(!LarderError::Store("disk full".into()).is_upstream());
    assert!(!LarderError::Configuration("bad".into()).is_upstream());
    assert!(!LarderError::InvalidInput("empty key".into()).is_upstream());
}
