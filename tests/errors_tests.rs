use salatlink::api::services::ErrorCode;
use salatlink::errors::{Result, SalatError};
use salatlink::services::FetchState;
use std::error::Error;

#[cfg(test)]
mod error_creation_tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SalatError::validation("Latitude out of range: 91");

        assert!(matches!(error, SalatError::Validation(_)));
        assert_eq!(error.code(), "E001");
        assert!(error.to_string().contains("Validation Error"));
        assert!(error.to_string().contains("Latitude out of range"));
    }

    #[test]
    fn test_upstream_error() {
        let error = SalatError::upstream("Failed to fetch route.");

        assert!(matches!(error, SalatError::Upstream(_)));
        assert_eq!(error.message(), "Failed to fetch route.");
        assert!(!error.is_empty_state());
    }

    #[test]
    fn test_empty_state_errors() {
        assert!(SalatError::no_results("No mosques found nearby.").is_empty_state());
        assert!(SalatError::unsupported("not yet").is_empty_state());
        assert!(!SalatError::timeout("slow").is_empty_state());
    }

    #[test]
    fn test_error_is_std_error() {
        let error = SalatError::config("bad port");
        let as_dyn: &dyn Error = &error;
        assert!(as_dyn.source().is_none());
    }
}

#[cfg(test)]
mod conversion_tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: SalatError = io.into();
        assert!(matches!(error, SalatError::FileOperation(_)));
    }

    #[test]
    fn test_from_serde_error() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let error: SalatError = parse.unwrap_err().into();
        assert!(matches!(error, SalatError::Serialization(_)));
    }

    #[test]
    fn test_from_chrono_error() {
        let parse = chrono::NaiveTime::parse_from_str("25:99", "%H:%M");
        let error: SalatError = parse.unwrap_err().into();
        assert!(matches!(error, SalatError::DateParse(_)));
    }
}

#[cfg(test)]
mod http_mapping_tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            SalatError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(SalatError::not_found("x").http_status(), StatusCode::NOT_FOUND);
        assert_eq!(SalatError::upstream("x").http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            SalatError::timeout("x").http_status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        // 空态保持 200
        assert_eq!(SalatError::no_results("x").http_status(), StatusCode::OK);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ErrorCode::from(&SalatError::unsupported("x")),
            ErrorCode::Unsupported
        );
        assert_eq!(
            ErrorCode::from(SalatError::timeout("x")),
            ErrorCode::UpstreamTimeout
        );
    }
}

#[cfg(test)]
mod fetch_state_tests {
    use super::*;

    #[test]
    fn test_from_result_keeps_empty_message() {
        let result: Result<Vec<u32>> = Err(SalatError::no_results("No route found."));
        let state = FetchState::from_result(result, "Failed to fetch route.");
        assert_eq!(state, FetchState::Empty("No route found.".into()));
    }

    #[test]
    fn test_from_result_replaces_failure_message() {
        let result: Result<Vec<u32>> = Err(SalatError::upstream("connection reset"));
        let state = FetchState::from_result(result, "Failed to fetch route.");
        assert_eq!(state.message(), Some("Failed to fetch route."));
    }
}
