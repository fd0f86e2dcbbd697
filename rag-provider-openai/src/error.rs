//! Mapping HTTP/reqwest failures to [`ProviderError`].

use rag_turn::ProviderError;

/// Map a non-success HTTP status to a [`ProviderError`].
///
/// Server-side failures map to `RequestFailed` so the LM retries them.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthFailed(body.to_string()),
        429 => ProviderError::RateLimited,
        500..=599 => ProviderError::RequestFailed(format!("HTTP {status}: {body}")),
        _ => ProviderError::InvalidResponse(format!("HTTP {status}: {body}")),
    }
}

/// Map a transport-level [`reqwest::Error`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_decode() {
        ProviderError::InvalidResponse(err.to_string())
    } else {
        ProviderError::RequestFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_401_and_403_to_auth_failed() {
        let err = map_http_status(reqwest::StatusCode::UNAUTHORIZED, "Invalid API key");
        assert!(matches!(err, ProviderError::AuthFailed(_)));
        let err = map_http_status(reqwest::StatusCode::FORBIDDEN, "nope");
        assert!(matches!(err, ProviderError::AuthFailed(_)));
    }

    #[test]
    fn map_429_to_rate_limited() {
        let err = map_http_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, ProviderError::RateLimited));
        assert!(err.is_retryable());
    }

    #[test]
    fn map_5xx_to_retryable_request_failure() {
        for status in [
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            reqwest::StatusCode::BAD_GATEWAY,
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = map_http_status(status, "down");
            assert!(matches!(err, ProviderError::RequestFailed(_)));
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn map_other_status_to_invalid_response() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad model");
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
        assert!(err.to_string().contains("bad model"));
        assert!(!err.is_retryable());
    }
}
