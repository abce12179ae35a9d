//! HTTP probing of the demo service

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Header the demo service uses to report its own handling time
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// A 2xx answer from the demo service
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    pub status: u16,
    /// Milliseconds, when the server reported it
    pub server_time_ms: Option<f64>,
}

/// Why a probe did not produce a 2xx answer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeFailure {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("request failed: {0}")]
    Request(String),
}

impl ProbeFailure {
    pub fn error_code(&self) -> String {
        match self {
            Self::Timeout(_) => "TIMEOUT".to_string(),
            Self::ConnectionRefused(_) => "CONNECTION_REFUSED".to_string(),
            Self::HttpStatus(code) => format!("HTTP_{}", code),
            Self::Request(_) => "REQUEST_FAILED".to_string(),
        }
    }
}

/// Issues GETs against the demo service
#[async_trait]
pub trait ServiceProbe: Send + Sync {
    async fn get(&self, path: &str) -> Result<ProbeResponse, ProbeFailure>;

    async fn health(&self) -> Result<(), ProbeFailure> {
        self.get("/health").await.map(|_| ())
    }
}

/// reqwest-backed probe with a bounded per-request timeout
pub struct HttpProbe {
    client: Client,
    base_url: String,
}

impl HttpProbe {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProbeFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeFailure::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn classify(err: reqwest::Error) -> ProbeFailure {
    if err.is_timeout() {
        ProbeFailure::Timeout(err.to_string())
    } else if err.is_connect() {
        ProbeFailure::ConnectionRefused(err.to_string())
    } else {
        ProbeFailure::Request(err.to_string())
    }
}

/// Accepts "42", "42.5" and "42ms"
pub fn parse_response_time(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches("ms")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[async_trait]
impl ServiceProbe for HttpProbe {
    async fn get(&self, path: &str) -> Result<ProbeResponse, ProbeFailure> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeFailure::HttpStatus(status.as_u16()));
        }

        let server_time_ms = response
            .headers()
            .get(RESPONSE_TIME_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_response_time);

        Ok(ProbeResponse {
            status: status.as_u16(),
            server_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ProbeFailure::Timeout("5s".into()).error_code(), "TIMEOUT");
        assert_eq!(ProbeFailure::ConnectionRefused("x".into()).error_code(), "CONNECTION_REFUSED");
        assert_eq!(ProbeFailure::HttpStatus(503).error_code(), "HTTP_503");
        assert_eq!(ProbeFailure::Request("x".into()).error_code(), "REQUEST_FAILED");
    }

    #[test]
    fn test_parse_response_time() {
        assert_eq!(parse_response_time("42"), Some(42.0));
        assert_eq!(parse_response_time("42.5ms"), Some(42.5));
        assert_eq!(parse_response_time(" 7 ms"), Some(7.0));
        assert_eq!(parse_response_time("-1"), None);
        assert_eq!(parse_response_time("fast"), None);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_probe_failure() {
        // port 9 (discard) is closed on test hosts
        let probe = HttpProbe::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();

        let result = probe.get("/users").await;

        assert!(matches!(
            result,
            Err(ProbeFailure::ConnectionRefused(_)) | Err(ProbeFailure::Timeout(_))
        ));
    }
}
