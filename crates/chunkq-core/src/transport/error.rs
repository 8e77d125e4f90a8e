//! Per-attempt transport error and its classification for run counters.

use crate::config::DataType;
use std::fmt;

/// Error from a single chunk POST (curl failure, HTTP error, or undecodable body).
/// Every variant counts as a failed attempt; the chunk is re-queued.
#[derive(Debug)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Body did not match the configured payload shape.
    Decode { data_type: DataType, message: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Curl(e) => write!(f, "{}", e),
            TransportError::Http(code) => write!(f, "HTTP {}", code),
            TransportError::Decode { data_type, message } => {
                write!(f, "response is not valid {:?}: {}", data_type, message)
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Curl(e) => Some(e),
            TransportError::Http(_) | TransportError::Decode { .. } => None,
        }
    }
}

/// How a failed attempt is counted in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Curl gave up waiting (connect or transfer timeout).
    Timeout,
    /// 429 or 503: the endpoint is shedding load.
    Throttled,
    /// Could not reach the endpoint or the connection broke mid-request.
    Connection,
    /// 5xx other than 503.
    Http5xx(u16),
    /// 4xx, other statuses, undecodable bodies, unrecognized curl errors.
    Other,
}

impl ErrorKind {
    /// Counted as `throttle_events` (false) or `error_events` (true); `Other`
    /// falls in neither bucket.
    pub fn is_error_event(self) -> bool {
        !matches!(self, ErrorKind::Throttled | ErrorKind::Other)
    }
}

pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    let unreachable = e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_got_nothing()
        || e.is_send_error()
        || e.is_recv_error();
    match () {
        _ if e.is_operation_timedout() => ErrorKind::Timeout,
        _ if unreachable => ErrorKind::Connection,
        _ => ErrorKind::Other,
    }
}

pub fn classify(e: &TransportError) -> ErrorKind {
    match e {
        TransportError::Curl(ce) => classify_curl_error(ce),
        TransportError::Http(code) => classify_http_status(*code),
        TransportError::Decode { .. } => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_statuses() {
        for code in [429, 503] {
            let kind = classify(&TransportError::Http(code));
            assert_eq!(kind, ErrorKind::Throttled);
            assert!(!kind.is_error_event());
        }
    }

    #[test]
    fn server_errors_count_as_error_events() {
        assert_eq!(classify_http_status(502), ErrorKind::Http5xx(502));
        assert!(classify_http_status(500).is_error_event());
    }

    #[test]
    fn client_errors_are_uncounted() {
        for code in [400, 404, 405] {
            assert_eq!(classify_http_status(code), ErrorKind::Other);
        }
        assert!(!ErrorKind::Other.is_error_event());
    }

    #[test]
    fn curl_codes() {
        // CURLE_OPERATION_TIMEDOUT, CURLE_COULDNT_CONNECT, CURLE_UNSUPPORTED_PROTOCOL
        let timeout = TransportError::Curl(curl::Error::new(28));
        let refused = TransportError::Curl(curl::Error::new(7));
        let other = TransportError::Curl(curl::Error::new(1));
        assert_eq!(classify(&timeout), ErrorKind::Timeout);
        assert_eq!(classify(&refused), ErrorKind::Connection);
        assert_eq!(classify(&other), ErrorKind::Other);
        assert!(classify(&timeout).is_error_event());
    }

    #[test]
    fn decode_error_is_other_and_displays_shape() {
        let e = TransportError::Decode {
            data_type: DataType::Json,
            message: "expected value".into(),
        };
        assert_eq!(classify(&e), ErrorKind::Other);
        assert!(e.to_string().contains("Json"));
        assert_eq!(TransportError::Http(502).to_string(), "HTTP 502");
    }
}
