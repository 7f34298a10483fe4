//! Failure classification for non-success responses.

use std::fmt::Write;

use http::header::DATE;

use crate::time::{parse_http_date, DateTime};
use crate::Error;

/// Maximum tolerated divergence between the local clock and the remote
/// `Date` header, in seconds. The API server rejects requests whose signing
/// timestamp is further out than this.
pub const MAX_CLOCK_DRIFT_SECS: i64 = 30;

/// Classify an already-failed response.
///
/// The most common root cause of signature rejections is a local clock out
/// of sync with the API server. When the remote `Date` header is present,
/// parseable, and more than [`MAX_CLOCK_DRIFT_SECS`] away from `now`, the
/// failure is pinned on clock drift; everything else becomes a generic
/// server-response error carrying status, reason and headers for diagnosis.
///
/// Success responses never reach this function.
pub fn classify_failure(parts: &http::response::Parts, now: DateTime) -> Error {
    if let Some(remote) = parts
        .headers
        .get(DATE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_http_date(v).ok())
    {
        let drift = (now - remote).num_seconds().abs();
        if drift > MAX_CLOCK_DRIFT_SECS {
            return Error::clock_drift(format!(
                "local clock is {drift}s out of sync with the remote server \
                 (max {MAX_CLOCK_DRIFT_SECS}s), check time synchronization"
            ));
        }
    }

    let mut message = format!(
        "unexpected response from server: {} {}",
        parts.status.as_u16(),
        parts.status.canonical_reason().unwrap_or("unknown"),
    );
    for (name, value) in parts.headers.iter() {
        // Header values are not guaranteed utf-8; lossy rendering is fine
        // for a diagnostic message.
        let _ = write!(message, "\n{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
    }

    Error::unexpected_server_response(message)
}
