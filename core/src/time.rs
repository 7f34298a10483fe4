//! Time related utils.

use chrono::Utc;

use crate::{Error, Result};

/// DateTime in UTC, the only form the wire protocol deals with.
pub type DateTime = chrono::DateTime<Utc>;

/// Take the current time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Seconds since unix epoch.
pub fn epoch_seconds(t: DateTime) -> i64 {
    t.timestamp()
}

/// Parse an HTTP `Date` header value (RFC 2822, e.g.
/// `Mon, 15 Aug 2022 16:50:12 GMT`).
pub fn parse_http_date(s: &str) -> Result<DateTime> {
    chrono::DateTime::parse_from_rfc2822(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            Error::unexpected_server_response(format!("invalid Date header {s:?}")).with_source(e)
        })
}
