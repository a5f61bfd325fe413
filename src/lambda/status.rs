//! HTTP reason phrases.

use http::StatusCode;

/// Canonical reason phrase for a status code, if known.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    StatusCode::from_u16(code).ok()?.canonical_reason()
}
