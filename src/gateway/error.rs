//! Typed failures from calls to the external music service (spec §4.2's
//! failure modes): rate limiting, generic non-2xx responses, transport
//! faults, and timeouts are kept distinct so `AppError::Gateway` can map
//! each to the right HTTP status and the right `error` event.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("rate limited by music service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("music service returned {status}: {body_snippet}")]
    Http { status: u16, body_snippet: String },

    #[error("music service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("music service request timed out")]
    Timeout,
}

/// Truncates a response body to a safe length for logging and error messages.
pub fn snippet(body: &str) -> String {
    const MAX_LEN: usize = 200;
    if body.len() <= MAX_LEN {
        body.to_string()
    } else {
        let mut end = MAX_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}
