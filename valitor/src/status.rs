//! Descriptions for non-200 pay API replies.

/// Describes an HTTP status the pay API answered with instead of `200`.
///
/// The description always contains the numeric status.
#[must_use]
pub fn describe_status(status: u16) -> String {
    match status {
        401 => format!("Unauthorized: the API key was rejected (HTTP {status})"),
        403 => format!("Forbidden: the API key may not use this operation (HTTP {status})"),
        404 => format!("Not found: unknown endpoint (HTTP {status})"),
        500 => format!("Internal error at the gateway (HTTP {status})"),
        503 => format!("Gateway unavailable (HTTP {status})"),
        _ => format!("Unknown error from the gateway, code: {status}"),
    }
}
