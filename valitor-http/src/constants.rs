//! Transport defaults.

use std::time::Duration;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of redirects followed per request.
pub const MAX_REDIRECTS: usize = 10;
