//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for the prize listing (`?include_unavailable=true`).
#[derive(Debug, Default, Deserialize)]
pub struct IncludeUnavailableParams {
    #[serde(default)]
    pub include_unavailable: bool,
}
