//! The extraction contract and challenge-page detection.

use crate::error::Result;
use yaseek_core::FactMap;

/// Field carrying the blocked marker.
pub const BLOCKED_FIELD: &str = "Error";

/// Value reported for a blocked query.
pub const BLOCKED_MESSAGE: &str = "Captcha detected";

/// Maps a raw response body to facts.
///
/// `Ok` with an empty map means nothing was found; `Err` means the body could
/// not be interpreted. Callers treat both as "no result" for that query.
pub trait Extractor: Send + Sync {
    /// Extract facts from a response body.
    fn extract(&self, body: &str) -> Result<FactMap>;
}

impl<F> Extractor for F
where
    F: Fn(&str) -> Result<FactMap> + Send + Sync,
{
    fn extract(&self, body: &str) -> Result<FactMap> {
        self(body)
    }
}

/// Whether the body is an anti-bot challenge page.
#[must_use]
pub fn is_blocked(body: &str, marker: &str) -> bool {
    !marker.is_empty() && body.contains(marker)
}

/// The one-field result recorded for a blocked query.
#[must_use]
pub fn blocked_facts() -> FactMap {
    FactMap::from_iter([(BLOCKED_FIELD, BLOCKED_MESSAGE)])
}
