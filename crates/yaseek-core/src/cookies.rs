//! Netscape cookie-jar loading.
//!
//! The crawler only needs a flat `name -> value` mapping sent with every
//! request, so domains and paths are parsed for validation and then dropped.

use crate::error::CookieError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// Flat credential mapping shared by every request of a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    /// A jar with no cookies.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a cookie jar from a Netscape-format file.
    ///
    /// With `strict`, expired cookies and session-only cookies (expiry `0`)
    /// are skipped.
    pub fn load(path: &Path, strict: bool) -> Result<Self, CookieError> {
        if !path.exists() {
            return Err(CookieError::NotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| CookieError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let jar = Self::parse(&contents, strict, Utc::now());
        debug!(path = %path.display(), count = jar.len(), "loaded cookies");
        Ok(jar)
    }

    /// Parse cookie-jar text. Later lines win when a name repeats.
    #[must_use]
    pub fn parse(contents: &str, strict: bool, now: DateTime<Utc>) -> Self {
        let mut cookies = BTreeMap::new();

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            let line = line.strip_prefix(HTTP_ONLY_PREFIX).unwrap_or(line);

            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 7 {
                warn!(line = index + 1, "skipping malformed cookie line");
                continue;
            }

            let (expires, name, value) = (fields[4], fields[5], fields[6]);
            let expires: i64 = if expires.is_empty() {
                0
            } else if let Ok(ts) = expires.parse() {
                ts
            } else {
                warn!(line = index + 1, "skipping cookie with invalid expiry");
                continue;
            };

            if strict {
                if expires == 0 {
                    continue;
                }
                if expires <= now.timestamp() {
                    continue;
                }
            }

            cookies.insert(name.to_string(), value.to_string());
        }

        Self { cookies }
    }

    /// Whether the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Look up a cookie value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Add or replace a cookie.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Render the jar as a `Cookie` header value, or `None` when empty.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
