//! Console presentation of per-query results.

use std::fmt;

/// Field holding the resolved URL of a query result.
pub const URL_FIELD: &str = "URL";

/// One labeled block of output for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBlock {
    /// Label such as `Yandex.Collections API`
    pub label: String,
    /// What the query produced
    pub status: BlockStatus,
}

/// Outcome of a query as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStatus {
    /// Empty result
    NotFound,
    /// The request itself failed
    Failed(String),
    /// Facts were found
    Found {
        /// Resolved URL, printed first
        url: Option<String>,
        /// Remaining fields with capitalized keys, in key order
        fields: Vec<(String, String)>,
    },
}

impl fmt::Display for QueryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[+] {}", self.label)?;
        match &self.status {
            BlockStatus::NotFound => writeln!(f, "\tNot found.")?,
            BlockStatus::Failed(reason) => writeln!(f, "\tError: {reason}")?,
            BlockStatus::Found { url, fields } => {
                if let Some(url) = url {
                    writeln!(f, "\t{URL_FIELD}: {url}")?;
                }
                for (key, value) in fields {
                    writeln!(f, "\t{key}: {value}")?;
                }
            }
        }
        writeln!(f)
    }
}

/// Uppercase the first character and lowercase the rest.
#[must_use]
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
