//! Yaseek Extract - turning raw response bodies into profile facts.
//!
//! The crawler treats extraction as an oracle: hand it a body, get back a
//! [`FactMap`](yaseek_core::FactMap) (possibly empty) or an error for input it
//! cannot make sense of. Anti-bot challenge pages are recognised before the
//! oracle runs, see [`is_blocked`].
//!
//! # Example
//!
//! ```rust
//! use yaseek_extract::{Extractor, SchemeExtractor};
//!
//! let extractor = SchemeExtractor::new();
//! let facts = extractor
//!     .extract(r#"{"public_id": "c48fhxw0qppa50289r5c9ku4k4", "display_name": "Alice"}"#)
//!     .expect("valid JSON");
//! assert_eq!(facts.get_str("yandex_public_id"), Some("c48fhxw0qppa50289r5c9ku4k4"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod oracle;
pub mod schemes;

// Re-export commonly used types
pub use error::{ExtractError, Result};
pub use oracle::{blocked_facts, is_blocked, Extractor, BLOCKED_FIELD, BLOCKED_MESSAGE};
pub use schemes::SchemeExtractor;
