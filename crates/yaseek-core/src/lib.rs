//! Yaseek Core - Foundation crate for the yaseek profile crawler.
//!
//! This crate provides the shared vocabulary every other yaseek crate depends on:
//! identifier kinds, fact mappings with their merge rule, configuration, and the
//! credential (cookie jar) loader.
//!
//! # Modules
//!
//! - [`error`] - Configuration and cookie error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Identifier kinds and the `FactMap` / `FactValue` aggregation types
//! - [`cookies`] - Netscape cookie-jar parsing into a flat credential mapping
//!
//! # Example
//!
//! ```rust
//! use yaseek_core::{FactMap, FactValue};
//!
//! let mut info = FactMap::new();
//! info.aggregate(&FactMap::from_iter([("fullname", "Alice")]));
//! info.aggregate(&FactMap::from_iter([("fullname", "Alice A.")]));
//!
//! assert!(matches!(info.get("fullname"), Some(FactValue::Multi(_))));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod cookies;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, CookieConfig, CrawlConfig, HttpConfig};
pub use cookies::CookieJar;
pub use error::{ConfigError, ConfigResult, CookieError};
pub use types::{FactMap, FactValue, Identifier, ResolverKind};
