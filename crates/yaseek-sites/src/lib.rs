//! Yaseek Sites - the per-identifier query tables.
//!
//! Every endpoint the crawler talks to is described as data: which identifier
//! kind it accepts, how to build the request, and which URL to attach to a
//! successful result. The table ships embedded in the binary and is the only
//! set of endpoints the crawler knows.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Strongly-typed query templates
//! - **Templates** ([`template`]): `{placeholder}` substitution
//! - **Loader** ([`loader`]): Parsing and validating the embedded table
//! - **Registry** ([`registry`]): Ordered query lists per resolver kind
//! - **Errors** ([`error`]): Site-definition error types
//!
//! # Example
//!
//! ```rust
//! use yaseek_core::ResolverKind;
//! use yaseek_sites::SiteRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SiteRegistry::builtin()?;
//! for query in registry.queries(ResolverKind::Username) {
//!     println!("{}.{}", registry.provider().name, query.title);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;
pub mod template;

// Re-export commonly used types
pub use definition::{
    HttpMethod, PreparedRequest, ProviderMetadata, QueryDefinition, RequestTemplate,
    SiteDefinitions, SuccessRule,
};
pub use error::{Result, SiteError};
pub use loader::load_builtin;
pub use registry::SiteRegistry;
