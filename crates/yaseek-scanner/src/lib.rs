//! Yaseek Scanner - resolvers and the recursive identifier crawl.
//!
//! This crate turns one seed identifier into every profile fact the provider
//! exposes. A [`Resolver`] runs all queries declared for its identifier kind
//! and merges their facts; the [`Router`] decides which kind a discovered
//! value may seed; the [`Crawler`] feeds newly discovered values back in until
//! nothing new turns up.
//!
//! # Features
//!
//! - Sequential, one-request-at-a-time crawling
//! - Per-query isolation: a blocked, failed or unparseable endpoint never stops the others
//! - Each identifier value dispatched at most once per crawl
//! - Depth limit turning runaway discovery into a reported outcome
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use yaseek_core::{CookieJar, FactMap};
//! use yaseek_extract::SchemeExtractor;
//! use yaseek_scanner::{Crawler, HttpFetcher, NoopObserver, Router};
//! use yaseek_sites::SiteRegistry;
//!
//! let crawler = Crawler::new(
//!     Arc::new(SiteRegistry::builtin()?),
//!     Router::new(),
//!     Arc::new(HttpFetcher::new(&config.http)?),
//!     Arc::new(SchemeExtractor::new()),
//! );
//!
//! let seed = FactMap::from_iter([("username", "alice")]);
//! let report = crawler.crawl(&seed, &CookieJar::empty(), &mut NoopObserver).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod crawler;
pub mod error;
pub mod fetch;
pub mod report;
pub mod resolver;
pub mod router;

// Re-export commonly used types
pub use crawler::{CrawlObserver, CrawlOutcome, CrawlReport, Crawler, NoopObserver};
pub use error::{FetchError, Result, ScanError};
pub use fetch::{Fetcher, HttpFetcher};
pub use report::{capitalize, BlockStatus, QueryBlock};
pub use resolver::{QueryResult, Resolver, ResolverContext};
pub use router::{PatternHook, Router, ValidationHook};
