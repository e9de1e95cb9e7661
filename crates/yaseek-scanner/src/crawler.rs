//! Recursive identifier crawl.
//!
//! This module provides the [`Crawler`], which starts from a seed fact map,
//! resolves every routable value it contains and keeps feeding newly
//! discovered values back in until nothing new appears.

use crate::fetch::Fetcher;
use crate::resolver::{Resolver, ResolverContext};
use crate::router::Router;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use yaseek_core::{CookieJar, FactMap, Identifier, ResolverKind};
use yaseek_extract::Extractor;
use yaseek_sites::SiteRegistry;

/// Default nesting limit for discoveries.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Receives progress while a crawl runs.
pub trait CrawlObserver: Send {
    /// A value is about to be resolved.
    fn on_dispatch(&mut self, _kind: ResolverKind, _identifier: &Identifier) {}

    /// A resolver finished all of its queries.
    fn on_resolved(&mut self, _resolver: &Resolver, _provider: &str) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {}

/// How a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// No unprocessed routable value remained
    Completed,
    /// At least one value sat deeper than the limit and was skipped
    LimitExceeded {
        /// The configured limit
        max_depth: usize,
    },
}

/// Everything a crawl produced.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Resolvers in dispatch order
    pub resolved: Vec<Resolver>,
    /// How the crawl ended
    pub outcome: CrawlOutcome,
}

impl CrawlReport {
    /// Facts of every resolver merged into one profile.
    #[must_use]
    pub fn profile(&self) -> FactMap {
        let mut profile = FactMap::new();
        for resolver in &self.resolved {
            profile.aggregate(resolver.info());
        }
        profile
    }

    /// Number of values dispatched.
    #[must_use]
    pub fn dispatched(&self) -> usize {
        self.resolved.len()
    }
}

/// One fact map being walked, and how deep in the discovery chain it sits.
struct Frame {
    pairs: std::vec::IntoIter<Identifier>,
    depth: usize,
}

/// Fixed-point driver over resolvers.
pub struct Crawler {
    registry: Arc<SiteRegistry>,
    router: Router,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    max_depth: usize,
}

impl Crawler {
    /// Create a crawler with the default depth limit.
    #[must_use]
    pub fn new(
        registry: Arc<SiteRegistry>,
        router: Router,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        Self {
            registry,
            router,
            fetcher,
            extractor,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum nesting of discoveries.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Crawl outward from `seed`.
    ///
    /// Depth-first: the facts discovered by a resolver are explored before
    /// the next value of the map that led to it. Every value is dispatched at
    /// most once; when several kinds accept it, the first in routing order
    /// wins. Values nested deeper than the limit are skipped while the
    /// shallower ones still pending keep being resolved. The processed set
    /// lives only for this call.
    pub async fn crawl(
        &self,
        seed: &FactMap,
        cookies: &CookieJar,
        observer: &mut dyn CrawlObserver,
    ) -> CrawlReport {
        let ctx = ResolverContext {
            registry: self.registry.as_ref(),
            fetcher: self.fetcher.as_ref(),
            extractor: self.extractor.as_ref(),
            cookies,
        };
        let provider = self.registry.provider().name.as_str();

        let mut processed: HashSet<String> = HashSet::new();
        let mut resolved = Vec::new();
        let mut outcome = CrawlOutcome::Completed;
        let mut stack = vec![Frame {
            pairs: seed.pairs().into_iter(),
            depth: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(identifier) = frame.pairs.next() else {
                stack.pop();
                continue;
            };
            let depth = frame.depth;

            if processed.contains(&identifier.value) {
                continue;
            }

            let kinds = self.router.route(&identifier.field, &identifier.value);
            let Some(&kind) = kinds.first() else {
                continue;
            };
            if kinds.len() > 1 {
                debug!(
                    identifier = %identifier,
                    ?kinds,
                    "several resolvers accept value; using the first"
                );
            }

            if depth >= self.max_depth {
                warn!(
                    identifier = %identifier,
                    max_depth = self.max_depth,
                    "crawl depth limit exceeded"
                );
                outcome = CrawlOutcome::LimitExceeded {
                    max_depth: self.max_depth,
                };
                continue;
            }

            processed.insert(identifier.value.clone());
            info!(%kind, identifier = %identifier, depth = depth + 1, "resolving");
            observer.on_dispatch(kind, &identifier);

            let mut resolver = Resolver::new(kind, identifier);
            resolver.collect(&ctx).await;
            observer.on_resolved(&resolver, provider);

            stack.push(Frame {
                pairs: resolver.info().pairs().into_iter(),
                depth: depth + 1,
            });
            resolved.push(resolver);
        }

        info!(dispatched = resolved.len(), ?outcome, "crawl finished");

        CrawlReport { resolved, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use yaseek_sites::PreparedRequest;

    /// Answers every request with a body naming a fresh public id.
    struct FabricatingFetcher {
        counter: Mutex<usize>,
    }

    #[async_trait]
    impl Fetcher for FabricatingFetcher {
        async fn fetch(
            &self,
            _request: &PreparedRequest,
            _cookies: &CookieJar,
        ) -> Result<String, FetchError> {
            let mut counter = self.counter.lock().expect("counter lock");
            *counter += 1;
            Ok(format!("{:026}", *counter))
        }
    }

    fn fabricating_oracle(body: &str) -> yaseek_extract::Result<FactMap> {
        Ok(FactMap::from_iter([("id", body)]))
    }

    fn empty_oracle(_body: &str) -> yaseek_extract::Result<FactMap> {
        Ok(FactMap::new())
    }

    #[derive(Default)]
    struct Recorder(Vec<(ResolverKind, String)>);

    impl CrawlObserver for Recorder {
        fn on_dispatch(&mut self, kind: ResolverKind, identifier: &Identifier) {
            self.0.push((kind, identifier.value.clone()));
        }
    }

    #[tokio::test]
    async fn test_depth_limit_skips_only_deep_values() {
        let crawler = Crawler::new(
            Arc::new(SiteRegistry::builtin().expect("builtin registry")),
            Router::new(),
            Arc::new(FabricatingFetcher {
                counter: Mutex::new(0),
            }),
            Arc::new(fabricating_oracle),
        )
        .with_max_depth(2);

        let seed = FactMap::from_iter([("username", "alice")]);
        let mut recorder = Recorder::default();
        let report = crawler
            .crawl(&seed, &CookieJar::empty(), &mut recorder)
            .await;

        // alice yields one public id per username query; each of those is
        // resolved, while the ids they yield in turn sit past the limit.
        let username_queries = crawler.registry.queries(ResolverKind::Username).len();
        assert_eq!(report.outcome, CrawlOutcome::LimitExceeded { max_depth: 2 });
        assert_eq!(report.dispatched(), 1 + username_queries);
        assert_eq!(recorder.0[0], (ResolverKind::Username, "alice".to_string()));
        assert!(recorder.0[1..]
            .iter()
            .all(|(kind, _)| *kind == ResolverKind::PublicUserId));
    }

    #[tokio::test]
    async fn test_value_accepted_by_two_kinds_dispatched_once() {
        let router = Router::new().with_rule(ResolverKind::PublicUserId, &["username"]);
        assert_eq!(router.route("username", "alice").len(), 2);

        let crawler = Crawler::new(
            Arc::new(SiteRegistry::builtin().expect("builtin registry")),
            router,
            Arc::new(FabricatingFetcher {
                counter: Mutex::new(0),
            }),
            Arc::new(empty_oracle),
        );

        let seed = FactMap::from_iter([("username", "alice")]);
        let mut recorder = Recorder::default();
        let report = crawler
            .crawl(&seed, &CookieJar::empty(), &mut recorder)
            .await;

        assert_eq!(report.outcome, CrawlOutcome::Completed);
        assert_eq!(report.dispatched(), 1);
        assert_eq!(recorder.0, [(ResolverKind::Username, "alice".to_string())]);
        assert_eq!(report.resolved[0].kind(), ResolverKind::Username);
    }

    #[tokio::test]
    async fn test_profile_merges_every_resolver() {
        let crawler = Crawler::new(
            Arc::new(SiteRegistry::builtin().expect("builtin registry")),
            Router::new(),
            Arc::new(FabricatingFetcher {
                counter: Mutex::new(0),
            }),
            Arc::new(fabricating_oracle),
        )
        .with_max_depth(1);

        let seed = FactMap::from_iter([("username", "alice")]);
        let report = crawler
            .crawl(&seed, &CookieJar::empty(), &mut NoopObserver)
            .await;

        let profile = report.profile();
        assert_eq!(profile.get("id"), report.resolved[0].info().get("id"));
        assert!(profile.contains("URL"));
    }

    #[tokio::test]
    async fn test_unroutable_seed_dispatches_nothing() {
        let crawler = Crawler::new(
            Arc::new(SiteRegistry::builtin().expect("builtin registry")),
            Router::new(),
            Arc::new(FabricatingFetcher {
                counter: Mutex::new(0),
            }),
            Arc::new(fabricating_oracle),
        );

        let seed = FactMap::from_iter([("email", "alice@example.com")]);
        let report = crawler
            .crawl(&seed, &CookieJar::empty(), &mut NoopObserver)
            .await;

        assert_eq!(report.outcome, CrawlOutcome::Completed);
        assert_eq!(report.dispatched(), 0);
    }
}
