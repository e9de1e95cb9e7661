//! Per-identifier resolution: run every query of a kind and merge the facts.

use crate::fetch::Fetcher;
use crate::report::{capitalize, BlockStatus, QueryBlock, URL_FIELD};
use tracing::{debug, warn};
use yaseek_core::{CookieJar, FactMap, Identifier, ResolverKind};
use yaseek_extract::{blocked_facts, is_blocked, Extractor};
use yaseek_sites::{QueryDefinition, SiteRegistry};

/// Collaborators shared by every resolver of a crawl.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    /// Query tables
    pub registry: &'a SiteRegistry,
    /// Request transport
    pub fetcher: &'a dyn Fetcher,
    /// Body-to-facts oracle
    pub extractor: &'a dyn Extractor,
    /// Credentials sent with every request
    pub cookies: &'a CookieJar,
}

/// Raw result of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Query id
    pub id: String,
    /// Query title
    pub title: String,
    /// Extracted facts, empty when nothing was found
    pub facts: FactMap,
    /// Set when the request could not be made or completed
    pub failure: Option<String>,
}

/// Lookup state for one identifier.
#[derive(Debug, Clone)]
pub struct Resolver {
    kind: ResolverKind,
    identifier: Identifier,
    info: FactMap,
    results: Vec<QueryResult>,
}

impl Resolver {
    /// Create a resolver for an identifier accepted by `kind`.
    #[must_use]
    pub fn new(kind: ResolverKind, identifier: Identifier) -> Self {
        Self {
            kind,
            identifier,
            info: FactMap::new(),
            results: Vec::new(),
        }
    }

    /// Resolver kind.
    #[must_use]
    pub fn kind(&self) -> ResolverKind {
        self.kind
    }

    /// The identifier being resolved.
    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Facts aggregated across all queries.
    #[must_use]
    pub fn info(&self) -> &FactMap {
        &self.info
    }

    /// Per-query results in declaration order.
    #[must_use]
    pub fn results(&self) -> &[QueryResult] {
        &self.results
    }

    /// Run every query declared for this kind, one after another.
    ///
    /// Failures are recorded per query and never abort the remaining ones.
    pub async fn collect(&mut self, ctx: &ResolverContext<'_>) {
        let marker = ctx.registry.provider().captcha_marker.as_str();

        for query in ctx.registry.queries(self.kind) {
            let result = match self.run_query(ctx, query, marker).await {
                Ok(facts) => QueryResult {
                    id: query.id.clone(),
                    title: query.title.clone(),
                    facts,
                    failure: None,
                },
                Err(reason) => {
                    warn!(
                        query = %query.qualified_id(),
                        identifier = %self.identifier.value,
                        error = %reason,
                        "query failed"
                    );
                    QueryResult {
                        id: query.id.clone(),
                        title: query.title.clone(),
                        facts: FactMap::new(),
                        failure: Some(reason),
                    }
                }
            };

            self.record(result);
        }
    }

    /// Store a query result and fold its facts into `info`.
    pub fn record(&mut self, result: QueryResult) {
        self.info.aggregate(&result.facts);
        self.results.push(result);
    }

    async fn run_query(
        &self,
        ctx: &ResolverContext<'_>,
        query: &QueryDefinition,
        marker: &str,
    ) -> Result<FactMap, String> {
        let value = self.identifier.value.as_str();
        let request = query.prepare(value).map_err(|e| e.to_string())?;

        let body = ctx
            .fetcher
            .fetch(&request, ctx.cookies)
            .await
            .map_err(|e| e.to_string())?;

        if is_blocked(&body, marker) {
            warn!(url = %request.url, "captcha challenge detected");
            return Ok(blocked_facts());
        }

        let facts = match ctx.extractor.extract(&body) {
            Ok(facts) => facts,
            Err(e) => {
                warn!(url = %request.url, error = %e, "extraction failed");
                FactMap::new()
            }
        };

        debug!(query = %query.qualified_id(), fields = facts.len(), "query finished");
        Ok(query.finish(value, &request, facts))
    }

    /// Presentation blocks, one per query in declaration order.
    #[must_use]
    pub fn materialize(&self, provider: &str) -> Vec<QueryBlock> {
        self.results
            .iter()
            .map(|result| {
                let status = if let Some(reason) = &result.failure {
                    BlockStatus::Failed(reason.clone())
                } else if result.facts.is_empty() {
                    BlockStatus::NotFound
                } else {
                    BlockStatus::Found {
                        url: result.facts.get(URL_FIELD).map(ToString::to_string),
                        fields: result
                            .facts
                            .iter()
                            .filter(|(key, _)| key.as_str() != URL_FIELD)
                            .map(|(key, value)| (capitalize(key), value.to_string()))
                            .collect(),
                    }
                };

                QueryBlock {
                    label: format!("{provider}.{}", result.title),
                    status,
                }
            })
            .collect()
    }
}
