//! Ordered query lists per resolver kind.

use crate::{
    definition::{ProviderMetadata, QueryDefinition, SiteDefinitions},
    error::Result,
    loader,
};
use std::collections::BTreeMap;
use yaseek_core::ResolverKind;

/// Query definitions indexed by resolver kind, preserving declaration order.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    provider: ProviderMetadata,
    queries: BTreeMap<ResolverKind, Vec<QueryDefinition>>,
}

impl SiteRegistry {
    /// Index validated definitions by resolver kind.
    fn from_definitions(definitions: SiteDefinitions) -> Self {
        let mut queries: BTreeMap<ResolverKind, Vec<QueryDefinition>> = BTreeMap::new();
        for query in definitions.queries {
            queries.entry(query.resolver).or_default().push(query);
        }

        Self {
            provider: definitions.provider,
            queries,
        }
    }

    /// Registry over the built-in table.
    pub fn builtin() -> Result<Self> {
        Ok(Self::from_definitions(loader::load_builtin()?))
    }

    /// Provider metadata.
    #[must_use]
    pub fn provider(&self) -> &ProviderMetadata {
        &self.provider
    }

    /// Queries for a resolver kind, in declaration order.
    #[must_use]
    pub fn queries(&self, kind: ResolverKind) -> &[QueryDefinition] {
        self.queries.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of queries across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queries.values().map(Vec::len).sum()
    }

    /// Whether no query is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order_preserved() {
        let registry = SiteRegistry::builtin().expect("builtin registry");

        let ids: Vec<&str> = registry
            .queries(ResolverKind::Username)
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(
            ids,
            ["collections-api", "music", "bugbounty", "messenger-search", "music-api"]
        );

        let ids: Vec<&str> = registry
            .queries(ResolverKind::PublicUserId)
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(
            ids,
            ["collections-api", "reviews", "znatoki", "zen", "market", "o"]
        );

        assert_eq!(registry.queries(ResolverKind::MessengerGuid).len(), 1);
        assert_eq!(registry.len(), 12);
    }
}
