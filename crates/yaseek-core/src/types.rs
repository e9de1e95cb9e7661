//! Shared types used across yaseek.
//!
//! This module defines the identifier vocabulary and the fact mapping that
//! carries everything a lookup discovers about an entity.

use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;

/// The closed set of identifier types that have a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverKind {
    /// Login name
    Username,
    /// 26-character public profile id
    #[serde(rename = "public-id")]
    PublicUserId,
    /// 36-character messenger GUID
    MessengerGuid,
}

impl ResolverKind {
    /// Every resolver kind, in routing order.
    pub const ALL: [ResolverKind; 3] = [
        ResolverKind::Username,
        ResolverKind::PublicUserId,
        ResolverKind::MessengerGuid,
    ];

    /// The kebab-case tag used in site definitions.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::PublicUserId => "public-id",
            Self::MessengerGuid => "messenger-guid",
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered (field name, value) pair.
///
/// The field name doubles as the type tag: oracle field names such as
/// `yandex_public_id` become candidate tags for routing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// Field name the value was found under
    pub field: String,
    /// Opaque identifier value
    pub value: String,
}

impl Identifier {
    /// Create a new identifier.
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.field, self.value)
    }
}

/// A fact value: a single string, or a set once two distinct strings were seen.
///
/// `Multi` always holds at least two members. It is only ever produced by
/// [`FactValue::absorb`], never constructed empty or with a single member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    /// One value
    Single(String),
    /// Two or more distinct values
    Multi(BTreeSet<String>),
}

impl FactValue {
    /// Fold another observed value into this one, promoting to a set on conflict.
    pub fn absorb(&mut self, incoming: &str) {
        match self {
            Self::Single(current) if current == incoming => {}
            Self::Single(current) => {
                let set = BTreeSet::from([std::mem::take(current), incoming.to_string()]);
                *self = Self::Multi(set);
            }
            Self::Multi(set) => {
                if !set.contains(incoming) {
                    set.insert(incoming.to_string());
                }
            }
        }
    }

    /// Iterate over every member value.
    pub fn values(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::Single(value) => Box::new(std::iter::once(value.as_str())),
            Self::Multi(set) => Box::new(set.iter().map(String::as_str)),
        }
    }

    /// The value if it is a single string.
    #[must_use]
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multi(_) => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => f.write_str(value),
            Self::Multi(set) => {
                let joined = set.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
                f.write_str(&joined)
            }
        }
    }
}

/// Field name to value mapping produced by one lookup or aggregated per entity.
///
/// Keys iterate in sorted order so that rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FactMap(BTreeMap<String, FactValue>);

impl FactMap {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the mapping has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FactValue> {
        self.0.get(field)
    }

    /// Look up a single-valued field.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(FactValue::as_single)
    }

    /// Whether the field is present.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set a field to a single value, replacing whatever was there.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), FactValue::Single(value.into()));
    }

    /// Merge one observed value into a field.
    ///
    /// New field: stored as-is. Equal single value: no change. Different single
    /// value: promoted to a two-element set. Existing set: value added.
    pub fn merge_value(&mut self, field: &str, value: &str) {
        match self.0.get_mut(field) {
            Some(existing) => existing.absorb(value),
            None => {
                self.0
                    .insert(field.to_string(), FactValue::Single(value.to_string()));
            }
        }
    }

    /// Fold every field of `other` into this mapping using the merge rule.
    ///
    /// Set-valued entries of `other` are merged member by member, which keeps
    /// the operation idempotent and order-insensitive.
    pub fn aggregate(&mut self, other: &FactMap) {
        for (field, value) in &other.0 {
            for member in value.values() {
                self.merge_value(field, member);
            }
        }
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FactValue> {
        self.0.iter()
    }

    /// Flatten into (field, value) pairs, expanding set-valued fields.
    #[must_use]
    pub fn pairs(&self) -> Vec<Identifier> {
        self.0
            .iter()
            .flat_map(|(field, value)| value.values().map(move |v| Identifier::new(field, v)))
            .collect()
    }
}

impl<'a> IntoIterator for &'a FactMap {
    type Item = (&'a String, &'a FactValue);
    type IntoIter = btree_map::Iter<'a, String, FactValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for FactMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FactMap::new();
        for (field, value) in iter {
            let field = field.into();
            let value = value.into();
            map.merge_value(&field, &value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(pairs: &[(&str, &str)]) -> FactMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_resolver_kind_serde_matches_tag() {
        for kind in ResolverKind::ALL {
            let tag = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(tag, format!("\"{}\"", kind.as_str()));

            let parsed: ResolverKind = serde_json::from_str(&tag).expect("deserialize");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_resolver_kind_reads_public_id_tag() {
        let parsed: ResolverKind = serde_json::from_str("\"public-id\"").expect("deserialize");
        assert_eq!(parsed, ResolverKind::PublicUserId);
        assert!(serde_json::from_str::<ResolverKind>("\"public-user-id\"").is_err());
    }

    #[test]
    fn test_merge_new_field() {
        let mut info = FactMap::new();
        info.aggregate(&facts(&[("username", "alice")]));
        assert_eq!(info.get_str("username"), Some("alice"));
    }

    #[test]
    fn test_merge_equal_value_is_noop() {
        let mut info = facts(&[("username", "alice")]);
        info.aggregate(&facts(&[("username", "alice")]));
        assert_eq!(info.get("username"), Some(&FactValue::Single("alice".into())));
    }

    #[test]
    fn test_merge_conflict_promotes_to_set() {
        let mut info = facts(&[("k", "a")]);
        info.aggregate(&facts(&[("k", "b")]));

        let expected = BTreeSet::from(["a".to_string(), "b".to_string()]);
        assert_eq!(info.get("k"), Some(&FactValue::Multi(expected)));
    }

    #[test]
    fn test_merge_adds_to_existing_set() {
        let mut info = facts(&[("k", "a")]);
        info.aggregate(&facts(&[("k", "b")]));
        info.aggregate(&facts(&[("k", "c")]));
        info.aggregate(&facts(&[("k", "a")]));

        match info.get("k") {
            Some(FactValue::Multi(set)) => assert_eq!(set.len(), 3),
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let incoming = facts(&[("k", "b"), ("name", "Alice"), ("id", "42")]);

        let mut once = facts(&[("k", "a")]);
        once.aggregate(&incoming);

        let mut twice = once.clone();
        twice.aggregate(&incoming);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_conflict_is_order_insensitive() {
        let mut forward = FactMap::new();
        forward.aggregate(&facts(&[("k", "a")]));
        forward.aggregate(&facts(&[("k", "b")]));

        let mut reverse = FactMap::new();
        reverse.aggregate(&facts(&[("k", "b")]));
        reverse.aggregate(&facts(&[("k", "a")]));

        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_aggregating_set_valued_map() {
        let mut left = facts(&[("k", "a")]);
        left.aggregate(&facts(&[("k", "b")]));

        let mut target = facts(&[("k", "a")]);
        target.aggregate(&left);

        assert_eq!(target, left);
    }

    #[test]
    fn test_pairs_expand_sets() {
        let mut info = facts(&[("k", "a"), ("username", "alice")]);
        info.aggregate(&facts(&[("k", "b")]));

        let pairs = info.pairs();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&Identifier::new("k", "a")));
        assert!(pairs.contains(&Identifier::new("k", "b")));
        assert!(pairs.contains(&Identifier::new("username", "alice")));
    }

    #[test]
    fn test_set_display_is_sorted() {
        let mut info = facts(&[("k", "zeta")]);
        info.aggregate(&facts(&[("k", "alpha")]));
        let rendered = info.get("k").map(ToString::to_string);
        assert_eq!(rendered.as_deref(), Some("alpha, zeta"));
    }

    #[test]
    fn test_fact_map_serializes_as_object() {
        let mut info = facts(&[("k", "a"), ("name", "Alice")]);
        info.aggregate(&facts(&[("k", "b")]));
        let json = serde_json::to_value(&info).expect("serialize");
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["k"], serde_json::json!(["a", "b"]));
    }
}
