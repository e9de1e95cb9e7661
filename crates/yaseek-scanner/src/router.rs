//! Identifier routing: which resolver kinds accept a discovered value.

use regex::Regex;
use tracing::debug;
use yaseek_core::ResolverKind;

/// Extra acceptance check for one resolver kind.
pub trait ValidationHook: Send + Sync {
    /// Whether `value` may be looked up.
    fn accepts(&self, value: &str) -> bool;
}

impl<F> ValidationHook for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accepts(&self, value: &str) -> bool {
        self(value)
    }
}

/// Accepts values matching a regular expression.
#[derive(Debug, Clone)]
pub struct PatternHook(Regex);

impl PatternHook {
    /// Compile a pattern hook.
    pub fn new(pattern: &str) -> crate::Result<Self> {
        Ok(Self(Regex::new(pattern)?))
    }
}

impl ValidationHook for PatternHook {
    fn accepts(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

/// Built-in shape rule for one resolver kind.
#[derive(Debug, Clone, Copy)]
struct IdentifierRule {
    kind: ResolverKind,
    fields: &'static [&'static str],
    exact_len: Option<usize>,
    requires_hyphen: bool,
}

impl IdentifierRule {
    const fn for_kind(kind: ResolverKind) -> Self {
        match kind {
            ResolverKind::Username => Self {
                kind,
                fields: &["username"],
                exact_len: None,
                requires_hyphen: false,
            },
            ResolverKind::PublicUserId => Self {
                kind,
                fields: &["yandex_public_id", "id"],
                exact_len: Some(26),
                requires_hyphen: false,
            },
            ResolverKind::MessengerGuid => Self {
                kind,
                fields: &["yandex_messenger_guid"],
                exact_len: Some(36),
                requires_hyphen: true,
            },
        }
    }

    fn accepts(&self, field: &str, value: &str) -> bool {
        if !self.fields.iter().any(|f| *f == field) {
            return false;
        }
        if let Some(len) = self.exact_len {
            if value.chars().count() != len {
                return false;
            }
        }
        !self.requires_hyphen || value.contains('-')
    }
}

/// Stateless routing over the built-in rules plus optional hooks.
pub struct Router {
    rules: Vec<IdentifierRule>,
    hooks: Vec<(ResolverKind, Box<dyn ValidationHook>)>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router over every resolver kind with no extra hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: ResolverKind::ALL
                .into_iter()
                .map(IdentifierRule::for_kind)
                .collect(),
            hooks: Vec::new(),
        }
    }

    /// Add a hook that must also accept values routed to `kind`.
    #[must_use]
    pub fn with_hook(mut self, kind: ResolverKind, hook: impl ValidationHook + 'static) -> Self {
        self.hooks.push((kind, Box::new(hook)));
        self
    }

    /// Let `kind` also accept any value filed under `fields`.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_rule(mut self, kind: ResolverKind, fields: &'static [&'static str]) -> Self {
        self.rules.push(IdentifierRule {
            kind,
            fields,
            exact_len: None,
            requires_hyphen: false,
        });
        self
    }

    /// Whether `kind` accepts the pair.
    #[must_use]
    pub fn accepts(&self, kind: ResolverKind, field: &str, value: &str) -> bool {
        let shape_ok = self
            .rules
            .iter()
            .any(|rule| rule.kind == kind && rule.accepts(field, value));
        if !shape_ok {
            return false;
        }

        let hooks_ok = self
            .hooks
            .iter()
            .filter(|(hook_kind, _)| *hook_kind == kind)
            .all(|(_, hook)| hook.accepts(value));
        if !hooks_ok {
            debug!(%kind, field, value, "rejected by validation hook");
        }
        hooks_ok
    }

    /// Every kind accepting the pair, in routing order.
    #[must_use]
    pub fn route(&self, field: &str, value: &str) -> Vec<ResolverKind> {
        ResolverKind::ALL
            .into_iter()
            .filter(|kind| self.accepts(*kind, field, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_ID: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAA";
    const GUID: &str = "12345678-1234-1234-1234-123456789012";

    #[test]
    fn test_username_accepts_any_value() {
        let router = Router::new();
        assert_eq!(router.route("username", "alice"), [ResolverKind::Username]);
        assert_eq!(router.route("username", PUBLIC_ID), [ResolverKind::Username]);
    }

    #[test]
    fn test_public_id_requires_length() {
        let router = Router::new();
        assert_eq!(router.route("id", PUBLIC_ID), [ResolverKind::PublicUserId]);
        assert_eq!(
            router.route("yandex_public_id", PUBLIC_ID),
            [ResolverKind::PublicUserId]
        );
        assert!(router.route("id", "short").is_empty());
        assert!(router.route("id", &format!("{PUBLIC_ID}A")).is_empty());
    }

    #[test]
    fn test_public_id_counts_characters() {
        let router = Router::new();
        let cyrillic = "ж".repeat(26);
        assert_eq!(router.route("id", &cyrillic), [ResolverKind::PublicUserId]);
    }

    #[test]
    fn test_messenger_guid_rules() {
        let router = Router::new();
        assert_eq!(
            router.route("yandex_messenger_guid", GUID),
            [ResolverKind::MessengerGuid]
        );

        let no_hyphen = "1".repeat(36);
        assert!(router.route("yandex_messenger_guid", &no_hyphen).is_empty());
        assert!(router.route("id", GUID).is_empty());
    }

    #[test]
    fn test_unknown_fields_never_route() {
        let router = Router::new();
        assert!(router.route("Error", "Captcha detected").is_empty());
        assert!(router.route("URL", "https://yandex.ru/chat#/user/x").is_empty());
        assert!(router.route("fullname", "Alice").is_empty());
    }

    #[test]
    fn test_hook_restricts_kind() {
        let hook = PatternHook::new(r"^[a-z0-9._-]{1,30}$").expect("valid pattern");
        let router = Router::new().with_hook(ResolverKind::Username, hook);

        assert_eq!(router.route("username", "alice"), [ResolverKind::Username]);
        assert!(router.route("username", "Alice Smith").is_empty());
        assert_eq!(router.route("id", PUBLIC_ID), [ResolverKind::PublicUserId]);
    }

    #[test]
    fn test_closure_hook() {
        let router =
            Router::new().with_hook(ResolverKind::PublicUserId, |v: &str| v.starts_with('A'));
        assert!(router.accepts(ResolverKind::PublicUserId, "id", PUBLIC_ID));
        assert!(!router.accepts(ResolverKind::PublicUserId, "id", &"B".repeat(26)));
    }

    #[test]
    fn test_extra_rule_routes_in_kind_order() {
        let router = Router::new().with_rule(ResolverKind::PublicUserId, &["username"]);
        assert_eq!(
            router.route("username", "alice"),
            [ResolverKind::Username, ResolverKind::PublicUserId]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternHook::new("(").is_err());
    }
}
