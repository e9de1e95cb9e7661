//! Scheme-based extractor for the provider's profile pages and APIs.
//!
//! Each scheme recognises one response shape and lists where its fields
//! live. Schemes are tried in order and the first one that recognises the
//! body decides the result.

use crate::error::Result;
use crate::oracle::Extractor;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, warn};
use yaseek_core::FactMap;

/// A field read from an HTML element: its text, or one of its attributes.
#[derive(Debug, Clone, Copy)]
struct HtmlField {
    field: &'static str,
    selector: &'static str,
    attr: Option<&'static str>,
}

/// One recognisable response shape.
#[derive(Debug, Clone)]
enum Scheme {
    /// JSON body; applies when `detect` (a JSON pointer) resolves.
    Json {
        name: &'static str,
        detect: &'static str,
        fields: Vec<(&'static str, &'static str)>,
    },
    /// HTML page; applies when the `detect` CSS selector matches an element.
    Html {
        name: &'static str,
        detect: &'static str,
        fields: Vec<HtmlField>,
    },
    /// State object embedded in a page script; applies when `detect` occurs
    /// in the body. The first capture group of each regex is the value.
    Embedded {
        name: &'static str,
        detect: &'static str,
        fields: &'static [(&'static str, Regex)],
    },
}

impl Scheme {
    fn name(&self) -> &'static str {
        match self {
            Self::Json { name, .. } | Self::Html { name, .. } | Self::Embedded { name, .. } => *name,
        }
    }
}

/// A parsed response body.
enum Body<'a> {
    Json(Value),
    Markup { raw: &'a str, document: Html },
}

/// Default [`Extractor`] built from the provider's known response shapes.
#[derive(Debug, Clone)]
pub struct SchemeExtractor {
    schemes: Vec<Scheme>,
}

impl Default for SchemeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemeExtractor {
    /// Extractor with the built-in schemes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schemes: default_schemes(),
        }
    }

    fn extract_json(json: &Value, fields: &[(&'static str, &'static str)]) -> FactMap {
        let mut facts = FactMap::new();
        for (field, pointer) in fields {
            if let Some(value) = json.pointer(pointer).and_then(scalar_to_string) {
                facts.insert(*field, value);
            }
        }
        facts
    }

    fn extract_html(document: &Html, fields: &[HtmlField]) -> FactMap {
        let mut facts = FactMap::new();
        for rule in fields {
            let Some(selector) = parse_selector(rule.selector) else {
                continue;
            };

            let value = document
                .select(&selector)
                .next()
                .and_then(|element| element_value(&element, rule.attr))
                .filter(|v| !v.is_empty());
            if let Some(value) = value {
                facts.insert(rule.field, value);
            }
        }
        facts
    }

    fn extract_embedded(body: &str, fields: &[(&'static str, Regex)]) -> FactMap {
        let mut facts = FactMap::new();
        for (field, regex) in fields {
            let value = regex
                .captures(body)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty());
            if let Some(value) = value {
                facts.insert(*field, value);
            }
        }
        facts
    }
}

impl Extractor for SchemeExtractor {
    fn extract(&self, body: &str) -> Result<FactMap> {
        let trimmed = body.trim_start();
        let parsed = if trimmed.starts_with('{') || trimmed.starts_with('[') {
            Body::Json(serde_json::from_str::<Value>(trimmed)?)
        } else {
            Body::Markup {
                raw: body,
                document: Html::parse_document(body),
            }
        };

        for scheme in &self.schemes {
            let facts = match (scheme, &parsed) {
                (Scheme::Json { detect, fields, .. }, Body::Json(json)) => {
                    if json.pointer(detect).is_none() {
                        continue;
                    }
                    Self::extract_json(json, fields)
                }
                (Scheme::Html { detect, fields, .. }, Body::Markup { document, .. }) => {
                    let Some(selector) = parse_selector(detect) else {
                        continue;
                    };
                    if document.select(&selector).next().is_none() {
                        continue;
                    }
                    Self::extract_html(document, fields)
                }
                (Scheme::Embedded { detect, fields, .. }, Body::Markup { raw, .. }) => {
                    if !raw.contains(detect) {
                        continue;
                    }
                    Self::extract_embedded(raw, fields)
                }
                _ => continue,
            };

            debug!(scheme = scheme.name(), fields = facts.len(), "scheme matched");
            return Ok(facts);
        }

        Ok(FactMap::new())
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector, error = %e, "invalid CSS selector");
            None
        }
    }
}

fn element_value(element: &ElementRef<'_>, attr: Option<&str>) -> Option<String> {
    match attr {
        Some(attr) => element.value().attr(attr).map(|v| v.trim().to_string()),
        None => Some(element.text().collect::<String>().trim().to_string()),
    }
}

/// Stringify a JSON scalar; containers, null and empty strings yield `None`.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("valid built-in regex")
}

fn embedded_state_fields() -> &'static [(&'static str, Regex)] {
    static FIELDS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    FIELDS.get_or_init(|| {
        vec![
            ("yandex_public_id", pattern(r#""publicId"\s*:\s*"([A-Za-z0-9_-]{26})""#)),
            ("fullname", pattern(r#""displayName"\s*:\s*"([^"]+)""#)),
            ("username", pattern(r#""login"\s*:\s*"([^"]+)""#)),
            ("image", pattern(r#""avatarUrl"\s*:\s*"([^"]+)""#)),
        ]
    })
}

fn default_schemes() -> Vec<Scheme> {
    vec![
        Scheme::Json {
            name: "collections_api",
            detect: "/public_id",
            fields: vec![
                ("yandex_public_id", "/public_id"),
                ("fullname", "/display_name"),
                ("is_passport", "/is_passport"),
                ("is_restricted", "/is_restricted"),
                ("is_forbid", "/is_forbid"),
                ("is_km", "/is_km"),
                ("is_business", "/is_business"),
            ],
        },
        Scheme::Json {
            name: "music_library",
            detect: "/owner/uid",
            fields: vec![
                ("yandex_uid", "/owner/uid"),
                ("username", "/owner/login"),
                ("fullname", "/owner/name"),
                ("gender", "/owner/sex"),
            ],
        },
        Scheme::Json {
            name: "music_api",
            detect: "/result/uid",
            fields: vec![
                ("yandex_uid", "/result/uid"),
                ("username", "/result/login"),
                ("fullname", "/result/fullName"),
                ("display_name", "/result/displayName"),
            ],
        },
        Scheme::Json {
            name: "messenger_search",
            detect: "/data/users_and_chats/items/0/data/guid",
            fields: vec![
                (
                    "yandex_messenger_guid",
                    "/data/users_and_chats/items/0/data/guid",
                ),
                ("fullname", "/data/users_and_chats/items/0/data/display_name"),
                ("is_robot", "/data/users_and_chats/items/0/data/is_robot"),
            ],
        },
        Scheme::Json {
            name: "messenger_users",
            detect: "/data/users/0/guid",
            fields: vec![
                ("yandex_messenger_guid", "/data/users/0/guid"),
                ("fullname", "/data/users/0/display_name"),
                ("image", "/data/users/0/avatar_url"),
                ("is_robot", "/data/users/0/is_robot"),
                ("position", "/data/users/0/position"),
            ],
        },
        Scheme::Html {
            name: "bugbounty",
            detect: ".researcher",
            fields: vec![
                HtmlField {
                    field: "fullname",
                    selector: ".researcher__name",
                    attr: None,
                },
                HtmlField {
                    field: "image",
                    selector: "img.researcher__avatar",
                    attr: Some("src"),
                },
                HtmlField {
                    field: "url",
                    selector: "a.researcher__link",
                    attr: Some("href"),
                },
            ],
        },
        Scheme::Embedded {
            name: "embedded_profile",
            detect: "\"publicId\"",
            fields: embedded_state_fields(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    #[test]
    fn test_collections_api() {
        let body = r#"{"public_id": "c48fhxw0qppa50289r5c9ku4k4", "display_name": "Alice", "is_km": false, "stats": {}}"#;
        let facts = SchemeExtractor::new().extract(body).expect("extract");
        assert_eq!(facts.get_str("yandex_public_id"), Some("c48fhxw0qppa50289r5c9ku4k4"));
        assert_eq!(facts.get_str("fullname"), Some("Alice"));
        assert_eq!(facts.get_str("is_km"), Some("false"));
        assert!(!facts.contains("is_business"));
    }

    #[test]
    fn test_music_library_numbers_stringified() {
        let body = r#"{"owner": {"uid": 123456, "login": "alice", "name": "Alice", "sex": "female"}}"#;
        let facts = SchemeExtractor::new().extract(body).expect("extract");
        assert_eq!(facts.get_str("yandex_uid"), Some("123456"));
        assert_eq!(facts.get_str("username"), Some("alice"));
    }

    #[test]
    fn test_messenger_search() {
        let body = r#"{"data": {"users_and_chats": {"items": [{"data": {"guid": "12345678-1234-1234-1234-123456789012", "display_name": "Alice"}}]}}}"#;
        let facts = SchemeExtractor::new().extract(body).expect("extract");
        assert_eq!(
            facts.get_str("yandex_messenger_guid"),
            Some("12345678-1234-1234-1234-123456789012")
        );
    }

    #[test]
    fn test_embedded_profile_page() {
        let body = r#"<html><script>window.__STATE__ = {"user":{"publicId":"c48fhxw0qppa50289r5c9ku4k4","displayName":"Alice A."}}</script></html>"#;
        let facts = SchemeExtractor::new().extract(body).expect("extract");
        assert_eq!(facts.get_str("yandex_public_id"), Some("c48fhxw0qppa50289r5c9ku4k4"));
        assert_eq!(facts.get_str("fullname"), Some("Alice A."));
        assert!(!facts.contains("username"));
    }

    #[test]
    fn test_bugbounty_page() {
        let body = r#"<html><body>
            <div class="researcher card">
              <span class="researcher__name"> Alice </span>
              <img class="researcher__avatar" src="https://avatars.example/alice.png">
              <a class="researcher__link" href="https://github.com/alice">profile</a>
            </div>
        </body></html>"#;
        let facts = SchemeExtractor::new().extract(body).expect("extract");
        assert_eq!(facts.get_str("fullname"), Some("Alice"));
        assert_eq!(facts.get_str("image"), Some("https://avatars.example/alice.png"));
        assert_eq!(facts.get_str("url"), Some("https://github.com/alice"));
    }

    #[test]
    fn test_class_name_in_text_is_not_a_researcher_page() {
        let body = "<html><body><p>class=\"researcher__name\" appears only as text</p></body></html>";
        let facts = SchemeExtractor::new().extract(body).expect("extract");
        assert!(facts.is_empty());
    }

    #[test]
    fn test_unknown_page_is_empty() {
        let facts = SchemeExtractor::new()
            .extract("<html><body>404</body></html>")
            .expect("extract");
        assert!(facts.is_empty());

        let facts = SchemeExtractor::new()
            .extract(r#"{"error": "not found"}"#)
            .expect("extract");
        assert!(facts.is_empty());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let result = SchemeExtractor::new().extract(r#"{"public_id": "#);
        assert!(matches!(result, Err(ExtractError::MalformedJson(_))));
    }
}
