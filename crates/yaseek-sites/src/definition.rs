//! Query definition types and request preparation.
//!
//! This module defines the data structures for query tables loaded from TOML
//! and turns a query plus an identifier into a concrete request.

use crate::error::{Result, SiteError};
use crate::template::{self, Vars};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use yaseek_core::{FactMap, ResolverKind};

/// A complete query table: provider metadata plus ordered queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDefinitions {
    /// Provider metadata
    pub provider: ProviderMetadata,

    /// Queries in declaration order
    #[serde(rename = "query", default)]
    pub queries: Vec<QueryDefinition>,
}

impl SiteDefinitions {
    /// Validate provider metadata and every query.
    pub fn validate(&self) -> Result<()> {
        if self.provider.name.trim().is_empty() {
            return Err(SiteError::ValidationError {
                query_id: "provider".to_string(),
                reason: "provider name cannot be empty".to_string(),
            });
        }

        if self.provider.captcha_marker.is_empty() {
            return Err(SiteError::ValidationError {
                query_id: "provider".to_string(),
                reason: "captcha marker cannot be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for query in &self.queries {
            query.validate()?;
            if !seen.insert((query.resolver, query.id.as_str())) {
                return Err(SiteError::ValidationError {
                    query_id: query.qualified_id(),
                    reason: "duplicate query id for this resolver".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Provider-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Label prefix in reports (e.g. "Yandex")
    pub name: String,

    /// Substring identifying an anti-bot challenge page
    pub captcha_marker: String,
}

/// One named lookup run for every identifier of a resolver kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDefinition {
    /// Identifier kind this query accepts
    pub resolver: ResolverKind,

    /// Kebab-case id, unique within the resolver kind
    pub id: String,

    /// Presentation label
    pub title: String,

    /// How to build the request
    pub request: RequestTemplate,
}

impl QueryDefinition {
    /// `resolver/id`, for log and error messages.
    #[must_use]
    pub fn qualified_id(&self) -> String {
        format!("{}/{}", self.resolver, self.id)
    }

    /// Validate the query for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        static ID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex =
            ID_REGEX.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("valid regex"));

        if !regex.is_match(&self.id) {
            return Err(self.invalid(format!(
                "query id must be lowercase alphanumeric with hyphens, got '{}'",
                self.id
            )));
        }

        if self.title.trim().is_empty() {
            return Err(self.invalid("title cannot be empty".to_string()));
        }

        let url = self.request.url();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(self.invalid(format!("URL must be http(s), got '{url}'")));
        }

        if let RequestTemplate::Rpc {
            rpc_method,
            success,
            ..
        } = &self.request
        {
            if rpc_method.trim().is_empty() {
                return Err(self.invalid("rpc_method cannot be empty".to_string()));
            }
            if let SuccessRule::FieldPresent { field } = success {
                if field.trim().is_empty() {
                    return Err(self.invalid("success field cannot be empty".to_string()));
                }
            }
        }

        Ok(())
    }

    /// Build the concrete request for an identifier.
    pub fn prepare(&self, identifier: &str) -> Result<PreparedRequest> {
        let vars: Vars<'_> = BTreeMap::from([("id", identifier)]);

        match &self.request {
            RequestTemplate::Get {
                url,
                display_url,
                headers,
            } => {
                let display_url =
                    template::render(display_url.as_ref().unwrap_or(url), &vars, false);
                let url = template::render(url, &vars, true);
                let headers = headers
                    .iter()
                    .map(|(name, value)| (name.clone(), template::render(value, &vars, true)))
                    .collect();

                Ok(PreparedRequest {
                    method: HttpMethod::Get,
                    url,
                    display_url,
                    headers,
                })
            }
            RequestTemplate::Rpc {
                url,
                rpc_method,
                params,
                form_field,
                ..
            } => {
                let body = serde_json::json!({
                    "method": rpc_method,
                    "params": template::render_json(params, &vars),
                });

                Ok(PreparedRequest {
                    method: HttpMethod::PostMultipart {
                        field: form_field.clone(),
                        body: serde_json::to_string(&body)?,
                    },
                    display_url: template::render(url, &vars, false),
                    url: template::render(url, &vars, true),
                    headers: BTreeMap::new(),
                })
            }
        }
    }

    /// Attach `URL` to extracted facts when the query's success rule is met.
    #[must_use]
    pub fn finish(&self, identifier: &str, request: &PreparedRequest, mut facts: FactMap) -> FactMap {
        if facts.is_empty() {
            return facts;
        }

        match &self.request {
            RequestTemplate::Get { .. } => {
                facts.insert("URL", request.display_url.clone());
                facts
            }
            RequestTemplate::Rpc { success, link, .. } => {
                if !success.is_met(&facts) {
                    return facts;
                }

                if let Some(link) = link {
                    let mut vars: Vars<'_> = facts
                        .iter()
                        .filter_map(|(field, value)| {
                            value.as_single().map(|v| (field.as_str(), v))
                        })
                        .collect();
                    vars.insert("id", identifier);

                    let rendered = template::render(link, &vars, false);
                    if !template::has_placeholder(&rendered) {
                        facts.insert("URL", rendered);
                    }
                }
                facts
            }
        }
    }

    fn invalid(&self, reason: String) -> SiteError {
        SiteError::ValidationError {
            query_id: self.qualified_id(),
            reason,
        }
    }
}

/// Request template, tagged by `method`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum RequestTemplate {
    /// Plain GET of a page or JSON endpoint
    Get {
        /// URL template
        url: String,
        /// Human-facing URL attached to results instead of `url`
        #[serde(default)]
        display_url: Option<String>,
        /// Extra headers (values are templates)
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },

    /// JSON remote procedure call sent as a multipart form field
    Rpc {
        /// Endpoint URL
        url: String,
        /// Remote procedure name
        rpc_method: String,
        /// Procedure parameters; every string is a template
        #[serde(default)]
        params: serde_json::Value,
        /// Multipart field carrying the JSON body
        #[serde(default = "default_form_field")]
        form_field: String,
        /// What counts as a hit
        success: SuccessRule,
        /// Deep link attached as `URL` on success
        #[serde(default)]
        link: Option<String>,
    },
}

impl RequestTemplate {
    /// The endpoint URL template.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Get { url, .. } | Self::Rpc { url, .. } => url,
        }
    }
}

fn default_form_field() -> String {
    "request".to_string()
}

/// When an RPC response counts as a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SuccessRule {
    /// Any extracted field
    NonEmpty,
    /// A specific field must be present
    FieldPresent {
        /// Required field name
        field: String,
    },
}

impl SuccessRule {
    /// Check the rule against extracted facts.
    #[must_use]
    pub fn is_met(&self, facts: &FactMap) -> bool {
        match self {
            Self::NonEmpty => !facts.is_empty(),
            Self::FieldPresent { field } => facts.contains(field),
        }
    }
}

/// HTTP verb and body of a prepared request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET with no body
    Get,
    /// POST with a single multipart text field
    PostMultipart {
        /// Form field name
        field: String,
        /// Field content (JSON)
        body: String,
    },
}

/// A fully rendered request ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Verb and body
    pub method: HttpMethod,
    /// Request URL
    pub url: String,
    /// URL reported alongside results
    pub display_url: String,
    /// Extra headers
    pub headers: BTreeMap<String, String>,
}
