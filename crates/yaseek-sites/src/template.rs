//! `{placeholder}` substitution for URL, header and body templates.

use std::collections::BTreeMap;

/// Variables available to a template.
pub type Vars<'a> = BTreeMap<&'a str, &'a str>;

/// Replace every `{name}` whose name is in `vars`.
///
/// Unknown placeholders and unbalanced braces are left untouched. With
/// `encode`, substituted values are percent-encoded.
#[must_use]
pub fn render(template: &str, vars: &Vars<'_>, encode: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match vars.get(name) {
                    Some(value) if encode => out.push_str(&urlencoding::encode(value)),
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render every string inside a JSON value, leaving other scalars as they are.
#[must_use]
pub fn render_json(value: &serde_json::Value, vars: &Vars<'_>) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::String(s) => Value::String(render(s, vars, false)),
        Value::Array(items) => Value::Array(items.iter().map(|v| render_json(v, vars)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_json(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Whether the template still contains a `{...}` placeholder.
#[must_use]
pub fn has_placeholder(rendered: &str) -> bool {
    rendered
        .find('{')
        .is_some_and(|open| rendered[open..].contains('}'))
}
