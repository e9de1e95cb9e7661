//! Loading of the query table compiled into the binary.

use crate::{
    definition::SiteDefinitions,
    error::{Result, SiteError},
};
use tracing::info;

/// The built-in Yandex query table.
const BUILTIN_DEFINITIONS: &str = include_str!("../site-definitions/yandex.toml");

/// Parse and validate the built-in query table.
pub fn load_builtin() -> Result<SiteDefinitions> {
    let definitions = parse_definitions(BUILTIN_DEFINITIONS, "<builtin>")?;

    info!(
        provider = %definitions.provider.name,
        count = definitions.queries.len(),
        "loaded site definitions"
    );

    Ok(definitions)
}

/// Parse a TOML query table and validate it.
pub(crate) fn parse_definitions(contents: &str, origin: &str) -> Result<SiteDefinitions> {
    let definitions: SiteDefinitions =
        toml::from_str(contents).map_err(|e| SiteError::ParseError {
            origin: origin.to_string(),
            source: e,
        })?;

    definitions.validate()?;
    Ok(definitions)
}
