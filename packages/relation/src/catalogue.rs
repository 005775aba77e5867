//! TOML relation catalogues.
//!
//! The built-in catalogue is baked into the binary at compile time via
//! [`include_str!`]. User catalogues use the same schema: a list of
//! `[[relations]]` tables, each one a flat [`RelationSpec`].

use serde::Deserialize;

use crate::{RelationError, RelationSpec};

/// Built-in relations, registered by [`crate::RelationRegistry::new`].
pub const BUILTIN_TOML: &str = include_str!("../relations/builtin.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Catalogue {
    #[serde(default)]
    relations: Vec<RelationSpec>,
}

/// Parses a catalogue into flat relation records.
///
/// No category validation happens here; that is done when each record is
/// converted into a [`crate::RelationDefinition`].
///
/// # Errors
///
/// Returns [`RelationError::Config`] if the TOML is malformed or a record has
/// an unknown field or category.
pub fn parse_catalogue_toml(toml_str: &str) -> Result<Vec<RelationSpec>, RelationError> {
    toml::de::from_str::<Catalogue>(toml_str)
        .map(|catalogue| catalogue.relations)
        .map_err(|e| RelationError::Config {
            message: e.to_string(),
        })
}
