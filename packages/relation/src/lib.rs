#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Registry of named spatial relations.
//!
//! [`RelationRegistry::new`] starts from the built-in catalogue embedded at
//! compile time (`relations/builtin.toml`). Additional relations can be
//! registered one at a time or loaded from a user TOML file with the same
//! schema.
//!
//! The registry is built during setup and read afterwards. It does no
//! internal locking: finish every registration before sharing it across
//! threads.

pub mod catalogue;
mod prompt;

use std::collections::BTreeMap;
use std::path::Path;

pub use search_area_relation_models::{
    BufferOrigin, CompassDirection, InvalidRelationDefinition, RelationCategory,
    RelationDefinition, RelationKind, RelationSpec, SECTOR_WIDTH_DEGREES,
};

/// Errors that can occur while registering or resolving relations.
#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    /// No relation with this name is registered.
    #[error("unknown spatial relation '{name}' (available: {available})")]
    UnknownRelation {
        /// The name that failed to resolve.
        name: String,
        /// Comma-separated, sorted list of registered names.
        available: String,
    },

    /// A relation with this name is already registered.
    #[error("spatial relation '{name}' is already registered")]
    DuplicateRelation {
        /// The conflicting name.
        name: String,
    },

    /// The definition is missing required fields or carries forbidden ones.
    #[error(transparent)]
    InvalidDefinition(#[from] InvalidRelationDefinition),

    /// A relation catalogue could not be parsed.
    #[error("relation catalogue error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// A relation catalogue file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Named spatial relations, kept in registration order.
#[derive(Debug, Clone)]
pub struct RelationRegistry {
    relations: Vec<RelationDefinition>,
    by_name: BTreeMap<String, usize>,
}

impl Default for RelationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationRegistry {
    /// Creates a registry holding the built-in catalogue.
    ///
    /// # Panics
    ///
    /// Panics if the embedded built-in catalogue is malformed.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry
            .load_toml_str(catalogue::BUILTIN_TOML)
            .unwrap_or_else(|e| panic!("Failed to load builtin relations: {e}"));
        registry
    }

    /// Creates a registry with no relations at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            relations: Vec::new(),
            by_name: BTreeMap::new(),
        }
    }

    /// Adds a relation.
    ///
    /// # Errors
    ///
    /// * [`RelationError::DuplicateRelation`] if the name is taken. The
    ///   existing entry is left untouched.
    /// * [`RelationError::InvalidDefinition`] if the name or defaults are
    ///   invalid.
    pub fn register(&mut self, definition: RelationDefinition) -> Result<(), RelationError> {
        if self.by_name.contains_key(definition.name()) {
            return Err(RelationError::DuplicateRelation {
                name: definition.name().to_string(),
            });
        }
        definition.validate()?;

        log::debug!(
            "Registered {} relation '{}'",
            definition.category(),
            definition.name()
        );
        self.by_name
            .insert(definition.name().to_string(), self.relations.len());
        self.relations.push(definition);
        Ok(())
    }

    /// Looks up a relation by name.
    ///
    /// # Errors
    ///
    /// Returns [`RelationError::UnknownRelation`] carrying the name if it is
    /// not registered.
    pub fn get(&self, name: &str) -> Result<&RelationDefinition, RelationError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.relations[idx])
            .ok_or_else(|| RelationError::UnknownRelation {
                name: name.to_string(),
                available: self
                    .by_name
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names of registered relations in registration order, optionally
    /// restricted to one category.
    #[must_use]
    pub fn list_by_category(&self, category: Option<RelationCategory>) -> Vec<&str> {
        self.relations
            .iter()
            .filter(|r| category.is_none_or(|c| r.category() == c))
            .map(RelationDefinition::name)
            .collect()
    }

    /// Iterates over all relations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationDefinition> {
        self.relations.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Registers every relation in a TOML catalogue, in file order.
    ///
    /// Stops at the first invalid or duplicate entry. Entries before it stay
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns [`RelationError::Config`] if the TOML is malformed, or the
    /// first registration error.
    pub fn load_toml_str(&mut self, toml_str: &str) -> Result<usize, RelationError> {
        let specs = catalogue::parse_catalogue_toml(toml_str)?;
        let count = specs.len();
        for spec in specs {
            self.register(RelationDefinition::try_from(spec)?)?;
        }
        Ok(count)
    }

    /// Reads `path` and registers its relations. See [`Self::load_toml_str`].
    ///
    /// # Errors
    ///
    /// Returns [`RelationError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::load_toml_str`].
    pub fn load_toml_file(&mut self, path: &Path) -> Result<usize, RelationError> {
        let contents = std::fs::read_to_string(path)?;
        let count = self.load_toml_str(&contents)?;
        log::info!("Loaded {count} relations from {}", path.display());
        Ok(count)
    }

    /// Renders the catalogue as vocabulary for a language model prompt.
    #[must_use]
    pub fn describe_for_prompt(&self) -> String {
        prompt::describe(self)
    }
}
