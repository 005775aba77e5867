#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place type hierarchy.
//!
//! A fixed two-level taxonomy maps broad categories ("water") to the
//! concrete type tags a geographic datasource understands ("lake", "river").
//! [`TypeHierarchy::get_matching_types`] resolves a caller's type hint
//! against the types a particular datasource actually advertises.
//!
//! The taxonomy is compiled in and never changes, so one process-wide
//! [`TypeHierarchy::global`] instance serves every caller.

mod taxonomy;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::str::FromStr as _;
use std::sync::LazyLock;

pub use taxonomy::TypeCategory;

/// Error returned when a type token names neither a type the datasource
/// offers nor a known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type '{token}': not an available type or a known category")]
pub struct UnknownTypeError {
    /// The token as the caller supplied it.
    pub token: String,
}

static GLOBAL: LazyLock<TypeHierarchy> = LazyLock::new(TypeHierarchy::build);

/// Read-only access to the place type taxonomy.
#[derive(Debug)]
pub struct TypeHierarchy {
    /// Concrete type to owning category.
    category_by_type: BTreeMap<&'static str, TypeCategory>,
}

impl TypeHierarchy {
    fn build() -> Self {
        let category_by_type = TypeCategory::all()
            .iter()
            .flat_map(|&category| category.types().iter().map(move |&t| (t, category)))
            .collect();
        Self { category_by_type }
    }

    /// The process-wide hierarchy.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn categories(&self) -> &'static [TypeCategory] {
        TypeCategory::all()
    }

    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn types_in(&self, category: TypeCategory) -> &'static [&'static str] {
        category.types()
    }

    /// Looks up the category a concrete type belongs to, ignoring case.
    #[must_use]
    pub fn category_of(&self, concrete_type: &str) -> Option<TypeCategory> {
        self.category_by_type
            .get(concrete_type.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    /// Resolves `token` against the types a datasource offers.
    ///
    /// An exact (case-insensitive) match in `available` wins and yields just
    /// that type, spelled the way the datasource spells it. Otherwise, if
    /// `token` names a category, the result is every available type in that
    /// category. That intersection may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTypeError`] if `token` is neither an available type
    /// nor a category name.
    pub fn get_matching_types<S: AsRef<str>>(
        &self,
        token: &str,
        available: &[S],
    ) -> Result<BTreeSet<String>, UnknownTypeError> {
        let needle = token.trim();

        if let Some(exact) = available
            .iter()
            .map(AsRef::as_ref)
            .find(|t| t.trim().eq_ignore_ascii_case(needle))
        {
            return Ok(BTreeSet::from([exact.to_string()]));
        }

        let category = TypeCategory::from_str(needle).map_err(|_| UnknownTypeError {
            token: token.to_string(),
        })?;

        let matches: BTreeSet<String> = available
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| self.category_of(t) == Some(category))
            .map(ToString::to_string)
            .collect();

        if matches.is_empty() {
            log::debug!(
                "Category '{category}' has no types among the {} available",
                available.len()
            );
        }

        Ok(matches)
    }

    /// Renders the taxonomy as prompt vocabulary, one category per line.
    #[must_use]
    pub fn describe_for_prompt(&self) -> String {
        let mut out = String::from("LOCATION TYPES (category: concrete types):\n");
        for &category in self.categories() {
            writeln!(
                out,
                "  • {category}: {}",
                self.types_in(category).join(", ")
            )
            .unwrap();
        }
        out
    }
}

/// A datasource that can only produce certain concrete place types.
pub trait AvailableTypes {
    /// The concrete type tags this datasource can return.
    fn available_types(&self) -> Vec<String>;
}

/// Resolves a type hint against what `source` offers.
///
/// # Errors
///
/// Returns [`UnknownTypeError`] under the same conditions as
/// [`TypeHierarchy::get_matching_types`].
pub fn resolve_type_hint(
    source: &impl AvailableTypes,
    token: &str,
) -> Result<BTreeSet<String>, UnknownTypeError> {
    TypeHierarchy::global().get_matching_types(token, &source.available_types())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AVAILABLE: [&str; 3] = ["lake", "city", "river"];

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn category_expands_to_available_members() {
        let matches = TypeHierarchy::global()
            .get_matching_types("water", &AVAILABLE)
            .unwrap();
        assert_eq!(matches, set(&["lake", "river"]));
    }

    #[test]
    fn concrete_type_matches_itself() {
        let matches = TypeHierarchy::global()
            .get_matching_types("lake", &AVAILABLE)
            .unwrap();
        assert_eq!(matches, set(&["lake"]));
    }

    #[test]
    fn unknown_token_is_an_error() {
        let err = TypeHierarchy::global()
            .get_matching_types("ocean", &AVAILABLE)
            .unwrap_err();
        assert_eq!(
            err,
            UnknownTypeError {
                token: "ocean".to_string()
            }
        );
        assert!(err.to_string().contains("ocean"));
    }

    #[test]
    fn matching_ignores_case_and_keeps_datasource_spelling() {
        let hierarchy = TypeHierarchy::global();
        assert_eq!(
            hierarchy.get_matching_types("LAKE", &AVAILABLE).unwrap(),
            set(&["lake"])
        );
        assert_eq!(
            hierarchy.get_matching_types("lake", &["Lake", "City"]).unwrap(),
            set(&["Lake"])
        );
        assert_eq!(
            hierarchy.get_matching_types("Water", &AVAILABLE).unwrap(),
            set(&["lake", "river"])
        );
    }

    #[test]
    fn exact_match_takes_precedence_over_category() {
        let hierarchy = TypeHierarchy::global();
        assert_eq!(
            hierarchy
                .get_matching_types("island", &["island", "islet"])
                .unwrap(),
            set(&["island"])
        );
        assert_eq!(
            hierarchy.get_matching_types("island", &["islet"]).unwrap(),
            set(&["islet"])
        );
    }

    #[test]
    fn category_without_available_members_is_empty() {
        let matches = TypeHierarchy::global()
            .get_matching_types("transport", &AVAILABLE)
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn concrete_type_the_datasource_lacks_is_unknown() {
        assert!(
            TypeHierarchy::global()
                .get_matching_types("castle", &AVAILABLE)
                .is_err()
        );
    }

    #[test]
    fn category_of_inverts_the_taxonomy() {
        let hierarchy = TypeHierarchy::global();
        for &category in hierarchy.categories() {
            for t in hierarchy.types_in(category) {
                assert_eq!(hierarchy.category_of(t), Some(category));
            }
        }
        assert_eq!(hierarchy.category_of("River"), Some(TypeCategory::Water));
        assert_eq!(hierarchy.category_of("ocean"), None);
    }

    #[test]
    fn prompt_lists_every_category() {
        let text = TypeHierarchy::global().describe_for_prompt();
        assert!(text.contains("  • water: lake, river, pond"));
        assert!(text.contains("  • infrastructure: dam"));
        assert_eq!(text.lines().count(), 1 + TypeCategory::all().len());
    }

    struct Gazetteer;

    impl AvailableTypes for Gazetteer {
        fn available_types(&self) -> Vec<String> {
            vec!["lake".into(), "mountain".into(), "peak".into(), "city".into()]
        }
    }

    #[test]
    fn resolves_hints_against_a_datasource() {
        assert_eq!(
            resolve_type_hint(&Gazetteer, "landforms").unwrap(),
            set(&["mountain", "peak"])
        );
        assert!(resolve_type_hint(&Gazetteer, "volcano").is_err());
    }
}
