#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the search-area engine.
//!
//! Lists the relation catalogue, applies a relation to a `GeoJSON`
//! reference geometry, and resolves place type hints against a list of
//! available types.

mod features;

use std::io::Read as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use search_area_relation::{RelationCategory, RelationRegistry};
use search_area_transform::{TransformEngine, TransformRequest};
use search_area_type_hierarchy::TypeHierarchy;

#[derive(Parser)]
#[command(name = "search_area", about = "Spatial relation search-area tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered relations
    Relations {
        /// Only list relations of this category
        #[arg(long, value_parser = parse_category)]
        category: Option<RelationCategory>,
        /// Print the prompt vocabulary instead of bare names
        #[arg(long)]
        prompt: bool,
        /// Extra relation catalogue (TOML) to register
        #[arg(long)]
        relations: Option<PathBuf>,
    },
    /// Apply a relation to a `GeoJSON` reference geometry
    Apply {
        /// Relation name, e.g. `near` or `north_of`
        #[arg(long)]
        relation: String,
        /// Override the default distance in meters
        #[arg(long, allow_negative_numbers = true)]
        distance: Option<f64>,
        /// Override the default erosion depth in meters (negative)
        #[arg(long, allow_negative_numbers = true)]
        depth: Option<f64>,
        /// `GeoJSON` file to read; stdin when absent
        #[arg(long)]
        input: Option<PathBuf>,
        /// Extra relation catalogue (TOML) to register
        #[arg(long)]
        relations: Option<PathBuf>,
    },
    /// Resolve a place type hint or list the type taxonomy
    Types {
        /// Type or category to resolve
        #[arg(long, required_unless_present = "list")]
        query: Option<String>,
        /// Comma-separated types the datasource offers
        #[arg(long, value_delimiter = ',')]
        available: Vec<String>,
        /// Print every category and its types
        #[arg(long, conflicts_with = "query")]
        list: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Relations {
            category,
            prompt,
            relations,
        } => {
            let registry = load_registry(relations.as_deref())?;
            if prompt {
                print!("{}", registry.describe_for_prompt());
            } else {
                for name in registry.list_by_category(category) {
                    println!("{name}");
                }
            }
        }
        Commands::Apply {
            relation,
            distance,
            depth,
            input,
            relations,
        } => {
            let registry = load_registry(relations.as_deref())?;
            let text = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let mut request = TransformRequest::new(features::read_reference(&text)?, relation);
            request.override_distance_m = distance;
            request.override_depth_m = depth;

            let result = TransformEngine::new(registry).apply(&request)?;
            if result.is_empty() {
                log::warn!("'{}' produced an empty search area", result.relation_applied);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&features::result_feature(&result))?
            );
        }
        Commands::Types {
            query,
            available,
            list,
        } => {
            let hierarchy = TypeHierarchy::global();
            if list {
                print!("{}", hierarchy.describe_for_prompt());
            } else if let Some(query) = query {
                for concrete in hierarchy.get_matching_types(&query, &available)? {
                    println!("{concrete}");
                }
            }
        }
    }

    Ok(())
}

fn parse_category(value: &str) -> Result<RelationCategory, String> {
    value.parse().map_err(|_| {
        let known: Vec<&str> = RelationCategory::all().iter().map(AsRef::as_ref).collect();
        format!("unknown category '{value}' (expected one of: {})", known.join(", "))
    })
}

/// Built-in relations plus an optional user catalogue.
fn load_registry(path: Option<&Path>) -> Result<RelationRegistry, Box<dyn std::error::Error>> {
    let mut registry = RelationRegistry::new();
    if let Some(path) = path {
        registry.load_toml_file(path)?;
    }
    Ok(registry)
}
