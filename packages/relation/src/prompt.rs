//! Plain-text rendering of the relation catalogue for language model prompts.

use std::fmt::Write as _;

use crate::{RelationCategory, RelationDefinition, RelationKind, RelationRegistry};

pub fn describe(registry: &RelationRegistry) -> String {
    let mut out = String::new();

    for &category in RelationCategory::all() {
        let mut relations: Vec<&RelationDefinition> = registry
            .iter()
            .filter(|r| r.category() == category)
            .collect();
        if relations.is_empty() {
            continue;
        }
        relations.sort_by(|a, b| a.name().cmp(b.name()));

        writeln!(out, "\n{} RELATIONS:", category.as_ref().to_uppercase()).unwrap();
        for relation in relations {
            describe_relation(&mut out, relation);
        }
    }

    out.push_str("\nNOTES:\n");
    out.push_str("  • Negative distances indicate erosion/shrinking (e.g., in_the_heart_of)\n");
    out.push_str("  • Ring buffers exclude the reference feature itself (e.g., shores of lake)\n");
    out.push_str("  • Buffer from 'center' vs 'edge' determines where the distance is measured from\n");
    out.push_str("  • Directional relations are 90° sectors anchored at the reference centroid\n");
    out
}

fn describe_relation(out: &mut String, relation: &RelationDefinition) {
    let kind = relation.kind();

    let default = match kind {
        RelationKind::Containment => String::new(),
        RelationKind::Erosion { depth_m } => format!(" (default: {}m erosion)", depth_m.abs()),
        RelationKind::Buffer { distance_m, .. }
        | RelationKind::Ring { distance_m }
        | RelationKind::Directional { distance_m, .. } => format!(" (default: {distance_m}m)"),
    };

    let mut flags = Vec::new();
    if matches!(kind, RelationKind::Ring { .. }) {
        flags.push("ring buffer".to_string());
    }
    if let RelationKind::Directional { direction, .. } = kind {
        flags.push(format!("bearing {}°", direction.bearing_degrees()));
    }
    if let Some(origin) = kind.buffer_from() {
        flags.push(format!("from {origin}"));
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    writeln!(out, "  • {}{default}{flags}", relation.name()).unwrap();
    if !relation.description().is_empty() {
        writeln!(out, "    {}", relation.description()).unwrap();
    }
    if !relation.applies_to().is_empty() {
        writeln!(
            out,
            "    (commonly used with: {})",
            relation.applies_to().join(", ")
        )
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use crate::RelationRegistry;

    #[test]
    fn groups_relations_by_category() {
        let text = RelationRegistry::new().describe_for_prompt();

        assert!(text.contains("CONTAINMENT RELATIONS"));
        assert!(text.contains("BUFFER RELATIONS"));
        assert!(text.contains("RING RELATIONS"));
        assert!(text.contains("EROSION RELATIONS"));
        assert!(text.contains("DIRECTIONAL RELATIONS"));
        assert!(text.contains("Negative distances"));
    }

    #[test]
    fn renders_defaults_and_flags() {
        let text = RelationRegistry::new().describe_for_prompt();

        assert!(text.contains("  • near (default: 5000m) [from center]"));
        assert!(text.contains("  • in_the_heart_of (default: 500m erosion) [from edge]"));
        assert!(text.contains("  • on_shores_of (default: 1000m) [ring buffer, from edge]"));
        assert!(text.contains("(commonly used with: lake, pond, sea)"));
    }

    #[test]
    fn empty_registry_only_has_notes() {
        let text = RelationRegistry::empty().describe_for_prompt();
        assert!(!text.contains("RELATIONS:"));
        assert!(text.contains("NOTES:"));
    }
}
