//! Schema text handed to the text-to-Cypher prompt.

use super::{PropertyIndex, SchemaDescriptor};

pub const NODE_PROPERTIES_HEADER: &str = "Node properties:";
pub const RELATIONSHIP_PROPERTIES_HEADER: &str = "Relationship properties:";
pub const RELATIONSHIPS_HEADER: &str = "The relationships:";

/// Render the descriptor as three sections joined by newlines:
///
/// ```text
/// Node properties:
/// Drug {code: INTEGER}
/// Relationship properties:
/// The relationships:
/// (:Drug)-[:HAS_DOSAGE]->(:Dosage)
/// ```
///
/// Labels and keys are written verbatim, without escaping.
pub fn format_schema(schema: &SchemaDescriptor) -> String {
    let mut lines = vec![NODE_PROPERTIES_HEADER.to_string()];
    push_property_lines(&mut lines, &schema.nodes);

    lines.push(RELATIONSHIP_PROPERTIES_HEADER.to_string());
    push_property_lines(&mut lines, &schema.relationships);

    lines.push(RELATIONSHIPS_HEADER.to_string());
    lines.extend(schema.relations.iter().cloned());

    lines.join("\n")
}

fn push_property_lines(lines: &mut Vec<String>, index: &PropertyIndex) {
    for (owner, properties) in index.iter() {
        let props = properties
            .iter()
            .map(|(key, tag)| format!("{key}: {tag}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("{owner} {{{props}}}"));
    }
}
