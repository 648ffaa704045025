use std::collections::HashSet;

use crate::config::LayoutConfig;
use crate::ir::Person;

use super::couple::CoupleResolver;
use super::placement::Placement;
use super::types::{EdgeKind, EdgeLayout, NodeLayout};

pub fn emit_nodes(
    persons: &[&Person],
    placement: &Placement<'_>,
    focal: Option<&str>,
) -> Vec<NodeLayout> {
    persons
        .iter()
        .map(|person| {
            let id = person.id.as_str();
            NodeLayout {
                id: id.to_string(),
                position: placement.position_of(id),
                person_data: (*person).clone(),
                is_focal: focal == Some(id),
                generation: placement.row_of(id),
            }
        })
        .collect()
}

/// Couple edges for every recorded spousal pair, then parent edges from
/// each parent's couple to the child.
pub fn emit_edges(resolver: &CoupleResolver<'_>) -> Vec<EdgeLayout> {
    let index = resolver.index();
    let mut edges = Vec::new();

    for (a, b) in index.couples() {
        edges.push(EdgeLayout {
            id: format!("couple-{a}|{b}"),
            source: a.to_string(),
            target: b.to_string(),
            kind: EdgeKind::Couple,
            source_handle: Some("right".to_string()),
            target_handle: Some("left".to_string()),
        });
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for (parent, child) in index.parent_child_facts() {
        let unit = resolver.unit_of(parent);
        for source in unit.members() {
            if source == child || !seen.insert((source, child)) {
                continue;
            }
            edges.push(EdgeLayout {
                id: format!("child-{source}-{child}"),
                source: source.to_string(),
                target: child.to_string(),
                kind: EdgeKind::ParentChild,
                source_handle: None,
                target_handle: None,
            });
        }
    }
    edges
}

/// Extent of the placed cards measured from the origin.
pub fn bounds(nodes: &[NodeLayout], config: &LayoutConfig) -> (f32, f32) {
    nodes.iter().fold((0.0f32, 0.0f32), |(width, height), node| {
        (
            width.max(node.position.x + config.node_width),
            height.max(node.position.y + config.node_height),
        )
    })
}
