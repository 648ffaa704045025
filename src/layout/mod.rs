mod couple;
mod depth;
mod emit;
mod index;
mod placement;
mod scope;
pub(crate) mod types;

pub use couple::{CoupleResolver, LayoutUnit};
pub use depth::{GenerationDepths, assign_depths};
pub use index::RelationshipIndex;
pub use placement::{Placement, SubtreePlacer};
pub use scope::{Scope, scope_register};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{Person, Register, Relationship};
use std::collections::HashSet;

/// Lays out the register as a family tree. With a focal person the register
/// is first narrowed to that person's relatives; an unknown focal id gives
/// an empty layout.
pub fn compute_layout(register: &Register, focal: Option<&str>, config: &LayoutConfig) -> Layout {
    let _span = tracing::debug_span!("compute_layout", focal = focal.unwrap_or("")).entered();

    let persons = unique_persons(&register.persons);
    let relationships = sanitize_relationships(&persons, &register.relationships);
    let scope = match focal {
        Some(focal) => scope_register(&persons, &relationships, focal, &config.scope),
        None => Scope::unscoped(persons, relationships),
    };

    let index = RelationshipIndex::build(scope.relationships.iter().copied());
    let resolver = CoupleResolver::new(&index, scope.persons.iter().copied(), config);
    let depths = assign_depths(&scope.persons, &index);
    let mut placer = SubtreePlacer::new(&resolver, &depths, config);
    placer.place_forest(&scope.persons);
    let placement = placer.into_placement();

    let nodes = emit::emit_nodes(&scope.persons, &placement, focal);
    let edges = emit::emit_edges(&resolver);
    let (width, height) = emit::bounds(&nodes, config);
    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        generations = placement.row_count(),
        "computed family tree layout"
    );

    Layout {
        nodes,
        edges,
        width,
        height,
        center: scope.center,
    }
}

fn unique_persons(persons: &[Person]) -> Vec<&Person> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unique = Vec::with_capacity(persons.len());
    for person in persons {
        if seen.insert(person.id.as_str()) {
            unique.push(person);
        } else {
            tracing::warn!(id = %person.id, "duplicate person id, keeping the first record");
        }
    }
    unique
}

/// Drops relationships that point outside the person list or at the same
/// person on both ends.
fn sanitize_relationships<'a>(
    persons: &[&Person],
    relationships: &'a [Relationship],
) -> Vec<&'a Relationship> {
    let ids: HashSet<&str> = persons.iter().map(|person| person.id.as_str()).collect();
    let mut dangling = 0usize;
    let mut self_relations = 0usize;
    let mut kept = Vec::with_capacity(relationships.len());
    for rel in relationships {
        if !rel.touches_only(&ids) {
            dangling += 1;
        } else if rel.is_self_relation() {
            self_relations += 1;
        } else {
            kept.push(rel);
        }
    }
    if dangling > 0 || self_relations > 0 {
        tracing::debug!(dangling, self_relations, "dropped unusable relationships");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::RelationKind;

    fn register(persons: &[&str], relationships: Vec<Relationship>) -> Register {
        Register {
            persons: persons.iter().map(|id| Person::new(*id, *id)).collect(),
            relationships,
        }
    }

    #[test]
    fn one_node_per_unique_person() {
        let mut reg = register(&["a", "b", "c"], vec![Relationship::parent_of("a", "b")]);
        reg.persons.push(Person::new("a", "Duplicate"));
        let layout = compute_layout(&reg, None, &LayoutConfig::default());
        let ids: Vec<&str> = layout.nodes.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(layout.node("a").map(|n| n.person_data.name.as_str()), Some("a"));
        assert!(layout.center.is_none());
    }

    #[test]
    fn dangling_and_self_relations_are_dropped() {
        let reg = register(
            &["a", "b"],
            vec![
                Relationship::parent_of("a", "ghost"),
                Relationship::new("b", "b", RelationKind::Son),
                Relationship::parent_of("a", "b"),
            ],
        );
        let layout = compute_layout(&reg, None, &LayoutConfig::default());
        assert_eq!(layout.edges.len(), 1);
        assert_eq!(layout.edges[0].id, "child-a-b");
    }

    #[test]
    fn focal_view_reports_center_and_flags_focal() {
        let reg = register(
            &["x", "y", "yp", "far"],
            vec![Relationship::married("x", "y"), Relationship::child_of("y", "yp")],
        );
        let layout = compute_layout(&reg, Some("x"), &LayoutConfig::default());
        assert_eq!(layout.center.as_deref(), Some("y"));
        assert_eq!(layout.focal().map(|n| n.id.as_str()), Some("x"));
        assert!(layout.node("far").is_none());
        assert_eq!(layout.edges_of_kind(EdgeKind::Couple).count(), 1);
    }

    #[test]
    fn unknown_focal_gives_empty_layout() {
        let reg = register(&["a"], Vec::new());
        let layout = compute_layout(&reg, Some("ghost"), &LayoutConfig::default());
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!((layout.width, layout.height), (0.0, 0.0));
    }

    #[test]
    fn identical_input_gives_identical_layout() {
        let reg = register(
            &["g", "p", "q", "c1", "c2"],
            vec![
                Relationship::parent_of("g", "p"),
                Relationship::married("p", "q"),
                Relationship::parent_of("p", "c1"),
                Relationship::parent_of("q", "c2"),
            ],
        );
        let config = LayoutConfig::default();
        assert_eq!(
            compute_layout(&reg, None, &config),
            compute_layout(&reg, None, &config)
        );
    }

    #[test]
    fn generation_matches_drawn_row_under_cycles() {
        let reg = register(
            &["r", "a", "b"],
            vec![
                Relationship::parent_of("r", "a"),
                Relationship::parent_of("a", "b"),
                Relationship::parent_of("b", "a"),
            ],
        );
        let config = LayoutConfig::default();
        let layout = compute_layout(&reg, None, &config);
        assert_eq!(layout.nodes.len(), 3);
        for node in &layout.nodes {
            assert_eq!(
                node.position.y,
                node.generation as f32 * config.row_height(),
                "{} reports a generation other than its row",
                node.id
            );
        }
        let a = layout.node("a").map(|node| node.generation);
        let b = layout.node("b").map(|node| node.generation);
        assert!(a.is_some_and(|row| row >= 1));
        assert!(b > a);
    }
}
