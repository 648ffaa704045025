use std::collections::{HashMap, HashSet};

use crate::config::ScopeConfig;
use crate::ir::{Person, Relationship};

use super::index::RelationshipIndex;

/// Generations below a sibling that the collateral walk still includes
/// (nieces/nephews, then their children).
const COLLATERAL_GENERATIONS: usize = 2;

#[derive(Debug, Clone)]
pub struct Scope<'a> {
    /// Person the scope was grown from; the focal person's spouse when the
    /// focal person married into the family.
    pub center: Option<String>,
    pub persons: Vec<&'a Person>,
    pub relationships: Vec<&'a Relationship>,
}

impl<'a> Scope<'a> {
    pub fn unscoped(persons: Vec<&'a Person>, relationships: Vec<&'a Relationship>) -> Self {
        Self {
            center: None,
            persons,
            relationships,
        }
    }
}

struct ScopeWalker<'i> {
    index: &'i RelationshipIndex,
    included: HashSet<&'i str>,
    ancestors_seen: HashMap<&'i str, usize>,
    descendants_seen: HashMap<&'i str, usize>,
    collateral_seen: HashMap<&'i str, usize>,
}

impl<'i> ScopeWalker<'i> {
    fn new(index: &'i RelationshipIndex) -> Self {
        Self {
            index,
            included: HashSet::new(),
            ancestors_seen: HashMap::new(),
            descendants_seen: HashMap::new(),
            collateral_seen: HashMap::new(),
        }
    }

    fn include_with_spouse(&mut self, id: &'i str) {
        self.included.insert(id);
        if let Some(spouse) = self.index.spouse_of(id) {
            self.included.insert(spouse);
        }
    }

    // `seen` keeps the largest remaining budget a person was visited with, so
    // shared ancestors are not walked twice with the same budget.
    fn first_visit(seen: &mut HashMap<&'i str, usize>, id: &'i str, remaining: usize) -> bool {
        match seen.get(id) {
            Some(&previous) if previous >= remaining => false,
            _ => {
                seen.insert(id, remaining);
                true
            }
        }
    }

    fn ancestors(&mut self, id: &'i str, remaining: usize) {
        self.include_with_spouse(id);
        if remaining == 0 || !Self::first_visit(&mut self.ancestors_seen, id, remaining) {
            return;
        }
        let index = self.index;
        for parent in index.parents_of(id) {
            self.ancestors(parent, remaining - 1);
        }
    }

    fn descendants(&mut self, id: &'i str, remaining: usize) {
        self.include_with_spouse(id);
        if remaining == 0 || !Self::first_visit(&mut self.descendants_seen, id, remaining) {
            return;
        }
        let index = self.index;
        for child in index.children_of(id) {
            self.descendants(child, remaining - 1);
        }
    }

    fn collateral(&mut self, id: &'i str, remaining: usize) {
        self.include_with_spouse(id);
        if remaining == 0 || !Self::first_visit(&mut self.collateral_seen, id, remaining) {
            return;
        }
        let index = self.index;
        for child in index.children_of(id) {
            self.collateral(child, remaining - 1);
        }
    }

    fn siblings_of(&mut self, id: &'i str) {
        let index = self.index;
        for parent in index.parents_of(id) {
            for sibling in index.children_of(parent) {
                self.collateral(sibling, COLLATERAL_GENERATIONS);
            }
        }
    }
}

/// Picks the person the scope is grown from: the focal person, or their
/// spouse when only the spouse has recorded parents or children.
fn effective_center<'i>(index: &'i RelationshipIndex, focal: &'i str) -> &'i str {
    if index.has_parent(focal) || index.has_children(focal) {
        return focal;
    }
    match index.spouse_of(focal) {
        Some(spouse) if index.has_parent(spouse) || index.has_children(spouse) => spouse,
        _ => focal,
    }
}

/// Restricts the register to the focal person's ancestors, descendants and
/// collateral relatives, each within a fixed number of generations.
pub fn scope_register<'a>(
    persons: &[&'a Person],
    relationships: &[&'a Relationship],
    focal: &str,
    config: &ScopeConfig,
) -> Scope<'a> {
    if !persons.iter().any(|person| person.id == focal) {
        tracing::warn!(focal, "focal person not found, scope is empty");
        return Scope {
            center: None,
            persons: Vec::new(),
            relationships: Vec::new(),
        };
    }

    let index = RelationshipIndex::build(relationships.iter().copied());
    let center = effective_center(&index, focal);
    if center != focal {
        tracing::debug!(focal, center, "focal person married in, centering on spouse");
    }

    let mut walker = ScopeWalker::new(&index);
    walker.included.insert(focal);
    let roots: Vec<&str> = std::iter::once(center).chain(index.spouse_of(center)).collect();
    for &root in &roots {
        walker.ancestors(root, config.ancestor_generations);
        walker.descendants(root, config.descendant_generations);
    }
    if config.include_collateral {
        for &root in &roots {
            walker.siblings_of(root);
        }
    }

    let included = walker.included;
    let persons: Vec<&'a Person> = persons
        .iter()
        .copied()
        .filter(|person| included.contains(person.id.as_str()))
        .collect();
    let relationships: Vec<&'a Relationship> = relationships
        .iter()
        .copied()
        .filter(|rel| {
            included.contains(rel.subject_id.as_str()) && included.contains(rel.object_id.as_str())
        })
        .collect();
    tracing::debug!(
        persons = persons.len(),
        relationships = relationships.len(),
        "scoped register"
    );

    Scope {
        center: Some(center.to_string()),
        persons,
        relationships,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(scope: &Scope<'_>) -> Vec<String> {
        let mut ids: Vec<String> = scope.persons.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids
    }

    fn run(persons: &[Person], rels: &[Relationship], focal: &str) -> Vec<String> {
        let persons: Vec<&Person> = persons.iter().collect();
        let rels: Vec<&Relationship> = rels.iter().collect();
        ids(&scope_register(&persons, &rels, focal, &ScopeConfig::default()))
    }

    fn people(ids: &[&str]) -> Vec<Person> {
        ids.iter().map(|id| Person::new(*id, id.to_uppercase())).collect()
    }

    #[test]
    fn collateral_line_reaches_nephew() {
        let persons = people(&["x", "p", "s", "t", "n", "stranger"]);
        let rels = vec![
            Relationship::child_of("x", "p"),
            Relationship::child_of("s", "p"),
            Relationship::married("s", "t"),
            Relationship::child_of("n", "s"),
        ];
        assert_eq!(run(&persons, &rels, "x"), vec!["n", "p", "s", "t", "x"]);
    }

    #[test]
    fn married_in_focal_centers_on_spouse() {
        let persons = people(&["x", "y", "yp", "yc"]);
        let rels = vec![
            Relationship::married("x", "y"),
            Relationship::child_of("y", "yp"),
            Relationship::parent_of("y", "yc"),
        ];
        let person_refs: Vec<&Person> = persons.iter().collect();
        let rel_refs: Vec<&Relationship> = rels.iter().collect();
        let scope = scope_register(&person_refs, &rel_refs, "x", &ScopeConfig::default());
        assert_eq!(scope.center.as_deref(), Some("y"));
        assert_eq!(ids(&scope), vec!["x", "y", "yc", "yp"]);
        assert_eq!(scope.relationships.len(), 3);
    }

    #[test]
    fn ancestors_stop_after_three_generations() {
        let persons = people(&["g0", "g1", "g2", "g3", "g4"]);
        let rels = vec![
            Relationship::child_of("g0", "g1"),
            Relationship::child_of("g1", "g2"),
            Relationship::child_of("g2", "g3"),
            Relationship::child_of("g3", "g4"),
        ];
        assert_eq!(run(&persons, &rels, "g0"), vec!["g0", "g1", "g2", "g3"]);
        assert_eq!(run(&persons, &rels, "g4"), vec!["g1", "g2", "g3", "g4"]);
    }

    #[test]
    fn collateral_can_be_disabled() {
        let persons = people(&["x", "p", "s"]);
        let rels = vec![Relationship::child_of("x", "p"), Relationship::child_of("s", "p")];
        let person_refs: Vec<&Person> = persons.iter().collect();
        let rel_refs: Vec<&Relationship> = rels.iter().collect();
        let config = ScopeConfig {
            include_collateral: false,
            ..ScopeConfig::default()
        };
        let scope = scope_register(&person_refs, &rel_refs, "x", &config);
        assert_eq!(ids(&scope), vec!["p", "x"]);
    }

    #[test]
    fn cyclic_parentage_terminates() {
        let persons = people(&["a", "b", "c"]);
        let rels = vec![
            Relationship::child_of("a", "b"),
            Relationship::child_of("b", "c"),
            Relationship::child_of("c", "a"),
        ];
        assert_eq!(run(&persons, &rels, "a"), vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_focal_yields_empty_scope() {
        let persons = people(&["a"]);
        assert!(run(&persons, &[], "ghost").is_empty());
    }
}
