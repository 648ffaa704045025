use std::collections::{BTreeSet, HashMap};

use crate::ir::{Orientation, Relationship};

/// Parent/child and spouse lookups over one relationship list.
///
/// Facts recorded from both sides (`son` from the child, `father` from the
/// parent) collapse into a single parent/child pair before the lookups are
/// built, so every query answers with each relative exactly once.
#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    spouse_of: HashMap<String, String>,
    children_of: HashMap<String, BTreeSet<String>>,
    parents_of: HashMap<String, BTreeSet<String>>,
    facts: BTreeSet<(String, String)>,
    couples: BTreeSet<(String, String)>,
}

impl RelationshipIndex {
    pub fn build<'a, I>(relationships: I) -> Self
    where
        I: IntoIterator<Item = &'a Relationship>,
    {
        let mut index = Self::default();
        for rel in relationships {
            if rel.is_self_relation() {
                continue;
            }
            match rel.orient() {
                Orientation::Spousal(a, b) => index.marry(a, b),
                Orientation::Parental { parent, child } => {
                    index.facts.insert((parent.to_string(), child.to_string()));
                }
            }
        }
        for (parent, child) in &index.facts {
            index
                .children_of
                .entry(parent.clone())
                .or_default()
                .insert(child.clone());
            index
                .parents_of
                .entry(child.clone())
                .or_default()
                .insert(parent.clone());
        }
        index
    }

    // Last recorded marriage wins; the previous partners lose their
    // back-reference so the honored map stays symmetric.
    fn marry(&mut self, a: &str, b: &str) {
        let key = if a < b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.couples.insert(key);
        for (person, partner) in [(a, b), (b, a)] {
            if let Some(previous) = self.spouse_of.get(person).cloned()
                && previous != partner
                && self.spouse_of.get(&previous).map(String::as_str) == Some(person)
            {
                self.spouse_of.remove(&previous);
            }
        }
        self.spouse_of.insert(a.to_string(), b.to_string());
        self.spouse_of.insert(b.to_string(), a.to_string());
    }

    pub fn spouse_of(&self, id: &str) -> Option<&str> {
        self.spouse_of.get(id).map(String::as_str)
    }

    pub fn children_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.children_of
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn parents_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.parents_of
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn child_count(&self, id: &str) -> usize {
        self.children_of.get(id).map_or(0, BTreeSet::len)
    }

    pub fn parent_count(&self, id: &str) -> usize {
        self.parents_of.get(id).map_or(0, BTreeSet::len)
    }

    pub fn has_parent(&self, id: &str) -> bool {
        self.parent_count(id) > 0
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.child_count(id) > 0
    }

    /// Deduplicated `(parent, child)` pairs in sorted order.
    pub fn parent_child_facts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.facts
            .iter()
            .map(|(parent, child)| (parent.as_str(), child.as_str()))
    }

    /// Every recorded spousal pair as `(smaller id, larger id)`, including
    /// pairs no longer honored by [`spouse_of`](Self::spouse_of).
    pub fn couples(&self) -> impl Iterator<Item = (&str, &str)> {
        self.couples.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Honored couples as sorted pairs.
    pub fn honored_couples(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .spouse_of
            .iter()
            .filter(|(person, spouse)| person < spouse)
            .map(|(person, spouse)| (person.as_str(), spouse.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::RelationKind;

    #[test]
    fn both_direction_recordings_count_once() {
        let rels = vec![
            Relationship::new("c", "p", RelationKind::Son),
            Relationship::new("p", "c", RelationKind::Father),
            Relationship::new("c", "p", RelationKind::Son),
        ];
        let index = RelationshipIndex::build(&rels);
        assert_eq!(index.parents_of("c").collect::<Vec<_>>(), vec!["p"]);
        assert_eq!(index.children_of("p").collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(index.fact_count(), 1);
    }

    #[test]
    fn spouses_are_symmetric() {
        let rels = vec![
            Relationship::new("a", "b", RelationKind::Husband),
            Relationship::new("b", "a", RelationKind::Wife),
        ];
        let index = RelationshipIndex::build(&rels);
        assert_eq!(index.spouse_of("a"), Some("b"));
        assert_eq!(index.spouse_of("b"), Some("a"));
        assert_eq!(index.couples().count(), 1);
    }

    #[test]
    fn last_marriage_wins_and_drops_stale_partner() {
        let rels = vec![
            Relationship::married("a", "b"),
            Relationship::married("a", "c"),
        ];
        let index = RelationshipIndex::build(&rels);
        assert_eq!(index.spouse_of("a"), Some("c"));
        assert_eq!(index.spouse_of("c"), Some("a"));
        assert_eq!(index.spouse_of("b"), None);
        assert_eq!(index.couples().count(), 2);
        assert_eq!(index.honored_couples(), vec![("a", "c")]);
    }

    #[test]
    fn self_relations_are_ignored() {
        let rels = vec![
            Relationship::child_of("a", "a"),
            Relationship::married("a", "a"),
        ];
        let index = RelationshipIndex::build(&rels);
        assert!(!index.has_parent("a"));
        assert_eq!(index.spouse_of("a"), None);
        assert_eq!(index.couples().count(), 0);
    }

    #[test]
    fn missing_ids_have_no_relatives() {
        let index = RelationshipIndex::build(Vec::<Relationship>::new().iter());
        assert_eq!(index.children_of("ghost").count(), 0);
        assert_eq!(index.child_count("ghost"), 0);
        assert!(!index.has_children("ghost"));
    }
}
