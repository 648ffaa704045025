use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::Person;

use super::index::RelationshipIndex;

/// One placement slot: a single person or a married couple anchored on its
/// representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutUnit<'a> {
    Single(&'a str),
    Couple {
        representative: &'a str,
        spouse: &'a str,
    },
}

impl<'a> LayoutUnit<'a> {
    pub fn representative(&self) -> &'a str {
        match *self {
            LayoutUnit::Single(id) => id,
            LayoutUnit::Couple { representative, .. } => representative,
        }
    }

    pub fn spouse(&self) -> Option<&'a str> {
        match *self {
            LayoutUnit::Single(_) => None,
            LayoutUnit::Couple { spouse, .. } => Some(spouse),
        }
    }

    pub fn members(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        std::iter::once(self.representative()).chain(self.spouse())
    }

    pub fn width(&self, config: &LayoutConfig) -> f32 {
        config.couple_width(self.spouse().is_some())
    }
}

/// Decides which partner anchors a couple and collects the couple's
/// children in birth order.
pub struct CoupleResolver<'a> {
    index: &'a RelationshipIndex,
    birth_keys: HashMap<&'a str, i32>,
    sentinel: i32,
}

impl<'a> CoupleResolver<'a> {
    pub fn new<I>(index: &'a RelationshipIndex, persons: I, config: &LayoutConfig) -> Self
    where
        I: IntoIterator<Item = &'a Person>,
    {
        let sentinel = config.unknown_birth_year;
        let birth_keys = persons
            .into_iter()
            .map(|person| (person.id.as_str(), person.birth_key(sentinel)))
            .collect();
        Self {
            index,
            birth_keys,
            sentinel,
        }
    }

    pub fn index(&self) -> &'a RelationshipIndex {
        self.index
    }

    pub fn birth_key(&self, id: &str) -> i32 {
        self.birth_keys.get(id).copied().unwrap_or(self.sentinel)
    }

    // Lower sorts first: more children, then a recorded parent, then id.
    fn anchor_rank<'s>(&self, id: &'s str) -> (Reverse<usize>, bool, &'s str) {
        (
            Reverse(self.index.child_count(id)),
            !self.index.has_parent(id),
            id,
        )
    }

    pub fn unit_of(&self, id: &'a str) -> LayoutUnit<'a> {
        let index: &'a RelationshipIndex = self.index;
        let Some(spouse) = index.spouse_of(id) else {
            return LayoutUnit::Single(id);
        };
        if self.anchor_rank(id) <= self.anchor_rank(spouse) {
            LayoutUnit::Couple {
                representative: id,
                spouse,
            }
        } else {
            LayoutUnit::Couple {
                representative: spouse,
                spouse: id,
            }
        }
    }

    pub fn representative_of(&self, id: &'a str) -> &'a str {
        self.unit_of(id).representative()
    }

    /// Children of either partner, sorted by birth year (unknown last) then id.
    pub fn family_children(&self, rep: &'a str) -> Vec<&'a str> {
        let index: &'a RelationshipIndex = self.index;
        let mut children: BTreeSet<&'a str> = BTreeSet::new();
        for member in self.unit_of(rep).members() {
            children.extend(index.children_of(member));
        }
        let mut sorted: Vec<&'a str> = children.into_iter().collect();
        sorted.sort_by_key(|id| (self.birth_key(id), *id));
        sorted
    }

    /// Representatives of the child units below `rep`, in birth order and
    /// without repeats.
    pub fn child_units(&self, rep: &'a str) -> Vec<&'a str> {
        let mut seen: HashSet<&'a str> = HashSet::new();
        self.family_children(rep)
            .into_iter()
            .map(|child| self.representative_of(child))
            .filter(|child_rep| seen.insert(*child_rep))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Relationship;

    fn resolver_for<'a>(index: &'a RelationshipIndex, persons: &'a [Person]) -> CoupleResolver<'a> {
        CoupleResolver::new(index, persons, &LayoutConfig::default())
    }

    #[test]
    fn single_person_is_own_representative() {
        let persons = vec![Person::new("a", "A")];
        let index = RelationshipIndex::build(Vec::<Relationship>::new().iter());
        let resolver = resolver_for(&index, &persons);
        assert_eq!(resolver.unit_of("a"), LayoutUnit::Single("a"));
        assert_eq!(resolver.representative_of("a"), "a");
    }

    #[test]
    fn partner_with_more_children_wins() {
        let persons = vec![Person::new("a", "A"), Person::new("z", "Z")];
        let rels = vec![
            Relationship::married("a", "z"),
            Relationship::child_of("c1", "z"),
            Relationship::child_of("c2", "z"),
            Relationship::child_of("c1", "a"),
        ];
        let index = RelationshipIndex::build(&rels);
        let resolver = resolver_for(&index, &persons);
        assert_eq!(resolver.representative_of("a"), "z");
        assert_eq!(
            resolver.unit_of("a"),
            LayoutUnit::Couple {
                representative: "z",
                spouse: "a"
            }
        );
    }

    #[test]
    fn blood_line_partner_wins_tie() {
        let persons = vec![Person::new("a", "A"), Person::new("m", "M")];
        let rels = vec![
            Relationship::married("a", "m"),
            Relationship::child_of("m", "elder"),
        ];
        let index = RelationshipIndex::build(&rels);
        let resolver = resolver_for(&index, &persons);
        assert_eq!(resolver.representative_of("a"), "m");
        assert_eq!(resolver.representative_of("m"), "m");
    }

    #[test]
    fn smaller_id_breaks_remaining_tie() {
        let persons = vec![Person::new("b", "B"), Person::new("a", "A")];
        let rels = vec![Relationship::married("b", "a")];
        let index = RelationshipIndex::build(&rels);
        let resolver = resolver_for(&index, &persons);
        assert_eq!(resolver.representative_of("b"), "a");
        assert_eq!(resolver.representative_of("a"), "a");
    }

    #[test]
    fn family_children_sorted_by_birth_then_id() {
        let persons = vec![
            Person::new("p", "P"),
            Person::new("q", "Q"),
            Person::new("old", "Old").born(1950),
            Person::new("young", "Young").born(1960),
            Person::new("b_unknown", "B"),
            Person::new("a_unknown", "A"),
        ];
        let rels = vec![
            Relationship::married("p", "q"),
            Relationship::child_of("young", "p"),
            Relationship::child_of("b_unknown", "q"),
            Relationship::child_of("old", "q"),
            Relationship::child_of("a_unknown", "p"),
        ];
        let index = RelationshipIndex::build(&rels);
        let resolver = resolver_for(&index, &persons);
        let rep = resolver.representative_of("p");
        assert_eq!(
            resolver.family_children(rep),
            vec!["old", "young", "a_unknown", "b_unknown"]
        );
    }

    #[test]
    fn married_siblings_share_one_child_unit() {
        let persons = vec![Person::new("p", "P"), Person::new("x", "X"), Person::new("y", "Y")];
        let rels = vec![
            Relationship::child_of("x", "p"),
            Relationship::child_of("y", "p"),
            Relationship::married("x", "y"),
        ];
        let index = RelationshipIndex::build(&rels);
        let resolver = resolver_for(&index, &persons);
        assert_eq!(resolver.child_units("p"), vec!["x"]);
    }
}
