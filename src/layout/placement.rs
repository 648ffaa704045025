use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::Person;

use super::couple::CoupleResolver;
use super::depth::GenerationDepths;
use super::types::Position;

/// Where each person ended up and which generation row they were drawn in.
/// The row can be deeper than the reconciled depth when a unit is reached
/// below it.
#[derive(Debug, Default)]
pub struct Placement<'a> {
    pub positions: HashMap<&'a str, Position>,
    pub rows: HashMap<&'a str, usize>,
}

impl<'a> Placement<'a> {
    pub fn position_of(&self, id: &str) -> Position {
        self.positions.get(id).copied().unwrap_or_default()
    }

    pub fn row_of(&self, id: &str) -> usize {
        self.rows.get(id).copied().unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.values().max().map_or(0, |row| row + 1)
    }

    fn put(&mut self, id: &'a str, position: Position, row: usize) {
        if !self.positions.contains_key(id) {
            self.positions.insert(id, position);
            self.rows.insert(id, row);
        }
    }
}

/// Places couples above their children, each subtree as wide as its widest
/// generation, and disconnected trees side by side.
pub struct SubtreePlacer<'a> {
    resolver: &'a CoupleResolver<'a>,
    depths: &'a GenerationDepths,
    config: &'a LayoutConfig,
    widths: HashMap<&'a str, f32>,
    placement: Placement<'a>,
    placed: HashSet<&'a str>,
}

impl<'a> SubtreePlacer<'a> {
    pub fn new(
        resolver: &'a CoupleResolver<'a>,
        depths: &'a GenerationDepths,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            resolver,
            depths,
            config,
            widths: HashMap::new(),
            placement: Placement::default(),
            placed: HashSet::new(),
        }
    }

    /// Horizontal space the unit anchored on `rep` and everything below it
    /// needs. A representative already on the current path counts as a
    /// single card, which keeps cyclic parentage finite.
    pub fn subtree_width(&mut self, rep: &'a str, visiting: &mut HashSet<&'a str>) -> f32 {
        if let Some(&width) = self.widths.get(rep) {
            return width;
        }
        if !visiting.insert(rep) {
            return self.config.node_width;
        }
        let couple_width = self.resolver.unit_of(rep).width(self.config);
        let children = self.resolver.child_units(rep);
        let width = if children.is_empty() {
            couple_width
        } else {
            let mut total = self.config.horizontal_gap * (children.len() - 1) as f32;
            for child in children {
                total += self.subtree_width(child, visiting);
            }
            couple_width.max(total)
        };
        visiting.remove(rep);
        self.widths.insert(rep, width);
        width
    }

    pub fn place_subtree(&mut self, rep: &'a str, center_x: f32, min_depth: usize) {
        if !self.placed.insert(rep) {
            return;
        }
        let depth = self.depths.depth_of(rep).max(min_depth);
        let y = depth as f32 * self.config.row_height();
        let unit = self.resolver.unit_of(rep);
        let left = center_x - unit.width(self.config) / 2.0;
        self.placement.put(rep, Position::new(left, y), depth);
        if let Some(spouse) = unit.spouse() {
            let spouse_x = left + self.config.node_width + self.config.horizontal_gap;
            self.placement.put(spouse, Position::new(spouse_x, y), depth);
        }

        let children = self.resolver.child_units(rep);
        if children.is_empty() {
            return;
        }
        let widths: Vec<f32> = children
            .iter()
            .map(|&child| self.subtree_width(child, &mut HashSet::new()))
            .collect();
        let total: f32 =
            widths.iter().sum::<f32>() + self.config.horizontal_gap * (children.len() - 1) as f32;
        let mut cursor = center_x - total / 2.0;
        for (child, width) in children.into_iter().zip(widths) {
            self.place_subtree(child, cursor + width / 2.0, depth + 1);
            cursor += width + self.config.horizontal_gap;
        }
    }

    /// Lays out every tree left to right in birth order, then appends
    /// persons no tree reached. Returns the x just past the last card.
    ///
    /// A tree is ordered by its earliest-born root member, so a couple whose
    /// anchor is the younger partner still sorts by the elder one.
    pub fn place_forest(&mut self, persons: &[&'a Person]) -> f32 {
        let index = self.resolver.index();
        let mut earliest: BTreeMap<&'a str, i32> = BTreeMap::new();
        for &person in persons {
            let id = person.id.as_str();
            if index.has_parent(id) {
                continue;
            }
            let rep = self.resolver.representative_of(id);
            if index.has_parent(rep) {
                continue;
            }
            let key = self.resolver.birth_key(id);
            earliest
                .entry(rep)
                .and_modify(|current| *current = (*current).min(key))
                .or_insert(key);
        }
        let roots: BTreeSet<(i32, &'a str)> =
            earliest.into_iter().map(|(rep, key)| (key, rep)).collect();

        let mut cursor = self.config.node_width;
        let mut trees = 0usize;
        for (_, rep) in roots {
            if self.placed.contains(rep) {
                continue;
            }
            let width = self.subtree_width(rep, &mut HashSet::new());
            self.place_subtree(rep, cursor + width / 2.0, 0);
            cursor += width + self.config.forest_gap();
            trees += 1;
        }

        let mut orphans = 0usize;
        for &person in persons {
            let id = person.id.as_str();
            if self.placement.positions.contains_key(id) {
                continue;
            }
            let depth = self.depths.depth_of(id);
            let y = depth as f32 * self.config.row_height();
            self.placement.put(id, Position::new(cursor, y), depth);
            cursor += self.config.node_width + self.config.horizontal_gap;
            orphans += 1;
        }
        tracing::debug!(trees, orphans, "placed forest");
        cursor
    }

    pub fn into_placement(self) -> Placement<'a> {
        self.placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Relationship;
    use crate::layout::depth::assign_depths;
    use crate::layout::index::RelationshipIndex;

    fn place_with_rows(
        persons: &[Person],
        rels: &[Relationship],
    ) -> HashMap<String, (Position, usize)> {
        let config = LayoutConfig::default();
        let refs: Vec<&Person> = persons.iter().collect();
        let index = RelationshipIndex::build(rels);
        let resolver = CoupleResolver::new(&index, persons, &config);
        let depths = assign_depths(&refs, &index);
        let mut placer = SubtreePlacer::new(&resolver, &depths, &config);
        placer.place_forest(&refs);
        let placement = placer.into_placement();
        placement
            .positions
            .iter()
            .map(|(&id, &pos)| (id.to_string(), (pos, placement.row_of(id))))
            .collect()
    }

    fn place(persons: &[Person], rels: &[Relationship]) -> HashMap<String, Position> {
        place_with_rows(persons, rels)
            .into_iter()
            .map(|(id, (pos, _))| (id, pos))
            .collect()
    }

    fn center(pos: Position) -> f32 {
        pos.x + LayoutConfig::default().node_width / 2.0
    }

    #[test]
    fn single_line_is_vertically_aligned() {
        let persons = vec![Person::new("a", "A"), Person::new("b", "B"), Person::new("c", "C")];
        let rels = vec![
            Relationship::parent_of("a", "b"),
            Relationship::parent_of("b", "c"),
        ];
        let pos = place(&persons, &rels);
        assert_eq!(center(pos["a"]), center(pos["b"]));
        assert_eq!(center(pos["b"]), center(pos["c"]));
        assert_eq!(pos["a"].y, 0.0);
        assert_eq!(pos["b"].y, 230.0);
        assert_eq!(pos["c"].y, 460.0);
        assert_eq!(pos["a"].x, 130.0);
    }

    #[test]
    fn spouse_sits_to_the_right_of_representative() {
        let persons = vec![Person::new("h", "H"), Person::new("w", "W"), Person::new("k", "K")];
        let rels = vec![
            Relationship::married("h", "w"),
            Relationship::parent_of("h", "k"),
            Relationship::parent_of("w", "k"),
        ];
        let pos = place(&persons, &rels);
        assert_eq!(pos["h"].y, pos["w"].y);
        assert_eq!(pos["w"].x - pos["h"].x, 170.0);
        let couple_center = (pos["h"].x + pos["w"].x + 130.0) / 2.0;
        assert_eq!(center(pos["k"]), couple_center);
    }

    #[test]
    fn children_ordered_by_birth_year() {
        let persons = vec![
            Person::new("p", "P"),
            Person::new("late", "Late").born(1990),
            Person::new("unknown", "Unknown"),
            Person::new("early", "Early").born(1980),
        ];
        let rels = vec![
            Relationship::parent_of("p", "late"),
            Relationship::parent_of("p", "unknown"),
            Relationship::parent_of("p", "early"),
        ];
        let pos = place(&persons, &rels);
        assert!(pos["early"].x < pos["late"].x);
        assert!(pos["late"].x < pos["unknown"].x);
        assert_eq!(pos["late"].x - pos["early"].x, 170.0);
    }

    #[test]
    fn separate_trees_keep_forest_gap() {
        let persons = vec![
            Person::new("young_root", "Y").born(1950),
            Person::new("old_root", "O").born(1900),
        ];
        let pos = place(&persons, &[]);
        assert_eq!(pos["old_root"].x, 130.0);
        assert_eq!(pos["young_root"].x, 130.0 + 130.0 + 240.0);
    }

    #[test]
    fn cyclic_parentage_still_places_everyone() {
        let persons = vec![Person::new("a", "A"), Person::new("b", "B"), Person::new("z", "Z")];
        let rels = vec![
            Relationship::parent_of("a", "b"),
            Relationship::parent_of("b", "a"),
        ];
        let pos = place(&persons, &rels);
        assert_eq!(pos.len(), 3);
        assert_eq!(pos["z"].x, 130.0);
        assert!(pos["a"].x > pos["z"].x);
    }

    #[test]
    fn forest_orders_couples_by_elder_root() {
        // s anchors the couple because of the child, yet r is the earliest root.
        let persons = vec![
            Person::new("r", "R").born(1950),
            Person::new("s", "S").born(1990),
            Person::new("k", "K").born(2015),
            Person::new("t", "T").born(1960),
        ];
        let rels = vec![
            Relationship::married("r", "s"),
            Relationship::parent_of("s", "k"),
        ];
        let pos = place(&persons, &rels);
        assert_eq!(pos["s"].x, 130.0);
        assert_eq!(pos["r"].x, 300.0);
        assert!(pos["r"].x < pos["t"].x);
        assert!(pos["s"].x < pos["t"].x);
    }

    #[test]
    fn cycle_below_a_root_is_cut_by_visiting_guard() {
        let persons = vec![Person::new("r", "R"), Person::new("a", "A"), Person::new("b", "B")];
        let rels = vec![
            Relationship::parent_of("r", "a"),
            Relationship::parent_of("a", "b"),
            Relationship::parent_of("b", "a"),
        ];
        let placed = place_with_rows(&persons, &rels);
        assert_eq!(placed.len(), 3);
        let (root, root_row) = placed["r"];
        assert_eq!((root.x, root.y, root_row), (130.0, 0.0, 0));
        for id in ["a", "b"] {
            let (pos, row) = placed[id];
            assert!(pos.x.is_finite());
            assert_eq!(pos.y, row as f32 * 230.0, "{id} drawn off its row");
            assert!(row >= 1);
        }
    }
}
