use std::collections::{HashMap, VecDeque};

use crate::ir::Person;

use super::index::RelationshipIndex;

/// Generation depth per person after couple and child reconciliation.
#[derive(Debug, Clone, Default)]
pub struct GenerationDepths {
    depths: HashMap<String, usize>,
    passes: usize,
}

impl GenerationDepths {
    pub fn depth_of(&self, id: &str) -> usize {
        self.depths.get(id).copied().unwrap_or(0)
    }

    /// Reconciliation passes that ran before the depths settled.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

pub fn assign_depths(persons: &[&Person], index: &RelationshipIndex) -> GenerationDepths {
    let mut depths: HashMap<&str, usize> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    for person in persons {
        let id = person.id.as_str();
        let parents = index.parent_count(id);
        in_degree.insert(id, parents);
        if parents == 0 {
            depths.insert(id, 0);
            queue.push_back(id);
        }
    }

    while let Some(current) = queue.pop_front() {
        let depth = depths.get(current).copied().unwrap_or(0);
        for child in index.children_of(current) {
            let entry = depths.entry(child).or_insert(depth + 1);
            *entry = (*entry).max(depth + 1);
            if let Some(remaining) = in_degree.get_mut(child) {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    queue.push_back(child);
                }
            }
        }
    }

    // Each pass settles couples then pushes children below both parents.
    // Acyclic data settles well before the bound; cyclic data stops at it.
    let couples = index.honored_couples();
    let max_passes = persons.len() + 1;
    let mut passes = 0;
    loop {
        if passes >= max_passes {
            tracing::warn!(passes, "generation depths did not settle, parentage may be cyclic");
            break;
        }
        passes += 1;
        let couples_changed = reconcile_couples(&mut depths, &couples, index);
        let children_changed = repropagate_children(&mut depths, index);
        if !couples_changed && !children_changed {
            break;
        }
    }

    let mut resolved = HashMap::with_capacity(persons.len());
    for person in persons {
        let id = person.id.as_str();
        resolved.insert(id.to_string(), depths.get(id).copied().unwrap_or(0));
    }
    tracing::debug!(passes, persons = persons.len(), "assigned generation depths");
    GenerationDepths {
        depths: resolved,
        passes,
    }
}

fn reconcile_couples<'a>(
    depths: &mut HashMap<&'a str, usize>,
    couples: &[(&'a str, &'a str)],
    index: &RelationshipIndex,
) -> bool {
    let mut changed = false;
    for &(a, b) in couples {
        let target = match (depths.get(a).copied(), depths.get(b).copied()) {
            (Some(da), None) => da,
            (None, Some(db)) => db,
            (Some(da), Some(db)) if da != db => {
                match (index.has_parent(a), index.has_parent(b)) {
                    (true, false) => da,
                    (false, true) => db,
                    _ => da.max(db),
                }
            }
            _ => continue,
        };
        for id in [a, b] {
            if depths.get(id) != Some(&target) {
                depths.insert(id, target);
                changed = true;
            }
        }
    }
    changed
}

fn repropagate_children<'a>(
    depths: &mut HashMap<&'a str, usize>,
    index: &'a RelationshipIndex,
) -> bool {
    let mut changed = false;
    for (parent, child) in index.parent_child_facts() {
        let Some(parent_depth) = depths.get(parent).copied() else {
            continue;
        };
        let wanted = parent_depth + 1;
        match depths.get(child) {
            Some(&current) if current >= wanted => {}
            _ => {
                depths.insert(child, wanted);
                changed = true;
            }
        }
    }
    changed
}
