use crate::ir::Person;

const SINGLE_CHAR_LIMIT: usize = 40;
const DEFAULT_LIMIT: usize = 20;

/// Persons whose name contains `query`, sorted by name. A one-character
/// query returns a longer list since it is usually a family-name prefix.
pub fn search_persons<'a>(persons: &'a [Person], query: &str) -> Vec<&'a Person> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let limit = if query.chars().count() == 1 {
        SINGLE_CHAR_LIMIT
    } else {
        DEFAULT_LIMIT
    };
    let mut matches: Vec<&Person> = persons
        .iter()
        .filter(|person| person.name.contains(query))
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    matches.truncate(limit);
    tracing::debug!(query, matches = matches.len(), "searched persons");
    matches
}
