use crate::ir::{Person, Register, RelationKind, Relationship};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("register is not valid JSON or JSON5: {0}")]
    Syntax(String),
    #[error("relationship #{index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("person #{index} has an empty id")]
    EmptyId { index: usize },
}

#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub register: Register,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRegister {
    #[serde(default)]
    persons: Vec<Person>,
    #[serde(default, alias = "rels")]
    relationships: Vec<RawRelationship>,
}

// Accepts both the engine contract (subject/object/kind) and storage rows
// (person_id/related_person_id/relation_type).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRelationship {
    subject_id: Option<String>,
    object_id: Option<String>,
    kind: Option<String>,
    #[serde(alias = "person_id")]
    person_id: Option<String>,
    #[serde(alias = "related_person_id")]
    related_person_id: Option<String>,
    #[serde(alias = "relation_type")]
    relation_type: Option<String>,
    #[serde(alias = "marriage_year")]
    marriage_year: Option<i32>,
}

pub fn parse_register(input: &str) -> Result<ParseOutput, ParseError> {
    let raw: RawRegister = match serde_json::from_str(input) {
        Ok(raw) => raw,
        Err(json_err) => json5::from_str(input).map_err(|_| ParseError::Syntax(json_err.to_string()))?,
    };

    for (index, person) in raw.persons.iter().enumerate() {
        if person.id.trim().is_empty() {
            return Err(ParseError::EmptyId { index });
        }
    }

    let mut warnings = Vec::new();
    let mut relationships = Vec::with_capacity(raw.relationships.len());
    for (index, rel) in raw.relationships.into_iter().enumerate() {
        let (subject, object) = match (rel.subject_id, rel.object_id) {
            (Some(subject), Some(object)) => (subject, object),
            // A storage row reads "related person is person's relation_type".
            _ => match (rel.related_person_id, rel.person_id) {
                (Some(related), Some(person)) => (related, person),
                (None, _) => {
                    return Err(ParseError::MissingField {
                        index,
                        field: "subjectId",
                    });
                }
                (_, None) => {
                    return Err(ParseError::MissingField {
                        index,
                        field: "objectId",
                    });
                }
            },
        };
        let Some(token) = rel.kind.or(rel.relation_type) else {
            return Err(ParseError::MissingField {
                index,
                field: "kind",
            });
        };
        let Some(kind) = RelationKind::from_token(&token) else {
            tracing::warn!(index, kind = %token, "skipping relationship with unknown kind");
            warnings.push(format!("relationship #{index}: unknown kind `{token}`"));
            continue;
        };
        relationships.push(Relationship {
            subject_id: subject,
            object_id: object,
            kind,
            marriage_year: rel.marriage_year,
        });
    }

    Ok(ParseOutput {
        register: Register {
            persons: raw.persons,
            relationships,
        },
        warnings,
    })
}
