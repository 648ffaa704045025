use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Gender {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "gender_or_unknown")]
    pub gender: Gender,
    #[serde(default, alias = "birth_year")]
    pub birth_year: Option<i32>,
    #[serde(default, alias = "death_year")]
    pub death_year: Option<i32>,
    #[serde(default, alias = "photo_url", alias = "photoUrl")]
    pub photo_ref: Option<String>,
    /// Family-line tags used to split one register into several trees.
    #[serde(
        default,
        alias = "family_tree_ids",
        alias = "familyTreeIds",
        deserialize_with = "families_or_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub families: Vec<String>,
}

// Storage exports leave both columns null for persons never edited.
fn gender_or_unknown<'de, D>(deserializer: D) -> Result<Gender, D::Error>
where
    D: Deserializer<'de>,
{
    let token = Option::<String>::deserialize(deserializer)?;
    Ok(token.as_deref().map_or(Gender::Unknown, Gender::from_token))
}

fn families_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender: Gender::Unknown,
            birth_year: None,
            death_year: None,
            photo_ref: None,
            families: Vec::new(),
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn born(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    pub fn died(mut self, year: i32) -> Self {
        self.death_year = Some(year);
        self
    }

    pub fn in_family(mut self, family: impl Into<String>) -> Self {
        self.families.push(family.into());
        self
    }

    /// Birth year with unknown years mapped to `sentinel` so they sort last.
    pub fn birth_key(&self, sentinel: i32) -> i32 {
        self.birth_year.unwrap_or(sentinel)
    }
}

/// Relation kinds read as "subject is object's <kind>".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Father,
    Mother,
    Husband,
    Wife,
    Son,
    Daughter,
}

impl RelationKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "father" => Some(Self::Father),
            "mother" => Some(Self::Mother),
            "husband" => Some(Self::Husband),
            "wife" => Some(Self::Wife),
            "son" => Some(Self::Son),
            "daughter" => Some(Self::Daughter),
            _ => None,
        }
    }

    pub fn is_spousal(self) -> bool {
        matches!(self, Self::Husband | Self::Wife)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation<'a> {
    Parental { parent: &'a str, child: &'a str },
    Spousal(&'a str, &'a str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub subject_id: String,
    pub object_id: String,
    pub kind: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marriage_year: Option<i32>,
}

impl Relationship {
    pub fn new(subject: impl Into<String>, object: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            subject_id: subject.into(),
            object_id: object.into(),
            kind,
            marriage_year: None,
        }
    }

    /// `child` is recorded as a son/daughter of `parent`.
    pub fn child_of(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(child, parent, RelationKind::Son)
    }

    /// `parent` is recorded as the father/mother of `child`.
    pub fn parent_of(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(parent, child, RelationKind::Father)
    }

    pub fn married(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(a, b, RelationKind::Husband)
    }

    pub fn orient(&self) -> Orientation<'_> {
        let subject = self.subject_id.as_str();
        let object = self.object_id.as_str();
        match self.kind {
            RelationKind::Son | RelationKind::Daughter => Orientation::Parental {
                parent: object,
                child: subject,
            },
            RelationKind::Father | RelationKind::Mother => Orientation::Parental {
                parent: subject,
                child: object,
            },
            RelationKind::Husband | RelationKind::Wife => Orientation::Spousal(subject, object),
        }
    }

    pub fn is_self_relation(&self) -> bool {
        self.subject_id == self.object_id
    }

    pub fn touches_only(&self, ids: &HashSet<&str>) -> bool {
        ids.contains(self.subject_id.as_str()) && ids.contains(self.object_id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persons tagged with `family`, plus the relationships among them.
    pub fn restrict_to_family(&self, family: &str) -> Register {
        let persons: Vec<Person> = self
            .persons
            .iter()
            .filter(|person| person.families.iter().any(|tag| tag == family))
            .cloned()
            .collect();
        let ids: HashSet<&str> = persons.iter().map(|person| person.id.as_str()).collect();
        let relationships = self
            .relationships
            .iter()
            .filter(|rel| rel.touches_only(&ids))
            .cloned()
            .collect();
        Register {
            persons,
            relationships,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_follows_kind() {
        let son = Relationship::new("c", "p", RelationKind::Son);
        assert_eq!(
            son.orient(),
            Orientation::Parental {
                parent: "p",
                child: "c"
            }
        );
        let mother = Relationship::new("p", "c", RelationKind::Mother);
        assert_eq!(
            mother.orient(),
            Orientation::Parental {
                parent: "p",
                child: "c"
            }
        );
        let wife = Relationship::new("a", "b", RelationKind::Wife);
        assert_eq!(wife.orient(), Orientation::Spousal("a", "b"));
    }

    #[test]
    fn relation_tokens_are_case_insensitive() {
        assert_eq!(RelationKind::from_token(" Daughter "), Some(RelationKind::Daughter));
        assert_eq!(RelationKind::from_token("cousin"), None);
        assert!(RelationKind::Wife.is_spousal());
        assert!(!RelationKind::Son.is_spousal());
    }

    #[test]
    fn unknown_gender_deserializes() {
        let person: Person =
            serde_json::from_str(r#"{"id":"a","name":"A","gender":"other"}"#).unwrap();
        assert_eq!(person.gender, Gender::Unknown);
        let person: Person = serde_json::from_str(
            r#"{"id":"a","name":"A","gender":"female","birth_year":1950,"photo_url":"x.png"}"#,
        )
        .unwrap();
        assert_eq!(person.gender, Gender::Female);
        assert_eq!(person.birth_year, Some(1950));
        assert_eq!(person.photo_ref.as_deref(), Some("x.png"));
    }

    #[test]
    fn null_columns_fall_back_to_defaults() {
        let person: Person = serde_json::from_str(
            r#"{"id":"a","name":"A","gender":null,"birth_year":null,"family_tree_ids":null}"#,
        )
        .unwrap();
        assert_eq!(person.gender, Gender::Unknown);
        assert_eq!(person.birth_year, None);
        assert!(person.families.is_empty());

        let person: Person =
            serde_json::from_str(r#"{"id":"b","name":"B","gender":"M"}"#).unwrap();
        assert_eq!(person.gender, Gender::Male);
    }

    #[test]
    fn family_restriction_keeps_internal_relations() {
        let register = Register {
            persons: vec![
                Person::new("a", "A").in_family("kim"),
                Person::new("b", "B").in_family("kim"),
                Person::new("c", "C").in_family("lee"),
            ],
            relationships: vec![
                Relationship::child_of("b", "a"),
                Relationship::married("a", "c"),
            ],
        };
        let kim = register.restrict_to_family("kim");
        assert_eq!(kim.persons.len(), 2);
        assert_eq!(kim.relationships.len(), 1);
    }
}
