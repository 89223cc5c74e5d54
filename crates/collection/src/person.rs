use serde::{Deserialize, Serialize};

use common::PersonId;

/// One person record.
///
/// A person built with [`Person::new`] is transient: it has no id until it
/// is handed to [`EntityCollection::save`](crate::EntityCollection::save),
/// which assigns one. Later saves of the same person overwrite the stored
/// entry under that id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    id: Option<PersonId>,
    name: String,
    birth_year: i32,
}

impl Person {
    /// Creates a transient person.
    pub fn new(name: impl Into<String>, birth_year: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            birth_year,
        }
    }

    /// Returns the assigned id, if the person has been saved.
    pub fn id(&self) -> Option<PersonId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_year(&self) -> i32 {
        self.birth_year
    }

    /// Returns true until the person has been saved once.
    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_birth_year(&mut self, birth_year: i32) {
        self.birth_year = birth_year;
    }

    pub(crate) fn assign_id(&mut self, id: PersonId) {
        self.id = Some(id);
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.birth_year)
    }
}
