//! View configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownFieldError;

pub const DEFAULT_CONTAINER_ID: &str = "person-table";
pub const DEFAULT_REMOVE_ACTION_CLASS: &str = "remove-person";

/// A column a list view can render for each person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    BirthYear,
    /// A control the UI routes back to a removal of the row's person.
    #[serde(alias = "removeButton")]
    RemoveAction,
}

impl Field {
    /// The default column set: name, birth year, remove control.
    pub fn defaults() -> Vec<Field> {
        vec![Field::Name, Field::BirthYear, Field::RemoveAction]
    }

    /// Parses a comma separated column list, ignoring blank entries.
    pub fn parse_list(s: &str) -> Result<Vec<Field>, UnknownFieldError> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::BirthYear => "birthYear",
            Field::RemoveAction => "removeAction",
        }
    }
}

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "birthYear" => Ok(Field::BirthYear),
            "removeAction" | "removeButton" => Ok(Field::RemoveAction),
            other => Err(UnknownFieldError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a [`ListView`](crate::ListView).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewConfig {
    /// Columns to render, in order.
    pub fields: Vec<Field>,
    /// Render target handed to the surface.
    pub container_id: String,
    /// Style tag placed on each row's remove control.
    pub remove_action_class: String,
}

impl ListViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_container_id(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    pub fn with_remove_action_class(mut self, class: impl Into<String>) -> Self {
        self.remove_action_class = class.into();
        self
    }
}

impl Default for ListViewConfig {
    fn default() -> Self {
        Self {
            fields: Field::defaults(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            remove_action_class: DEFAULT_REMOVE_ACTION_CLASS.to_string(),
        }
    }
}
