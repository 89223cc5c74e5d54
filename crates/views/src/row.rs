//! Row fragments produced by a list view.

use collection::Person;
use common::PersonId;
use serde::Serialize;

use crate::config::Field;

/// One rendered column of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Cell {
    /// A plain field value.
    Value(String),
    /// The removal control for the row's person.
    RemoveAction {
        class: String,
        #[serde(rename = "personId")]
        person_id: PersonId,
    },
}

impl Cell {
    /// Renders the cell as a table data element.
    pub fn to_html(&self) -> String {
        match self {
            Cell::Value(text) => format!("<td>{}</td>", escape_html(text)),
            Cell::RemoveAction { class, person_id } => format!(
                "<td><input type='button' class='{}' value='Remove' personId='{}'></td>",
                escape_html(class),
                person_id
            ),
        }
    }
}

/// The projection of one person through the configured fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub person_id: PersonId,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Projects a saved person. Returns `None` for a transient person,
    /// which has no id to route a removal back to.
    pub fn project(person: &Person, fields: &[Field], remove_action_class: &str) -> Option<Self> {
        let person_id = person.id()?;
        let cells = fields
            .iter()
            .map(|field| match field {
                Field::Name => Cell::Value(person.name().to_string()),
                Field::BirthYear => Cell::Value(person.birth_year().to_string()),
                Field::RemoveAction => Cell::RemoveAction {
                    class: remove_action_class.to_string(),
                    person_id,
                },
            })
            .collect();
        Some(Self { person_id, cells })
    }

    /// Renders the row as a table row element.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<tr>");
        for cell in &self.cells {
            html.push_str(&cell.to_html());
        }
        html.push_str("</tr>");
        html
    }
}

fn escape_html(text: &str) -> String {
    v_htmlescape::escape(text).to_string()
}
