//! Views derived from an [`EntityCollection`](collection::EntityCollection).
//!
//! This crate provides the render side of the person list:
//! - [`ListView`], which re-projects the collection into rows on every change
//! - [`Row`] and [`Cell`], the per-person fragments handed to a surface
//! - [`RenderSurface`] and its in-memory, HTML and JSON implementations

pub mod config;
pub mod error;
pub mod list_view;
pub mod row;
pub mod surface;

pub use config::{Field, ListViewConfig};
pub use error::{RenderError, Result, UnknownFieldError};
pub use list_view::ListView;
pub use row::{Cell, Row};
pub use surface::{HtmlSurface, JsonSurface, RecordingSurface, RenderSurface};
