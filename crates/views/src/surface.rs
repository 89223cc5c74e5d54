//! Rendering surfaces that receive a view's rows.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::Result;
use crate::row::Row;

/// Destination for rendered rows.
///
/// A surface owns presentation: it receives the container a view targets
/// and the ordered rows for that container, replacing whatever it showed
/// there before.
pub trait RenderSurface {
    /// Replaces the contents of `container_id` with `rows`.
    fn render(&mut self, container_id: &str, rows: &[Row]) -> Result<()>;
}

impl<T: RenderSurface + ?Sized> RenderSurface for Box<T> {
    fn render(&mut self, container_id: &str, rows: &[Row]) -> Result<()> {
        (**self).render(container_id, rows)
    }
}

/// Surface that keeps the latest rows per container in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    containers: HashMap<String, Vec<Row>>,
    renders: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rows last rendered into `container_id`.
    pub fn rows(&self, container_id: &str) -> Option<&[Row]> {
        self.containers.get(container_id).map(Vec::as_slice)
    }

    /// Returns how many renders this surface has received.
    pub fn render_count(&self) -> usize {
        self.renders
    }
}

impl RenderSurface for RecordingSurface {
    fn render(&mut self, container_id: &str, rows: &[Row]) -> Result<()> {
        self.containers
            .insert(container_id.to_string(), rows.to_vec());
        self.renders += 1;
        Ok(())
    }
}

/// Surface that writes HTML table rows for the container's `tbody`.
#[derive(Debug)]
pub struct HtmlSurface<W: Write> {
    writer: W,
}

impl<W: Write> HtmlSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSurface for HtmlSurface<W> {
    fn render(&mut self, container_id: &str, rows: &[Row]) -> Result<()> {
        writeln!(self.writer, "#{container_id} tbody")?;
        for row in rows {
            writeln!(self.writer, "{}", row.to_html())?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRender<'a> {
    container_id: &'a str,
    rows: &'a [Row],
}

/// Surface that writes one JSON document per render, newline delimited.
#[derive(Debug)]
pub struct JsonSurface<W: Write> {
    writer: W,
}

impl<W: Write> JsonSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSurface for JsonSurface<W> {
    fn render(&mut self, container_id: &str, rows: &[Row]) -> Result<()> {
        let document = JsonRender { container_id, rows };
        serde_json::to_writer(&mut self.writer, &document)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
