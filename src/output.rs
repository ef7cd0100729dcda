// Output renderer - writes pages and events to stdout (or any writer)
//
// Text mode prints one line per event, optionally through the colorizer.
// JSON mode prints the service's original payload untouched.

use crate::api::{Event, PageResult};
use crate::format::Colorizer;
use std::io::Write;

/// How events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// `<received_at> <source_name> <program>: <message>`
    Text,
    /// Raw JSON payloads, one document per line
    Json,
}

pub struct Renderer<W: Write> {
    out: W,
    mode: OutputMode,
    colorizer: Option<Colorizer>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, mode: OutputMode, colorizer: Option<Colorizer>) -> Self {
        Self {
            out,
            mode,
            colorizer,
        }
    }

    /// Render a whole page: one JSON document for the page, or one line per event
    pub fn render_page(&mut self, page: &PageResult) -> std::io::Result<()> {
        match self.mode {
            OutputMode::Json => writeln!(self.out, "{}", page.data)?,
            OutputMode::Text => {
                for event in &page.events {
                    self.write_line(event)?;
                }
            }
        }
        self.out.flush()
    }

    /// Render a single event: its JSON payload, or its text line
    pub fn render_event(&mut self, event: &Event) -> std::io::Result<()> {
        match self.mode {
            OutputMode::Json => writeln!(self.out, "{}", event.data),
            OutputMode::Text => self.write_line(event),
        }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    fn write_line(&mut self, event: &Event) -> std::io::Result<()> {
        let line = event.to_string();
        match &self.colorizer {
            Some(colorizer) => writeln!(self.out, "{}", colorizer.colorize(&line)),
            None => writeln!(self.out, "{}", line),
        }
    }

    /// Give back the underlying writer
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
