//! Event rendering

use anyhow::Result;
use notifyx_watcher::WatchedEvent;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::Write;

/// One `--json` line
#[derive(Debug, Serialize)]
pub struct EventRecord {
    pub wd: i32,
    pub path: Option<String>,
    pub mask: u32,
    pub flags: Vec<String>,
    pub cookie: u32,
    pub name: Option<String>,
}

impl From<&WatchedEvent> for EventRecord {
    fn from(watched: &WatchedEvent) -> Self {
        let event = &watched.event;
        let description = event.mask.describe();
        Self {
            wd: event.watch.as_raw(),
            path: watched.path.as_ref().map(|p| p.display().to_string()),
            mask: event.mask.bits(),
            flags: description.split('|').map(str::to_string).collect(),
            cookie: event.cookie,
            name: event.name_lossy().map(|n| n.into_owned()),
        }
    }
}

/// Writes events as text lines or JSON lines
pub struct Printer<W> {
    out: W,
    json: bool,
    color: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, json: bool, color: bool) -> Self {
        Self { out, json, color }
    }

    pub fn print(&mut self, watched: &WatchedEvent) -> Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.out, &EventRecord::from(watched))?;
            writeln!(self.out)?;
        } else {
            let line = self.format(watched);
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// `<path>: <mask description> [<name>]`
    fn format(&self, watched: &WatchedEvent) -> String {
        let event = &watched.event;
        let path = match &watched.path {
            Some(path) => path.display().to_string(),
            None => format!("wd {}", event.watch),
        };
        let description = event.mask.describe();
        let name = event.name_lossy();

        if self.color {
            match name {
                Some(name) => format!("{}: {} {}", path.cyan(), description.yellow(), name.bold()),
                None => format!("{}: {}", path.cyan(), description.yellow()),
            }
        } else {
            match name {
                Some(name) => format!("{}: {} {}", path, description, name),
                None => format!("{}: {}", path, description),
            }
        }
    }
}
