use std::io::{self, Write};

use serde::Serialize;

use crate::app::{AddResult, ResolveResult};
use crate::error::CentaurusError;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

#[derive(Debug, Serialize)]
struct ErrorOutput<'a> {
    kind: crate::error::ErrorKind,
    message: &'a str,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_add(result: &AddResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_resolve(result: &ResolveResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_error(error: &CentaurusError) -> io::Result<()> {
        let message = error.to_string();
        Self::print_json(&ErrorOutput {
            kind: error.kind(),
            message: &message,
        })
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl crate::app::ProgressSink for JsonOutput {
    fn event(&self, _event: crate::app::ProgressEvent) {}
}

/// Progress lines on stderr for plain terminal runs.
pub struct ConsoleSink;

impl crate::app::ProgressSink for ConsoleSink {
    fn event(&self, event: crate::app::ProgressEvent) {
        eprintln!("  {}", event.message.trim());
    }
}
