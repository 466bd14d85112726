use std::io::{self, Write};

use serde::Serialize;

use crate::app::{EnvironmentReport, ProgressEvent, ProgressSink, SearchReport};
use crate::render;
use crate::search::SearchPage;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_search(report: &SearchReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_environment(report: &EnvironmentReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Human-readable output for one-shot commands.
pub struct TextOutput;

impl TextOutput {
    pub fn print_search(report: &SearchReport, details: bool) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(Self::render_search(report, details).as_bytes())?;
        stdout.flush()
    }

    /// Renders a report through the same page state the interactive view
    /// uses.
    pub fn render_search(report: &SearchReport, details: bool) -> String {
        let mut page = SearchPage::new();
        match page.submit(report.term.as_str()) {
            Some(ticket) => {
                page.apply(ticket.seq, report.resolution.clone());
            }
            None => return String::new(),
        }
        render::render_page(&page.view(), details)
    }

    pub fn print_environment(report: &EnvironmentReport) -> io::Result<()> {
        let cyan = "\x1b[36m";
        let reset = "\x1b[0m";
        let mut stdout = io::stdout();
        writeln!(stdout, "{cyan}{}{reset}", report.brand)?;
        writeln!(stdout, "environment: {}", report.environment)?;
        writeln!(stdout, "api: {}", report.base_url)?;
        Ok(())
    }
}

/// Progress lines on stderr, so stdout stays clean for the result.
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn event(&self, event: ProgressEvent) {
        let dim = "\x1b[2m";
        let reset = "\x1b[0m";
        match event.elapsed {
            Some(elapsed) => eprintln!(
                "{dim}{} ({} ms){reset}",
                event.message,
                elapsed.as_millis()
            ),
            None => eprintln!("{dim}{}{reset}", event.message),
        }
    }
}
