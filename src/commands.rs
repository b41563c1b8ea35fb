use crate::models::{Category, ExportFormat};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::PathBuf;

/// One line of user input at the session prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    Start {
        name: String,
        category: Option<Category>,
    },
    Stop,
    Stats {
        days: Option<u32>,
    },
    Clear,
    Export {
        path: PathBuf,
        format: ExportFormat,
    },
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  status                           refresh and show the current status
  start <task> [study|game|other]  start a task (default category: study)
  stop                             stop the running task
  stats [days]                     show totals for the last N days
  clear                            delete every record (asks first)
  export <path> [csv|json]         save the last 30 days to a file
  help                             show this text
  quit                             leave";

/// Parses prompt lines into commands
///
/// The task name in `start` may contain spaces; a trailing category word is
/// split off only when it names a known category.
pub struct CommandParser {
    start: Regex,
    stats: Regex,
    export: Regex,
}

impl CommandParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            start: Regex::new(r"(?i)^start(?:\s+(.*?))?(?:\s+(study|game|other))?\s*$")
                .context("Failed to compile start pattern")?,
            stats: Regex::new(r"(?i)^stats(?:\s+(\d+))?\s*$")
                .context("Failed to compile stats pattern")?,
            export: Regex::new(r"(?i)^export\s+(.+?)(?:\s+(csv|json))?\s*$")
                .context("Failed to compile export pattern")?,
        })
    }

    /// `None` for blank lines.
    pub fn parse(&self, line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let keyword = line
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let command = match keyword.as_str() {
            "status" | "refresh" if line.split_whitespace().count() == 1 => Command::Status,
            "stop" if line.split_whitespace().count() == 1 => Command::Stop,
            "clear" if line.split_whitespace().count() == 1 => Command::Clear,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "start" => self.parse_start(line),
            "stats" => self.parse_stats(line),
            "export" => self.parse_export(line),
            _ => Command::Unknown(line.to_string()),
        };

        Some(command)
    }

    fn parse_start(&self, line: &str) -> Command {
        let Some(caps) = self.start.captures(line) else {
            return Command::Unknown(line.to_string());
        };

        Command::Start {
            name: caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            category: caps.get(2).and_then(|m| m.as_str().parse().ok()),
        }
    }

    fn parse_stats(&self, line: &str) -> Command {
        match self.stats.captures(line) {
            Some(caps) => Command::Stats {
                days: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            },
            None => Command::Unknown(line.to_string()),
        }
    }

    fn parse_export(&self, line: &str) -> Command {
        match self.export.captures(line) {
            Some(caps) => Command::Export {
                path: PathBuf::from(&caps[1]),
                format: caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or_default(),
            },
            None => Command::Unknown(line.to_string()),
        }
    }
}
