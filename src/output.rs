// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet, JSON, and GitHub Actions workflow-command output.

use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output (only warnings, errors and the final result)
    Quiet,
    /// JSON lines for scripting
    Json,
    /// GitHub Actions workflow commands (groups and annotations)
    Github,
}

impl OutputMode {
    /// Pick the mode when none was requested.
    pub fn detect(in_ci: bool) -> Self {
        if in_ci {
            OutputMode::Github
        } else {
            OutputMode::Normal
        }
    }
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("  → {message}"),
            OutputMode::Github => println!("{message}"),
            OutputMode::Quiet | OutputMode::Json => {}
        }
    }

    /// Open a collapsible section of related progress lines.
    ///
    /// The section closes when the returned [`Group`] is dropped, including
    /// when a step inside it fails with `?`.
    pub fn group(&self, name: &str) -> Group<'_> {
        match self.mode {
            OutputMode::Normal => println!("{name}"),
            OutputMode::Github => println!("::group::{name}"),
            OutputMode::Quiet | OutputMode::Json => {}
        }
        Group { output: self }
    }

    fn end_group(&self) {
        if self.mode == OutputMode::Github {
            println!("::endgroup::");
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Github => eprintln!("::warning::{message}"),
            OutputMode::Json => self.emit_json("warning", message, true),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Github => println!("::notice::\u{2705} {message}"),
            OutputMode::Json => self.emit_json("success", message, false),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Github => eprintln!("::error::{message}"),
            OutputMode::Json => self.emit_json("error", message, true),
        }
    }

    fn emit_json(&self, event: &str, message: &str, to_stderr: bool) {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.duration_secs(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            if to_stderr {
                eprintln!("{json}");
            } else {
                println!("{json}");
            }
        }
    }
}

/// An open output section, closed on drop.
#[must_use = "the group closes as soon as this is dropped"]
pub struct Group<'a> {
    output: &'a Output,
}

impl Drop for Group<'_> {
    fn drop(&mut self) {
        self.output.end_group();
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
