//! Logging utilities with colored output and step display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only printed with `--verbose`
//! - `StepLine` for single-line progress of the `generate` command
//!
//! # Example
//!
//! ```ignore
//! log!("serve"; "http://{}", addr);
//!
//! let steps = StepLine::new(&["load", "generate", "write"]);
//! steps.advance("load");
//! steps.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// A step line currently occupies the last terminal line
static STEP_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();

    // Keep an active step line below the log output
    if STEP_ACTIVE.load(Ordering::SeqCst) {
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" => prefix.bright_blue().bold().to_string(),
        "archive" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "fetch" | "warning" => prefix.bright_magenta().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Step Line (single-line pipeline progress)
// ============================================================================

/// Single-line step display for the generate command
///
/// Displays: `[generate] assets ✓ model … package`
///
/// The line is rewritten in place as steps advance.
pub struct StepLine {
    steps: Vec<&'static str>,
    done: Mutex<usize>,
}

impl StepLine {
    /// Create a step display and draw it.
    pub fn new(steps: &[&'static str]) -> Self {
        STEP_ACTIVE.store(true, Ordering::SeqCst);
        let line = Self {
            steps: steps.to_vec(),
            done: Mutex::new(0),
        };
        line.display();
        line
    }

    /// Mark `name` and every step before it as done.
    pub fn advance(&self, name: &str) {
        if let Some(index) = self.steps.iter().position(|s| *s == name) {
            let mut done = self.done.lock();
            *done = (*done).max(index + 1);
        }
        self.display();
    }

    fn render(&self) -> String {
        let done = *self.done.lock();
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| match i.cmp(&done) {
                std::cmp::Ordering::Less => format!("{step} {}", "✓".green()),
                std::cmp::Ordering::Equal => format!("{step} {}", "…".yellow()),
                std::cmp::Ordering::Greater => step.dimmed().to_string(),
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn display(&self) {
        let prefix = colorize_prefix("generate", "generate");
        let line = self.render();

        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        write!(stdout, "{prefix} {line}").ok();
        stdout.flush().ok();
    }

    /// Finish the display, keep the line and move to the next one.
    pub fn finish(self) {
        *self.done.lock() = self.steps.len();
        self.display();
        writeln!(stdout()).ok();
        STEP_ACTIVE.store(false, Ordering::SeqCst);
        std::mem::forget(self); // Prevent Drop from clearing
    }
}

impl Drop for StepLine {
    fn drop(&mut self) {
        STEP_ACTIVE.store(false, Ordering::SeqCst);

        // Clear the line on drop (if not finished properly)
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        stdout.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(line: &str) -> String {
        // Drop ANSI escapes for assertions
        let re = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        re.replace_all(line, "").into_owned()
    }

    #[test]
    fn test_step_line_render_progress() {
        let steps = StepLine {
            steps: vec!["assets", "model", "package"],
            done: Mutex::new(0),
        };
        assert_eq!(strip(&steps.render()), "assets …  model  package");

        *steps.done.lock() = 2;
        assert_eq!(strip(&steps.render()), "assets ✓  model ✓  package …");
        std::mem::forget(steps);
    }
}
