//! Diagnostics for the assembler.
//!
//! The assembler does not stop at the first problem it finds. Errors and
//! warnings are collected into a [`MessageQueue`], which the front end can
//! render once assembly is over. The queue enforces an error threshold:
//! once too many errors accumulate, it signals [`Abort`] and the assembly
//! pipeline unwinds without producing code.
//!
//! This module consists of:
//! - [`MessageQueue`]: the diagnostic collector and report formatter
//! - [`Diagnostic`]: a single recorded message
//! - [`Severity`]: the error/warning distinction
//! - [`Abort`]: the sentinel returned when the error threshold is hit

use std::fmt::Write as _;

/// Sentinel indicating the error threshold was reached and
/// assembly must stop immediately.
///
/// This is returned from [`MessageQueue::error`] and propagated with `?`
/// through the assembly passes. It is not itself a diagnostic; the
/// `"N errors. Quitting."` message is already in the queue when this
/// value is produced.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Abort;

impl std::fmt::Display for Abort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("too many errors, assembly aborted")
    }
}
impl std::error::Error for Abort {}

/// How serious a diagnostic is.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Severity {
    /// A fatal problem. Any error makes assembly fail.
    Error,
    /// A non-fatal observation. Warnings never block output.
    Warning,
}
impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error   => f.write_str("Error"),
            Severity::Warning => f.write_str("Warning"),
        }
    }
}

/// A single diagnostic message.
///
/// Diagnostics are append-only: once recorded they are never mutated.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Diagnostic {
    /// Whether this is an error or a warning.
    pub severity: Severity,
    /// The message text.
    pub text: String,
    /// The 1-based source line this message refers to, if any.
    pub line: Option<usize>,
    /// The source line text, for display under the message.
    pub source: String,
}

/// Collects errors and warnings, enforces an error threshold,
/// and formats a report.
///
/// ## Example
/// ```
/// use lmc_suite::err::MessageQueue;
///
/// let mut q = MessageQueue::new(10);
/// q.error("Unknown mnemonic", Some(4), "LAD 53").unwrap();
/// q.warn("Unused label", Some(7), "X DAT");
///
/// assert!(q.has_error());
/// assert_eq!(q.to_string(), "\
/// Error: Unknown mnemonic
///   line 4: LAD 53
/// Warning: Unused label
///   line 7: X DAT
///
/// 1 error, 1 warning
/// ");
/// ```
#[derive(Debug, Clone)]
pub struct MessageQueue {
    messages: Vec<Diagnostic>,
    n_errors: usize,
    n_warnings: usize,
    max_errors: usize,
}

impl MessageQueue {
    /// Creates an empty queue which aborts once `max_errors` errors accumulate.
    pub fn new(max_errors: usize) -> Self {
        Self { messages: Vec::new(), n_errors: 0, n_warnings: 0, max_errors }
    }

    fn push(&mut self, severity: Severity, text: String, line: Option<usize>, source: &str) {
        match severity {
            Severity::Error   => self.n_errors += 1,
            Severity::Warning => self.n_warnings += 1,
        }
        self.messages.push(Diagnostic { severity, text, line, source: source.to_string() });
    }

    /// Records an error.
    ///
    /// If this error brings the count up to the configured threshold, a final
    /// `"N errors. Quitting."` message is appended (and counted) and
    /// `Err(Abort)` is returned. Callers must propagate the abort; no
    /// further assembly work may run after it.
    pub fn error(&mut self, text: impl Into<String>, line: Option<usize>, source: &str) -> Result<(), Abort> {
        self.push(Severity::Error, text.into(), line, source);
        if self.n_errors == self.max_errors {
            let text = format!("{} errors. Quitting.", self.max_errors);
            self.push(Severity::Error, text, None, "");
            return Err(Abort);
        }
        Ok(())
    }

    /// Records a warning. Warnings never trigger an abort.
    pub fn warn(&mut self, text: impl Into<String>, line: Option<usize>, source: &str) {
        self.push(Severity::Warning, text.into(), line, source);
    }

    /// Whether any error has been recorded.
    pub fn has_error(&self) -> bool {
        self.n_errors > 0
    }

    /// The number of errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.n_errors
    }

    /// The number of warnings recorded so far.
    pub fn warning_count(&self) -> usize {
        self.n_warnings
    }

    /// Iterates over the recorded diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.messages.iter()
    }

    /// Writes the rendered report to an [`std::io::Write`] stream.
    ///
    /// Front ends typically point this at standard error; the core never
    /// writes anywhere on its own.
    pub fn write(&self, mut w: impl std::io::Write) -> std::io::Result<()> {
        write!(w, "{self}")
    }
}

impl std::fmt::Display for MessageQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for m in &self.messages {
            writeln!(f, "{}: {}", m.severity, m.text)?;
            if let Some(n) = m.line {
                writeln!(f, "  line {}: {}", n, m.source)?;
            }
        }
        if self.n_errors > 0 || self.n_warnings > 0 {
            f.write_char('\n')?;
            writeln!(f, "{}, {}", count(self.n_errors, "error"), count(self.n_warnings, "warning"))?;
        }
        Ok(())
    }
}

/// Formats a count of things, pluralizing by appending `s`.
pub(crate) fn count(n: usize, word: &str) -> String {
    match n {
        1 => format!("1 {word}"),
        _ => format!("{n} {word}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::{count, Abort, MessageQueue, Severity};

    #[test]
    fn test_count() {
        assert_eq!(count(0, "error"), "0 errors");
        assert_eq!(count(1, "error"), "1 error");
        assert_eq!(count(2, "warning"), "2 warnings");
    }

    #[test]
    fn test_empty_report() {
        let q = MessageQueue::new(10);
        assert!(!q.has_error());
        // No messages, no summary.
        assert_eq!(q.to_string(), "");
    }

    #[test]
    fn test_line_formats() {
        let mut q = MessageQueue::new(10);
        q.error("Unknown mnemonic", Some(4), "LAD 53").unwrap();
        q.warn("No HLT instruction in input", None, "");

        assert_eq!(q.to_string(), "\
Error: Unknown mnemonic
  line 4: LAD 53
Warning: No HLT instruction in input

1 error, 1 warning
");
    }

    #[test]
    fn test_warnings_only() {
        let mut q = MessageQueue::new(10);
        q.warn("Unused label", Some(2), "X DAT");
        assert!(!q.has_error());
        assert_eq!(q.warning_count(), 1);
        assert!(q.to_string().ends_with("0 errors, 1 warning\n"));
    }

    #[test]
    fn test_threshold_abort() {
        let mut q = MessageQueue::new(4);
        for i in 0..3 {
            q.error("Unknown mnemonic", Some(i + 1), "???").unwrap();
        }
        // The fourth error hits the threshold.
        assert_eq!(q.error("Unknown mnemonic", Some(4), "???"), Err(Abort));

        // The quitting message is itself an error, so the final count is 5.
        assert_eq!(q.error_count(), 5);
        let last = q.iter().last().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert_eq!(last.text, "4 errors. Quitting.");
        assert_eq!(last.line, None);
    }

    #[test]
    fn test_warnings_do_not_abort() {
        let mut q = MessageQueue::new(1);
        for _ in 0..5 {
            q.warn("Unused label", Some(1), "X DAT");
        }
        assert_eq!(q.warning_count(), 5);
        assert!(!q.has_error());
    }
}
