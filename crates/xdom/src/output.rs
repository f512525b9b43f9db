//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Messages go to stderr so that converted documents on stdout stay clean.
pub(crate) struct Output {
    term: Term,
    data: Term,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            data: Term::stdout(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Print command output to stdout.
    pub(crate) fn data(&self, text: &str) -> std::io::Result<()> {
        self.data.write_line(text)
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Heading for a listing section (cyan bold), on stdout.
    pub(crate) fn heading(&self, msg: &str) -> std::io::Result<()> {
        self.data.write_line(&self.cyan_bold.apply_to(msg).to_string())
    }

    /// A listing entry with a dimmed description, on stdout.
    pub(crate) fn entry(&self, name: &str, description: &str) -> std::io::Result<()> {
        if description.is_empty() {
            self.data.write_line(&format!("  {name}"))
        } else {
            self.data
                .write_line(&format!("  {name:<12} {}", self.dim.apply_to(description)))
        }
    }
}
