// Diagnostic reporting for the export pass
// Renders per-declaration failures with spans, colors and suggestions

use colored::Colorize;
use std::fmt;

/// Source code location (line, column, file)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub length: usize, // Length of the highlighted region
}

impl Span {
    pub fn new(file: String, line: usize, column: usize, length: usize) -> Self {
        Self {
            file,
            line,
            column,
            length,
        }
    }

    pub fn unknown() -> Self {
        Self {
            file: "<unknown>".to_string(),
            line: 0,
            column: 0,
            length: 0,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    /// Defect in the compiler itself, not in the user's source
    Bug,
    Error,
    Warning,
    Note,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLevel::Bug => write!(f, "{}", "internal error".magenta().bold()),
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
            ErrorLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
            ErrorLevel::Note => write!(f, "{}", "note".cyan().bold()),
        }
    }
}

/// Structured diagnostic message
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: String, // e.g., "E0101" for an unsupported export type
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(level: ErrorLevel, code: &str, message: String, span: Span) -> Self {
        Self {
            level,
            code: code.to_string(),
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn bug(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Bug, code, message, span)
    }

    pub fn error(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Error, code, message, span)
    }

    pub fn warning(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Warning, code, message, span)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Format diagnostic in Rust-style, with a source excerpt when available
    pub fn format(&self, source_code: &str) -> String {
        let mut output = self.header();

        if let Some(snippet) = self.get_source_snippet(source_code) {
            output.push_str(&snippet);
        }

        output.push_str(&self.trailer());
        output
    }

    // error[E0101]: message
    //  --> file.rs:12:15
    fn header(&self) -> String {
        format!(
            "{}[{}]: {}\n {} {}\n",
            self.level,
            self.code,
            self.message.bold(),
            "-->".cyan().bold(),
            self.span
        )
    }

    fn trailer(&self) -> String {
        let mut output = String::new();
        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }
        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }
        output
    }

    /// Extract source code snippet with the span underlined
    fn get_source_snippet(&self, source_code: &str) -> Option<String> {
        if self.span.line == 0 {
            return None;
        }
        let line = source_code.lines().nth(self.span.line - 1)?;

        let mut snippet = String::new();
        let line_num_width = self.span.line.to_string().len().max(2);
        let gutter = " ".repeat(line_num_width + 1);

        snippet.push_str(&format!(" {}\n", gutter.cyan()));
        snippet.push_str(&format!(
            " {} {} {}\n",
            format!("{:>width$}", self.span.line, width = line_num_width)
                .cyan()
                .bold(),
            "|".cyan().bold(),
            line
        ));

        let padding = " ".repeat(line_num_width + 3 + self.span.column.saturating_sub(1));
        let underline = "^".repeat(self.span.length.max(1));
        snippet.push_str(&format!(
            " {} {}{}\n",
            gutter.cyan(),
            padding,
            underline.red().bold()
        ));

        Some(snippet)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.header(), self.trailer())
    }
}

/// Diagnostic collection for one export pass
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    bug_count: usize,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            ErrorLevel::Bug => self.bug_count += 1,
            ErrorLevel::Error => self.error_count += 1,
            ErrorLevel::Warning => self.warning_count += 1,
            ErrorLevel::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0 || self.bug_count > 0
    }

    /// Internal errors are reported separately from user errors
    pub fn has_bugs(&self) -> bool {
        self.bug_count > 0
    }

    pub fn bug_count(&self) -> usize {
        self.bug_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Renders every diagnostic against the source of the script
    pub fn render_all(&self, source_code: &str) -> String {
        self.diagnostics
            .iter()
            .map(|diag| diag.format(source_code))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.bug_count = 0;
        self.error_count = 0;
        self.warning_count = 0;
    }
}

/// Diagnostic codes emitted by the export pass
pub mod error_codes {
    // Export errors (E0100-E0199)
    pub const UNSUPPORTED_TYPE: &str = "E0101";
    pub const CONSTANT_EVALUATION: &str = "E0102";
    pub const MISSING_INITIALIZER: &str = "E0103";
    pub const RESERVED_NAME: &str = "E0104";

    // Internal consistency (E0900-E0999)
    pub const ELEMENT_MISMATCH: &str = "E0901";

    // Warnings (W0001-W9999)
    pub const UNKNOWN_ELEMENT_NAME: &str = "W0101";
}

/// Fuzzy matching utilities for "did you mean?" suggestions
pub mod fuzzy {
    use strsim::jaro_winkler;

    /// Find similar names using fuzzy matching (Jaro-Winkler distance)
    /// Returns up to `max_suggestions` names with similarity > threshold
    pub fn find_similar_names<'c, I>(
        target: &str,
        candidates: I,
        threshold: f64,
        max_suggestions: usize,
    ) -> Vec<String>
    where
        I: IntoIterator<Item = &'c str>,
    {
        let mut scored: Vec<(&str, f64)> = candidates
            .into_iter()
            .filter(|candidate| *candidate != target)
            .map(|candidate| (candidate, jaro_winkler(target, candidate)))
            .filter(|(_, score)| *score > threshold)
            .collect();

        // Highest similarity first, ties broken by name for stable output
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        scored
            .into_iter()
            .take(max_suggestions)
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_format() {
        let source = "typedef struct { int x; } S;\nstatic void *gPtr;\n";

        let span = Span::new("script.rs".to_string(), 2, 14, 4);
        let diag = Diagnostic::error(
            error_codes::UNSUPPORTED_TYPE,
            "type `void *` is not exportable".to_string(),
            span,
        )
        .with_note("pointers to `void` have no reflected representation".to_string())
        .with_help("declare the variable `static` to keep it out of reflection".to_string());

        let formatted = diag.format(source);

        assert!(formatted.contains("E0101"));
        assert!(formatted.contains("is not exportable"));
        assert!(formatted.contains("script.rs:2:14"));
        assert!(formatted.contains("^^^^"));
    }

    #[test]
    fn test_engine_counts_bugs_separately() {
        let mut engine = DiagnosticEngine::new();
        engine.emit(Diagnostic::error("E0101", "a".to_string(), Span::unknown()));
        engine.emit(Diagnostic::bug("E0901", "b".to_string(), Span::unknown()));
        engine.emit(Diagnostic::warning("W0101", "c".to_string(), Span::unknown()));

        assert_eq!(engine.error_count(), 1);
        assert_eq!(engine.bug_count(), 1);
        assert_eq!(engine.warning_count(), 1);
        assert!(engine.has_bugs());

        let rendered = engine.render_all("");
        assert!(rendered.contains("E0101") && rendered.contains("W0101"));

        engine.clear();
        assert!(!engine.has_errors());
        assert!(engine.diagnostics().is_empty());
    }

    #[test]
    fn test_similar_names() {
        let names = ["rs_pixel_rgb", "rs_pixel_rgba", "rs_pixel_l"];
        let similar = fuzzy::find_similar_names("rs_pixel_rbg", names, 0.8, 2);
        assert_eq!(similar.first().map(String::as_str), Some("rs_pixel_rgb"));
    }
}
