//! UI helpers for consistent output formatting.

use console::Style;
use sentryscan_core::Severity;

/// Single-character Unicode glyphs used as status indicators.
pub mod indicators {
    /// Error indicator (✖).
    pub const ERROR: &str = "✖";
    /// Warning indicator (⚠).
    pub const WARNING: &str = "⚠";
    /// Success indicator (✓).
    pub const SUCCESS: &str = "✓";
}

/// Semantic colour palette for terminal output.
pub mod colors {
    use console::Style;

    /// Red - errors and critical findings.
    pub const fn error() -> Style {
        Style::new().red()
    }

    /// Yellow - warnings.
    pub const fn warning() -> Style {
        Style::new().yellow()
    }

    /// Green - success messages.
    pub const fn success() -> Style {
        Style::new().green()
    }

    /// Light grey - secondary descriptive text.
    pub const fn secondary() -> Style {
        Style::new().color256(252)
    }

    /// Dark grey - muted/contextual text.
    pub const fn muted() -> Style {
        Style::new().color256(243)
    }
}

/// Process exit codes.
pub mod exit {
    /// No findings at or above the severity threshold.
    pub const OK: i32 = 0;
    /// Engine error or invalid configuration.
    pub const ERROR: i32 = 1;
    /// Findings at or above the threshold are present.
    pub const FINDINGS: i32 = 3;
    /// Findings were present but all were suppressed by the baseline.
    pub const SUPPRESSED: i32 = 5;
}

/// Returns the terminal colour style for a severity level.
pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::new().color256(196).bold(),
        Severity::High => Style::new().color256(208),
        Severity::Medium => Style::new().color256(220),
        Severity::Low => Style::new().color256(75),
    }
}

/// Prints a red error message to stderr.
pub fn print_error(message: &str) {
    eprintln!(
        "{} {}",
        colors::error().apply_to(indicators::ERROR),
        colors::secondary().apply_to(message)
    );
}

/// Prints a yellow warning message to stderr.
pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        colors::warning().apply_to(indicators::WARNING),
        colors::secondary().apply_to(message)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicators_are_single_chars() {
        assert_eq!(indicators::ERROR.chars().count(), 1);
        assert_eq!(indicators::WARNING.chars().count(), 1);
        assert_eq!(indicators::SUCCESS.chars().count(), 1);
    }

    #[test]
    fn exit_codes_match_the_documented_contract() {
        assert_eq!(exit::OK, 0);
        assert_eq!(exit::ERROR, 1);
        assert_eq!(exit::FINDINGS, 3);
        assert_eq!(exit::SUPPRESSED, 5);
    }
}
