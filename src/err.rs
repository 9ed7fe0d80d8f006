//! Error interface for this crate.
//!
//! Every error raised by this crate implements [`Error`], which extends
//! [`std::error::Error`] with diagnostic information (the source line the
//! error occurred on, the span within that line, and an optional help message).
//!
//! The [`report`] function renders any of these errors into a
//! compiler-style diagnostic.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::ops::Range;

pub use crate::asm::{AsmErr, AsmErrKind};
pub use crate::ast::OffsetNewErr;
pub use crate::parse::{ParseErr, ParseErrKind};
pub use crate::parse::lex::LexErr;
pub use crate::sim::SimErr;

/// Unified error interface for all errors in this crate.
pub trait Error: std::error::Error {
    /// The (0-indexed) source line this error is associated with, if any.
    fn line(&self) -> Option<usize> {
        None
    }

    /// The character range within the source line this error points to, if any.
    fn span(&self) -> Option<Range<usize>> {
        None
    }

    /// A help message describing how to fix the error, if one exists.
    fn help(&self) -> Option<Cow<str>> {
        None
    }
}

/// Renders an error into a compiler-style diagnostic.
///
/// If `src` is provided and the error is associated with a line,
/// the offending line is printed with the error's span underlined.
///
/// ```
/// use mipsette::asm::assemble;
/// use mipsette::err::report;
///
/// let src = "addi $t0 $zero 5\naddi $t0 $zero 40000";
/// let err = assemble(src).unwrap_err();
///
/// let diag = report(&err, Some(src));
/// assert!(diag.starts_with("error: line 1:"));
/// assert!(diag.contains("addi $t0 $zero 40000"));
/// ```
pub fn report(err: &dyn Error, src: Option<&str>) -> String {
    let mut diag = String::new();

    match err.line() {
        Some(lno) => { let _ = writeln!(diag, "error: line {lno}: {err}"); },
        None      => { let _ = writeln!(diag, "error: {err}"); },
    }

    let line_text = err.line()
        .zip(src)
        .and_then(|(lno, src)| src.lines().nth(lno));
    if let (Some(lno), Some(text)) = (err.line(), line_text) {
        let gutter = " ".repeat(lno.to_string().len());
        let _ = writeln!(diag, "{gutter} |");
        let _ = writeln!(diag, "{lno} | {}", text.trim_end_matches('\r'));

        if let Some(Range { start, end }) = err.span() {
            let width = end.saturating_sub(start).max(1);
            let _ = writeln!(diag, "{gutter} | {}{}", " ".repeat(start), "^".repeat(width));
        }
    }

    if let Some(help) = err.help() {
        let _ = writeln!(diag, "help: {help}");
    }

    diag
}

#[cfg(test)]
mod tests {
    use crate::asm::assemble;
    use crate::sim::SimErr;

    use super::report;

    #[test]
    fn test_report_underlines_span() {
        let src = "nop\nadd $t0 $t1 $x1";
        let err = assemble(src).unwrap_err();

        let diag = report(&err, Some(src));
        let lines: Vec<_> = diag.lines().collect();
        assert_eq!(lines[0], "error: line 1: unknown register");
        assert_eq!(lines[1], "  |");
        assert_eq!(lines[2], "1 | add $t0 $t1 $x1");
        assert_eq!(lines[3], "  |             ^^^");
        assert!(lines[4].starts_with("help: registers are $zero, $at"));
    }

    #[test]
    fn test_report_without_line() {
        let err = SimErr::IllegalInstruction { word: 0xFC00_0000, pc: 0x0040_0000 };
        let diag = report(&err, None);
        assert!(diag.starts_with("error: simulator executed illegal instruction 0xfc000000 at 0x00400000\n"));
        assert!(diag.contains("help: "));
    }
}
