//! Error reporting interface and the small set of errors that actually cross
//! the `Parser` API boundary.
//!
//! The core itself never "throws" on malformed HTML — every recoverable condition
//! goes through [`ErrorReporter::report_warning`] / [`ErrorReporter::report_error`]
//! and parsing continues. Only I/O failures bubbling up from the external character
//! source, and a handful of construction-time misconfigurations, are represented as
//! a real `Result` error.

use std::fmt;

/// Stable identifiers for every warning/error kind the core can report, grouped
/// roughly as encoding / lexical / structural / tree.
///
/// `#[non_exhaustive]` because this list of representative kinds is expected to
/// grow without that being a breaking change for callers who only match on the
/// keys they care about.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKey {
    /// HTML1000: unknown or unsupported charset label.
    UnsupportedCharset,
    /// HTML1001: an encoding switch was requested to an incompatible encoding.
    IncompatibleEncodingSwitch,
    /// HTML1002: unterminated comment at end of document.
    UnterminatedComment,
    /// HTML1003: unterminated CDATA section at end of document.
    UnterminatedCdata,
    /// HTML1004: unterminated processing instruction.
    UnterminatedProcessingInstruction,
    /// HTML1005: a numeric character reference named a surrogate or out-of-range
    /// code point and was replaced with U+FFFD.
    InvalidCodePoint,
    /// HTML1006: missing semicolon after a character reference.
    MissingSemicolonAfterCharacterReference,
    /// HTML2000: a tag is missing an attribute name.
    MissingAttributeName,
    /// HTML2001: missing whitespace between two attributes.
    MissingWhitespaceBetweenAttributes,
    /// HTML2002: a stray `<` appeared inside an attribute name (tolerated and
    /// preserved as permissive behavior, not "fixed").
    StrayLessThanInAttributeName,
    /// HTML2003: the document ended mid-token.
    UnexpectedEndOfDocument,
    /// HTML2004: a stray end tag had no matching open element.
    StrayEndTag,
    /// HTML2005: an implicit parent element was synthesized.
    ImplicitParentSynthesized,
    /// HTML2006: a misnested inline element was closed early and re-opened.
    MisnestedInlineReopened,
    /// HTML2007: an extra `<html>`, `<head>`, or `<body>` was discarded.
    DuplicateRootElement,
    /// HTML2008: a `<table>` was opened inside another table's row context and the
    /// outer table was implicitly closed first.
    TableInTable,
    /// HTML2009: a `<form>` nested inside another open form was discarded.
    NestedForm,
    /// HTML2010: content was discarded because it was not permitted inside the
    /// current `select`/`frameset` containment context.
    DisallowedInContainment,
    /// HTML2011: an element the balancer does not recognize was passed through
    /// unchanged (treated as a generic inline/flow element).
    UnrecognizedElement,
}

impl DiagnosticKey {
    /// The stable `HTMLxxxx` string form of this key.
    pub fn code(self) -> &'static str {
        use DiagnosticKey::*;
        match self {
            UnsupportedCharset => "HTML1000",
            IncompatibleEncodingSwitch => "HTML1001",
            UnterminatedComment => "HTML1002",
            UnterminatedCdata => "HTML1003",
            UnterminatedProcessingInstruction => "HTML1004",
            InvalidCodePoint => "HTML1005",
            MissingSemicolonAfterCharacterReference => "HTML1006",
            MissingAttributeName => "HTML2000",
            MissingWhitespaceBetweenAttributes => "HTML2001",
            StrayLessThanInAttributeName => "HTML2002",
            UnexpectedEndOfDocument => "HTML2003",
            StrayEndTag => "HTML2004",
            ImplicitParentSynthesized => "HTML2005",
            MisnestedInlineReopened => "HTML2006",
            DuplicateRootElement => "HTML2007",
            TableInTable => "HTML2008",
            NestedForm => "HTML2009",
            DisallowedInContainment => "HTML2010",
            UnrecognizedElement => "HTML2011",
        }
    }
}

impl fmt::Display for DiagnosticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// External collaborator: receives every recoverable diagnostic the core raises
/// while scanning and balancing. Never drives control flow — the core continues
/// regardless of what the reporter does with a warning or error.
pub trait ErrorReporter {
    fn report_warning(&self, key: DiagnosticKey, args: &[String]) {
        log::warn!("{}: {}", key, self.format_message(key, args));
    }

    fn report_error(&self, key: DiagnosticKey, args: &[String]) {
        log::warn!("{}: {}", key, self.format_message(key, args));
    }

    /// Renders a human-readable message for `key` given its arguments. The default
    /// implementation just joins the key code and arguments; a host application is
    /// expected to supply localized templates.
    fn format_message(&self, key: DiagnosticKey, args: &[String]) -> String {
        if args.is_empty() {
            key.code().to_string()
        } else {
            format!("{} ({})", key.code(), args.join(", "))
        }
    }
}

/// Reports every diagnostic to `log::warn!`/`log::trace!` via the trait defaults and
/// nothing else. Always available, used as the crate's fallback when no reporter is
/// configured via [`NullReporter`]-style opt-out.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report_warning(&self, key: DiagnosticKey, args: &[String]) {
        eprintln!("warning: {}", self.format_message(key, args));
    }

    fn report_error(&self, key: DiagnosticKey, args: &[String]) {
        eprintln!("error: {}", self.format_message(key, args));
    }
}

/// Discards every diagnostic. This is [`crate::config::ParserOptions`]'s default
/// reporter, matching `report_errors` defaulting to `false`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ErrorReporter for NullReporter {
    fn report_warning(&self, _key: DiagnosticKey, _args: &[String]) {}
    fn report_error(&self, _key: DiagnosticKey, _args: &[String]) {}
}

/// Errors that cross the [`crate::parser::Parser`] API boundary: I/O failures from
/// the external `Decoder`/character source, and construction-time misconfiguration.
/// Malformed HTML itself is never an error here — see module docs.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("character source I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("fragment context element {0:?} is not a recognized element")]
    UnknownFragmentContext(String),

    #[error("encoding label {0:?} is not supported")]
    UnsupportedEncoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_codes_are_stable() {
        assert_eq!(DiagnosticKey::UnsupportedCharset.code(), "HTML1000");
        assert_eq!(DiagnosticKey::UnrecognizedElement.code(), "HTML2011");
    }

    #[test]
    fn null_reporter_does_nothing_observable() {
        let r = NullReporter;
        r.report_warning(DiagnosticKey::StrayEndTag, &[]);
        r.report_error(DiagnosticKey::StrayEndTag, &[]);
    }

    #[test]
    fn format_message_joins_args() {
        let r = NullReporter;
        let msg = r.format_message(DiagnosticKey::StrayEndTag, &["div".to_string()]);
        assert_eq!(msg, "HTML2004 (div)");
    }
}
