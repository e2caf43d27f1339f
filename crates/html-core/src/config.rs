//! Parser configuration surface.
//!
//! `ParserOptions` carries every named feature flag and property as a field, with
//! `with_*` builder methods composing over a plain `#[derive(Default)] +
//! ..Default::default()` construction idiom.

use crate::error::{ErrorReporter, NullReporter};
use std::rc::Rc;

/// Tag/attribute name casing policy applied to scanned (as-written) names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameCase {
    Upper,
    Lower,
    #[default]
    Default,
}

impl NameCase {
    /// Applies this casing policy to a scanned name. `Default` passes the
    /// as-written spelling through unchanged.
    pub fn apply(self, name: &str) -> String {
        match self {
            NameCase::Upper => name.to_ascii_uppercase(),
            NameCase::Lower => name.to_ascii_lowercase(),
            NameCase::Default => name.to_string(),
        }
    }
}

/// HTML 4.01 Strict/Transitional/Frameset PUBID and SYSID constants.
pub mod doctype_ids {
    pub const STRICT_PUBID: &str = "-//W3C//DTD HTML 4.01//EN";
    pub const STRICT_SYSID: &str = "http://www.w3.org/TR/html4/strict.dtd";
    pub const TRANSITIONAL_PUBID: &str = "-//W3C//DTD HTML 4.01 Transitional//EN";
    pub const TRANSITIONAL_SYSID: &str = "http://www.w3.org/TR/html4/loose.dtd";
    pub const FRAMESET_PUBID: &str = "-//W3C//DTD HTML 4.01 Frameset//EN";
    pub const FRAMESET_SYSID: &str = "http://www.w3.org/TR/html4/frameset.dtd";
}

/// The special encoding label that triggers the single-character-U+FFFD decoder.
pub const REPLACEMENT_ENCODING_LABEL: &str = "replacement";

/// Default `reader_buffer_size`: tuned to fit ten 64-byte cache lines minus
/// bookkeeping overhead.
pub const DEFAULT_READER_BUFFER_SIZE: usize = 616;

/// Scanner-specific feature flags.
#[derive(Debug, Clone)]
pub struct ScannerOptions {
    pub cdata_sections: bool,
    pub cdata_early_closing: bool,
    pub script_strip_cdata_delims: bool,
    pub script_strip_comment_delims: bool,
    pub style_strip_cdata_delims: bool,
    pub style_strip_comment_delims: bool,
    pub allow_selfclosing_iframe: bool,
    pub allow_selfclosing_script: bool,
    pub allow_selfclosing_tags: bool,
    pub normalize_attrs: bool,
    pub plain_attr_values: bool,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            cdata_sections: false,
            cdata_early_closing: true,
            script_strip_cdata_delims: false,
            script_strip_comment_delims: false,
            style_strip_cdata_delims: false,
            style_strip_comment_delims: false,
            allow_selfclosing_iframe: false,
            allow_selfclosing_script: false,
            allow_selfclosing_tags: false,
            normalize_attrs: false,
            plain_attr_values: false,
        }
    }
}

/// Balancer-specific feature flags.
#[derive(Debug, Clone, Default)]
pub struct BalancerOptions {
    pub document_fragment: bool,
    pub ignore_outside_content: bool,
    /// Qualified names of the pre-populated fragment context stack, outermost
    /// first, or empty for document mode.
    pub fragment_context_stack: Vec<String>,
}

/// Top-level parser configuration.
#[derive(Clone)]
pub struct ParserOptions {
    pub augmentations: bool,
    pub report_errors: bool,
    pub ignore_specified_charset: bool,
    pub scanner: ScannerOptions,
    pub parse_noscript_content: bool,
    pub balancer: BalancerOptions,
    pub override_doctype: bool,
    pub insert_doctype: bool,
    pub names_elems: NameCase,
    pub names_attrs: NameCase,
    pub default_encoding: String,
    pub doctype_pubid: String,
    pub doctype_sysid: String,
    pub reader_buffer_size: usize,
    pub error_reporter: Rc<dyn ErrorReporter>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            augmentations: false,
            report_errors: false,
            ignore_specified_charset: false,
            scanner: ScannerOptions::default(),
            parse_noscript_content: true,
            balancer: BalancerOptions::default(),
            override_doctype: false,
            insert_doctype: false,
            names_elems: NameCase::default(),
            names_attrs: NameCase::default(),
            default_encoding: "Windows-1252".to_string(),
            doctype_pubid: doctype_ids::TRANSITIONAL_PUBID.to_string(),
            doctype_sysid: doctype_ids::TRANSITIONAL_SYSID.to_string(),
            reader_buffer_size: DEFAULT_READER_BUFFER_SIZE,
            error_reporter: Rc::new(NullReporter),
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_augmentations(mut self, enabled: bool) -> Self {
        self.augmentations = enabled;
        self
    }

    pub fn with_report_errors(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_error_reporter(mut self, reporter: Rc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    pub fn with_insert_doctype(mut self, enabled: bool) -> Self {
        self.insert_doctype = enabled;
        self
    }

    pub fn with_override_doctype(mut self, enabled: bool) -> Self {
        self.override_doctype = enabled;
        self
    }

    pub fn with_default_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.default_encoding = encoding.into();
        self
    }

    pub fn with_doctype_ids(mut self, pubid: impl Into<String>, sysid: impl Into<String>) -> Self {
        self.doctype_pubid = pubid.into();
        self.doctype_sysid = sysid.into();
        self
    }

    pub fn with_fragment_context(mut self, stack: Vec<String>) -> Self {
        self.balancer.fragment_context_stack = stack;
        self.balancer.document_fragment = !self.balancer.fragment_context_stack.is_empty();
        self
    }

    pub fn with_ignore_outside_content(mut self, enabled: bool) -> Self {
        self.balancer.ignore_outside_content = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let o = ParserOptions::default();
        assert!(!o.augmentations);
        assert!(!o.report_errors);
        assert!(o.scanner.cdata_early_closing);
        assert!(!o.scanner.cdata_sections);
        assert!(o.parse_noscript_content);
        assert_eq!(o.reader_buffer_size, 616);
        assert_eq!(o.default_encoding, "Windows-1252");
    }

    #[test]
    fn builder_methods_compose() {
        let o = ParserOptions::new()
            .with_report_errors(true)
            .with_insert_doctype(true);
        assert!(o.report_errors);
        assert!(o.insert_doctype);
    }

    #[test]
    fn fragment_context_implies_document_fragment() {
        let o = ParserOptions::new().with_fragment_context(vec!["body".to_string()]);
        assert!(o.balancer.document_fragment);
    }

    #[test]
    fn name_case_apply() {
        assert_eq!(NameCase::Upper.apply("Div"), "DIV");
        assert_eq!(NameCase::Lower.apply("Div"), "div");
        assert_eq!(NameCase::Default.apply("Div"), "Div");
    }
}
