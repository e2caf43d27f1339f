//! Permissive HTML scanner and tag balancer: turns malformed byte/character
//! input into a well-formed stream of [`event::DocumentEvent`]s.
//!
//! Pipeline: an external [`char_source::Decoder`] feeds a [`char_source::CharacterSource`],
//! which the [`scanner::Scanner`] tokenizes into [`token::Token`]s, which the
//! [`balancer::Balancer`] turns into well-formed document events. [`parser::Parser`]
//! wires the three together behind a single pull-based API.

pub mod balancer;
pub mod char_source;
pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod parser;
pub mod scanner;
pub mod token;

pub use balancer::Balancer;
pub use char_source::{CharacterSource, Decoder, StrDecoder};
pub use config::{BalancerOptions, NameCase, ParserOptions, ScannerOptions};
pub use element::{ElementFlags, ElementInfo, TagCode};
pub use error::{DiagnosticKey, ErrorReporter, NullReporter, ParserError, StderrReporter};
pub use event::{Augmentations, DocumentEvent};
pub use parser::{Parser, ScanOutcome};
pub use scanner::{ScanStep, Scanner, ScannerPersonality};
pub use token::{Attribute, CommentType, Token};

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    fn parse(html: &str) -> Vec<DocumentEvent> {
        let mut parser = Parser::new(Box::new(StrDecoder::new(html)), ParserOptions::default());
        let mut events = Vec::new();
        while let Some(event) = parser.next_event() {
            events.push(event);
        }
        events
    }

    fn element_names(events: &[DocumentEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                DocumentEvent::StartElement { name, .. } => Some(format!("+{name}")),
                DocumentEvent::EmptyElement { name, .. } => Some(format!("!{name}")),
                DocumentEvent::EndElement { name, .. } => Some(format!("-{name}")),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn minimal_document_is_well_formed() {
        let events = parse("<p>hi</p>");
        assert_eq!(events.first(), Some(&DocumentEvent::StartDocument));
        assert_eq!(events.last(), Some(&DocumentEvent::EndDocument));
        assert_eq!(
            element_names(&events),
            vec!["+html", "+head", "-head", "+body", "+p", "-p", "-body", "-html"]
        );
    }

    #[test]
    fn script_raw_text_is_not_tokenized_as_markup() {
        let events = parse("<script>a<b>c</script>");
        let has_text = events.iter().any(|e| {
            matches!(e, DocumentEvent::Characters { text, .. } if text == "a<b>c")
        });
        assert!(has_text);
        assert!(!element_names(&events).contains(&"+b".to_string()));
    }

    #[test]
    fn comment_and_doctype_pass_through() {
        let events = parse("<!DOCTYPE html><!-- hi --><p></p>");
        assert!(matches!(events[1], DocumentEvent::DoctypeDecl { .. }));
        assert!(events.iter().any(|e| matches!(e, DocumentEvent::Comment { text, .. } if text == " hi ")));
    }
}
