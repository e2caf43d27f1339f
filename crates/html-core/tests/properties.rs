//! Property tests covering tag balance and character-reference resolution.

use html_core::char_source::StrDecoder;
use html_core::config::ParserOptions;
use html_core::element::TagCode;
use html_core::event::DocumentEvent;
use html_core::parser::Parser;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

#[derive(Debug, Clone)]
struct BalancedTagSoup(String);

impl Arbitrary for BalancedTagSoup {
    fn arbitrary(g: &mut Gen) -> Self {
        const TAGS: &[&str] = &["div", "span", "p", "b", "i", "a", "ul", "li"];
        let depth = (usize::arbitrary(g) % 6) + 1;
        let mut open = Vec::new();
        let mut out = String::new();
        for _ in 0..depth {
            let tag = TAGS[usize::arbitrary(g) % TAGS.len()];
            out.push('<');
            out.push_str(tag);
            out.push('>');
            out.push_str("x");
            open.push(tag);
        }
        while let Some(tag) = open.pop() {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        BalancedTagSoup(out)
    }
}

fn parse(html: &str) -> Vec<DocumentEvent> {
    let mut parser = Parser::new(Box::new(StrDecoder::new(html)), ParserOptions::default());
    let mut events = Vec::new();
    while let Some(e) = parser.next_event() {
        events.push(e);
    }
    events
}

/// Every non-EMPTY `startElement` has a matching `endElement` by end of
/// document.
#[quickcheck]
fn every_start_element_gets_matching_end(soup: BalancedTagSoup) -> bool {
    let events = parse(&soup.0);
    let mut depth = 0i32;
    for event in &events {
        match event {
            DocumentEvent::StartElement { .. } => depth += 1,
            DocumentEvent::EndElement { .. } => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

/// Numeric references for surrogate/out-of-range code points resolve to U+FFFD.
#[quickcheck]
fn numeric_surrogates_and_overflow_resolve_to_replacement(offset: u32) -> bool {
    let cp = 0xD800 + (offset % (0xDFFF - 0xD800 + 1));
    let body = format!("{cp:x};");
    let m = html_entities::parse_numeric_reference(body.chars());
    m.replacement.as_deref() == Some(html_entities::REPLACEMENT_CHAR.to_string().as_str())
}

/// Every Windows-1252-remapped code resolves to its documented Unicode
/// equivalent.
#[quickcheck]
fn windows_1252_remap_is_stable(which: u8) -> bool {
    const REMAPPED: &[(u32, char)] = &[
        (0x80, '\u{20AC}'),
        (0x82, '\u{201A}'),
        (0x83, '\u{0192}'),
        (0x91, '\u{2018}'),
        (0x92, '\u{2019}'),
        (0x96, '\u{2013}'),
        (0x97, '\u{2014}'),
    ];
    let (code, expected) = REMAPPED[which as usize % REMAPPED.len()];
    let body = format!("x{code:x};");
    let m = html_entities::parse_numeric_reference(body.chars());
    m.replacement.as_deref() == Some(expected.to_string().as_str())
}

#[test]
fn fragment_parser_rejects_unknown_context() {
    let result = Parser::new_fragment(
        Box::new(StrDecoder::new("hi")),
        ParserOptions::default(),
        vec!["not-a-real-tag".to_string()],
    );
    assert!(result.is_err());
}

#[test]
fn fragment_parser_accepts_known_context() {
    let result = Parser::new_fragment(
        Box::new(StrDecoder::new("hi")),
        ParserOptions::default(),
        vec!["body".to_string()],
    );
    assert!(result.is_ok());
}

#[test]
fn script_tag_code_is_recognized() {
    assert_eq!(html_core::element::code_for_name("script"), TagCode::Script);
}
