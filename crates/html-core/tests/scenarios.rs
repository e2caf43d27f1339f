//! Full-pipeline scenario tests covering implicit-body insertion, misnested-inline
//! recovery, table-in-table handling, and raw-text scripts end to end.

use html_core::char_source::StrDecoder;
use html_core::config::ParserOptions;
use html_core::event::DocumentEvent;
use html_core::parser::Parser;

fn parse(html: &str) -> Vec<DocumentEvent> {
    parse_with(html, ParserOptions::default())
}

fn parse_with(html: &str, options: ParserOptions) -> Vec<DocumentEvent> {
    let mut parser = Parser::new(Box::new(StrDecoder::new(html)), options);
    let mut events = Vec::new();
    while let Some(event) = parser.next_event() {
        events.push(event);
    }
    events
}

fn tag_trace(events: &[DocumentEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DocumentEvent::StartElement { name, .. } => Some(format!("+{name}")),
            DocumentEvent::EmptyElement { name, .. } => Some(format!("!{name}")),
            DocumentEvent::EndElement { name, .. } => Some(format!("-{name}")),
            DocumentEvent::Characters { text, .. } => Some(format!("#{text}")),
            _ => None,
        })
        .collect()
}

#[test]
fn implicit_body_full_pipeline() {
    let events = parse("<p>hi</p>");
    assert_eq!(
        tag_trace(&events),
        vec!["+html", "+head", "-head", "+body", "+p", "#hi", "-p", "-body", "-html"]
    );
}

#[test]
fn misnested_inline_full_pipeline() {
    let events = parse("<i>a<b>bc</i>d</b>");
    let trace = tag_trace(&events);
    let close_b = trace.iter().position(|s| s == "-b").unwrap();
    let close_i = trace.iter().position(|s| s == "-i").unwrap();
    let reopen_b = trace.iter().rposition(|s| s == "+b").unwrap();
    assert!(close_b < close_i, "b must close before i: {trace:?}");
    assert!(reopen_b > close_i, "b must reopen after i closes: {trace:?}");
    // "d" ends up inside the reopened <b>.
    let d = trace.iter().position(|s| s == "#d").unwrap();
    assert!(d > reopen_b);
}

#[test]
fn table_in_table_preserved_when_nested_properly() {
    let events = parse("<table><tr><td><table></table></td></tr></table>");
    let trace = tag_trace(&events);
    assert_eq!(trace.iter().filter(|s| *s == "+table").count(), 2);
    assert_eq!(trace.iter().filter(|s| *s == "-table").count(), 2);
}

#[test]
fn table_in_table_synthesizes_close_when_directly_nested() {
    let events = parse("<table><tr><table>");
    let trace = tag_trace(&events);
    assert_eq!(trace.iter().filter(|s| *s == "+table").count(), 2);
}

#[test]
fn script_raw_text_emits_one_characters_and_one_end_tag() {
    let events = parse("<script>a<b>c</script>");
    let characters_events: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, DocumentEvent::Characters { .. }))
        .collect();
    assert_eq!(characters_events.len(), 1);
    assert!(matches!(
        characters_events[0],
        DocumentEvent::Characters { text, .. } if text == "a<b>c"
    ));
    let script_ends = events
        .iter()
        .filter(|e| matches!(e, DocumentEvent::EndElement { name, .. } if name == "script"))
        .count();
    assert_eq!(script_ends, 1);
}

#[test]
fn unclosed_document_gets_every_open_element_closed() {
    let events = parse("<div><p>a");
    let trace = tag_trace(&events);
    assert_eq!(trace.iter().filter(|s| s.starts_with('+')).count(), trace.iter().filter(|s| s.starts_with('-')).count());
    assert_eq!(events.last(), Some(&DocumentEvent::EndDocument));
}

#[test]
fn entity_references_resolve_in_body_text() {
    let events = parse("<p>a&amp;b</p>");
    let has = events.iter().any(|e| matches!(e, DocumentEvent::Characters { text, .. } if text == "a&b"));
    assert!(has, "expected decoded '&' in characters, got {events:?}");
}

#[test]
fn void_elements_emit_empty_element_not_start_and_end() {
    let events = parse("<p>before<br>after</p>");
    assert!(events.iter().any(|e| matches!(e, DocumentEvent::EmptyElement { name, .. } if name == "br")));
    assert!(!events.iter().any(|e| matches!(e, DocumentEvent::StartElement { name, .. } if name == "br")));
}

#[test]
fn noscript_content_is_parsed_by_default() {
    let events = parse("<noscript><p>hi</p></noscript>");
    assert!(events.iter().any(|e| matches!(e, DocumentEvent::StartElement { name, .. } if name == "p")));
}

#[test]
fn noscript_content_is_raw_text_when_disabled() {
    let options = ParserOptions {
        parse_noscript_content: false,
        ..ParserOptions::default()
    };
    let events = parse_with("<noscript><p>hi</p></noscript>", options);
    assert!(!events.iter().any(|e| matches!(e, DocumentEvent::StartElement { name, .. } if name == "p")));
    assert!(events.iter().any(|e| matches!(e, DocumentEvent::Characters { text, .. } if text == "<p>hi</p>")));
}

#[test]
fn names_elems_upper_recases_emitted_tag_names() {
    let options = ParserOptions {
        names_elems: html_core::config::NameCase::Upper,
        ..ParserOptions::default()
    };
    let events = parse_with("<div>x</div>", options);
    assert!(events.iter().any(|e| matches!(e, DocumentEvent::StartElement { name, .. } if name == "DIV")));
}

#[test]
fn form_inside_table_row_is_closed_immediately() {
    let events = parse("<table><tr><td><form><input></form></td></tr></table>");
    let trace = tag_trace(&events);
    let open_form = trace.iter().position(|s| s == "+form").unwrap();
    let close_form = trace.iter().position(|s| s == "-form").unwrap();
    let open_table = trace.iter().position(|s| s == "+table").unwrap();
    let close_table = trace.iter().rposition(|s| s == "-table").unwrap();
    assert!(open_table < open_form && close_form < close_table, "{trace:?}");
    // The cell keeps the input; only the form wrapper is discarded.
    assert!(trace.iter().any(|s| s == "!input"));
}

#[test]
fn meta_charset_after_the_first_element_is_ignored() {
    // Per the "first element context" rule, a <meta charset> seen after <p>
    // has already opened must not trigger a switch (and so must not discard
    // the "after" paragraph by restarting into the replacement stream).
    let events = parse("<p>before</p><meta charset=\"replacement\"><p>after</p>");
    let trace = tag_trace(&events);
    assert_eq!(trace.iter().filter(|s| *s == "#before").count(), 1);
    assert!(trace.iter().any(|s| s == "#after"));
}

#[test]
fn meta_charset_replacement_in_preamble_collapses_the_stream() {
    // A <meta charset="replacement"> seen before any element restarts
    // tokenization against a decoder that yields a single U+FFFD and then
    // ends, so nothing past the switch point survives.
    let events = parse("<meta charset=\"replacement\">ignored<p>also ignored</p>");
    let trace = tag_trace(&events);
    assert!(!trace.iter().any(|s| s == "+p"), "{trace:?}");
    assert!(!trace.iter().any(|s| s.contains("ignored")), "{trace:?}");
    assert!(trace.iter().any(|s| s.contains('\u{FFFD}')), "{trace:?}");
}
