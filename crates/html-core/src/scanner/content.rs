//! Content scanner: `CONTENT` and `MARKUP_BRACKET` states.

use super::Scanner;
use crate::element::{self, TagCode};
use crate::error::{DiagnosticKey, ErrorReporter};
use crate::token::{Attribute, CommentType, Token};
use html_entities::named::{NamedEntityResolver, NamedStep};
use html_entities::numeric::{NumericEntityParser, NumericStep};

/// Longest entity name in the static table, used to bound how many characters a
/// failed named-entity walk may buffer before giving up.
const MAX_ENTITY_NAME_LEN: usize = 32;

pub(super) fn scan(scanner: &mut Scanner) -> Token {
    let mut text = String::new();
    loop {
        match scanner.source.read() {
            None => {
                return if text.is_empty() {
                    Token::Eof
                } else {
                    Token::Characters(text)
                };
            }
            Some('<') => {
                if text.is_empty() {
                    return scan_markup_bracket(scanner);
                }
                scanner.source.rewind(1);
                return Token::Characters(text);
            }
            Some('&') => resolve_entity_reference(scanner, &mut text, false),
            Some('\r') => {
                if scanner.source.peek(1) == "\n" {
                    scanner.source.read();
                }
                text.push('\n');
            }
            Some(c) => text.push(c),
        }
    }
}

/// Resolves an entity reference starting right after the `&` has already been
/// consumed, appending either the replacement or the literal un-matched text to
/// `text`. `in_attribute` applies the ambiguous-ampersand suppression rule.
pub(super) fn resolve_entity_reference(scanner: &mut Scanner, text: &mut String, in_attribute: bool) {
    match scanner.source.read() {
        None => text.push('&'),
        Some('#') => resolve_numeric_reference(scanner, text),
        Some(first) => {
            scanner.source.rewind(1);
            resolve_named_reference(scanner, text, in_attribute, first);
        }
    }
}

fn resolve_numeric_reference(scanner: &mut Scanner, text: &mut String) {
    let mut parser = NumericEntityParser::new();
    loop {
        let c = scanner.source.read();
        match parser.feed(c) {
            NumericStep::Continue => continue,
            NumericStep::Done(m) => {
                if m.rewind_count > 0 {
                    scanner.source.rewind(m.rewind_count);
                }
                match m.replacement {
                    Some(rep) => {
                        if !m.ends_with_semicolon && scanner.options.report_errors {
                            scanner.reporter.report_warning(
                                DiagnosticKey::MissingSemicolonAfterCharacterReference,
                                &[],
                            );
                        }
                        text.push_str(&rep);
                    }
                    None => text.push_str("&#"),
                }
                return;
            }
        }
    }
}

fn resolve_named_reference(scanner: &mut Scanner, text: &mut String, in_attribute: bool, first: char) {
    let mut buf = String::new();
    let mut state = NamedEntityResolver::start();
    let mut c = Some(first);
    loop {
        match NamedEntityResolver::step(state, c) {
            NamedStep::Continue(next) => {
                state = next;
                buf.push(c.unwrap());
                if buf.len() >= MAX_ENTITY_NAME_LEN {
                    c = None;
                    match NamedEntityResolver::step(state, c) {
                        NamedStep::Done(m) => {
                            finish_named(scanner, text, &buf, in_attribute, m);
                            return;
                        }
                        NamedStep::Continue(_) => unreachable!("feeding None must finish the walk"),
                    }
                }
                c = scanner.source.read();
            }
            NamedStep::Done(m) => {
                finish_named(scanner, text, &buf, in_attribute, m);
                return;
            }
        }
    }
}

fn finish_named(
    scanner: &mut Scanner,
    text: &mut String,
    buf: &str,
    in_attribute: bool,
    m: html_entities::NamedMatch,
) {
    let rewind = buf.chars().count().saturating_sub(m.match_length);
    if rewind > 0 {
        scanner.source.rewind(rewind);
    }
    match m.replacement {
        None => {
            text.push('&');
            text.push_str(buf);
        }
        Some(replacement) => {
            if in_attribute {
                let next = scanner.source.peek(1).chars().next();
                if NamedEntityResolver::suppressed_in_attribute_value(&m, next) {
                    text.push('&');
                    text.push_str(buf);
                    return;
                }
            }
            if m.missing_semicolon_warning && scanner.options.report_errors {
                scanner
                    .reporter
                    .report_warning(DiagnosticKey::MissingSemicolonAfterCharacterReference, &[]);
            }
            text.push_str(replacement);
        }
    }
}

fn scan_markup_bracket(scanner: &mut Scanner) -> Token {
    match scanner.source.read() {
        None => Token::Characters("<".to_string()),
        Some('!') => scan_markup_declaration(scanner),
        Some('?') => scan_processing_instruction(scanner),
        Some('/') => scan_end_tag(scanner),
        Some(c) if super::is_tag_name_start(c) => {
            scanner.source.rewind(1);
            scan_start_tag(scanner)
        }
        Some(_) => {
            // Not a recognized markup opener: treat `<` as literal text and
            // reprocess the next character as ordinary content (permissive
            // fallback).
            scanner.source.rewind(1);
            Token::Characters("<".to_string())
        }
    }
}

fn scan_markup_declaration(scanner: &mut Scanner) -> Token {
    if scanner.source.skip("--->") || scanner.source.skip("-->") || scanner.source.skip("->") {
        return Token::Comment {
            text: String::new(),
            kind: CommentType::Normal,
        };
    }
    if scanner.source.skip(">") {
        return Token::Comment {
            text: String::new(),
            kind: CommentType::Normal,
        };
    }
    if scanner.source.skip("-!>") {
        return Token::Comment {
            text: "-!".to_string(),
            kind: CommentType::Bogus,
        };
    }
    if scanner.source.skip("--") {
        return scan_comment(scanner);
    }
    if scanner.options.scanner.cdata_sections && scanner.source.skip("[CDATA[") {
        return scan_cdata(scanner);
    }
    if scanner.source.skip("DOCTYPE") {
        return scan_doctype(scanner);
    }
    // Unrecognized `<!...>`: skip to `>` and emit a bogus comment of its contents.
    let mut text = String::new();
    loop {
        match scanner.source.read() {
            None => {
                if scanner.options.report_errors {
                    scanner
                        .reporter
                        .report_error(crate::error::DiagnosticKey::UnterminatedComment, &[]);
                }
                break;
            }
            Some('>') => break,
            Some(c) => text.push(c),
        }
    }
    Token::Comment {
        text,
        kind: CommentType::Bogus,
    }
}

fn scan_comment(scanner: &mut Scanner) -> Token {
    let mut text = String::new();
    loop {
        if scanner.source.skip("-->") || scanner.source.skip("--!>") {
            return Token::Comment {
                text,
                kind: CommentType::Normal,
            };
        }
        match scanner.source.read() {
            None => {
                if scanner.options.report_errors {
                    scanner
                        .reporter
                        .report_error(crate::error::DiagnosticKey::UnterminatedComment, &[]);
                }
                return Token::Comment {
                    text,
                    kind: CommentType::Normal,
                };
            }
            Some('-') => {
                // Bare `--X`: fall back to emitting a literal `-` and continue.
                text.push('-');
            }
            Some(c) => text.push(c),
        }
    }
}

fn scan_cdata(scanner: &mut Scanner) -> Token {
    let mut text = String::new();
    loop {
        if scanner.source.skip("]]>") {
            break;
        }
        if scanner.options.scanner.cdata_early_closing && scanner.source.peek(1) == ">" {
            scanner.source.read();
            break;
        }
        match scanner.source.read() {
            None => {
                if scanner.options.report_errors {
                    scanner
                        .reporter
                        .report_error(crate::error::DiagnosticKey::UnterminatedCdata, &[]);
                }
                break;
            }
            Some(c) => text.push(c),
        }
    }
    if scanner.options.scanner.cdata_sections {
        Token::Cdata(text)
    } else {
        Token::Comment {
            text: format!("[CDATA[{}]]", text),
            kind: CommentType::CdataAsComment,
        }
    }
}

fn scan_processing_instruction(scanner: &mut Scanner) -> Token {
    let mut target = String::new();
    while let Some(c) = scanner.source.read() {
        if c == ' ' || c == '\t' || c == '>' || c == '?' {
            scanner.source.rewind(1);
            break;
        }
        target.push(c);
    }
    scanner.source.skip_spaces();
    let mut data = String::new();
    loop {
        if scanner.source.skip("?>") {
            break;
        }
        match scanner.source.read() {
            None => {
                if scanner.options.report_errors {
                    scanner.reporter.report_error(
                        crate::error::DiagnosticKey::UnterminatedProcessingInstruction,
                        &[],
                    );
                }
                break;
            }
            Some(c) => data.push(c),
        }
    }
    if target.eq_ignore_ascii_case("xml") {
        if let Some(label) = extract_xml_encoding(&data) {
            scanner.pending_encoding_switch = Some(label);
        }
    }
    Token::ProcessingInstruction { target, data }
}

fn extract_xml_encoding(decl: &str) -> Option<String> {
    let idx = decl.to_ascii_lowercase().find("encoding")?;
    let rest = &decl[idx + "encoding".len()..];
    let eq = rest.find('=')?;
    let after_eq = rest[eq + 1..].trim_start();
    let quote = after_eq.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let body = &after_eq[1..];
    let end = body.find(quote)?;
    Some(body[..end].to_string())
}

fn scan_doctype(scanner: &mut Scanner) -> Token {
    scanner.source.skip_spaces();
    let mut name = String::new();
    while let Some(c) = scanner.source.read() {
        if c == ' ' || c == '\t' || c == '>' {
            scanner.source.rewind(1);
            break;
        }
        name.push(c);
    }
    scanner.source.skip_spaces();
    let mut public_id = None;
    let mut system_id = None;
    if scanner.source.skip("PUBLIC") {
        scanner.source.skip_spaces();
        public_id = scan_quoted_literal(scanner);
        scanner.source.skip_spaces();
        system_id = scan_quoted_literal(scanner);
    } else if scanner.source.skip("SYSTEM") {
        scanner.source.skip_spaces();
        system_id = scan_quoted_literal(scanner);
    }
    let had_closer = scanner.source.skip_markup(false);
    let _ = had_closer;
    Token::Doctype {
        name: if name.is_empty() { None } else { Some(name) },
        public_id,
        system_id,
        force_quirks: false,
    }
}

fn scan_quoted_literal(scanner: &mut Scanner) -> Option<String> {
    match scanner.source.read() {
        Some(q @ ('"' | '\'')) => {
            let mut s = String::new();
            loop {
                match scanner.source.read() {
                    None => return Some(s),
                    Some(c) if c == q => return Some(s),
                    Some(c) => s.push(c),
                }
            }
        }
        Some(_) => {
            scanner.source.rewind(1);
            None
        }
        None => None,
    }
}

fn scan_end_tag(scanner: &mut Scanner) -> Token {
    let mut name = String::new();
    while let Some(c) = scanner.source.read() {
        if !super::is_tag_name_continue(c) {
            scanner.source.rewind(1);
            break;
        }
        name.push(c);
    }
    scanner.source.skip_markup(false);
    let lower = name.to_ascii_lowercase();
    let code = element::code_for_name(&lower);
    Token::EndTag {
        code,
        name: scanner.options.names_elems.apply(&name),
    }
}

fn scan_start_tag(scanner: &mut Scanner) -> Token {
    let mut name = String::new();
    while let Some(c) = scanner.source.read() {
        if !super::is_tag_name_continue(c) {
            scanner.source.rewind(1);
            break;
        }
        name.push(c);
    }
    let lower = name.to_ascii_lowercase();
    let code = element::code_for_name(&lower);

    let mut attributes: Vec<Attribute> = Vec::new();
    let mut self_closing = false;
    loop {
        let had_whitespace = scanner.source.skip_spaces() > 0;
        scanner.source.skip_newlines();

        match scanner.source.peek(1).chars().next() {
            None => break,
            Some('>') => {
                scanner.source.read();
                break;
            }
            Some('/') => {
                scanner.source.read();
                if scanner.source.peek(1) == ">" {
                    scanner.source.read();
                    self_closing = true;
                    break;
                }
                // Lone `/`: ignore and continue attribute scanning.
                continue;
            }
            Some('<') => {
                if scanner.options.report_errors {
                    scanner
                        .reporter
                        .report_warning(crate::error::DiagnosticKey::StrayLessThanInAttributeName, &[]);
                }
                scanner.source.read();
                continue;
            }
            Some(_) => {
                if !had_whitespace && !attributes.is_empty() && scanner.options.report_errors {
                    scanner
                        .reporter
                        .report_warning(crate::error::DiagnosticKey::MissingWhitespaceBetweenAttributes, &[]);
                }
                let attr = scan_attribute(scanner);
                attributes.push(attr);
            }
        }
    }

    if scanner.options.scanner.normalize_attrs {
        for a in &mut attributes {
            if let Some(v) = &a.value {
                a.value = Some(normalize_whitespace(v));
            }
        }
    }

    if code == TagCode::Meta && scanner.before_first_element {
        if let Some(label) = detect_meta_charset(&attributes) {
            scanner.pending_encoding_switch = Some(label);
        }
    }

    let self_closing = honor_self_closing(scanner, code, self_closing);
    let name = scanner.options.names_elems.apply(&name);

    Token::StartTag {
        code,
        name,
        attributes,
        self_closing,
    }
}

/// Looks for `<meta charset="...">` or `<meta http-equiv="content-type"
/// content="...charset=...">` among a `<meta>`'s attributes and returns the
/// declared label, if any.
fn detect_meta_charset(attributes: &[Attribute]) -> Option<String> {
    let find = |attr_name: &str| {
        attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(attr_name))
            .and_then(|a| a.value.as_deref())
    };
    if let Some(charset) = find("charset") {
        return Some(charset.trim().to_string());
    }
    let http_equiv = find("http-equiv")?;
    if !http_equiv.trim().eq_ignore_ascii_case("content-type") {
        return None;
    }
    extract_content_charset(find("content")?)
}

fn extract_content_charset(content: &str) -> Option<String> {
    let idx = content.to_ascii_lowercase().find("charset")?;
    let rest = &content[idx + "charset".len()..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let (value, _) = match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &rest[1..];
            let end = body.find(quote)?;
            (&body[..end], true)
        }
        _ => {
            let end = rest.find(|c: char| c == ';' || c.is_whitespace()).unwrap_or(rest.len());
            (&rest[..end], false)
        }
    };
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// A trailing `/>` only actually self-closes a void element, an unrecognized
/// (custom) element, or an element explicitly opted in via the matching
/// `allow_selfclosing_*` option; otherwise the slash is noise and the element
/// still receives normal content/closing-tag handling.
fn honor_self_closing(scanner: &Scanner, code: TagCode, self_closing: bool) -> bool {
    if !self_closing {
        return false;
    }
    if element::is_empty(code) || code == TagCode::Unknown {
        return true;
    }
    match code {
        TagCode::Script => scanner.options.scanner.allow_selfclosing_script,
        TagCode::Iframe => scanner.options.scanner.allow_selfclosing_iframe,
        _ => scanner.options.scanner.allow_selfclosing_tags,
    }
}

fn normalize_whitespace(s: &str) -> String {
    let mut out = String::new();
    let mut in_space = false;
    for c in s.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn scan_attribute(scanner: &mut Scanner) -> Attribute {
    let mut name = String::new();
    let mut warned_missing_name = false;
    loop {
        match scanner.source.peek(1).chars().next() {
            Some('=') if name.is_empty() => {
                // Missing attribute name: probe for the stray `=` and synthesize
                // a name "=<next-name>" instead of treating it as the value
                // separator.
                if scanner.options.report_errors && !warned_missing_name {
                    scanner
                        .reporter
                        .report_warning(DiagnosticKey::MissingAttributeName, &[]);
                    warned_missing_name = true;
                }
                name.push(scanner.source.read().unwrap());
            }
            Some('=') => break,
            Some(c) if matches!(c, ' ' | '\t' | '\r' | '\n' | '/' | '>') => break,
            Some(_) => name.push(scanner.source.read().unwrap()),
            None => break,
        }
    }

    scanner.source.skip_spaces();
    let name = scanner.options.names_attrs.apply(&name);
    if scanner.source.peek(1) != "=" {
        return Attribute::new(name, None);
    }
    scanner.source.read();
    scanner.source.skip_spaces();

    let raw_start_is_quoted = matches!(scanner.source.peek(1).chars().next(), Some('"') | Some('\''));
    let mut raw = String::new();
    let mut value = String::new();
    if raw_start_is_quoted {
        let quote = scanner.source.read().unwrap();
        loop {
            match scanner.source.read() {
                None => break,
                Some(c) if c == quote => break,
                Some('&') => {
                    raw.push('&');
                    resolve_entity_reference(scanner, &mut value, true);
                }
                Some(c) => {
                    raw.push(c);
                    value.push(c);
                }
            }
        }
    } else {
        loop {
            match scanner.source.peek(1).chars().next() {
                None => break,
                Some(c) if matches!(c, ' ' | '\t' | '\r' | '\n' | '>') => break,
                Some('&') => {
                    scanner.source.read();
                    raw.push('&');
                    resolve_entity_reference(scanner, &mut value, true);
                }
                Some(_) => {
                    let c = scanner.source.read().unwrap();
                    raw.push(c);
                    value.push(c);
                }
            }
        }
    }

    let mut attr = Attribute::new(name, Some(value));
    if scanner.options.scanner.plain_attr_values {
        attr.raw_value = Some(raw);
    }
    attr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::char_source::{CharacterSource, StrDecoder};
    use crate::config::ParserOptions;
    use crate::error::NullReporter;
    use std::rc::Rc;

    fn scanner_for(input: &str) -> Scanner {
        Scanner::new(
            CharacterSource::new(Box::new(StrDecoder::new(input))),
            Rc::new(ParserOptions::default()),
            Rc::new(NullReporter),
        )
    }

    #[test]
    fn scans_simple_start_tag() {
        let mut s = scanner_for("<p class=\"a\">");
        let tok = scan(&mut s);
        match tok {
            Token::StartTag {
                code, name, attributes, self_closing,
            } => {
                assert_eq!(code, TagCode::P);
                assert_eq!(name, "p");
                assert_eq!(attributes.len(), 1);
                assert_eq!(attributes[0].name, "class");
                assert_eq!(attributes[0].value.as_deref(), Some("a"));
                assert!(!self_closing);
            }
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn scans_end_tag() {
        let mut s = scanner_for("</div>");
        let tok = scan(&mut s);
        assert_eq!(
            tok,
            Token::EndTag {
                code: TagCode::Div,
                name: "div".to_string()
            }
        );
    }

    #[test]
    fn scans_characters_with_named_entity() {
        let mut s = scanner_for("a&amp;b<");
        let tok = scan(&mut s);
        assert_eq!(tok, Token::Characters("a&b".to_string()));
    }

    #[test]
    fn named_entity_legacy_rewinds_trailing_space() {
        let mut s = scanner_for("Euml <");
        let tok = scan(&mut s);
        assert_eq!(tok, Token::Characters("\u{00CB} ".to_string()));
    }

    #[test]
    fn scans_comment() {
        let mut s = scanner_for("<!-- hi -->");
        let tok = scan(&mut s);
        assert_eq!(
            tok,
            Token::Comment {
                text: " hi ".to_string(),
                kind: CommentType::Normal,
            }
        );
    }

    #[test]
    fn unterminated_comment_is_tolerated() {
        let mut s = scanner_for("<!-- oops");
        let tok = scan(&mut s);
        match tok {
            Token::Comment { text, .. } => assert_eq!(text, " oops"),
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn scans_doctype() {
        let mut s = scanner_for("<!DOCTYPE html>");
        let tok = scan(&mut s);
        match tok {
            Token::Doctype { name, .. } => assert_eq!(name.as_deref(), Some("html")),
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn self_closing_tag_is_flagged() {
        let mut s = scanner_for("<br/>");
        let tok = scan(&mut s);
        match tok {
            Token::StartTag { self_closing, .. } => assert!(self_closing),
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn self_closing_slash_is_ignored_on_ordinary_elements_by_default() {
        let mut s = scanner_for("<div/>");
        let tok = scan(&mut s);
        match tok {
            Token::StartTag { self_closing, .. } => assert!(!self_closing),
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn meta_charset_attribute_requests_encoding_switch() {
        let mut s = scanner_for("<meta charset=\"iso-8859-1\">");
        scan(&mut s);
        assert_eq!(s.take_pending_encoding_switch().as_deref(), Some("iso-8859-1"));
    }

    #[test]
    fn meta_http_equiv_content_type_requests_encoding_switch() {
        let mut s = scanner_for(
            "<meta http-equiv=\"Content-Type\" content=\"text/html; charset=Shift_JIS\">",
        );
        scan(&mut s);
        assert_eq!(s.take_pending_encoding_switch().as_deref(), Some("Shift_JIS"));
    }

    #[test]
    fn meta_charset_is_ignored_after_the_first_element() {
        let mut s = scanner_for("<p></p><meta charset=\"iso-8859-1\">");
        scan(&mut s); // <p>
        scan(&mut s); // </p>
        scan(&mut s); // <meta>
        assert_eq!(s.take_pending_encoding_switch(), None);
    }

    #[test]
    fn meta_without_http_equiv_or_charset_is_ignored() {
        let mut s = scanner_for("<meta name=\"viewport\" content=\"width=device-width\">");
        let tok = scan(&mut s);
        assert!(matches!(tok, Token::StartTag { code: TagCode::Meta, .. }));
        assert_eq!(s.take_pending_encoding_switch(), None);
    }
}
