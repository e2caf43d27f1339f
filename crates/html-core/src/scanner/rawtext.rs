//! Special scanner: raw-text elements other than `script`.
//!
//! Scans characters (and, for `textarea`/`title` only, entity references) until it
//! sees `</name` case-insensitively followed by whitespace or `>`.

use super::content::resolve_entity_reference;
use super::Scanner;
use crate::element::{self, TagCode};
use crate::token::Token;

pub(super) fn scan(scanner: &mut Scanner, code: TagCode) -> Token {
    let name = element::info(code).name;
    let resolve_entities = matches!(code, TagCode::Textarea | TagCode::Title);
    let mut text = String::new();

    loop {
        if matches_closing_tag(scanner, name) {
            consume_closing_tag(scanner, name);
            return finish(scanner, code, text, Some(Token::EndTag {
                code,
                name: name.to_string(),
            }));
        }
        match scanner.source.read() {
            None => return finish(scanner, code, text, None),
            Some('&') if resolve_entities => resolve_entity_reference(scanner, &mut text, false),
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

fn matches_closing_tag(scanner: &mut Scanner, name: &str) -> bool {
    let ahead: Vec<char> = scanner.source.peek(2 + name.len() + 1).chars().collect();
    if ahead.len() < 2 + name.len() || ahead[0] != '<' || ahead[1] != '/' {
        return false;
    }
    let candidate: String = ahead[2..2 + name.len()].iter().collect();
    if !candidate.eq_ignore_ascii_case(name) {
        return false;
    }
    match ahead.get(2 + name.len()) {
        None => true, // end of input right after the name: treat as a match
        Some(c) => matches!(c, ' ' | '\t' | '\n' | '\r' | '>'),
    }
}

fn consume_closing_tag(scanner: &mut Scanner, name: &str) {
    for _ in 0..(2 + name.len()) {
        scanner.source.read();
    }
    scanner.source.skip_markup(false);
}

fn finish(scanner: &mut Scanner, code: TagCode, mut text: String, end_tag: Option<Token>) -> Token {
    if code == TagCode::Style {
        if scanner.options.scanner.style_strip_comment_delims {
            text = strip_delims(&text, "<!--", "-->");
        }
        if scanner.options.scanner.style_strip_cdata_delims {
            text = strip_delims(&text, "<![CDATA[", "]]>");
        }
    }
    match end_tag {
        Some(tag) => {
            if text.is_empty() {
                tag
            } else {
                scanner.queue_token(tag);
                Token::Characters(text)
            }
        }
        None if text.is_empty() => Token::Eof,
        None => Token::Characters(text),
    }
}

fn strip_delims(text: &str, open: &str, close: &str) -> String {
    let trimmed = text.trim();
    if let (Some(body), true) = (trimmed.strip_prefix(open), trimmed.ends_with(close)) {
        body[..body.len() - close.len()].to_string()
    } else {
        text.to_string()
    }
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
    fn textarea_resolves_entities_and_splits_end_tag() {
        let mut s = scanner_for("a&amp;b</textarea>");
        let tok = scan(&mut s, TagCode::Textarea);
        assert_eq!(tok, Token::Characters("a&b".to_string()));
        assert_eq!(
            s.pending_token.take(),
            Some(Token::EndTag {
                code: TagCode::Textarea,
                name: "textarea".to_string()
            })
        );
    }

    #[test]
    fn style_does_not_resolve_entities() {
        let mut s = scanner_for("a&amp;b</style>");
        let tok = scan(&mut s, TagCode::Style);
        assert_eq!(tok, Token::Characters("a&amp;b".to_string()));
    }

    #[test]
    fn nested_angle_brackets_do_not_terminate() {
        let mut s = scanner_for("a<b>c</style>");
        let tok = scan(&mut s, TagCode::Style);
        assert_eq!(tok, Token::Characters("a<b>c".to_string()));
    }

    #[test]
    fn empty_element_emits_end_tag_directly() {
        let mut s = scanner_for("</title>");
        let tok = scan(&mut s, TagCode::Title);
        assert_eq!(
            tok,
            Token::EndTag {
                code: TagCode::Title,
                name: "title".to_string()
            }
        );
    }
}
