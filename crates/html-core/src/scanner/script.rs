//! Script scanner: the HTML "script data" state machine.
//!
//! Five sub-states track whether a `<!--` comment-like escape is open and whether
//! it is single- or double-escaped (re-entered via a nested `<script>` start tag
//! inside the escape), so that `</script` inside an escape does not end the
//! element.

use super::Scanner;
use crate::element::TagCode;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Escaped,
    EscapedDash,
    EscapedDashDash,
    DoubleEscaped,
    DoubleEscapedDash,
    DoubleEscapedDashDash,
}

pub(super) fn scan(scanner: &mut Scanner) -> Token {
    let mut text = String::new();
    let mut state = State::Data;

    loop {
        if matches!(
            state,
            State::Data | State::Escaped | State::EscapedDash | State::EscapedDashDash
        ) && matches_script_close(scanner)
        {
            consume_close_tag(scanner);
            return finish(scanner, text, true);
        }

        match scanner.source.read() {
            None => return finish(scanner, text, false),
            Some(c) => {
                state = advance(scanner, state, c, &mut text);
            }
        }
    }
}

fn advance(scanner: &mut Scanner, state: State, c: char, text: &mut String) -> State {
    text.push(c);
    match (state, c) {
        (State::Data, '<') => {
            if scanner.source.peek(3).eq_ignore_ascii_case("!--") {
                text.push_str("!--");
                scanner.source.read();
                scanner.source.read();
                scanner.source.read();
                State::Escaped
            } else {
                State::Data
            }
        }
        (State::Escaped, '-') => State::EscapedDash,
        (State::Escaped, '<') => maybe_open_nested_script(scanner, text, State::Escaped),
        (State::Escaped, _) => State::Escaped,
        (State::EscapedDash, '-') => State::EscapedDashDash,
        (State::EscapedDash, '<') => maybe_open_nested_script(scanner, text, State::Escaped),
        (State::EscapedDash, _) => State::Escaped,
        (State::EscapedDashDash, '>') => State::Data,
        (State::EscapedDashDash, '-') => State::EscapedDashDash,
        (State::EscapedDashDash, '<') => maybe_open_nested_script(scanner, text, State::Escaped),
        (State::EscapedDashDash, _) => State::Escaped,
        (State::DoubleEscaped, '-') => State::DoubleEscapedDash,
        (State::DoubleEscaped, '<') => maybe_close_nested_script(scanner, text, State::DoubleEscaped),
        (State::DoubleEscaped, _) => State::DoubleEscaped,
        (State::DoubleEscapedDash, '-') => State::DoubleEscapedDashDash,
        (State::DoubleEscapedDash, '<') => {
            maybe_close_nested_script(scanner, text, State::DoubleEscaped)
        }
        (State::DoubleEscapedDash, _) => State::DoubleEscaped,
        (State::DoubleEscapedDashDash, '>') => State::Data,
        (State::DoubleEscapedDashDash, '-') => State::DoubleEscapedDashDash,
        (State::DoubleEscapedDashDash, '<') => {
            maybe_close_nested_script(scanner, text, State::DoubleEscaped)
        }
        (State::DoubleEscapedDashDash, _) => State::DoubleEscaped,
        (State::Data, _) => State::Data,
    }
}

fn is_tag_name_terminator(c: Option<char>) -> bool {
    matches!(c, None | Some(' ' | '\t' | '\n' | '\r' | '/' | '>'))
}

/// On `<` in (double-dash) escaped state, `<script` re-enters the double-escape
/// (nested script open, per the HTML "script data escaped" state).
fn maybe_open_nested_script(scanner: &mut Scanner, text: &mut String, fallback: State) -> State {
    let ahead: Vec<char> = scanner.source.peek(7).chars().collect();
    if ahead.len() >= 6 {
        let candidate: String = ahead[0..6].iter().collect();
        if candidate.eq_ignore_ascii_case("script") && is_tag_name_terminator(ahead.get(6).copied()) {
            for _ in 0..6 {
                text.push(scanner.source.read().unwrap());
            }
            return State::DoubleEscaped;
        }
    }
    fallback
}

/// On `<` in double-escaped state, `</script` returns to single-escaped.
fn maybe_close_nested_script(scanner: &mut Scanner, text: &mut String, fallback: State) -> State {
    let ahead: Vec<char> = scanner.source.peek(8).chars().collect();
    if ahead.len() >= 7 && ahead[0] == '/' {
        let candidate: String = ahead[1..7].iter().collect();
        if candidate.eq_ignore_ascii_case("script") && is_tag_name_terminator(ahead.get(7).copied()) {
            for _ in 0..7 {
                text.push(scanner.source.read().unwrap());
            }
            return State::Escaped;
        }
    }
    fallback
}

fn matches_script_close(scanner: &mut Scanner) -> bool {
    let ahead: Vec<char> = scanner.source.peek(9).chars().collect();
    if ahead.len() < 8 || ahead[0] != '<' || ahead[1] != '/' {
        return false;
    }
    let candidate: String = ahead[2..8].iter().collect();
    candidate.eq_ignore_ascii_case("script") && is_tag_name_terminator(ahead.get(8).copied())
}

fn consume_close_tag(scanner: &mut Scanner) {
    for _ in 0..8 {
        scanner.source.read();
    }
    scanner.source.skip_markup(false);
}

fn finish(scanner: &mut Scanner, text: String, matched_close: bool) -> Token {
    let text = strip_delims(scanner, text);
    if matched_close {
        let tag = Token::EndTag {
            code: TagCode::Script,
            name: "script".to_string(),
        };
        if text.is_empty() {
            tag
        } else {
            scanner.queue_token(tag);
            Token::Characters(text)
        }
    } else if text.is_empty() {
        Token::Eof
    } else {
        Token::Characters(text)
    }
}

fn strip_delims(scanner: &Scanner, text: String) -> String {
    let mut text = text;
    if scanner.options.scanner.script_strip_comment_delims {
        text = strip_one(&text, "<!--", "-->");
    }
    if scanner.options.scanner.script_strip_cdata_delims {
        text = strip_one(&text, "<![CDATA[", "]]>");
    }
    text
}

fn strip_one(text: &str, open: &str, close: &str) -> String {
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

    fn scanner_for_with_options(input: &str, options: ParserOptions) -> Scanner {
        Scanner::new(
            CharacterSource::new(Box::new(StrDecoder::new(input))),
            Rc::new(options),
            Rc::new(NullReporter),
        )
    }

    #[test]
    fn script_raw_text_with_embedded_angle_brackets() {
        let mut s = scanner_for("a<b>c</script>");
        let tok = scan(&mut s);
        assert_eq!(tok, Token::Characters("a<b>c".to_string()));
        assert_eq!(
            s.pending_token.take(),
            Some(Token::EndTag {
                code: TagCode::Script,
                name: "script".to_string()
            })
        );
    }

    #[test]
    fn strips_cdata_delims_when_enabled() {
        let mut options = ParserOptions::default();
        options.scanner.script_strip_cdata_delims = true;
        let mut s = scanner_for_with_options("<![CDATA[var x = 1;]]></script>", options);
        let tok = scan(&mut s);
        assert_eq!(tok, Token::Characters("var x = 1;".to_string()));
    }

    #[test]
    fn leaves_cdata_delims_when_disabled() {
        let mut s = scanner_for("<![CDATA[var x = 1;]]></script>");
        let tok = scan(&mut s);
        assert_eq!(tok, Token::Characters("<![CDATA[var x = 1;]]>".to_string()));
    }

    #[test]
    fn escaped_comment_hides_closing_tag() {
        let mut s = scanner_for("x<!--</script>-->y</script>");
        let tok = scan(&mut s);
        match tok {
            Token::Characters(text) => assert!(text.contains("</script>-->y")),
            other => panic!("unexpected token {other:?}"),
        }
    }
}
