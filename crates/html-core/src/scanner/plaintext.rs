//! Plaintext scanner: once a `plaintext` element is opened, everything
//! remaining in the document is a single run of characters — no tags,
//! comments, or entities are ever recognized again.

use super::Scanner;
use crate::token::Token;

pub(super) fn scan(scanner: &mut Scanner) -> Token {
    let mut text = String::new();
    while let Some(c) = scanner.source_mut().read() {
        if c == '\r' {
            if scanner.source_mut().peek(1) == "\n" {
                scanner.source_mut().read();
            }
            text.push('\n');
        } else {
            text.push(c);
        }
    }
    if text.is_empty() {
        Token::Eof
    } else {
        Token::Characters(text)
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
    fn consumes_everything_including_tag_like_text() {
        let mut s = scanner_for("a<b>c</plaintext>d");
        let tok = scan(&mut s);
        assert_eq!(tok, Token::Characters("a<b>c</plaintext>d".to_string()));
    }

    #[test]
    fn empty_input_yields_eof() {
        let mut s = scanner_for("");
        assert_eq!(scan(&mut s), Token::Eof);
    }

    #[test]
    fn normalizes_crlf_to_lf() {
        let mut s = scanner_for("a\r\nb\rc");
        let tok = scan(&mut s);
        assert_eq!(tok, Token::Characters("a\nb\nc".to_string()));
    }
}
