//! Named and numeric HTML character reference resolution.
//!
//! This crate is the character-reference half of a permissive HTML parsing
//! pipeline: a prefix trie over the named-entity table ([`trie`], [`named`],
//! [`data`]) and a character-fed state machine for `&#...;` / `&#x...;`
//! numeric references ([`numeric`]).
//!
//! Exposed as incremental character-fed walkers so a streaming
//! [`CharacterSource`](../html_core/char_source/struct.CharacterSource.html)
//! can drive them one char at a time instead of slicing a byte buffer.

mod data;
pub mod named;
pub mod numeric;
mod trie;

pub use named::{NamedEntityResolver, NamedMatch, NamedStep, NamedWalkState};
pub use numeric::{
    parse_numeric_reference, resolve_code_point, NumericEntityParser, NumericMatch, NumericStep,
    REPLACEMENT_CHAR,
};
pub use trie::TrieMatch;

/// Convenience one-shot decode of a bare named or numeric reference body (the text
/// following `&`, excluding the `&` itself). Returns the replacement text if the
/// whole body names a valid, complete reference with nothing left over.
///
/// Only accepts a reference that consumes the entire input, since the streaming
/// scanner handles partial matches and rewinding itself via
/// [`named::NamedEntityResolver::step`] / [`numeric::NumericEntityParser::feed`].
pub fn decode(body: &str) -> Option<String> {
    if let Some(rest) = body.strip_prefix('#') {
        let m = parse_numeric_reference(rest.chars());
        if m.rewind_count == 0 {
            return m.replacement;
        }
        return None;
    }
    let m = NamedEntityResolver::lookup(body)?;
    if m.length == body.len() {
        Some(m.replacement.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_named_with_semicolon() {
        assert_eq!(decode("amp;").as_deref(), Some("&"));
    }

    #[test]
    fn decode_numeric_hex() {
        assert_eq!(decode("#x41;").as_deref(), Some("A"));
    }

    #[test]
    fn decode_rejects_trailing_garbage() {
        assert_eq!(decode("amp;x"), None);
    }

    #[test]
    fn decode_rejects_unknown_name() {
        assert_eq!(decode("notareference;"), None);
    }
}
