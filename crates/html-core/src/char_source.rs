//! Buffered character reader with mark/rewind, line/column tracking, and pushback
//! for encoding switches.
//!
//! Expressed over `char` rather than raw bytes: the external [`Decoder`] already
//! hands back characters, so byte decoding itself is out of scope here.

use crate::error::ParserError;

/// External collaborator: an external decoder supplies a character stream and
/// may be switched mid-parse via a playback byte stream. Out of scope to
/// implement fully — this is the seam [`CharacterSource`] pulls from.
pub trait Decoder {
    /// Pulls the next decoded character, or `None` at end of input.
    fn next_char(&mut self) -> Option<char>;

    /// Switches the underlying byte decoder to `encoding_label`, replaying any
    /// buffered bytes already consumed. Returns an error if the label is not
    /// supported.
    fn switch_encoding(&mut self, encoding_label: &str) -> Result<(), ParserError>;

    /// The decoder's current encoding label, for idempotence checks: switching
    /// to the same encoding is a no-op.
    fn current_encoding(&self) -> &str;
}

/// Decoder for the special `"replacement"` encoding label: yields exactly one
/// U+FFFD and then ends, matching the WHATWG Encoding Standard's treatment of
/// the `replacement` encoding (the whole stream collapses to one replacement
/// character and decoding stops).
#[derive(Default)]
struct ReplacementDecoder {
    emitted: bool,
}

impl Decoder for ReplacementDecoder {
    fn next_char(&mut self) -> Option<char> {
        if self.emitted {
            None
        } else {
            self.emitted = true;
            Some('\u{FFFD}')
        }
    }

    fn switch_encoding(&mut self, encoding_label: &str) -> Result<(), ParserError> {
        Err(ParserError::UnsupportedEncoding(encoding_label.to_string()))
    }

    fn current_encoding(&self) -> &str {
        crate::config::REPLACEMENT_ENCODING_LABEL
    }
}

/// A [`Decoder`] over an in-memory string, for tests and for hosts that have
/// already decoded their input. `current_encoding` is fixed and every
/// `switch_encoding` to a different label is rejected as incompatible.
pub struct StrDecoder {
    chars: std::vec::IntoIter<char>,
    encoding: String,
}

impl StrDecoder {
    pub fn new(s: &str) -> Self {
        Self {
            chars: s.chars().collect::<Vec<_>>().into_iter(),
            encoding: "UTF-8".to_string(),
        }
    }
}

impl Decoder for StrDecoder {
    fn next_char(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn switch_encoding(&mut self, encoding_label: &str) -> Result<(), ParserError> {
        if encoding_label.eq_ignore_ascii_case(&self.encoding) {
            Ok(())
        } else {
            Err(ParserError::UnsupportedEncoding(encoding_label.to_string()))
        }
    }

    fn current_encoding(&self) -> &str {
        &self.encoding
    }
}

/// Buffered character reader.
///
/// Invariant: after every read or rewind, `0 <= offset <= buffer.len()`; `position`
/// equals the total number of characters returned since construction (or since the
/// last encoding switch, which resets it).
pub struct CharacterSource {
    decoder: Box<dyn Decoder>,
    buffer: Vec<char>,
    offset: usize,
    eof: bool,
    line: usize,
    column: usize,
    position: usize,
    /// Whether the playback buffer (the full `buffer` from index 0) is still
    /// retained for a possible encoding-switch rewind. Discarded once `<body>`
    /// is reached.
    playback_active: bool,
    /// `reader_buffer_size`: minimum batch pulled from the decoder per fill, so
    /// lookahead-heavy scanning doesn't call back into the decoder one
    /// character at a time.
    read_ahead_hint: usize,
}

impl CharacterSource {
    pub fn new(decoder: Box<dyn Decoder>) -> Self {
        Self::with_read_ahead_hint(decoder, crate::config::DEFAULT_READER_BUFFER_SIZE)
    }

    pub fn with_read_ahead_hint(decoder: Box<dyn Decoder>, read_ahead_hint: usize) -> Self {
        Self {
            decoder,
            buffer: Vec::new(),
            offset: 0,
            eof: false,
            line: 1,
            column: 1,
            position: 0,
            playback_active: true,
            read_ahead_hint,
        }
    }

    fn fill(&mut self, want_at_least: usize) {
        let target = want_at_least.max(self.read_ahead_hint);
        while !self.eof && self.buffer.len() < target {
            match self.decoder.next_char() {
                Some(c) => self.buffer.push(c),
                None => self.eof = true,
            }
        }
    }

    fn peek_at(&mut self, idx: usize) -> Option<char> {
        self.fill(idx + 1);
        self.buffer.get(idx).copied()
    }

    fn advance_position(&mut self, c: char) {
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Reads the next character, advancing line/column/offset. Loads more input
    /// from the decoder on buffer exhaustion.
    pub fn read(&mut self) -> Option<char> {
        let c = self.peek_at(self.offset)?;
        self.offset += 1;
        self.advance_position(c);
        Some(c)
    }

    /// Peeks up to `n` characters ahead without disturbing the buffer or position,
    /// so a failed lookahead (e.g. checking for `</script`) can be abandoned for
    /// free.
    pub fn peek(&mut self, n: usize) -> String {
        self.fill(self.offset + n);
        self.buffer[self.offset..(self.offset + n).min(self.buffer.len())]
            .iter()
            .collect()
    }

    /// Reads ahead while guaranteeing the already-read prefix remains in the
    /// buffer, so a later mismatch can rewind fully. Equivalent to `read`,
    /// since this buffer never evicts a read character until an explicit
    /// encoding-switch discard.
    pub fn read_preserving(&mut self) -> Option<char> {
        self.read()
    }

    /// Undoes the last `n` reads. The caller guarantees those characters are still
    /// in the buffer (true for any `n <= offset`, since this implementation never
    /// evicts read characters outside of an encoding switch).
    pub fn rewind(&mut self, n: usize) {
        for _ in 0..n {
            self.offset -= 1;
            self.position -= 1;
            let c = self.buffer[self.offset];
            if c == '\n' {
                self.line -= 1;
                // Column can't be perfectly reconstructed without rescanning the
                // previous line; this is acceptable since rewinds are always
                // immediately re-read character by character in practice.
                self.column = 1;
            } else {
                self.column = self.column.saturating_sub(1).max(1);
            }
        }
    }

    /// Case-insensitive match-and-consume of `literal`. On mismatch, restores the
    /// position exactly.
    pub fn skip(&mut self, literal: &str) -> bool {
        let chars: Vec<char> = literal.chars().collect();
        let mut read = 0;
        for expected in &chars {
            match self.read() {
                Some(c) if c.eq_ignore_ascii_case(expected) => read += 1,
                _ => {
                    self.rewind(read);
                    return false;
                }
            }
        }
        true
    }

    /// Consumes a run of ASCII space/tab characters, returning the count consumed.
    pub fn skip_spaces(&mut self) -> usize {
        let mut n = 0;
        while let Some(c) = self.peek_at(self.offset) {
            if c == ' ' || c == '\t' {
                self.read();
                n += 1;
            } else {
                break;
            }
        }
        n
    }

    /// Consumes a run of newlines, normalizing CRLF/CR/LF so a CR immediately
    /// followed by LF counts as a single line.
    pub fn skip_newlines(&mut self) -> usize {
        let mut n = 0;
        loop {
            match self.peek_at(self.offset) {
                Some('\r') => {
                    self.read();
                    if self.peek_at(self.offset) == Some('\n') {
                        self.read();
                    }
                    n += 1;
                }
                Some('\n') => {
                    self.read();
                    n += 1;
                }
                _ => break,
            }
        }
        n
    }

    /// Consumes characters up to and including a matching `>`, optionally tracking
    /// nested `<` (`balance`). Returns whether the final close was via `/>`.
    pub fn skip_markup(&mut self, balance: bool) -> bool {
        let mut depth = 1usize;
        let mut last_was_slash = false;
        loop {
            match self.read() {
                None => return false,
                Some('>') => {
                    if balance {
                        depth -= 1;
                        if depth > 0 {
                            last_was_slash = false;
                            continue;
                        }
                    }
                    return last_was_slash;
                }
                Some('<') if balance => {
                    depth += 1;
                    last_was_slash = false;
                }
                Some('/') => last_was_slash = true,
                Some(_) => last_was_slash = false,
            }
        }
    }

    /// Peek-only variant of [`skip_markup`](Self::skip_markup)'s use case: look
    /// ahead `n` characters to decide whether e.g. `</script` follows, without
    /// consuming anything.
    pub fn next_content(&mut self, n: usize) -> String {
        self.peek(n)
    }

    pub fn is_eof(&mut self) -> bool {
        self.peek_at(self.offset).is_none()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Discards the playback buffer: no further encoding switch is possible
    /// after this point. Called once `<body>` is reached.
    pub fn discard_playback(&mut self) {
        self.playback_active = false;
    }

    pub fn playback_active(&self) -> bool {
        self.playback_active
    }

    /// The decoder's current encoding label.
    pub fn current_encoding(&self) -> &str {
        self.decoder.current_encoding()
    }

    fn reset_buffer(&mut self) {
        self.buffer.clear();
        self.offset = 0;
        self.eof = false;
        self.line = 1;
        self.column = 1;
        self.position = 0;
    }

    /// Attempts an encoding switch. If `label` matches the decoder's current
    /// encoding, this is a no-op. If the playback buffer has already been
    /// discarded, the switch is rejected as incompatible. `label` equal to
    /// [`crate::config::REPLACEMENT_ENCODING_LABEL`] swaps the decoder for one
    /// that yields a single U+FFFD and stops.
    /// On success, the caller is responsible for restarting tokenization from
    /// scratch (`element_depth := element_count`), since `CharacterSource` itself
    /// only resets its own counters, buffer, and decoder.
    pub fn switch_encoding(&mut self, label: &str) -> Result<bool, ParserError> {
        if label.eq_ignore_ascii_case(crate::config::REPLACEMENT_ENCODING_LABEL) {
            if !self.playback_active {
                return Ok(false);
            }
            self.decoder = Box::new(ReplacementDecoder::default());
            self.reset_buffer();
            return Ok(true);
        }
        if label.eq_ignore_ascii_case(self.decoder.current_encoding()) {
            return Ok(false);
        }
        if !self.playback_active {
            return Ok(false);
        }
        self.decoder.switch_encoding(label)?;
        self.reset_buffer();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(s: &str) -> CharacterSource {
        CharacterSource::new(Box::new(StrDecoder::new(s)))
    }

    #[test]
    fn reads_characters_in_order() {
        let mut s = source("ab");
        assert_eq!(s.read(), Some('a'));
        assert_eq!(s.read(), Some('b'));
        assert_eq!(s.read(), None);
    }

    #[test]
    fn rewind_restores_position_for_rereading() {
        let mut s = source("abc");
        s.read();
        s.read();
        s.rewind(1);
        assert_eq!(s.read(), Some('b'));
        assert_eq!(s.read(), Some('c'));
    }

    #[test]
    fn skip_matches_case_insensitively_and_restores_on_mismatch() {
        let mut s = source("DOCTYPE html");
        assert!(s.skip("doctype"));
        assert_eq!(s.read(), Some(' '));

        let mut s2 = source("nope");
        assert!(!s2.skip("yes"));
        assert_eq!(s2.read(), Some('n'));
    }

    #[test]
    fn skip_newlines_counts_crlf_as_one_line() {
        let mut s = source("\r\n\n abc");
        let n = s.skip_newlines();
        assert_eq!(n, 2);
        assert_eq!(s.line(), 3);
        assert_eq!(s.read(), Some(' '));
    }

    #[test]
    fn peek_does_not_disturb_position() {
        let mut s = source("abc");
        assert_eq!(s.peek(2), "ab");
        assert_eq!(s.read(), Some('a'));
    }

    #[test]
    fn switch_encoding_to_same_label_is_noop() {
        let mut s = source("abc");
        s.read();
        let changed = s.switch_encoding("utf-8").unwrap();
        assert!(!changed);
        assert_eq!(s.read(), Some('b'));
    }

    #[test]
    fn switch_encoding_to_replacement_collapses_stream_to_one_fffd() {
        let mut s = source("abc");
        let changed = s.switch_encoding("replacement").unwrap();
        assert!(changed);
        assert_eq!(s.current_encoding(), "replacement");
        assert_eq!(s.read(), Some('\u{FFFD}'));
        assert_eq!(s.read(), None);
    }

    #[test]
    fn switch_encoding_rejected_once_playback_discarded() {
        let mut s = source("abc");
        s.discard_playback();
        let changed = s.switch_encoding("replacement").unwrap();
        assert!(!changed);
        assert_eq!(s.read(), Some('a'));
    }
}
