//! The crate-level pipeline type.
//!
//! Owns the character source, scanner, and balancer, and exposes the
//! `scan_document`/`next_event` surface a host application drives.

use crate::balancer::Balancer;
use crate::char_source::{CharacterSource, Decoder};
use crate::config::{ParserOptions, REPLACEMENT_ENCODING_LABEL};
use crate::error::{DiagnosticKey, ParserError};
use crate::event::DocumentEvent;
use crate::scanner::{ScanStep, Scanner, ScannerPersonality};
use std::rc::Rc;

/// Outcome of a single [`Parser::scan_document`] call: each `scan_document(complete)`
/// call either runs until end-of-document or until the next token boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The document has been fully tokenized; remaining events are available via
    /// [`Parser::next_event`].
    Done,
    /// A token boundary was reached but the document is not finished (only
    /// possible with `complete == false`).
    Boundary,
}

/// A pushed input source: a handler may inject more characters to be scanned
/// in line, e.g. a script emulator rewriting `document.write` output. The
/// nested source is popped on its own EOF, restoring the outer position.
struct PushedSource {
    source: CharacterSource,
}

/// The parser. Single-threaded, cooperative, pull-driven: no internal threads,
/// no async suspension.
pub struct Parser {
    scanner: Scanner,
    balancer: Balancer,
    options: Rc<ParserOptions>,
    /// Stack of pushed input sources, innermost last.
    pushed_sources: Vec<PushedSource>,
    finished: bool,
}

impl Parser {
    pub fn new(decoder: Box<dyn Decoder>, options: ParserOptions) -> Self {
        let options = Rc::new(options);
        let reporter = options.error_reporter.clone();
        let source = CharacterSource::with_read_ahead_hint(decoder, options.reader_buffer_size);
        let mut scanner = Scanner::new(source, options.clone(), reporter.clone());
        let balancer = Balancer::new(options.clone(), reporter);
        if let Some(personality_code) = balancer.fragment_start_personality() {
            scanner.start_in(ScannerPersonality::Special(personality_code));
        }
        Self {
            scanner,
            balancer,
            options,
            pushed_sources: Vec::new(),
            finished: false,
        }
    }

    /// Constructs a fragment parser: the balancer's stack is pre-populated with
    /// `context_stack` (outermost first) and never fully unwound.
    pub fn new_fragment(
        decoder: Box<dyn Decoder>,
        options: ParserOptions,
        context_stack: Vec<String>,
    ) -> Result<Self, ParserError> {
        for name in &context_stack {
            let lower = name.to_ascii_lowercase();
            if crate::element::code_for_name(&lower) == crate::element::TagCode::Unknown {
                return Err(ParserError::UnknownFragmentContext(name.clone()));
            }
        }
        Ok(Self::new(decoder, options.with_fragment_context(context_stack)))
    }

    /// Injects `source` to be scanned in line before the outer source resumes,
    /// pushing it onto the pushed-source stack.
    pub fn push_input_source(&mut self, decoder: Box<dyn Decoder>) {
        let nested = CharacterSource::new(decoder);
        let outer_source = std::mem::replace(self.scanner.source_mut(), nested);
        self.pushed_sources.push(PushedSource { source: outer_source });
    }

    /// Restores the outer input source once the innermost pushed source is
    /// exhausted.
    fn pop_exhausted_source(&mut self) {
        while self.scanner.source_mut().is_eof() {
            match self.pushed_sources.pop() {
                Some(popped) => {
                    *self.scanner.source_mut() = popped.source;
                }
                None => break,
            }
        }
    }

    /// Runs the scanner/balancer pipeline. With `complete == true`, drives to
    /// end-of-document; with `complete == false`, stops after the first token
    /// (this implementation never actually suspends mid-token, matching
    /// [`ScanStep::More`]'s documented non-occurrence).
    pub fn scan_document(&mut self, complete: bool) -> Result<ScanOutcome, ParserError> {
        if self.finished {
            return Ok(ScanOutcome::Done);
        }
        loop {
            self.pop_exhausted_source();
            match self.scanner.scan(true) {
                ScanStep::Done(token) => {
                    if let Some(label) = self.scanner.take_pending_encoding_switch() {
                        if self.apply_encoding_switch(&label)? {
                            // The scanner was rewound to the start of the
                            // playback buffer under the new encoding; `token`
                            // was produced under the old one and is discarded
                            // rather than fed to the fresh balancer.
                            continue;
                        }
                    }
                    self.balancer.feed(token);
                    if self.balancer.take_playback_discard_signal() {
                        self.scanner.source_mut().discard_playback();
                    }
                }
                ScanStep::Eof => {
                    self.balancer.feed(crate::token::Token::Eof);
                    self.finished = true;
                    return Ok(ScanOutcome::Done);
                }
                ScanStep::More => {
                    if !complete {
                        return Ok(ScanOutcome::Boundary);
                    }
                }
            }
            if !complete {
                return Ok(ScanOutcome::Boundary);
            }
        }
    }

    /// Handles a `<meta charset>` / `<?xml encoding="...">`-triggered switch
    /// request. A switch to a family-compatible encoding rewinds the byte
    /// playback buffer and restarts tokenization from scratch, skipping the
    /// elements already delivered to the consumer; a switch to an incompatible
    /// encoding, or one attempted after the playback buffer has already been
    /// discarded, is reported and the current encoding is kept.
    fn apply_encoding_switch(&mut self, label: &str) -> Result<bool, ParserError> {
        if self.options.ignore_specified_charset {
            return Ok(false);
        }
        let current = self.scanner.source_mut().current_encoding().to_string();
        if label.eq_ignore_ascii_case(&current) {
            return Ok(false);
        }
        let is_replacement = label.eq_ignore_ascii_case(REPLACEMENT_ENCODING_LABEL);
        if !is_replacement && !encodings_compatible(&current, label) {
            if self.options.report_errors {
                self.options
                    .error_reporter
                    .report_error(DiagnosticKey::IncompatibleEncodingSwitch, &[current, label.to_string()]);
            }
            return Ok(false);
        }
        match self.scanner.source_mut().switch_encoding(label) {
            Ok(true) => {
                self.restart_after_encoding_switch();
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(_) => {
                if self.options.report_errors {
                    self.options
                        .error_reporter
                        .report_error(DiagnosticKey::UnsupportedCharset, &[label.to_string()]);
                }
                Ok(false)
            }
        }
    }

    /// Rebuilds the balancer (preserving how many elements it has already
    /// delivered, so the restarted parse doesn't re-emit them) and resets the
    /// scanner, after [`CharacterSource::switch_encoding`] has rewound the byte
    /// playback buffer to its start.
    fn restart_after_encoding_switch(&mut self) {
        let already_emitted = self.balancer.elements_emitted();
        let reporter = self.options.error_reporter.clone();
        let mut fresh = Balancer::new(self.options.clone(), reporter);
        fresh.set_suppress_until_element_count(already_emitted);
        self.balancer = fresh;
        self.scanner.reset_for_restart();
    }

    /// Drains the next queued document event, running the pipeline if the queue
    /// is currently empty and the document isn't finished.
    pub fn next_event(&mut self) -> Option<DocumentEvent> {
        loop {
            if let Some(event) = self.balancer.next_event() {
                return Some(event);
            }
            if self.finished {
                return None;
            }
            if self.scan_document(false).is_err() {
                return None;
            }
        }
    }

    /// Abandons the parse: pops the pushed-source stack, closing each pushed
    /// character source; subsequent `scan_document` calls return immediately
    /// as done.
    pub fn cleanup(&mut self, close_all: bool) {
        if close_all {
            self.pushed_sources.clear();
        }
        self.finished = true;
    }
}

/// Whether switching from `current` to `target` can be satisfied by rewinding
/// and re-decoding the already-buffered bytes, rather than requiring a decoder
/// family change no playback rewind can fix (e.g. UTF-16 to an ASCII-superset
/// single-byte encoding, where the underlying byte units differ).
fn encodings_compatible(current: &str, target: &str) -> bool {
    ascii_compatible_family(current) == ascii_compatible_family(target)
}

/// Buckets an encoding label into the coarse family the WHATWG Encoding
/// Standard's byte layout falls into: UTF-16 (two-byte units), UTF-32
/// (four-byte units), or the single-byte/variable-width ASCII-superset family
/// that includes UTF-8, the ISO-8859 series, and the Windows code pages.
fn ascii_compatible_family(label: &str) -> u8 {
    let lower = label.to_ascii_lowercase();
    if lower.starts_with("utf-16") || lower.starts_with("utf16") {
        1
    } else if lower.starts_with("utf-32") || lower.starts_with("utf32") {
        2
    } else {
        0
    }
}
