//! The tokenizer: a variant state machine with four scanner personalities, each
//! driving the current character source and producing
//! [`Token`](crate::token::Token)s for the balancer.
//!
//! State transitions are expressed as token-emitting transitions over a
//! streaming [`CharacterSource`], producing a real token stream between the
//! scanner and the balancer rather than a lazy cursor API.

mod content;
mod plaintext;
mod rawtext;
mod script;

use crate::char_source::CharacterSource;
use crate::config::ParserOptions;
use crate::element::TagCode;
use crate::error::ErrorReporter;
use crate::token::Token;
use std::rc::Rc;

/// Which sub-scanner is currently driving the character source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerPersonality {
    Content,
    /// `textarea`/`title` (entities resolved) or `style`/`iframe`/`noscript`/
    /// `noframes`/`noembed`/`xmp` (entities not resolved).
    Special(TagCode),
    Script,
    PlainText,
}

/// Outcome of a single [`Scanner::scan`] call.
pub enum ScanStep {
    /// A token was produced.
    Done(Token),
    /// End of input reached with nothing more to produce.
    Eof,
    /// No complete token yet; call again (only possible with `complete == false`,
    /// which this implementation never actually needs since `CharacterSource`
    /// always blocks until its `Decoder` is exhausted rather than reporting a
    /// partial read).
    More,
}

/// The tokenizer state machine.
pub struct Scanner {
    source: CharacterSource,
    options: Rc<ParserOptions>,
    reporter: Rc<dyn ErrorReporter>,
    personality: ScannerPersonality,
    /// True until the first element has been opened; controls the `<meta
    /// charset>` / encoding-switch special-casing.
    before_first_element: bool,
    pending_encoding_switch: Option<String>,
    /// A token already produced but not yet returned, used by the script/rawtext
    /// scanners to split "characters, then end tag" into two `scan` calls: emit
    /// characters accumulated so far, then an end-element event.
    pending_token: Option<Token>,
}

impl Scanner {
    pub fn new(source: CharacterSource, options: Rc<ParserOptions>, reporter: Rc<dyn ErrorReporter>) -> Self {
        Self {
            source,
            options,
            reporter,
            personality: ScannerPersonality::Content,
            before_first_element: true,
            pending_encoding_switch: None,
            pending_token: None,
        }
    }

    /// Queues `token` to be returned by the *next* [`Self::scan`] call rather than
    /// the current one.
    pub(super) fn queue_token(&mut self, token: Token) {
        debug_assert!(self.pending_token.is_none());
        self.pending_token = Some(token);
    }

    /// Starts the scanner directly in a raw-text personality, used for fragment
    /// parsing when the context element is SPECIAL.
    pub fn start_in(&mut self, personality: ScannerPersonality) {
        self.personality = personality;
        self.before_first_element = false;
    }

    /// Drains any encoding-switch request the last scan surfaced (e.g. via a `<meta
    /// charset>` or `<?xml encoding="...">` seen in content scanning), for the
    /// [`crate::parser::Parser`] to apply to the character source.
    pub fn take_pending_encoding_switch(&mut self) -> Option<String> {
        self.pending_encoding_switch.take()
    }

    pub fn source_mut(&mut self) -> &mut CharacterSource {
        &mut self.source
    }

    /// Resets the tokenizer state to its initial condition after a compatible
    /// encoding switch has rewound the character source, without touching the
    /// source itself (already reset by [`CharacterSource::switch_encoding`]).
    pub(crate) fn reset_for_restart(&mut self) {
        self.personality = ScannerPersonality::Content;
        self.before_first_element = true;
        self.pending_encoding_switch = None;
        self.pending_token = None;
    }

    /// Runs one scan step. With `complete == true`, keeps internally retrying until
    /// a token is produced or the input is exhausted — in practice always the case
    /// here since `CharacterSource` never reports a transient "not enough bytes
    /// yet" condition the way a non-blocking byte reader might.
    pub fn scan(&mut self, complete: bool) -> ScanStep {
        let _ = complete;
        if let Some(token) = self.pending_token.take() {
            self.after_token(&token);
            return ScanStep::Done(token);
        }
        if self.source.is_eof() {
            return ScanStep::Eof;
        }
        let token = match &self.personality {
            ScannerPersonality::Content => content::scan(self),
            ScannerPersonality::Special(code) => {
                let code = *code;
                rawtext::scan(self, code)
            }
            ScannerPersonality::Script => script::scan(self),
            ScannerPersonality::PlainText => plaintext::scan(self),
        };
        self.after_token(&token);
        ScanStep::Done(token)
    }

    /// Post-processes a just-produced token: dispatches raw-text sub-scanners after
    /// a start tag and tracks whether the first element has been seen.
    fn after_token(&mut self, token: &Token) {
        if let Token::StartTag {
            code, self_closing, ..
        } = token
        {
            self.before_first_element = false;
            if !*self_closing {
                self.personality = match code {
                    TagCode::Script => ScannerPersonality::Script,
                    TagCode::Plaintext => ScannerPersonality::PlainText,
                    TagCode::Noscript if !self.options.parse_noscript_content => {
                        ScannerPersonality::Special(TagCode::Noscript)
                    }
                    c if crate::element::is_special(*c) => ScannerPersonality::Special(*c),
                    _ => ScannerPersonality::Content,
                };
            }
        }
        if let Token::EndTag { code, .. } = token {
            if matches!(self.personality, ScannerPersonality::Special(c) if c == *code)
                || matches!(self.personality, ScannerPersonality::Script if *code == TagCode::Script)
            {
                self.personality = ScannerPersonality::Content;
            }
        }
    }
}

pub(crate) fn is_tag_name_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub(crate) fn is_tag_name_continue(c: char) -> bool {
    !matches!(c, ' ' | '\t' | '\n' | '\r' | '/' | '>' | '\0')
}
