//! Named character reference resolution.
//!
//! Wraps [`crate::trie::EntityTrie`] with the two entry points callers need:
//! a one-shot [`NamedEntityResolver::lookup`] for back-mapping / convenience,
//! and an incremental, character-fed walk ([`NamedEntityResolver::start`] /
//! [`NamedEntityResolver::step`]) for the scanner to drive one character at a time
//! without needing the whole candidate string buffered up front.

use crate::data::ENTITIES;
use crate::trie::{EntityTrie, TrieMatch, ROOT};
use std::sync::OnceLock;

fn trie() -> &'static EntityTrie {
    static TRIE: OnceLock<EntityTrie> = OnceLock::new();
    TRIE.get_or_init(|| EntityTrie::build(ENTITIES))
}

/// The outcome of a completed named-reference match.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMatch {
    /// The resolved replacement text, or `None` if no named reference matched at all.
    pub replacement: Option<&'static str>,
    /// Total characters the walk consumed (including any that must be rewound).
    pub consumed: usize,
    /// Characters that are actually part of the match (`consumed - match_length`
    /// must be rewound by the caller).
    pub match_length: usize,
    pub ends_with_semicolon: bool,
    /// True when a match was found but it was a legacy (no `;`) form: the caller
    /// should raise the "missing semicolon after character reference" warning.
    pub missing_semicolon_warning: bool,
}

impl NamedMatch {
    fn none(consumed: usize) -> Self {
        Self {
            replacement: None,
            consumed,
            match_length: 0,
            ends_with_semicolon: false,
            missing_semicolon_warning: false,
        }
    }
}

/// Incremental walk state, opaque to callers beyond construction and stepping.
#[derive(Debug, Clone, Copy)]
pub struct NamedWalkState {
    node: u32,
    consumed: usize,
    best: Option<(usize, &'static str, bool)>,
}

/// Result of feeding one character into an in-progress walk.
pub enum NamedStep {
    /// Keep feeding; no terminal condition reached yet.
    Continue(NamedWalkState),
    /// The walk is over; this is the longest match found (if any).
    Done(NamedMatch),
}

/// Resolver over the static named-entity table. Stateless; all instances share the
/// same lazily-built trie.
pub struct NamedEntityResolver;

impl NamedEntityResolver {
    /// One-shot longest-match lookup. `name` excludes the leading `&` and may or may
    /// not include a trailing `;`.
    pub fn lookup(name: &str) -> Option<TrieMatch> {
        trie().lookup(name)
    }

    /// Begins an incremental walk.
    pub fn start() -> NamedWalkState {
        NamedWalkState {
            node: ROOT,
            consumed: 0,
            best: None,
        }
    }

    /// Feeds the next character of the candidate (or `None` at end of input / when
    /// the source is exhausted) into the walk.
    ///
    /// Completion is signaled when: (a) the new state is a terminal node, (b) no
    /// child matched the fed character, or (c) the input runs out.
    pub fn step(state: NamedWalkState, c: Option<char>) -> NamedStep {
        let t = trie();
        let c = match c {
            None => return NamedStep::Done(Self::finish(state)),
            Some(c) => c,
        };
        match t.step(state.node, c) {
            None => NamedStep::Done(Self::finish(state)),
            Some(next) => {
                let consumed = state.consumed + 1;
                let mut best = state.best;
                if let Some((replacement, ends_with_semicolon)) = t.resolved_at(next) {
                    best = Some((consumed, replacement, ends_with_semicolon));
                }
                let advanced = NamedWalkState {
                    node: next,
                    consumed,
                    best,
                };
                if t.is_end_node(next) {
                    NamedStep::Done(Self::finish(advanced))
                } else {
                    NamedStep::Continue(advanced)
                }
            }
        }
    }

    fn finish(state: NamedWalkState) -> NamedMatch {
        match state.best {
            None => NamedMatch::none(state.consumed),
            Some((match_length, replacement, ends_with_semicolon)) => NamedMatch {
                replacement: Some(replacement),
                consumed: state.consumed,
                match_length,
                ends_with_semicolon,
                missing_semicolon_warning: !ends_with_semicolon,
            },
        }
    }

    /// Applies the attribute-value-context ambiguous-ampersand rule: an
    /// unterminated legacy match followed directly by `=` or an alphanumeric
    /// must not be resolved, so the raw `&name` text is kept as-is.
    pub fn suppressed_in_attribute_value(m: &NamedMatch, next: Option<char>) -> bool {
        if m.replacement.is_none() || m.ends_with_semicolon {
            return false;
        }
        match next {
            Some('=') => true,
            Some(c) => c.is_ascii_alphanumeric(),
            None => false,
        }
    }
}
