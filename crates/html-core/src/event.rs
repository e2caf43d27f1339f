//! Document events emitted by the [`crate::balancer`] to the external handler.

use crate::element::TagCode;
use crate::token::Attribute;

/// Begin/end line, column, and character-offset metadata attached to an event when
/// `augmentations` is enabled. Synthesized events get a best-effort augmentation
/// computed from the position where recovery occurs, not backfilled from the
/// original (absent) token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Augmentations {
    pub begin_line: usize,
    pub begin_column: usize,
    pub begin_offset: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub end_offset: usize,
}

/// A well-formed event emitted by the balancer. Every event the host sees has
/// already passed through implicit-parent synthesis, implicit closing, and
/// misnested-inline recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    StartDocument,
    XmlDecl {
        version: String,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    DoctypeDecl {
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    Comment {
        text: String,
        augmentations: Option<Augmentations>,
    },
    ProcessingInstruction {
        target: String,
        data: String,
        augmentations: Option<Augmentations>,
    },
    StartElement {
        code: TagCode,
        name: String,
        attributes: Vec<Attribute>,
        /// True when this event was synthesized by the balancer rather than
        /// corresponding directly to an input token.
        synthesized: bool,
        augmentations: Option<Augmentations>,
    },
    EmptyElement {
        code: TagCode,
        name: String,
        attributes: Vec<Attribute>,
        augmentations: Option<Augmentations>,
    },
    EndElement {
        code: TagCode,
        name: String,
        synthesized: bool,
        augmentations: Option<Augmentations>,
    },
    Characters {
        text: String,
        augmentations: Option<Augmentations>,
    },
    StartCdata,
    EndCdata,
    EndDocument,
}

impl DocumentEvent {
    /// True for synthesized events: implicit tags and lost-text replay, inserted
    /// by the balancer rather than mirroring input.
    pub fn is_synthesized(&self) -> bool {
        matches!(
            self,
            DocumentEvent::StartElement { synthesized: true, .. }
                | DocumentEvent::EndElement { synthesized: true, .. }
        )
    }
}
