//! Scanner output: the low-level token stream handed to the [`crate::balancer`].

use crate::element::TagCode;

/// A single parsed attribute. `value` is `None` for a boolean/empty-value attribute
/// (e.g. `<input disabled>`).
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
    /// The pre-entity-resolution raw value, kept alongside the resolved one when
    /// `scanner.plain_attr_values` is enabled.
    pub raw_value: Option<String>,
}

impl Attribute {
    pub fn new(name: String, value: Option<String>) -> Self {
        Self {
            name,
            value,
            raw_value: None,
        }
    }
}

/// Comment sub-kind, distinguished because `MARKUP_BRACKET` recognizes several
/// comment-opening spellings and CDATA-as-comment emits with different wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentType {
    /// An ordinary `<!-- ... -->` comment.
    Normal,
    /// `<!...>` bogus comment (any `!` opening that isn't a recognized form).
    Bogus,
    /// `<?...>` processing-instruction-shaped bogus comment.
    ProcessingInstructionLike,
    /// A CDATA section re-emitted as a comment because the parser is not in
    /// XML mode.
    CdataAsComment,
}

/// One token emitted by a [`crate::scanner`] personality.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartTag {
        code: TagCode,
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        code: TagCode,
        name: String,
    },
    Characters(String),
    Comment {
        text: String,
        kind: CommentType,
    },
    Doctype {
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        force_quirks: bool,
    },
    ProcessingInstruction {
        target: String,
        data: String,
    },
    Cdata(String),
    Eof,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }
}
