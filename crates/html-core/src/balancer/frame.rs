//! A single entry on the balancer's stack of open elements.

use crate::element::TagCode;
use crate::token::Attribute;

/// One open element: descriptor + qualified name + attribute *copies*, needed
/// for re-emitting a start tag when an inline element is reopened after
/// misnesting recovery.
#[derive(Debug, Clone)]
pub struct Frame {
    pub code: TagCode,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Frame {
    pub fn new(code: TagCode, name: String, attributes: Vec<Attribute>) -> Self {
        Self {
            code,
            name,
            attributes,
        }
    }
}
