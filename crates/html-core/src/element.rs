//! Element descriptor table: dense integer codes for recognized HTML elements.
//!
//! `TagCode` is hand-written rather than generated, since there's no codegen
//! step for it. The element list covers every element the balancer's rules
//! need plus the common void / raw-text / table / foreign-content set; it is
//! a representative subset of the full ~130-entry HTML element registry, not
//! an exhaustive one (see DESIGN.md).

use bitflags::bitflags;

bitflags! {
    /// Per-element behavioral flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ElementFlags: u16 {
        const INLINE = 1 << 0;
        const BLOCK = 1 << 1;
        const EMPTY = 1 << 2;
        const CONTAINER = 1 << 3;
        /// Raw-text content: parsed ignoring markup.
        const SPECIAL = 1 << 4;
        const SCRIPT_SUPPORTING = 1 << 5;
    }
}

/// Dense integer identity for a recognized HTML element. Codes are contiguous
/// starting at 0, with `Unknown` as the sentinel.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(non_camel_case_types)]
pub enum TagCode {
    Unknown = 0,
    Html,
    Head,
    Body,
    Title,
    Base,
    Link,
    Meta,
    Style,
    Script,
    Noscript,
    Noframes,
    Noembed,
    Template,
    P,
    Div,
    Span,
    A,
    B,
    I,
    U,
    Em,
    Strong,
    Br,
    Hr,
    Img,
    Input,
    Button,
    Label,
    Ul,
    Ol,
    Li,
    Dl,
    Dt,
    Dd,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Table,
    Caption,
    Colgroup,
    Col,
    Thead,
    Tbody,
    Tfoot,
    Tr,
    Td,
    Th,
    Select,
    Option,
    Optgroup,
    Form,
    Textarea,
    Iframe,
    Frameset,
    Frame,
    Svg,
    MathMl,
    Xmp,
    Plaintext,
}

/// Number of recognized codes, including `Unknown`.
pub const TAG_COUNT: usize = TagCode::Plaintext as usize + 1;

impl TagCode {
    pub fn as_usize(self) -> usize {
        self as usize
    }
}

/// Static descriptor for one element.
pub struct ElementInfo {
    pub code: TagCode,
    pub name: &'static str,
    pub flags: ElementFlags,
    /// Ordered list of preferred parent codes; the first is synthesized when none is
    /// open on the stack.
    pub parents: &'static [TagCode],
    /// A code past which parent search must not climb when synthesizing a parent or
    /// computing implicit closure depth.
    pub bounds: Option<TagCode>,
    /// Codes this element implicitly closes when opened.
    pub closes: &'static [TagCode],
}

macro_rules! elem {
    ($code:ident, $name:literal, $flags:expr, $parents:expr, $bounds:expr, $closes:expr) => {
        ElementInfo {
            code: TagCode::$code,
            name: $name,
            flags: $flags,
            parents: $parents,
            bounds: $bounds,
            closes: $closes,
        }
    };
}

use ElementFlags as F;
use TagCode::*;

/// The element registry, indexed by `TagCode as usize`. Built once as a `const`
/// array rather than constructed at runtime.
pub static ELEMENTS: [ElementInfo; TAG_COUNT] = [
    elem!(Unknown, "", F::INLINE, &[], None, &[]),
    elem!(Html, "html", F::CONTAINER, &[], None, &[]),
    elem!(Head, "head", F::CONTAINER, &[Html], Some(Html), &[]),
    elem!(
        Body,
        "body",
        F::CONTAINER,
        &[Html],
        Some(Html),
        &[Head]
    ),
    elem!(Title, "title", F::SPECIAL, &[Head], Some(Head), &[]),
    elem!(Base, "base", F::EMPTY, &[Head], Some(Head), &[]),
    elem!(Link, "link", F::EMPTY, &[Head], Some(Head), &[]),
    elem!(Meta, "meta", F::EMPTY, &[Head], Some(Head), &[]),
    elem!(
        Style,
        "style",
        F::SPECIAL,
        &[Head],
        Some(Head),
        &[]
    ),
    elem!(
        Script,
        "script",
        F::SPECIAL.union(F::SCRIPT_SUPPORTING),
        &[Head, Body],
        None,
        &[]
    ),
    elem!(
        Noscript,
        "noscript",
        F::CONTAINER,
        &[Head, Body],
        None,
        &[]
    ),
    elem!(Noframes, "noframes", F::SPECIAL, &[Frameset], None, &[]),
    elem!(Noembed, "noembed", F::SPECIAL, &[Body], None, &[]),
    elem!(
        Template,
        "template",
        F::CONTAINER.union(F::SCRIPT_SUPPORTING),
        &[Head, Body],
        None,
        &[]
    ),
    elem!(
        P,
        "p",
        F::BLOCK.union(F::CONTAINER),
        &[Body],
        Some(Body),
        &[P]
    ),
    elem!(Div, "div", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(Span, "span", F::INLINE, &[Body], Some(Body), &[]),
    elem!(A, "a", F::INLINE, &[Body], Some(Body), &[A]),
    elem!(B, "b", F::INLINE, &[Body], Some(Body), &[]),
    elem!(I, "i", F::INLINE, &[Body], Some(Body), &[]),
    elem!(U, "u", F::INLINE, &[Body], Some(Body), &[]),
    elem!(Em, "em", F::INLINE, &[Body], Some(Body), &[]),
    elem!(Strong, "strong", F::INLINE, &[Body], Some(Body), &[]),
    elem!(Br, "br", F::EMPTY.union(F::INLINE), &[Body], Some(Body), &[]),
    elem!(Hr, "hr", F::EMPTY.union(F::BLOCK), &[Body], Some(Body), &[P]),
    elem!(Img, "img", F::EMPTY.union(F::INLINE), &[Body], Some(Body), &[]),
    elem!(Input, "input", F::EMPTY.union(F::INLINE), &[Body], Some(Body), &[]),
    elem!(Button, "button", F::INLINE.union(F::CONTAINER), &[Body], Some(Body), &[]),
    elem!(Label, "label", F::INLINE, &[Body], Some(Body), &[]),
    elem!(Ul, "ul", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(Ol, "ol", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(Li, "li", F::BLOCK.union(F::CONTAINER), &[Ul, Ol], Some(Body), &[Li]),
    elem!(Dl, "dl", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(Dt, "dt", F::BLOCK.union(F::CONTAINER), &[Dl], Some(Body), &[Dt, Dd]),
    elem!(Dd, "dd", F::BLOCK.union(F::CONTAINER), &[Dl], Some(Body), &[Dt, Dd]),
    elem!(H1, "h1", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(H2, "h2", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(H3, "h3", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(H4, "h4", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(H5, "h5", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(H6, "h6", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(Table, "table", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[P]),
    elem!(Caption, "caption", F::CONTAINER, &[Table], Some(Table), &[]),
    elem!(Colgroup, "colgroup", F::CONTAINER, &[Table], Some(Table), &[]),
    elem!(Col, "col", F::EMPTY, &[Colgroup], Some(Table), &[]),
    elem!(
        Thead,
        "thead",
        F::CONTAINER,
        &[Table],
        Some(Table),
        &[Caption, Colgroup, Thead, Tbody, Tfoot]
    ),
    elem!(
        Tbody,
        "tbody",
        F::CONTAINER,
        &[Table],
        Some(Table),
        &[Caption, Colgroup, Thead, Tbody, Tfoot]
    ),
    elem!(
        Tfoot,
        "tfoot",
        F::CONTAINER,
        &[Table],
        Some(Table),
        &[Caption, Colgroup, Thead, Tbody, Tfoot]
    ),
    elem!(
        Tr,
        "tr",
        F::CONTAINER,
        &[Tbody, Table],
        Some(Table),
        &[Tr]
    ),
    elem!(Td, "td", F::CONTAINER, &[Tr], Some(Table), &[Td, Th]),
    elem!(Th, "th", F::CONTAINER, &[Tr], Some(Table), &[Td, Th]),
    elem!(Select, "select", F::CONTAINER, &[Body], Some(Body), &[]),
    elem!(Option, "option", F::CONTAINER, &[Select, Optgroup], Some(Select), &[Option]),
    elem!(
        Optgroup,
        "optgroup",
        F::CONTAINER,
        &[Select],
        Some(Select),
        &[Option, Optgroup]
    ),
    elem!(Form, "form", F::BLOCK.union(F::CONTAINER), &[Body], Some(Body), &[]),
    elem!(Textarea, "textarea", F::SPECIAL, &[Body], Some(Body), &[]),
    elem!(Iframe, "iframe", F::SPECIAL, &[Body], Some(Body), &[]),
    elem!(Frameset, "frameset", F::CONTAINER, &[Html], Some(Html), &[]),
    elem!(Frame, "frame", F::EMPTY, &[Frameset], Some(Html), &[]),
    elem!(Svg, "svg", F::CONTAINER, &[Body], Some(Body), &[]),
    elem!(MathMl, "math", F::CONTAINER, &[Body], Some(Body), &[]),
    elem!(Xmp, "xmp", F::SPECIAL.union(F::BLOCK), &[Body], Some(Body), &[P]),
    elem!(Plaintext, "plaintext", F::SPECIAL.union(F::BLOCK), &[Body], Some(Body), &[P]),
];

/// Looks up the descriptor for `code`. Infallible: every `TagCode` variant has a
/// corresponding row in [`ELEMENTS`].
pub fn info(code: TagCode) -> &'static ElementInfo {
    &ELEMENTS[code.as_usize()]
}

/// Resolves a (lowercased) tag name to its `TagCode`, or `Unknown` if unrecognized.
/// Unrecognized elements still flow through the balancer as generic inline content.
pub fn code_for_name(lowercase_name: &str) -> TagCode {
    ELEMENTS
        .iter()
        .find(|e| e.name == lowercase_name)
        .map(|e| e.code)
        .unwrap_or(Unknown)
}

/// The elements whose content model is raw text, dispatched to a non-content
/// scanner personality after their start tag.
pub fn is_special(code: TagCode) -> bool {
    info(code).flags.contains(F::SPECIAL)
}

pub fn is_empty(code: TagCode) -> bool {
    info(code).flags.contains(F::EMPTY)
}

pub fn is_inline(code: TagCode) -> bool {
    info(code).flags.contains(F::INLINE)
}

pub fn is_block(code: TagCode) -> bool {
    info(code).flags.contains(F::BLOCK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_a_row() {
        for code in 0..TAG_COUNT {
            let info = &ELEMENTS[code];
            assert_eq!(info.code.as_usize(), code);
        }
    }

    #[test]
    fn parents_and_closes_reference_real_codes() {
        for info in ELEMENTS.iter() {
            for &p in info.parents {
                assert!((p as usize) < TAG_COUNT);
            }
            for &c in info.closes {
                assert!((c as usize) < TAG_COUNT);
            }
        }
    }

    #[test]
    fn code_for_name_resolves_known_elements() {
        assert_eq!(code_for_name("script"), TagCode::Script);
        assert_eq!(code_for_name("p"), TagCode::P);
        assert_eq!(code_for_name("not-a-real-tag"), TagCode::Unknown);
    }

    #[test]
    fn script_and_style_and_textarea_are_special() {
        assert!(is_special(TagCode::Script));
        assert!(is_special(TagCode::Style));
        assert!(is_special(TagCode::Textarea));
        assert!(!is_special(TagCode::Div));
    }

    #[test]
    fn br_and_img_are_empty() {
        assert!(is_empty(TagCode::Br));
        assert!(is_empty(TagCode::Img));
        assert!(!is_empty(TagCode::Div));
    }
}
