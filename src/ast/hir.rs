/*!
Translation from `regex-syntax`'s high-level intermediate representation.

This lets callers parse patterns with the full `regex-syntax` parser (and its
Unicode class support) while still compiling them with this crate. Only the
subset of the HIR that has a counterpart in [`Node`] is accepted: line
anchors, word boundaries and non-ASCII bytes are rejected with
[`BuildError`].
*/

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};

use regex_syntax::hir::{self, Hir, HirKind};

use crate::{
    ast::{Capture, Group, Node},
    error::BuildError,
    util::range_set::CharRangeSet,
};

impl Node {
    /// Translate a `regex-syntax` HIR into a node.
    ///
    /// `\A` translates to `Empty`, since matching always starts at the
    /// first character fed to a matcher, and `\z` translates to
    /// `EndOfInput`.
    ///
    /// # Example
    ///
    /// ```
    /// use regex_dispatch::ast::Node;
    ///
    /// let hir = regex_syntax::Parser::new().parse(r"(?:ab)+\z")?;
    /// let node = Node::from_hir(&hir)?;
    /// assert_eq!("(?:ab)+$", node.to_string());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_hir(expr: &Hir) -> Result<Node, BuildError> {
        match *expr.kind() {
            HirKind::Empty => Ok(Node::Empty),
            HirKind::Literal(hir::Literal::Unicode(ch)) => {
                Ok(Node::Text(String::from(ch)))
            }
            HirKind::Literal(hir::Literal::Byte(b)) => {
                if b > 0x7F {
                    return Err(BuildError::unsupported_byte());
                }
                Ok(Node::Text(String::from(b as char)))
            }
            HirKind::Class(hir::Class::Unicode(ref cls)) => {
                let mut set = CharRangeSet::new();
                for r in cls.iter() {
                    set.unite(&CharRangeSet::char_range(r.start(), r.end()));
                }
                Ok(Node::CharSet(set))
            }
            HirKind::Class(hir::Class::Bytes(ref cls)) => {
                let mut set = CharRangeSet::new();
                for r in cls.iter() {
                    if r.end() > 0x7F {
                        return Err(BuildError::unsupported_byte());
                    }
                    set.unite(&CharRangeSet::char_range(
                        r.start() as char,
                        r.end() as char,
                    ));
                }
                Ok(Node::CharSet(set))
            }
            HirKind::Anchor(hir::Anchor::StartText) => Ok(Node::Empty),
            HirKind::Anchor(hir::Anchor::EndText) => Ok(Node::EndOfInput),
            HirKind::Anchor(_) => Err(BuildError::unsupported_line_anchor()),
            HirKind::WordBoundary(_) => {
                Err(BuildError::unsupported_word_boundary())
            }
            HirKind::Repetition(ref rep) => {
                let (min, max) = match rep.kind {
                    hir::RepetitionKind::ZeroOrOne => (0, Some(1)),
                    hir::RepetitionKind::ZeroOrMore => (0, None),
                    hir::RepetitionKind::OneOrMore => (1, None),
                    hir::RepetitionKind::Range(ref rng) => match *rng {
                        hir::RepetitionRange::Exactly(n) => (n, Some(n)),
                        hir::RepetitionRange::AtLeast(n) => (n, None),
                        hir::RepetitionRange::Bounded(m, n) => (m, Some(n)),
                    },
                };
                let node = Node::from_hir(&rep.hir)?;
                Ok(Node::repeat(node, min, max, !rep.greedy))
            }
            HirKind::Group(ref group) => {
                let node = Node::from_hir(&group.hir)?;
                let group = match group.kind {
                    hir::GroupKind::NonCapturing => return Ok(node),
                    hir::GroupKind::CaptureIndex(index) => Group::Index(index),
                    hir::GroupKind::CaptureName { ref name, .. } => {
                        Group::Name(Arc::from(name.as_str()))
                    }
                };
                let node = Box::new(node);
                Ok(Node::CapturingGroup(Capture { group, node }))
            }
            HirKind::Concat(ref exprs) => {
                let nodes = exprs
                    .iter()
                    .map(Node::from_hir)
                    .collect::<Result<Vec<Node>, BuildError>>()?;
                Ok(Node::concat(nodes))
            }
            HirKind::Alternation(ref exprs) => {
                let nodes = exprs
                    .iter()
                    .map(Node::from_hir)
                    .collect::<Result<Vec<Node>, BuildError>>()?;
                Ok(Node::alternation(nodes))
            }
        }
    }
}
