/*!
An abstract syntax for the patterns compiled by this crate.

A [`Node`] is either produced by the recursive descent parser in
[`parse`](parse::parse), translated from a `regex-syntax` HIR (with the
`syntax` feature enabled), or built programmatically by callers such as a
path router that assembles patterns out of typed segment descriptors.

Nodes are immutable once built. The NFA compiler only ever borrows them.

The [`Display`](core::fmt::Display) impl of a node prints pattern syntax
that parses back into an equivalent node.
*/

use core::fmt::{self, Write};

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};

use crate::util::{
    point_char,
    range_set::{CharRange, CharRangeSet},
    END, EOI,
};

#[cfg(feature = "syntax")]
pub mod hir;
pub mod parse;

pub use self::parse::{parse, Error, ErrorKind, Parser};

/// A node in the abstract syntax of a pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    /// Matches the empty string.
    Empty,
    /// Matches the end of input. This consumes the end-of-input point, which
    /// is only ever fed by [`Matcher::end`](crate::Matcher::end).
    EndOfInput,
    /// Matches a literal string.
    Text(String),
    /// Matches any single point in the set.
    CharSet(CharRangeSet),
    /// Matches each node in sequence.
    Concat(Vec<Node>),
    /// Matches either of the two nodes.
    OneOf(Box<Node>, Box<Node>),
    /// Matches a node repeatedly.
    Repeat(Repetition),
    /// Matches a node and marks the boundaries of the match with a group.
    CapturingGroup(Capture),
}

/// A repetition of a node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repetition {
    /// The node being repeated.
    pub node: Box<Node>,
    /// The minimum number of repetitions.
    pub min: u32,
    /// The maximum number of repetitions, or `None` when unbounded.
    pub max: Option<u32>,
    /// Whether the repetition prefers to stop as early as possible.
    pub reluctant: bool,
}

/// A capturing group wrapped around a node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Capture {
    /// The identity of the group.
    pub group: Group,
    /// The node inside the group.
    pub node: Box<Node>,
}

/// The identity of a capturing group: either its name or its index.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Group {
    /// An unnamed group, identified by the position of its opening
    /// parenthesis among all capturing groups, starting at 1.
    Index(u32),
    /// A named group.
    Name(Arc<str>),
}

impl Node {
    /// A literal string. The empty string is equivalent to `Node::Empty`.
    pub fn text<S: Into<String>>(text: S) -> Node {
        let text = text.into();
        if text.is_empty() {
            Node::Empty
        } else {
            Node::Text(text)
        }
    }

    /// A single point from the given set.
    pub fn char_set(set: CharRangeSet) -> Node {
        Node::CharSet(set)
    }

    /// Any single code point.
    pub fn any_char() -> Node {
        Node::CharSet(CharRangeSet::all_chars())
    }

    /// A concatenation. Zero nodes collapse to `Empty` and a single node is
    /// returned as is.
    pub fn concat(mut nodes: Vec<Node>) -> Node {
        match nodes.len() {
            0 => Node::Empty,
            1 => nodes.pop().unwrap_or(Node::Empty),
            _ => Node::Concat(nodes),
        }
    }

    /// A binary alternation.
    pub fn one_of(first: Node, second: Node) -> Node {
        Node::OneOf(Box::new(first), Box::new(second))
    }

    /// An alternation of any number of nodes, folded into nested binary
    /// alternations from the left. Zero nodes yield a node matching nothing.
    pub fn alternation(nodes: Vec<Node>) -> Node {
        let mut it = nodes.into_iter();
        let first = match it.next() {
            None => return Node::CharSet(CharRangeSet::new()),
            Some(first) => first,
        };
        it.fold(first, Node::one_of)
    }

    /// A repetition of `node` between `min` and `max` times. A `max` of
    /// `None` means the repetition is unbounded.
    pub fn repeat(
        node: Node,
        min: u32,
        max: Option<u32>,
        reluctant: bool,
    ) -> Node {
        Node::Repeat(Repetition { node: Box::new(node), min, max, reluctant })
    }

    /// Zero or more repetitions (`*`).
    pub fn zero_or_more(node: Node) -> Node {
        Node::repeat(node, 0, None, false)
    }

    /// One or more repetitions (`+`).
    pub fn one_or_more(node: Node) -> Node {
        Node::repeat(node, 1, None, false)
    }

    /// Zero or one repetitions (`?`).
    pub fn optional(node: Node) -> Node {
        Node::repeat(node, 0, Some(1), false)
    }

    /// A capturing group identified by index.
    pub fn group_index(index: u32, node: Node) -> Node {
        Node::CapturingGroup(Capture {
            group: Group::Index(index),
            node: Box::new(node),
        })
    }

    /// A capturing group identified by name.
    pub fn group_name(name: &str, node: Node) -> Node {
        Node::CapturingGroup(Capture {
            group: Group::Name(Arc::from(name)),
            node: Box::new(node),
        })
    }

    /// Returns true if this node can only be printed as a single atom that
    /// a quantifier may follow without grouping.
    fn is_atom(&self) -> bool {
        match *self {
            Node::EndOfInput | Node::CapturingGroup(_) => true,
            Node::Text(ref s) => s.chars().count() == 1,
            Node::CharSet(ref set) => !set.contains(EOI),
            Node::Empty
            | Node::Concat(_)
            | Node::OneOf(..)
            | Node::Repeat(_) => false,
        }
    }

    /// Returns true if this node, printed inside a concatenation, needs a
    /// non-capturing group around it.
    fn needs_group_in_concat(&self) -> bool {
        match *self {
            Node::OneOf(..) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Node::Empty => Ok(()),
            Node::EndOfInput => f.write_str("$"),
            Node::Text(ref s) => {
                for ch in s.chars() {
                    write_literal(f, ch)?;
                }
                Ok(())
            }
            Node::CharSet(ref set) => write_set(f, set),
            Node::Concat(ref nodes) => {
                for node in nodes.iter() {
                    if node.needs_group_in_concat() {
                        write!(f, "(?:{})", node)?;
                    } else {
                        write!(f, "{}", node)?;
                    }
                }
                Ok(())
            }
            Node::OneOf(ref first, ref second) => {
                write!(f, "{}|{}", first, second)
            }
            Node::Repeat(ref rep) => {
                if rep.node.is_atom() {
                    write!(f, "{}", rep.node)?;
                } else {
                    write!(f, "(?:{})", rep.node)?;
                }
                match (rep.min, rep.max) {
                    (0, None) => f.write_str("*")?,
                    (1, None) => f.write_str("+")?,
                    (0, Some(1)) => f.write_str("?")?,
                    (min, None) => write!(f, "{{{},}}", min)?,
                    (min, Some(max)) if min == max => {
                        write!(f, "{{{}}}", min)?
                    }
                    (min, Some(max)) => write!(f, "{{{},{}}}", min, max)?,
                }
                if rep.reluctant {
                    f.write_str("?")?;
                }
                Ok(())
            }
            Node::CapturingGroup(ref cap) => match cap.group {
                Group::Index(_) => write!(f, "({})", cap.node),
                Group::Name(ref name) => {
                    write!(f, "(?<{}>{})", name, cap.node)
                }
            },
        }
    }
}

const META: &str = r"\.+*?()|[]{}^$";

fn write_literal(f: &mut fmt::Formatter, ch: char) -> fmt::Result {
    if META.contains(ch) {
        write!(f, "\\{}", ch)
    } else {
        write_char_escaped(f, ch)
    }
}

fn write_char_escaped(f: &mut fmt::Formatter, ch: char) -> fmt::Result {
    match ch {
        '\t' => f.write_str(r"\t"),
        '\n' => f.write_str(r"\n"),
        '\r' => f.write_str(r"\r"),
        ch if ch.is_control() || !ch.is_ascii() => {
            write!(f, "\\u{{{:X}}}", ch as u32)
        }
        ch => f.write_char(ch),
    }
}

fn write_class_point(f: &mut fmt::Formatter, point: i32) -> fmt::Result {
    match point_char(point) {
        Some(ch) if "\\]^-[".contains(ch) => write!(f, "\\{}", ch),
        Some(ch) => write_char_escaped(f, ch),
        // Class boundaries are never surrogates once the set is
        // canonicalized, so this is only a fallback.
        None => write!(f, "\\u{{{:X}}}", point),
    }
}

fn write_set(f: &mut fmt::Formatter, set: &CharRangeSet) -> fmt::Result {
    let mut chars = set.clone();
    chars.clear(EOI, 0).canonicalize_surrogates();
    let eoi = set.contains(EOI);
    if eoi {
        f.write_str("(?:")?;
    }
    if chars == CharRangeSet::all_chars() {
        f.write_str(".")?;
    } else if let Some(ch) = chars.as_single_char() {
        write_literal(f, ch)?;
    } else if chars.is_empty() && eoi {
        // Nothing but end of input, handled below.
    } else {
        f.write_str("[")?;
        let mut ranges: Vec<CharRange> = chars.ranges().to_vec();
        if ranges.is_empty() {
            // An empty class has no syntax of its own, so write the
            // negation of everything instead.
            f.write_str("^")?;
            ranges.push(CharRange::new(0, END));
        }
        for r in ranges.iter() {
            write_class_point(f, r.start())?;
            if r.len() > 1 {
                f.write_str("-")?;
                write_class_point(f, r.end() - 1)?;
            }
        }
        f.write_str("]")?;
    }
    if eoi {
        if chars.is_empty() {
            f.write_str("$)")?;
        } else {
            f.write_str("|$)")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(pattern: &str) -> String {
        let node = parse(pattern).unwrap();
        let printed = node.to_string();
        assert_eq!(node, parse(&printed).unwrap(), "printed: {}", printed);
        printed
    }

    #[test]
    fn display_reparses() {
        assert_eq!("abc", roundtrip("abc"));
        assert_eq!("a+|b*?", roundtrip("a+|b*?"));
        assert_eq!("(?:ab){2,5}", roundtrip("(?:ab){2,5}"));
        assert_eq!("(?<id>[0-9]+)/(x)", roundtrip("(?<id>[0-9]+)/(x)"));
        assert_eq!(r"\.\*[\-a-z]", roundtrip(r"\.\*[-a-z]"));
        assert_eq!("x(a|b)$", roundtrip("x(a|b)$"));
        assert_eq!(".{3,}", roundtrip(".{3,}"));
    }

    #[test]
    fn display_around_surrogates() {
        assert_eq!(
            r"[\u{0}-\u{D7FF}\u{E001}-\u{10FFFF}]",
            roundtrip(r"[^\u{E000}]")
        );
        roundtrip(r"[^\u{D7FF}]");
        roundtrip(r"[^\u{D7FF}\u{E000}]");
        roundtrip(r"\D[^a]");

        // Sets built by hand may split the surrogate block anywhere.
        let mut set = CharRangeSet::from_range(0xD000, 0xD900);
        let printed = Node::char_set(set.clone()).to_string();
        assert_eq!(r"[\u{D000}-\u{D7FF}]", printed);
        assert!(parse(&printed).is_ok());
        set.set(0xDF00, 0xE010);
        let printed = Node::char_set(set).to_string();
        assert_eq!(r"[\u{D000}-\u{E00F}]", printed);
        assert!(parse(&printed).is_ok());
    }

    #[test]
    fn display_programmatic_nodes() {
        let node = Node::concat(vec![
            Node::text("a.b"),
            Node::alternation(vec![Node::text("x"), Node::text("yz")]),
            Node::repeat(Node::text("cd"), 1, Some(1), true),
        ]);
        assert_eq!(r"a\.b(?:x|yz)(?:cd){1}?", node.to_string());

        let mut set = CharRangeSet::single('/');
        set.set(EOI, EOI + 1);
        assert_eq!("(?:/|$)", Node::char_set(set).to_string());
        assert_eq!(
            "[^\\u{0}-\\u{10FFFF}]",
            Node::alternation(vec![]).to_string()
        );
    }

    #[test]
    fn constructors() {
        assert_eq!(Node::Empty, Node::text(""));
        assert_eq!(Node::Empty, Node::concat(vec![]));
        assert_eq!(Node::text("a"), Node::concat(vec![Node::text("a")]));
        let abc = vec![Node::text("a"), Node::text("b"), Node::text("c")];
        match Node::alternation(abc) {
            Node::OneOf(first, _) => match *first {
                Node::OneOf(..) => {}
                ref node => panic!("expected left fold, got {:?}", node),
            },
            node => panic!("expected alternation, got {:?}", node),
        }
    }
}
