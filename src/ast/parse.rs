/*!
A recursive descent parser for pattern syntax.

The grammar, from lowest to highest precedence:

```text
union      := concat ('|' concat)*
concat     := repeat*
repeat     := term (quantifier '?'?)*
quantifier := '*' | '+' | '?' | '{' m '}' | '{' m ',}' | '{' m ',' n '}'
term       := literal | '.' | '^' | '$' | escape | class | group
group      := '(' union ')' | '(?:' union ')' | '(?<' name '>' union ')'
            | '(?P<' name '>' union ')'
class      := '[' '^'? (range | escape | class)+ ']'
```

Adjacent literals are merged into a single `Text` node. A quantifier binds
to the term immediately before it, so `ab+` is `a` followed by `b+`.
*/

use core::fmt;

use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};

use crate::{
    ast::{Capture, Group, Node},
    util::{range_set::CharRangeSet, END},
};

/// Parse the given pattern with the default parser configuration.
pub fn parse(pattern: &str) -> Result<Node, Error> {
    Parser::new().parse(pattern)
}

/// An error that occurred while parsing a pattern.
///
/// The human readable message is available via the `Display` impl. The
/// position is a byte offset into the pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    position: usize,
}

/// The kind of parse error that occurred.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A `(` was never closed. The position points at the `(`.
    GroupUnclosed,
    /// A `)` had no matching `(`.
    GroupUnopened,
    /// A named group had an empty name.
    GroupNameEmpty,
    /// A group name contained a character other than ASCII letters, digits
    /// or `_`, or it was not terminated by `>`.
    GroupNameInvalid,
    /// The same group name was used twice within one pattern.
    GroupNameDuplicate(String),
    /// A group started with `(?` followed by something other than `:`, `<`
    /// or `P<`. Inline flags are not supported.
    GroupFlagUnsupported,
    /// A `[` was never closed. The position points at the `[`.
    ClassUnclosed,
    /// A class range had its bounds out of order, or used a class escape
    /// such as `\d` as a bound.
    ClassRangeInvalid,
    /// A `\` appeared at the end of the pattern.
    EscapeUnexpectedEof,
    /// An escape sequence is not recognized.
    EscapeUnrecognized(char),
    /// A `\x` or `\u` escape was malformed or named an invalid code point.
    EscapeHexInvalid,
    /// A quantifier appeared with nothing to repeat.
    RepetitionMissing,
    /// A counted repetition `{m,n}` has `n < m`.
    RepetitionCountInvalid {
        /// The minimum count.
        min: u32,
        /// The maximum count.
        max: u32,
    },
    /// A counted repetition was malformed, e.g., missing digits or a `}`.
    RepetitionCountMalformed,
    /// Groups or classes were nested more deeply than the configured limit.
    NestLimitExceeded(u32),
}

impl Error {
    fn new(kind: ErrorKind, position: usize) -> Error {
        Error { kind, position }
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Return the byte offset in the pattern at which this error occurred.
    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::GroupUnclosed => write!(f, "unclosed group")?,
            ErrorKind::GroupUnopened => write!(f, "unopened group")?,
            ErrorKind::GroupNameEmpty => write!(f, "empty group name")?,
            ErrorKind::GroupNameInvalid => write!(f, "invalid group name")?,
            ErrorKind::GroupNameDuplicate(ref name) => {
                write!(f, "duplicate group name '{}'", name)?
            }
            ErrorKind::GroupFlagUnsupported => {
                write!(f, "unsupported group syntax after '(?'")?
            }
            ErrorKind::ClassUnclosed => write!(f, "unclosed character class")?,
            ErrorKind::ClassRangeInvalid => {
                write!(f, "invalid character class range")?
            }
            ErrorKind::EscapeUnexpectedEof => {
                write!(f, "incomplete escape sequence at end of pattern")?
            }
            ErrorKind::EscapeUnrecognized(ch) => {
                write!(f, "unrecognized escape sequence '\\{}'", ch)?
            }
            ErrorKind::EscapeHexInvalid => {
                write!(f, "invalid hexadecimal escape sequence")?
            }
            ErrorKind::RepetitionMissing => {
                write!(f, "repetition operator missing expression")?
            }
            ErrorKind::RepetitionCountInvalid { min, max } => write!(
                f,
                "invalid repetition count {{{},{}}}: maximum is less than \
                 minimum",
                min, max,
            )?,
            ErrorKind::RepetitionCountMalformed => {
                write!(f, "malformed repetition count")?
            }
            ErrorKind::NestLimitExceeded(limit) => {
                write!(f, "exceeded nesting limit of {}", limit)?
            }
        }
        write!(f, " at position {}", self.position)
    }
}

/// A configurable pattern parser.
#[derive(Clone, Debug)]
pub struct Parser {
    nest_limit: u32,
}

impl Parser {
    /// Create a new parser with the default configuration.
    pub fn new() -> Parser {
        Parser { nest_limit: 250 }
    }

    /// Set the maximum nesting depth of groups and classes.
    ///
    /// The parser is recursive, so this bounds its stack usage. The default
    /// is `250`.
    pub fn nest_limit(&mut self, limit: u32) -> &mut Parser {
        self.nest_limit = limit;
        self
    }

    /// Parse the given pattern into a node.
    pub fn parse(&self, pattern: &str) -> Result<Node, Error> {
        let mut p = ParserI {
            config: self,
            pattern,
            pos: 0,
            depth: 0,
            next_group: 1,
            names: Vec::new(),
        };
        let node = p.parse_union()?;
        // The union only stops early at a ')' with no matching '('.
        match p.peek() {
            None => Ok(node),
            Some(_) => Err(p.error(ErrorKind::GroupUnopened)),
        }
    }
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

/// The result of parsing an escape sequence.
enum Escape {
    Char(char),
    Class(CharRangeSet),
}

struct ParserI<'a> {
    config: &'a Parser,
    pattern: &'a str,
    pos: usize,
    depth: u32,
    next_group: u32,
    names: Vec<Arc<str>>,
}

impl<'a> ParserI<'a> {
    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.pos)
    }

    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut it = self.pattern[self.pos..].chars();
        it.next();
        it.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn enter(&mut self, start: usize) -> Result<(), Error> {
        if self.depth >= self.config.nest_limit {
            return Err(Error::new(
                ErrorKind::NestLimitExceeded(self.config.nest_limit),
                start,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_union(&mut self) -> Result<Node, Error> {
        let mut node = self.parse_concat()?;
        while self.bump_if('|') {
            let next = self.parse_concat()?;
            node = Node::one_of(node, next);
        }
        Ok(node)
    }

    fn parse_concat(&mut self) -> Result<Node, Error> {
        let mut nodes: Vec<Node> = Vec::new();
        loop {
            match self.peek() {
                None | Some('|') | Some(')') => break,
                Some(_) => {}
            }
            let node = self.parse_repeat()?;
            if node == Node::Empty {
                continue;
            }
            if let Node::Text(ref next) = node {
                if let Some(Node::Text(prev)) = nodes.last_mut() {
                    prev.push_str(next);
                    continue;
                }
            }
            nodes.push(node);
        }
        Ok(Node::concat(nodes))
    }

    fn parse_repeat(&mut self) -> Result<Node, Error> {
        let mut node = self.parse_term()?;
        loop {
            let start = self.pos;
            let (min, max) = match self.peek() {
                Some('*') => {
                    self.bump();
                    (0, None)
                }
                Some('+') => {
                    self.bump();
                    (1, None)
                }
                Some('?') => {
                    self.bump();
                    (0, Some(1))
                }
                Some('{') => self.parse_counted(start)?,
                _ => break,
            };
            let reluctant = self.bump_if('?');
            node = Node::repeat(node, min, max, reluctant);
        }
        Ok(node)
    }

    /// Parse `{m}`, `{m,}` or `{m,n}`. The parser is positioned at the `{`.
    fn parse_counted(
        &mut self,
        start: usize,
    ) -> Result<(u32, Option<u32>), Error> {
        self.bump();
        let min = self.parse_decimal(start)?;
        let max = if self.bump_if(',') {
            if self.peek() == Some('}') {
                None
            } else {
                Some(self.parse_decimal(start)?)
            }
        } else {
            Some(min)
        };
        if !self.bump_if('}') {
            return Err(Error::new(ErrorKind::RepetitionCountMalformed, start));
        }
        if let Some(max) = max {
            if max < min {
                return Err(Error::new(
                    ErrorKind::RepetitionCountInvalid { min, max },
                    start,
                ));
            }
        }
        Ok((min, max))
    }

    fn parse_decimal(&mut self, start: usize) -> Result<u32, Error> {
        let digits_start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
        }
        self.pattern[digits_start..self.pos]
            .parse::<u32>()
            .map_err(|_| {
                Error::new(ErrorKind::RepetitionCountMalformed, start)
            })
    }

    fn parse_term(&mut self) -> Result<Node, Error> {
        let start = self.pos;
        let ch = match self.bump() {
            Some(ch) => ch,
            None => return Ok(Node::Empty),
        };
        match ch {
            '(' => self.parse_group(start),
            '[' => Ok(Node::CharSet(self.parse_class(start)?)),
            '.' => Ok(Node::any_char()),
            '$' => Ok(Node::EndOfInput),
            // Matching always starts at the first character fed to a
            // matcher, so a leading anchor has nothing left to assert.
            '^' => Ok(Node::Empty),
            '\\' => match self.parse_escape(start)? {
                Escape::Char(ch) => Ok(Node::Text(ch.into())),
                Escape::Class(set) => Ok(Node::CharSet(set)),
            },
            '*' | '+' | '?' | '{' => {
                Err(Error::new(ErrorKind::RepetitionMissing, start))
            }
            ch => Ok(Node::Text(ch.into())),
        }
    }

    /// Parse a group. The opening `(` has already been consumed.
    fn parse_group(&mut self, start: usize) -> Result<Node, Error> {
        self.enter(start)?;
        let group = if self.bump_if('?') {
            if self.bump_if(':') {
                None
            } else if self.bump_if('<') {
                Some(self.parse_group_name()?)
            } else if self.peek() == Some('P')
                && self.peek_second() == Some('<')
            {
                self.bump();
                self.bump();
                Some(self.parse_group_name()?)
            } else {
                return Err(self.error(ErrorKind::GroupFlagUnsupported));
            }
        } else {
            let index = self.next_group;
            self.next_group += 1;
            Some(Group::Index(index))
        };
        let inner = self.parse_union()?;
        if !self.bump_if(')') {
            return Err(Error::new(ErrorKind::GroupUnclosed, start));
        }
        self.leave();
        Ok(match group {
            None => inner,
            Some(group) => {
                Node::CapturingGroup(Capture { group, node: Box::new(inner) })
            }
        })
    }

    /// Parse a group name up to and including the closing `>`. Named groups
    /// also consume a group index so that unnamed groups are numbered by
    /// the position of their opening parenthesis.
    fn parse_group_name(&mut self) -> Result<Group, Error> {
        let start = self.pos;
        while self
            .peek()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        let name = &self.pattern[start..self.pos];
        if !self.bump_if('>') {
            return Err(self.error(ErrorKind::GroupNameInvalid));
        }
        if name.is_empty() {
            return Err(Error::new(ErrorKind::GroupNameEmpty, start));
        }
        if self.names.iter().any(|n| &**n == name) {
            return Err(Error::new(
                ErrorKind::GroupNameDuplicate(name.into()),
                start,
            ));
        }
        let name: Arc<str> = Arc::from(name);
        self.names.push(name.clone());
        self.next_group += 1;
        Ok(Group::Name(name))
    }

    /// Parse a class. The opening `[` has already been consumed.
    fn parse_class(&mut self, start: usize) -> Result<CharRangeSet, Error> {
        self.enter(start)?;
        let negated = self.bump_if('^');
        let mut set = CharRangeSet::new();
        let mut first = true;
        loop {
            let item_start = self.pos;
            let ch = match self.bump() {
                None => {
                    return Err(Error::new(ErrorKind::ClassUnclosed, start))
                }
                Some(ch) => ch,
            };
            let lo = match ch {
                ']' if !first => break,
                '[' => {
                    let nested = self.parse_class(item_start)?;
                    set.unite(&nested);
                    first = false;
                    continue;
                }
                '\\' => match self.parse_escape(item_start)? {
                    Escape::Char(ch) => ch,
                    Escape::Class(class) => {
                        set.unite(&class);
                        first = false;
                        continue;
                    }
                },
                ch => ch,
            };
            first = false;
            // A '-' right before the closing ']' is a literal.
            let range = self.peek() == Some('-')
                && self.peek_second().map_or(false, |c| c != ']');
            if range {
                self.bump();
                let hi_start = self.pos;
                let hi = match self.bump() {
                    Some('\\') => match self.parse_escape(hi_start)? {
                        Escape::Char(ch) => ch,
                        Escape::Class(_) => {
                            return Err(Error::new(
                                ErrorKind::ClassRangeInvalid,
                                item_start,
                            ))
                        }
                    },
                    Some(ch) => ch,
                    None => {
                        return Err(Error::new(ErrorKind::ClassUnclosed, start))
                    }
                };
                if hi < lo {
                    return Err(Error::new(
                        ErrorKind::ClassRangeInvalid,
                        item_start,
                    ));
                }
                set.unite(&CharRangeSet::char_range(lo, hi));
            } else {
                set.unite(&CharRangeSet::single(lo));
            }
        }
        if negated {
            set.invert(0, END);
        }
        set.canonicalize_surrogates();
        self.leave();
        Ok(set)
    }

    /// Parse an escape sequence. The `\` has already been consumed and
    /// `start` points at it.
    fn parse_escape(&mut self, start: usize) -> Result<Escape, Error> {
        let ch = match self.bump() {
            None => {
                return Err(Error::new(ErrorKind::EscapeUnexpectedEof, start))
            }
            Some(ch) => ch,
        };
        let class = |ranges: &[(char, char)], negated: bool| {
            let mut set = CharRangeSet::new();
            for &(lo, hi) in ranges {
                set.unite(&CharRangeSet::char_range(lo, hi));
            }
            if negated {
                set.invert(0, END).canonicalize_surrogates();
            }
            Escape::Class(set)
        };
        const DIGIT: &[(char, char)] = &[('0', '9')];
        const SPACE: &[(char, char)] = &[('\t', '\r'), (' ', ' ')];
        const WORD: &[(char, char)] =
            &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')];
        Ok(match ch {
            'd' => class(DIGIT, false),
            'D' => class(DIGIT, true),
            's' => class(SPACE, false),
            'S' => class(SPACE, true),
            'w' => class(WORD, false),
            'W' => class(WORD, true),
            't' => Escape::Char('\t'),
            'n' => Escape::Char('\n'),
            'r' => Escape::Char('\r'),
            'f' => Escape::Char('\x0C'),
            'v' => Escape::Char('\x0B'),
            '0' => Escape::Char('\0'),
            'x' => Escape::Char(self.parse_hex_fixed(start, 2)?),
            'u' => {
                if self.bump_if('{') {
                    Escape::Char(self.parse_hex_braced(start)?)
                } else {
                    Escape::Char(self.parse_hex_fixed(start, 4)?)
                }
            }
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']'
            | '{' | '}' | '^' | '$' | '-' | '/' | '&' | '~' | '#' | ' ' => {
                Escape::Char(ch)
            }
            ch => {
                let kind = ErrorKind::EscapeUnrecognized(ch);
                return Err(Error::new(kind, start));
            }
        })
    }

    fn parse_hex_fixed(
        &mut self,
        start: usize,
        len: usize,
    ) -> Result<char, Error> {
        let digits_start = self.pos;
        for _ in 0..len {
            match self.bump() {
                Some(c) if c.is_ascii_hexdigit() => {}
                _ => {
                    return Err(Error::new(ErrorKind::EscapeHexInvalid, start))
                }
            }
        }
        self.hex_to_char(start, digits_start, self.pos)
    }

    fn parse_hex_braced(&mut self, start: usize) -> Result<char, Error> {
        let digits_start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_hexdigit()) {
            self.bump();
        }
        let end = self.pos;
        if !self.bump_if('}') || end == digits_start || end - digits_start > 6
        {
            return Err(Error::new(ErrorKind::EscapeHexInvalid, start));
        }
        self.hex_to_char(start, digits_start, end)
    }

    fn hex_to_char(
        &self,
        start: usize,
        digits_start: usize,
        end: usize,
    ) -> Result<char, Error> {
        u32::from_str_radix(&self.pattern[digits_start..end], 16)
            .ok()
            .and_then(core::char::from_u32)
            .ok_or_else(|| Error::new(ErrorKind::EscapeHexInvalid, start))
    }
}
