use crate::{ast, dfa, nfa};

/// An error that occurred while building a [`Pattern`](crate::Pattern).
///
/// This wraps the errors of every stage of the pipeline, from parsing to
/// subset construction, and adds the failures that only make sense for a
/// complete pattern: rejected ambiguity and unsupported `regex-syntax`
/// features.
///
/// When the `std` feature is enabled, this implements the `std::error::Error`
/// trait, and the error of the failing stage is available via `source`.
#[derive(Clone, Debug)]
pub struct BuildError {
    kind: BuildErrorKind,
}

/// The kind of error that occurred while building a pattern.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum BuildErrorKind {
    /// A pattern could not be parsed.
    Syntax(ast::Error),
    /// The NFA could not be built.
    NFA(nfa::Error),
    /// The DFA could not be built.
    DFA(dfa::Error),
    /// Two or more patterns match the same input and ambiguity was
    /// configured to be rejected.
    Ambiguous(dfa::Ambiguity),
    /// A `regex-syntax` expression uses a feature without a counterpart in
    /// this crate's syntax tree.
    Unsupported(&'static str),
}

impl BuildError {
    /// Return the kind of this error.
    pub fn kind(&self) -> &BuildErrorKind {
        &self.kind
    }

    /// If this error occurred because a pattern failed to parse, then this
    /// returns the byte offset of the error in that pattern.
    pub fn syntax_position(&self) -> Option<usize> {
        match self.kind {
            BuildErrorKind::Syntax(ref err) => Some(err.position()),
            _ => None,
        }
    }

    pub(crate) fn syntax(err: ast::Error) -> BuildError {
        BuildError { kind: BuildErrorKind::Syntax(err) }
    }

    pub(crate) fn nfa(err: nfa::Error) -> BuildError {
        BuildError { kind: BuildErrorKind::NFA(err) }
    }

    pub(crate) fn dfa(err: dfa::Error) -> BuildError {
        BuildError { kind: BuildErrorKind::DFA(err) }
    }

    pub(crate) fn ambiguous(ambiguity: dfa::Ambiguity) -> BuildError {
        BuildError { kind: BuildErrorKind::Ambiguous(ambiguity) }
    }

    #[cfg(feature = "syntax")]
    pub(crate) fn unsupported_byte() -> BuildError {
        let msg = "bytes that are not valid UTF-8 are not supported";
        BuildError { kind: BuildErrorKind::Unsupported(msg) }
    }

    #[cfg(feature = "syntax")]
    pub(crate) fn unsupported_line_anchor() -> BuildError {
        let msg = "multi-line anchors are not supported, \
                   use \\A or ^ and \\z or $";
        BuildError { kind: BuildErrorKind::Unsupported(msg) }
    }

    #[cfg(feature = "syntax")]
    pub(crate) fn unsupported_word_boundary() -> BuildError {
        let msg = r"word boundary assertions (\b and \B) are not supported";
        BuildError { kind: BuildErrorKind::Unsupported(msg) }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            BuildErrorKind::Syntax(ref err) => Some(err),
            BuildErrorKind::NFA(ref err) => Some(err),
            BuildErrorKind::DFA(ref err) => Some(err),
            BuildErrorKind::Ambiguous(_) => None,
            BuildErrorKind::Unsupported(_) => None,
        }
    }
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind() {
            BuildErrorKind::Syntax(ref err) => {
                write!(f, "error parsing pattern: {}", err)
            }
            BuildErrorKind::NFA(_) => write!(f, "error building NFA"),
            BuildErrorKind::DFA(_) => write!(f, "error building DFA"),
            BuildErrorKind::Ambiguous(ref ambiguity) => {
                write!(f, "ambiguous patterns: {}", ambiguity)
            }
            BuildErrorKind::Unsupported(msg) => write!(f, "{}", msg),
        }
    }
}
