use crate::nfa;

/// An error that occurred during the construction of a DFA.
///
/// There are generally only two things you can do with it:
///
/// * Obtain a human readable message via its `std::fmt::Display` impl.
/// * Access an underlying [`nfa::Error`] from its `source` method via the
/// `std::error::Error` trait. This error only occurs when using convenience
/// routines that compile AST nodes all the way to a DFA.
///
/// When the `std` feature is enabled, this implements the `std::error::Error`
/// trait.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that occurred during the construction of a DFA.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum ErrorKind {
    /// An error that occurred while constructing an NFA as a precursor step
    /// before a DFA is compiled.
    NFA(nfa::Error),
    /// An error that occurs if subset construction produces more states than
    /// the configured limit.
    TooManyStates {
        /// The configured limit on the number of DFA states.
        limit: usize,
    },
}

impl Error {
    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn nfa(err: nfa::Error) -> Error {
        Error { kind: ErrorKind::NFA(err) }
    }

    pub(crate) fn too_many_states(limit: usize) -> Error {
        Error { kind: ErrorKind::TooManyStates { limit } }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::NFA(ref err) => Some(err),
            ErrorKind::TooManyStates { .. } => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind() {
            ErrorKind::NFA(_) => write!(f, "error building NFA"),
            ErrorKind::TooManyStates { limit } => write!(
                f,
                "number of DFA states exceeds limit of {}",
                limit,
            ),
        }
    }
}
