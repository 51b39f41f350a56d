use crate::util::id::{PatternID, StateID};

/// An error that can occur during the construction of an NFA.
///
/// When the `std` feature is enabled, this implements the `std::error::Error`
/// trait.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that occurred during the construction of an NFA.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum ErrorKind {
    /// No patterns were given to the compiler.
    NoPatterns,
    /// An error that occurs if too many patterns were given to the NFA
    /// compiler.
    TooManyPatterns {
        /// The number of patterns given, which exceeds the limit.
        given: usize,
        /// The limit on the number of patterns.
        limit: usize,
    },
    /// An error that occurs if too many states are produced while building an
    /// NFA.
    TooManyStates {
        /// The minimum number of states that are desired, which exceeds the
        /// limit.
        given: usize,
        /// The limit on the number of states.
        limit: usize,
    },
    /// A repetition built without the parser has a maximum that is less than
    /// its minimum.
    InvalidRepetition {
        /// The minimum number of repetitions.
        min: u32,
        /// The maximum number of repetitions.
        max: u32,
    },
}

impl Error {
    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn no_patterns() -> Error {
        Error { kind: ErrorKind::NoPatterns }
    }

    pub(crate) fn too_many_patterns(given: usize, limit: usize) -> Error {
        let limit = core::cmp::min(limit, PatternID::LIMIT);
        Error { kind: ErrorKind::TooManyPatterns { given, limit } }
    }

    pub(crate) fn too_many_states(given: usize, limit: usize) -> Error {
        let limit = core::cmp::min(limit, StateID::LIMIT);
        Error { kind: ErrorKind::TooManyStates { given, limit } }
    }

    pub(crate) fn invalid_repetition(min: u32, max: u32) -> Error {
        Error { kind: ErrorKind::InvalidRepetition { min, max } }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind() {
            ErrorKind::NoPatterns => {
                write!(f, "at least one pattern is required")
            }
            ErrorKind::TooManyPatterns { given, limit } => write!(
                f,
                "attempted to compile {} patterns, \
                 which exceeds the limit of {}",
                given, limit,
            ),
            ErrorKind::TooManyStates { given, limit } => write!(
                f,
                "attempted to compile {} NFA states, \
                 which exceeds the limit of {}",
                given, limit,
            ),
            ErrorKind::InvalidRepetition { min, max } => write!(
                f,
                "invalid repetition {{{},{}}}: maximum is less than minimum",
                min, max,
            ),
        }
    }
}
