/*!
Type definitions for identifier types.

A [`StateID`] identifies a state in one of the automata built by this crate:
an NFA state, a DFA state or a state of a generated [`Program`]. State IDs
are always relative to the automaton that produced them. Using a state ID
from one automaton with another one is a logic error.

A [`PatternID`] identifies one of the patterns compiled together into a
single automaton. Patterns are assigned auto-incrementing IDs starting at
`0` in the order in which they were given to a builder. In the terminology
of this crate, the pattern ID that a terminal state accepts is its *domain*.

Both identifier types are represented by a `u32` and clamp their values to
`i32::MAX - 1`, which keeps them representable as an `i32` and a `usize` on
all supported targets.

[`Program`]: crate::program::Program
*/

use core::{convert::TryFrom, fmt, ops};

use alloc::vec::Vec;

/// A macro for defining an identifier type along with its error type.
/// Pattern and state identifiers behave identically modulo names.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $ty:ident, $tyerr:ident, $label:expr
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(
            Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord,
        )]
        pub struct $ty(u32);

        impl $ty {
            /// The maximum value of this identifier.
            pub const MAX: $ty = $ty::new_unchecked(i32::MAX as usize - 1);

            /// The total number of distinct identifiers of this type.
            pub const LIMIT: usize = $ty::MAX.as_usize() + 1;

            /// The zero identifier.
            pub const ZERO: $ty = $ty::new_unchecked(0);

            /// Create a new identifier.
            ///
            /// If the given value exceeds `MAX`, then this returns an error.
            #[inline]
            pub fn new(id: usize) -> Result<$ty, $tyerr> {
                $ty::try_from(id)
            }

            /// Create a new identifier without checking whether the given
            /// value exceeds `MAX`.
            #[inline]
            pub const fn new_unchecked(id: usize) -> $ty {
                $ty(id as u32)
            }

            /// Like `new`, but panics if the given value is not valid.
            #[inline]
            pub fn must(id: usize) -> $ty {
                match $ty::new(id) {
                    Ok(id) => id,
                    Err(err) => panic!("{}", err),
                }
            }

            /// Return this identifier as a `usize`.
            #[inline]
            pub const fn as_usize(&self) -> usize {
                self.0 as usize
            }

            /// Return this identifier as a `u32`.
            #[inline]
            pub const fn as_u32(&self) -> u32 {
                self.0
            }

            /// Return this identifier as an `i32`. This never overflows.
            #[inline]
            pub const fn as_i32(&self) -> i32 {
                self.0 as i32
            }
        }

        /// The error returned when a value exceeds the maximum identifier.
        ///
        /// When the `std` feature is enabled, this implements the `Error`
        /// trait.
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub struct $tyerr {
            attempted: u64,
        }

        impl $tyerr {
            /// Returns the value that failed to construct an identifier.
            pub fn attempted(&self) -> u64 {
                self.attempted
            }
        }

        #[cfg(feature = "std")]
        impl std::error::Error for $tyerr {}

        impl fmt::Display for $tyerr {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    f,
                    "failed to create {} ID from {:?}, which exceeds {:?}",
                    $label,
                    self.attempted(),
                    $ty::MAX,
                )
            }
        }

        impl TryFrom<usize> for $ty {
            type Error = $tyerr;

            fn try_from(id: usize) -> Result<$ty, $tyerr> {
                if id > $ty::MAX.as_usize() {
                    return Err($tyerr { attempted: id as u64 });
                }
                Ok($ty::new_unchecked(id))
            }
        }

        impl<T> ops::Index<$ty> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, index: $ty) -> &T {
                &self[index.as_usize()]
            }
        }

        impl<T> ops::IndexMut<$ty> for [T] {
            #[inline]
            fn index_mut(&mut self, index: $ty) -> &mut T {
                &mut self[index.as_usize()]
            }
        }

        impl<T> ops::Index<$ty> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $ty) -> &T {
                &self[index.as_usize()]
            }
        }

        impl<T> ops::IndexMut<$ty> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $ty) -> &mut T {
                &mut self[index.as_usize()]
            }
        }
    };
}

define_id!(
    /// An identifier for one of the patterns compiled into an automaton.
    ///
    /// When several patterns are compiled together, each terminal state
    /// records the IDs of the patterns it accepts. These are called the
    /// state's *domains*.
    PatternID,
    PatternIDError,
    "pattern"
);

define_id!(
    /// An identifier for a state in an NFA, a DFA or a generated program.
    ///
    /// States are stored in arenas owned by their automaton and refer to one
    /// another by index, which is what a `StateID` is.
    StateID,
    StateIDError,
    "state"
);

impl StateID {
    /// Returns an iterator over all state IDs from 0 up to and not including
    /// the given length.
    ///
    /// If the given length exceeds `LIMIT`, then this panics.
    pub(crate) fn iter(len: usize) -> StateIDIter {
        assert!(
            len <= StateID::LIMIT,
            "cannot create iterator for state IDs when number of \
             elements exceeds {:?}",
            StateID::LIMIT,
        );
        StateIDIter { rng: 0..len }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct StateIDIter {
    rng: ops::Range<usize>,
}

impl Iterator for StateIDIter {
    type Item = StateID;

    fn next(&mut self) -> Option<StateID> {
        // new_unchecked is OK since the length was checked when the
        // iterator was created.
        self.rng.next().map(StateID::new_unchecked)
    }
}

/// A utility trait that attaches IDs to the elements of an exact size
/// iterator, checking once that every index is representable.
pub(crate) trait IteratorIDExt: Iterator {
    fn with_state_ids(self) -> WithStateIDIter<Self>
    where
        Self: Sized + ExactSizeIterator,
    {
        let ids = StateID::iter(self.len());
        WithStateIDIter { it: self, ids }
    }
}

impl<I: Iterator> IteratorIDExt for I {}

/// An iterator adapter that is like `Enumerate`, but yields state IDs.
#[derive(Clone, Debug)]
pub(crate) struct WithStateIDIter<I> {
    it: I,
    ids: StateIDIter,
}

impl<I: Iterator + ExactSizeIterator> Iterator for WithStateIDIter<I> {
    type Item = (StateID, I::Item);

    fn next(&mut self) -> Option<(StateID, I::Item)> {
        let item = self.it.next()?;
        let id = self.ids.next()?;
        Some((id, item))
    }
}
