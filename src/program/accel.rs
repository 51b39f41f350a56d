// Acceleration of states that loop on almost every character.
//
// A state like the one for the body of `[^/]*` transitions to itself on every
// character except `/`. Feeding such a state one character at a time is
// wasteful: instead, `memchr` finds the next `/` and everything before it is
// consumed in one step. Since text is UTF-8 and exit characters must be
// ASCII, searching bytes for the exits is exact.
//
// A state is accelerated only if:
//
// * it is not the start state, so its self-loop keeps the current domain;
// * its self-loop is not reluctant, so no character before an exit could
//   stop a reluctant feed;
// * every character on which it does not loop to itself is one of at most
//   three ASCII characters. End of input never occurs in text, so its
//   transition is irrelevant.

use crate::{
    dfa::{self, DFA},
    util::{id::StateID, DebugPoint},
};

/// The maximum number of exit bytes in an accelerator.
const ACCEL_CAP: usize = 3;

/// Search for the first occurrence of any of the given needles in
/// `haystack[at..]`, returning its absolute offset.
pub(crate) fn find_fwd(
    needles: &[u8],
    haystack: &[u8],
    at: usize,
) -> Option<usize> {
    let bs = needles;
    let i = match needles.len() {
        1 => memchr::memchr(bs[0], &haystack[at..])?,
        2 => memchr::memchr2(bs[0], bs[1], &haystack[at..])?,
        3 => memchr::memchr3(bs[0], bs[1], bs[2], &haystack[at..])?,
        0 => panic!("cannot find with empty needles"),
        n => unreachable!("invalid needles length: {}", n),
    };
    Some(at + i)
}

/// The exit bytes of an accelerated state.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct Accel {
    /// The first byte is the length. Subsequent bytes are the exit bytes.
    bytes: [u8; ACCEL_CAP + 1],
}

impl Accel {
    /// Returns an empty accel, where no bytes are accelerated.
    pub(crate) fn new() -> Accel {
        Accel { bytes: [0; ACCEL_CAP + 1] }
    }

    /// Build the accelerator for the given state, if it qualifies.
    pub(crate) fn for_state(id: StateID, state: &dfa::State) -> Option<Accel> {
        if id == DFA::START {
            return None;
        }
        let mut accel = Accel::new();
        for run in state.transitions().runs() {
            let range = run.range;
            let loops = run.value.map_or(false, |t| {
                t.target() == id && !t.is_reluctant()
            });
            // Runs that only cover end of input don't matter.
            if loops || range.end() <= 0 {
                continue;
            }
            let start = range.start().max(0);
            if range.end() - start != 1 || start > 0x7F {
                return None;
            }
            if !accel.add(start as u8) {
                return None;
            }
        }
        if accel.is_empty() {
            // Nothing but end of input leaves the state, so no text does.
            // A single search would still work, but there is nothing to find.
            return None;
        }
        Some(accel)
    }

    /// Attempts to add the given byte to this accelerator. If the accelerator
    /// is already full then this returns false. Otherwise, returns true.
    pub(crate) fn add(&mut self, byte: u8) -> bool {
        if self.len() >= ACCEL_CAP {
            return false;
        }
        self.bytes[self.len() + 1] = byte;
        self.bytes[0] += 1;
        true
    }

    /// Return the number of bytes in this accelerator.
    pub(crate) fn len(&self) -> usize {
        self.bytes[0] as usize
    }

    /// Returns true if and only if there are no bytes in this accelerator.
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the slice of bytes to accelerate.
    pub(crate) fn needles(&self) -> &[u8] {
        &self.bytes[1..1 + self.len()]
    }
}

impl core::fmt::Debug for Accel {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Accel(")?;
        let mut set = f.debug_set();
        for &b in self.needles() {
            set.entry(&DebugPoint(i32::from(b)));
        }
        set.finish()?;
        write!(f, ")")
    }
}
