/*!
Dispatch code generated from a DFA.

A [`Program`] is the executable form of a [`DFA`]: one [`StateCode`] per DFA
state, in the order produced by depth first reordering, each holding the
[`Dispatch`](dispatch::Dispatch) code that maps the next point to an
[`Action`]. Actions carry everything a matcher needs to advance: the next
state, how its current domain changes and whether the step is reluctant.

Domain updates are computed once at generation time:

* entering a terminal state sets the domain to the state's resolved domain,
  except on a self-loop of a terminal state other than the start state,
  which keeps it;
* entering a non-terminal state from a terminal state clears the domain;
* any other step keeps it.

Programs are immutable and are shared by every matcher created from the same
[`Pattern`](crate::Pattern).
*/

use core::fmt;

use alloc::vec::Vec;

use crate::{
    dfa::{self, DFA},
    program::{accel::Accel, dispatch::Dispatch},
    util::id::{IteratorIDExt, PatternID, StateID},
};

pub(crate) mod accel;
pub mod dispatch;

/// What a matcher does on a single point.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    /// There is no transition. The matcher becomes invalid.
    Fail,
    /// Consume the point and move to `next`.
    Goto {
        /// The state to move to.
        next: StateID,
        /// How the matcher's domain changes.
        domain: DomainUpdate,
        /// Whether the transition belongs to a reluctant repetition only.
        reluctant: bool,
    },
}

/// A change to a matcher's domain on a transition.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DomainUpdate {
    /// Leave the domain as it is.
    Keep,
    /// Set the domain to the given pattern.
    Set(PatternID),
    /// Forget the domain.
    Clear,
}

/// The generated code of a whole DFA.
#[derive(Clone)]
pub struct Program {
    states: Vec<StateCode>,
    pattern_len: usize,
}

/// The generated code of a single state.
#[derive(Clone)]
pub struct StateCode {
    domain: Option<PatternID>,
    dispatch: Dispatch,
    accel: Option<Accel>,
}

/// Generate a program for the given DFA. States are reordered first, so
/// state identifiers in the program generally differ from those in `dfa`,
/// except for the start state.
///
/// When `accelerate` is true, states that loop on themselves for all but a
/// few ASCII characters are skipped through with a vectorized search.
pub fn generate(dfa: &DFA, accelerate: bool) -> Program {
    let dfa = dfa::reorder::reorder(dfa);
    let mut states = Vec::with_capacity(dfa.len());
    for (id, state) in dfa.states() {
        let actions = state
            .transitions()
            .map(|t| Some(action(&dfa, id, state, t)));
        let accel =
            if accelerate { Accel::for_state(id, state) } else { None };
        states.push(StateCode {
            domain: state.domain(),
            dispatch: Dispatch::new(&actions),
            accel,
        });
    }
    let program = Program { states, pattern_len: dfa.pattern_len() };
    debug!(
        "generated program with {} states ({} accelerated) using {} bytes",
        program.state_len(),
        program.states.iter().filter(|s| s.accel.is_some()).count(),
        program.memory_usage(),
    );
    program
}

/// The action for taking transition `t` out of state `id`.
fn action(
    dfa: &DFA,
    id: StateID,
    state: &dfa::State,
    t: &dfa::Transition,
) -> Action {
    let domain = match dfa.state(t.target()).domain() {
        Some(_) if t.target() == id && id != DFA::START => {
            DomainUpdate::Keep
        }
        Some(pid) => DomainUpdate::Set(pid),
        None if state.is_terminal() => DomainUpdate::Clear,
        None => DomainUpdate::Keep,
    };
    Action::Goto { next: t.target(), domain, reluctant: t.is_reluctant() }
}

impl Program {
    /// The identifier of the state every matcher starts in.
    pub const START: StateID = StateID::ZERO;

    /// Generate an accelerated program for the given DFA.
    pub fn new(dfa: &DFA) -> Program {
        generate(dfa, true)
    }

    /// Returns the number of states in this program.
    pub fn state_len(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of patterns this program matches.
    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    /// Returns the code of the given state.
    ///
    /// # Panics
    ///
    /// This panics if the identifier does not refer to a state of this
    /// program.
    pub fn state(&self, id: StateID) -> &StateCode {
        &self.states[id]
    }

    /// Returns the action taken in state `id` on the given point.
    #[inline]
    pub fn dispatch(&self, id: StateID, point: i32) -> Action {
        self.states[id].dispatch.lookup(point)
    }

    /// Returns the heap memory used by this program, in bytes.
    pub fn memory_usage(&self) -> usize {
        use core::mem::size_of;

        self.states
            .iter()
            .map(|s| size_of::<StateCode>() + s.dispatch.memory_usage())
            .sum()
    }
}

impl StateCode {
    /// The resolved domain of this state, if it is terminal.
    pub fn domain(&self) -> Option<PatternID> {
        self.domain
    }

    /// Returns true if this state accepts some pattern.
    pub fn is_terminal(&self) -> bool {
        self.domain.is_some()
    }

    /// The dispatch code of this state.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// The bytes on which an accelerated state stops looping. This is empty
    /// for states that aren't accelerated.
    pub fn accelerator(&self) -> &[u8] {
        match self.accel {
            Some(ref accel) => accel.needles(),
            None => &[],
        }
    }

    pub(crate) fn accel(&self) -> Option<&Accel> {
        self.accel.as_ref()
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "program::Program(")?;
        for (sid, state) in self.states.iter().with_state_ids() {
            let status = if sid == Program::START {
                '>'
            } else if state.is_terminal() {
                '*'
            } else {
                ' '
            };
            write!(f, "{}{:06?}", status, sid.as_usize())?;
            if let Some(pid) = state.domain {
                write!(f, "[{}]", pid.as_usize())?;
            }
            if let Some(ref accel) = state.accel {
                write!(f, " {:?}", accel)?;
            }
            writeln!(f, ":")?;
            write!(f, "{:?}", state.dispatch)?;
        }
        writeln!(f, ")")?;
        Ok(())
    }
}
