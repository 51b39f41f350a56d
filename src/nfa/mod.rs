/*!
A Thompson NFA over code point ranges, with one accepting state per pattern.

An [`NFA`] is built by the [`compiler`] from one AST per pattern. All
patterns share state `0` as their start state, and pattern `i` accepts in a
state whose domain is `PatternID(i)`.

Unlike a textbook NFA, a state here is just a list of transitions. A
transition with no character set is an epsilon transition, and epsilon
transitions may carry capturing group markers. Transitions may also be
*reluctant*, which marks them as belonging to a non-greedy repetition.
*/

use core::fmt;

use alloc::{format, string::String, vec::Vec};

use crate::{
    ast::{self, Group},
    util::{
        id::{IteratorIDExt, PatternID, StateID},
        range_set::CharRangeSet,
    },
};

pub use self::{
    compiler::{Compiler, Config},
    error::{Error, ErrorKind},
};

pub mod compiler;
mod error;

/// A non-deterministic finite automaton built from one or more patterns.
///
/// # Example
///
/// ```
/// use regex_dispatch::{ast, nfa::NFA, PatternID};
///
/// let nfa = NFA::new(&[ast::parse("ab|c")?])?;
/// assert_eq!(1, nfa.pattern_len());
/// assert_eq!(1, nfa.accepting().count());
/// assert_eq!(
///     Some(PatternID::ZERO),
///     nfa.accepting().next().and_then(|id| nfa.state(id).domain()),
/// );
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct NFA {
    states: Vec<State>,
    pattern_len: usize,
}

/// A single NFA state.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct State {
    pub(crate) domain: Option<PatternID>,
    pub(crate) transitions: Vec<Transition>,
}

/// A transition from one NFA state to another.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    pub(crate) target: StateID,
    pub(crate) set: Option<CharRangeSet>,
    pub(crate) reluctant: bool,
    pub(crate) group: Option<GroupMarker>,
}

/// Marks the boundary of a capturing group on an epsilon transition.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum GroupMarker {
    /// The transition enters the group.
    Start(Group),
    /// The transition leaves the group.
    End(Group),
}

impl NFA {
    /// The identifier of the start state shared by every pattern.
    pub const START: StateID = StateID::ZERO;

    /// Compile the given nodes into an NFA using the default configuration.
    /// Node `i` accepts with domain `PatternID(i)`.
    pub fn new(nodes: &[ast::Node]) -> Result<NFA, Error> {
        Compiler::new().build(nodes)
    }

    pub(crate) fn from_parts(states: Vec<State>, pattern_len: usize) -> NFA {
        NFA { states, pattern_len }
    }

    /// Returns the number of states in this NFA.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of patterns compiled into this NFA.
    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    /// Returns the state with the given identifier.
    ///
    /// # Panics
    ///
    /// This panics if the identifier does not refer to a state in this NFA.
    pub fn state(&self, id: StateID) -> &State {
        &self.states[id]
    }

    /// Returns an iterator over all states and their identifiers.
    pub fn states(&self) -> impl Iterator<Item = (StateID, &State)> + '_ {
        self.states.iter().with_state_ids()
    }

    /// Returns the identifiers of all accepting states, in order.
    pub fn accepting(&self) -> impl Iterator<Item = StateID> + '_ {
        self.states().filter(|(_, s)| s.is_accepting()).map(|(id, _)| id)
    }

    /// Returns the heap memory used by this NFA, in bytes.
    pub fn memory_usage(&self) -> usize {
        use core::mem::size_of;

        let mut bytes = self.states.len() * size_of::<State>();
        for state in self.states.iter() {
            bytes += state.transitions.len() * size_of::<Transition>();
            for t in state.transitions.iter() {
                if let Some(ref set) = t.set {
                    bytes += set.ranges().len() * 2 * size_of::<i32>();
                }
            }
        }
        bytes
    }
}

impl State {
    /// Returns the pattern accepted in this state, if any.
    pub fn domain(&self) -> Option<PatternID> {
        self.domain
    }

    /// Returns true if this state accepts some pattern.
    pub fn is_accepting(&self) -> bool {
        self.domain.is_some()
    }

    /// Returns this state's transitions in the order they were added.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

impl Transition {
    /// The state this transition leads to.
    pub fn target(&self) -> StateID {
        self.target
    }

    /// The points consumed by this transition, or `None` for an epsilon
    /// transition.
    pub fn set(&self) -> Option<&CharRangeSet> {
        self.set.as_ref()
    }

    /// Returns true if this is an epsilon transition.
    pub fn is_epsilon(&self) -> bool {
        self.set.is_none()
    }

    /// Returns true if this transition belongs to a reluctant repetition.
    pub fn is_reluctant(&self) -> bool {
        self.reluctant
    }

    /// The capturing group boundary crossed by this transition, if any.
    pub fn group(&self) -> Option<&GroupMarker> {
        self.group.as_ref()
    }
}

impl fmt::Debug for NFA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nfa::NFA(")?;
        for (sid, state) in self.states() {
            let status = if sid == NFA::START { '>' } else { ' ' };
            let domain = match state.domain {
                Some(pid) => format!("[{:?}]", pid.as_usize()),
                None => String::new(),
            };
            let trans = state
                .transitions
                .iter()
                .map(|t| format!("{:?}", TransitionDebug(t)))
                .collect::<Vec<String>>()
                .join(", ");
            writeln!(
                f,
                "{}{:06?}{}: {}",
                status,
                sid.as_usize(),
                domain,
                trans
            )?;
        }
        writeln!(f, ")")?;
        Ok(())
    }
}

struct TransitionDebug<'a>(&'a Transition);

impl<'a> fmt::Debug for TransitionDebug<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.0;
        match t.set {
            Some(ref set) => write!(f, "{:?}", set)?,
            None => write!(f, "eps")?,
        }
        match t.group {
            Some(GroupMarker::Start(ref g)) => write!(f, " start({:?})", g)?,
            Some(GroupMarker::End(ref g)) => write!(f, " end({:?})", g)?,
            None => {}
        }
        if t.reluctant {
            write!(f, "?")?;
        }
        write!(f, " => {:?}", t.target.as_usize())
    }
}
