/*!
A deterministic finite automaton over code point ranges, with domain tracking.

A [`DFA`] is produced from an [`NFA`](crate::nfa::NFA) by
[subset construction](determinize). Each state maps ranges of points
(including end of input) to at most one [`Transition`], and records the
sorted set of pattern *domains* that accept in it. A state with no domains is
non-terminal, a state with one domain is terminal and a state with more than
one domain is *ambiguous*: its patterns cannot be told apart by any input
that ends there. The [`ambiguity`] module finds such states along with an
example input reaching them.

Before code generation, states are renumbered by the [`reorder`] module so
that the start state comes first and states reached by a depth first walk
are adjacent.

# Example

```
use regex_dispatch::{ast, dfa::DFA, PatternID};

let dfa = DFA::new(&[ast::parse("[a-z]+")?, ast::parse("foo")?])?;
let sid = dfa.walk("foo").unwrap();
let both = [PatternID::must(0), PatternID::must(1)];
assert_eq!(&both, dfa.state(sid).domains());
let sid = dfa.walk("bar").unwrap();
assert_eq!(&[PatternID::must(0)], dfa.state(sid).domains());
assert_eq!(None, dfa.walk("BAR"));

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use core::fmt;

use alloc::vec::Vec;

use crate::{
    ast::Node,
    nfa,
    util::{
        id::{IteratorIDExt, PatternID, StateID},
        range_map::CharRangeMap,
        DebugPoint,
    },
};

pub use self::{
    ambiguity::{find_ambiguities, Ambiguity, Step},
    determinize::Config,
    error::{Error, ErrorKind},
};

pub mod ambiguity;
pub mod determinize;
mod error;
pub(crate) mod reorder;

/// A deterministic finite automaton with one start state, `StateID::ZERO`.
#[derive(Clone)]
pub struct DFA {
    states: Vec<State>,
    pattern_len: usize,
}

/// A single DFA state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct State {
    transitions: CharRangeMap<Transition>,
    domains: Vec<PatternID>,
}

/// A transition to another state of the same DFA.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Transition {
    target: StateID,
    reluctant: bool,
}

impl DFA {
    /// The identifier of the start state.
    pub const START: StateID = StateID::ZERO;

    /// Compile the given nodes to an NFA and then to a DFA, using default
    /// configurations. Node `i` accepts with domain `PatternID(i)`.
    pub fn new(nodes: &[Node]) -> Result<DFA, Error> {
        let nfa = nfa::NFA::new(nodes).map_err(Error::nfa)?;
        Config::new().run(&nfa)
    }

    pub(crate) fn from_parts(states: Vec<State>, pattern_len: usize) -> DFA {
        DFA { states, pattern_len }
    }

    /// Returns the number of states in this DFA.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of patterns compiled into this DFA.
    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    /// Returns the state with the given identifier.
    ///
    /// # Panics
    ///
    /// This panics if the identifier does not refer to a state in this DFA.
    pub fn state(&self, id: StateID) -> &State {
        &self.states[id]
    }

    /// Returns an iterator over all states and their identifiers.
    pub fn states(&self) -> impl Iterator<Item = (StateID, &State)> + '_ {
        self.states.iter().with_state_ids()
    }

    /// Returns the state reached from `id` on the given point, if any.
    pub fn next_state(&self, id: StateID, point: i32) -> Option<StateID> {
        self.states[id].transitions.get(point).map(|t| t.target)
    }

    /// Returns the state reached from the start state after consuming every
    /// character in `text`, or `None` if the automaton gets stuck.
    pub fn walk(&self, text: &str) -> Option<StateID> {
        text.chars()
            .try_fold(DFA::START, |id, ch| self.next_state(id, ch as i32))
    }

    /// Returns the heap memory used by this DFA, in bytes.
    pub fn memory_usage(&self) -> usize {
        use core::mem::size_of;

        self.states
            .iter()
            .map(|s| {
                size_of::<State>()
                    + s.transitions.run_len()
                        * (size_of::<i32>() + size_of::<Option<Transition>>())
                    + s.domains.len() * size_of::<PatternID>()
            })
            .sum()
    }
}

impl State {
    pub(crate) fn new(
        transitions: CharRangeMap<Transition>,
        domains: Vec<PatternID>,
    ) -> State {
        State { transitions, domains }
    }

    /// Returns this state's transition map.
    pub fn transitions(&self) -> &CharRangeMap<Transition> {
        &self.transitions
    }

    /// Returns the sorted, deduplicated domains accepting in this state.
    pub fn domains(&self) -> &[PatternID] {
        &self.domains
    }

    /// Returns true if at least one pattern accepts in this state.
    pub fn is_terminal(&self) -> bool {
        !self.domains.is_empty()
    }

    /// Returns true if more than one pattern accepts in this state.
    pub fn is_ambiguous(&self) -> bool {
        self.domains.len() > 1
    }

    /// Returns the domain reported when a matcher enters this state. Ties
    /// between several domains are broken in favor of the lowest pattern
    /// identifier, which is the pattern given first.
    pub fn domain(&self) -> Option<PatternID> {
        self.domains.first().copied()
    }
}

impl Transition {
    pub(crate) fn new(target: StateID, reluctant: bool) -> Transition {
        Transition { target, reluctant }
    }

    /// The state this transition leads to.
    pub fn target(&self) -> StateID {
        self.target
    }

    /// Returns true if every NFA transition that contributed to this one was
    /// part of a reluctant repetition.
    pub fn is_reluctant(&self) -> bool {
        self.reluctant
    }
}

impl fmt::Debug for DFA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dfa::DFA(")?;
        for (sid, state) in self.states() {
            let status = if sid == DFA::START {
                '>'
            } else if state.is_ambiguous() {
                '!'
            } else if state.is_terminal() {
                '*'
            } else {
                ' '
            };
            write!(f, "{}{:06?}", status, sid.as_usize())?;
            if state.is_terminal() {
                let pids: Vec<usize> =
                    state.domains.iter().map(|p| p.as_usize()).collect();
                write!(f, "{:?}", pids)?;
            }
            write!(f, ":")?;
            for (range, t) in state.transitions.iter() {
                write!(f, " {:?}", DebugPoint(range.start()))?;
                if range.len() > 1 {
                    write!(f, "-{:?}", DebugPoint(range.end() - 1))?;
                }
                let rel = if t.reluctant { "?" } else { "" };
                write!(f, " =>{} {},", rel, t.target.as_usize())?;
            }
            writeln!(f)?;
        }
        writeln!(f, ")")?;
        Ok(())
    }
}
