/*!
Detection of inputs that more than one pattern accepts.

When several patterns are compiled into one DFA, a terminal state can accept
more than one domain. A matcher ending in such a state reports the lowest
domain, and the other patterns can never be reported for that input. This is
usually a mistake in the pattern set, so [`find_ambiguities`] reports every
such state along with the shortest example input that reaches it.
*/

use core::fmt;

use alloc::{collections::VecDeque, string::String, vec, vec::Vec};

use crate::{
    dfa::DFA,
    util::{
        id::{PatternID, StateID},
        point_char,
        range_set::CharRange,
        EOI,
    },
};

/// A single step along the path to an ambiguous state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// Consume a character.
    Char(char),
    /// Consume end of input, as done by
    /// [`Matcher::end`](crate::Matcher::end).
    End,
}

/// A terminal DFA state that accepts more than one pattern, together with an
/// input that reaches it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ambiguity {
    steps: Vec<Step>,
    example: String,
    domains: Vec<PatternID>,
    state: StateID,
}

impl Ambiguity {
    /// The characters consumed on a shortest path from the start state to
    /// the ambiguous state.
    pub fn example(&self) -> &str {
        &self.example
    }

    /// Returns true if the path to the ambiguous state consumes end of
    /// input at least once. The exact positions are given by
    /// [`Ambiguity::steps`].
    pub fn requires_end(&self) -> bool {
        self.steps.contains(&Step::End)
    }

    /// Every step on a shortest path from the start state to the ambiguous
    /// state, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The domains accepted by the ambiguous state, in ascending order.
    pub fn domains(&self) -> &[PatternID] {
        &self.domains
    }

    /// The identifier of the ambiguous state.
    pub fn state(&self) -> StateID {
        self.state
    }
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patterns ")?;
        for (i, pid) in self.domains.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", pid.as_usize())?;
        }
        write!(f, " all match {:?}", self.example)?;
        if self.requires_end() {
            write!(f, " at end of input")?;
        }
        Ok(())
    }
}

/// Find every ambiguous state of the given DFA that is reachable from its
/// start state, in ascending order of state identifier.
///
/// # Example
///
/// ```
/// use regex_dispatch::{ast, dfa::{find_ambiguities, DFA}};
///
/// let dfa = DFA::new(&[ast::parse("[a-z]+")?, ast::parse("foo")?])?;
/// let found = find_ambiguities(&dfa);
/// assert_eq!("foo", found[0].example());
/// assert!(!found[0].requires_end());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn find_ambiguities(dfa: &DFA) -> Vec<Ambiguity> {
    // For every reachable state, the state it was first discovered from and
    // the step taken to get there. Discovery is breadth first, so following
    // these back to the start yields a shortest path.
    let mut parents: Vec<Option<(StateID, Step)>> = vec![None; dfa.len()];
    let mut seen = vec![false; dfa.len()];
    let mut queue = VecDeque::new();
    seen[DFA::START] = true;
    queue.push_back(DFA::START);
    while let Some(id) = queue.pop_front() {
        for (range, t) in dfa.state(id).transitions().iter() {
            if seen[t.target()] {
                continue;
            }
            let step = match representative(range) {
                Some(ch) => Step::Char(ch),
                None if range.contains(EOI) => Step::End,
                None => continue,
            };
            seen[t.target()] = true;
            parents[t.target()] = Some((id, step));
            queue.push_back(t.target());
        }
    }

    let found: Vec<Ambiguity> = dfa
        .states()
        .filter(|&(id, state)| seen[id] && state.is_ambiguous())
        .map(|(id, _)| ambiguity(dfa, &parents, id))
        .collect();
    debug!("found {} ambiguous DFA states", found.len());
    found
}

/// Build the ambiguity for `state` from its discovery path.
fn ambiguity(
    dfa: &DFA,
    parents: &[Option<(StateID, Step)>],
    state: StateID,
) -> Ambiguity {
    let mut steps = vec![];
    let mut cur = state;
    while let Some((prev, step)) = parents[cur] {
        steps.push(step);
        cur = prev;
    }
    steps.reverse();
    let example = steps
        .iter()
        .filter_map(|step| match *step {
            Step::Char(ch) => Some(ch),
            Step::End => None,
        })
        .collect();
    Ambiguity {
        steps,
        example,
        domains: dfa.state(state).domains().to_vec(),
        state,
    }
}

/// Pick a readable character from the given range, preferring ASCII letters
/// and digits. End of input and surrogate code points are never picked.
fn representative(range: CharRange) -> Option<char> {
    const PREFERRED: &[(char, char)] = &[('a', 'z'), ('0', '9'), ('A', 'Z')];
    for &(lo, hi) in PREFERRED {
        let start = range.start().max(lo as i32);
        let end = range.end().min(hi as i32 + 1);
        if start < end {
            return point_char(start);
        }
    }
    let start = range.start().max(0);
    (start..range.end()).take(0x800 + 1).find_map(point_char)
}
