use alloc::{vec, vec::Vec};

use crate::{
    dfa::{State, Transition, DFA},
    util::id::StateID,
};

/// Renumber the states of a DFA in depth first pre-order from its start
/// state, visiting transitions in ascending order of their ranges.
///
/// A state's first successor (in range order) that hasn't been visited yet
/// ends up immediately after it. Generated dispatch code walks states in
/// this order, so common paths through the automaton end up close together.
/// The start state always keeps identifier zero.
pub(crate) fn reorder(dfa: &DFA) -> DFA {
    let remapper = Remapper::depth_first(dfa);
    remapper.remap(dfa)
}

/// A permutation of a DFA's state identifiers.
#[derive(Debug)]
struct Remapper {
    /// The old identifiers in their new order.
    order: Vec<StateID>,
    /// A map from old identifier to new identifier.
    map: Vec<StateID>,
}

impl Remapper {
    fn depth_first(dfa: &DFA) -> Remapper {
        let mut order = Vec::with_capacity(dfa.len());
        let mut seen = vec![false; dfa.len()];
        let mut stack = vec![DFA::START];
        while let Some(id) = stack.pop() {
            if seen[id] {
                continue;
            }
            seen[id] = true;
            order.push(id);
            let targets: Vec<StateID> = dfa
                .state(id)
                .transitions()
                .iter()
                .map(|(_, t)| t.target())
                .collect();
            stack.extend(targets.into_iter().rev().filter(|&t| !seen[t]));
        }
        // Subset construction only creates reachable states, but keep any
        // others so the permutation is total.
        for (id, _) in dfa.states() {
            if !seen[id] {
                order.push(id);
            }
        }

        let mut map = vec![StateID::ZERO; dfa.len()];
        for (new, &old) in order.iter().enumerate() {
            map[old] = StateID::new_unchecked(new);
        }
        Remapper { order, map }
    }

    fn remap(&self, dfa: &DFA) -> DFA {
        let states: Vec<State> = self
            .order
            .iter()
            .map(|&old| {
                let state = dfa.state(old);
                let transitions = state.transitions().map(|t| {
                    let target = self.map[t.target()];
                    Some(Transition::new(target, t.is_reluctant()))
                });
                State::new(transitions, state.domains().to_vec())
            })
            .collect();
        trace!("reordered {} DFA states", states.len());
        DFA::from_parts(states, dfa.pattern_len())
    }
}
