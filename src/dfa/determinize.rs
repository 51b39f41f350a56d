use alloc::{vec, vec::Vec};

use crate::{
    dfa::{Error, State, Transition, DFA},
    nfa::{self, NFA},
    util::{
        id::{PatternID, StateID},
        range_map::CharRangeMap,
        range_set::CharRangeSet,
        sparse_set::SparseSet,
    },
};

/// The configuration used for subset construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    state_limit: Option<Option<usize>>,
}

impl Config {
    /// Return a new default determinization configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Set the maximum number of DFA states that subset construction may
    /// produce before giving up with an error. `None` disables the limit.
    ///
    /// Subset construction can produce exponentially many states in the
    /// number of NFA states. The default limit is `10,000`.
    pub fn state_limit(mut self, limit: Option<usize>) -> Config {
        self.state_limit = Some(limit);
        self
    }

    /// Returns the state limit, as set by `state_limit`.
    pub fn get_state_limit(&self) -> Option<usize> {
        self.state_limit.unwrap_or(Some(10_000))
    }

    /// Run subset construction on the given NFA.
    pub fn run(&self, nfa: &NFA) -> Result<DFA, Error> {
        Runner {
            config: *self,
            nfa,
            builder_states: vec![],
            cache: StateMap::default(),
            stack: vec![],
        }
        .run()
    }
}

/// A DFA state under construction, identified by the NFA states it is made
/// of. Only NFA states that consume input or accept are kept: two epsilon
/// closures that agree on those states behave identically.
#[derive(Clone, Debug)]
struct BuilderState {
    nfa_states: Vec<StateID>,
    transitions: CharRangeMap<Transition>,
    domains: Vec<PatternID>,
}

/// A map from the NFA states making up a DFA state to its identifier.
#[cfg(feature = "std")]
type StateMap = std::collections::HashMap<Vec<StateID>, StateID>;
#[cfg(not(feature = "std"))]
type StateMap = alloc::collections::BTreeMap<Vec<StateID>, StateID>;

struct Runner<'a> {
    config: Config,
    nfa: &'a NFA,
    builder_states: Vec<BuilderState>,
    cache: StateMap,
    /// Scratch space for depth first visiting of epsilon transitions.
    stack: Vec<StateID>,
}

/// An NFA transition that consumes input, flattened out of its source state.
struct CharTransition<'a> {
    set: &'a CharRangeSet,
    target: StateID,
    reluctant: bool,
}

impl<'a> Runner<'a> {
    fn run(mut self) -> Result<DFA, Error> {
        let mut sparse = SparseSet::new(self.nfa.len());
        self.epsilon_closure(NFA::START, &mut sparse);
        let (start, _) = self.cached_state(&sparse)?;
        debug_assert_eq!(DFA::START, start);

        let mut uncompiled = vec![start];
        while let Some(dfa_id) = uncompiled.pop() {
            let transitions = self.compute_transitions(
                dfa_id,
                &mut sparse,
                &mut uncompiled,
            )?;
            trace!(
                "determinized DFA state {:?} with {} runs",
                dfa_id.as_usize(),
                transitions.run_len()
            );
            self.builder_states[dfa_id].transitions = transitions;
        }

        let pattern_len = self.nfa.pattern_len();
        let states: Vec<State> = self
            .builder_states
            .into_iter()
            .map(|bs| State::new(bs.transitions, bs.domains))
            .collect();
        debug!(
            "determinized {} NFA states into {} DFA states",
            self.nfa.len(),
            states.len()
        );
        Ok(DFA::from_parts(states, pattern_len))
    }

    /// Build the transition map of the given DFA state. Any successor states
    /// that didn't exist yet are created and pushed on to `uncompiled`.
    fn compute_transitions(
        &mut self,
        dfa_id: StateID,
        sparse: &mut SparseSet,
        uncompiled: &mut Vec<StateID>,
    ) -> Result<CharRangeMap<Transition>, Error> {
        let nfa = self.nfa;
        let mut outgoing: Vec<CharTransition<'_>> = vec![];
        for &nfa_id in self.builder_states[dfa_id].nfa_states.iter() {
            for t in nfa.state(nfa_id).transitions() {
                if let Some(set) = t.set() {
                    outgoing.push(CharTransition {
                        set,
                        target: t.target(),
                        reluctant: t.is_reluctant(),
                    });
                }
            }
        }

        // Every boundary of every outgoing set. Between two consecutive
        // boundaries, the set of applicable NFA transitions is constant.
        let mut boundaries: Vec<i32> = vec![];
        for ct in outgoing.iter() {
            for r in ct.set.ranges() {
                boundaries.push(r.start());
                boundaries.push(r.end());
            }
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut map = CharRangeMap::new();
        for w in boundaries.windows(2) {
            let (start, end) = (w[0], w[1]);
            sparse.clear();
            let mut any = false;
            let mut reluctant = true;
            for ct in outgoing.iter().filter(|ct| ct.set.contains(start)) {
                any = true;
                reluctant = reluctant && ct.reluctant;
                self.epsilon_closure(ct.target, sparse);
            }
            if !any {
                continue;
            }
            let (target, is_new) = self.cached_state(sparse)?;
            if is_new {
                uncompiled.push(target);
            }
            map.fill(start, end, Transition::new(target, reluctant));
        }
        Ok(map)
    }

    /// Return the identifier of the DFA state for the given epsilon closure,
    /// creating it if it doesn't exist yet. The boolean is true when the
    /// state was created by this call.
    fn cached_state(
        &mut self,
        closure: &SparseSet,
    ) -> Result<(StateID, bool), Error> {
        let nfa = self.nfa;
        let mut nfa_states: Vec<StateID> = closure
            .iter()
            .filter(|&id| is_significant(nfa.state(id)))
            .collect();
        nfa_states.sort_unstable();
        if let Some(&id) = self.cache.get(&nfa_states) {
            return Ok((id, false));
        }
        if let Some(limit) = self.config.get_state_limit() {
            if self.builder_states.len() >= limit {
                return Err(Error::too_many_states(limit));
            }
        }
        let mut domains: Vec<PatternID> = nfa_states
            .iter()
            .filter_map(|&id| nfa.state(id).domain())
            .collect();
        domains.sort_unstable();
        domains.dedup();

        let id = StateID::new(self.builder_states.len())
            .map_err(|_| Error::too_many_states(StateID::LIMIT))?;
        self.cache.insert(nfa_states.clone(), id);
        self.builder_states.push(BuilderState {
            nfa_states,
            transitions: CharRangeMap::new(),
            domains,
        });
        Ok((id, true))
    }

    /// Add every NFA state reachable from `start` through epsilon
    /// transitions, including `start` itself, to `set`. Epsilon cycles are
    /// cut by the set's membership test.
    fn epsilon_closure(&mut self, start: StateID, set: &mut SparseSet) {
        let nfa = self.nfa;
        self.stack.push(start);
        while let Some(id) = self.stack.pop() {
            if !set.insert(id) {
                continue;
            }
            for t in nfa.state(id).transitions().iter().rev() {
                if t.is_epsilon() {
                    self.stack.push(t.target());
                }
            }
        }
    }
}

/// Returns true if the given NFA state can affect matching once reached: it
/// either accepts or consumes some input.
fn is_significant(state: &nfa::State) -> bool {
    state.is_accepting()
        || state
            .transitions()
            .iter()
            .any(|t| t.set().map_or(false, |s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{parse, Node},
        dfa::ErrorKind,
        util::EOI,
    };

    fn dfa(patterns: &[&str]) -> DFA {
        let nodes: Vec<Node> =
            patterns.iter().map(|p| parse(p).unwrap()).collect();
        DFA::new(&nodes).unwrap()
    }

    fn accepts(dfa: &DFA, text: &str) -> Vec<usize> {
        dfa.walk(text)
            .and_then(|id| dfa.next_state(id, EOI))
            .map(|id| {
                dfa.state(id).domains().iter().map(|p| p.as_usize()).collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn literal() {
        let dfa = dfa(&["abc"]);
        assert_eq!(vec![0], accepts(&dfa, "abc"));
        assert!(accepts(&dfa, "ab").is_empty());
        assert!(accepts(&dfa, "abd").is_empty());
        assert!(accepts(&dfa, "abcc").is_empty());
    }

    #[test]
    fn start_state_is_first() {
        let dfa = dfa(&["a|b"]);
        assert!(!dfa.state(DFA::START).is_terminal());
        // The start state and the accepting state, which loops on end of
        // input.
        assert_eq!(2, dfa.len());
        let after_a = dfa.walk("a");
        assert_eq!(after_a, dfa.walk("b"));
    }

    #[test]
    fn maximal_runs_share_targets() {
        let dfa = dfa(&["[a-m]|[n-z]"]);
        let runs: Vec<_> =
            dfa.state(DFA::START).transitions().iter().collect();
        assert_eq!(1, runs.len());
        let (range, _) = runs[0];
        assert_eq!(('a' as i32, 'z' as i32 + 1), (range.start(), range.end()));
    }

    #[test]
    fn empty_loops_terminate() {
        let dfa = dfa(&["(a*)*b", "(?:)*"]);
        assert_eq!(vec![0], accepts(&dfa, "aaab"));
        assert_eq!(vec![1], accepts(&dfa, ""));
    }

    #[test]
    fn end_of_input_anchor() {
        let dfa = dfa(&["a$", "ab"]);
        assert_eq!(vec![0], accepts(&dfa, "a"));
        assert_eq!(vec![1], accepts(&dfa, "ab"));
        let after_a = dfa.walk("a").unwrap();
        assert!(!dfa.state(after_a).is_terminal());
    }

    #[test]
    fn domains_union() {
        let dfa = dfa(&["[a-z]+", "foo", "f.o"]);
        assert_eq!(vec![0, 1, 2], accepts(&dfa, "foo"));
        assert_eq!(vec![0, 2], accepts(&dfa, "fao"));
        assert_eq!(vec![0], accepts(&dfa, "fooo"));
    }

    #[test]
    fn reluctant_requires_every_contributor() {
        let dfa = dfa(&["a+?"]);
        let after_a = dfa.walk("a").unwrap();
        let t = dfa.state(after_a).transitions().get('a' as i32).unwrap();
        assert!(t.is_reluctant());
        assert_eq!(after_a, t.target());

        let dfa = self::dfa(&["a+?", "a+"]);
        let after_a = dfa.walk("a").unwrap();
        let t = dfa.state(after_a).transitions().get('a' as i32).unwrap();
        assert!(!t.is_reluctant());
    }

    #[test]
    fn state_limit() {
        // The classic exponential blowup: the DFA must remember the last
        // 12 characters.
        let nfa = NFA::new(&[parse("[ab]*a[ab]{12}").unwrap()]).unwrap();
        let err = Config::new()
            .state_limit(Some(100))
            .run(&nfa)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TooManyStates { limit: 100 }));
        assert!(Config::new().state_limit(None).run(&nfa).is_ok());
    }
}
