/*!
Thompson construction of an [`NFA`] from AST nodes.

Every AST node compiles to a [`ThompsonRef`]: a pair of states such that
matching the node means getting from `start` to `end`. Sub-automata are
wired together with epsilon transitions through [`Compiler::patch`].
*/

use core::{cell::RefCell, mem};

use alloc::{vec, vec::Vec};

use crate::{
    ast::{Capture, Node, Repetition},
    nfa::{Error, GroupMarker, State, Transition, NFA},
    util::{
        id::{PatternID, StateID},
        range_set::CharRangeSet,
    },
};

/// The configuration used for compiling AST nodes into an NFA.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    pattern_limit: Option<usize>,
    state_limit: Option<usize>,
}

impl Config {
    /// Return a new default NFA compiler configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Set the maximum number of patterns that may be compiled into a
    /// single NFA. By default, this is only bounded by
    /// [`PatternID::LIMIT`].
    pub fn pattern_limit(mut self, limit: usize) -> Config {
        self.pattern_limit = Some(limit);
        self
    }

    /// Set the maximum number of NFA states. Counted repetitions are unrolled,
    /// so a pattern like `(a{100}){100}` needs on the order of ten thousand
    /// states. The default limit is `100,000`. A limit is never larger than
    /// [`StateID::LIMIT`].
    pub fn state_limit(mut self, limit: usize) -> Config {
        self.state_limit = Some(limit);
        self
    }

    /// Returns the pattern limit, as set by `pattern_limit`.
    pub fn get_pattern_limit(&self) -> usize {
        self.pattern_limit.unwrap_or(PatternID::LIMIT).min(PatternID::LIMIT)
    }

    /// Returns the state limit, as set by `state_limit`.
    pub fn get_state_limit(&self) -> usize {
        self.state_limit.unwrap_or(100_000).min(StateID::LIMIT)
    }

    pub(crate) fn overwrite(self, o: Config) -> Config {
        Config {
            pattern_limit: o.pattern_limit.or(self.pattern_limit),
            state_limit: o.state_limit.or(self.state_limit),
        }
    }
}

/// A compiler from AST nodes to an NFA.
///
/// Compiling several nodes at once produces a single NFA in which node `i`
/// accepts with domain `PatternID(i)`.
#[derive(Clone, Debug)]
pub struct Compiler {
    config: Config,
    states: RefCell<Vec<State>>,
}

/// The start and end states of a compiled sub-automaton.
#[derive(Clone, Copy, Debug)]
struct ThompsonRef {
    start: StateID,
    end: StateID,
}

impl Compiler {
    /// Create a new compiler with the default configuration.
    pub fn new() -> Compiler {
        Compiler { config: Config::default(), states: RefCell::new(vec![]) }
    }

    /// Apply the given configuration options to this compiler.
    pub fn configure(&mut self, config: Config) -> &mut Compiler {
        self.config = self.config.overwrite(config);
        self
    }

    /// Compile the given nodes into a single NFA.
    pub fn build(&self, nodes: &[Node]) -> Result<NFA, Error> {
        if nodes.is_empty() {
            return Err(Error::no_patterns());
        }
        let limit = self.config.get_pattern_limit();
        if nodes.len() > limit {
            return Err(Error::too_many_patterns(nodes.len(), limit));
        }
        self.states.borrow_mut().clear();

        let start = self.add_empty()?;
        debug_assert_eq!(NFA::START, start);
        for (i, node) in nodes.iter().enumerate() {
            let pid = PatternID::new_unchecked(i);
            let compiled = self.compile(node, false)?;
            let accept = self.add_accept(pid)?;
            self.patch(start, compiled.start);
            self.patch(compiled.end, accept);
        }
        let states = mem::take(&mut *self.states.borrow_mut());
        debug!(
            "compiled NFA with {} states for {} patterns",
            states.len(),
            nodes.len()
        );
        Ok(NFA::from_parts(states, nodes.len()))
    }

    /// Compile a single node. When `reluctant` is true, every transition
    /// that consumes input is marked reluctant.
    fn compile(
        &self,
        node: &Node,
        reluctant: bool,
    ) -> Result<ThompsonRef, Error> {
        match *node {
            Node::Empty => self.c_empty(),
            Node::EndOfInput => self.c_set(CharRangeSet::eoi(), reluctant),
            Node::Text(ref text) => self.c_text(text, reluctant),
            Node::CharSet(ref set) => self.c_set(set.clone(), reluctant),
            Node::Concat(ref nodes) => self.c_concat(
                nodes.iter().map(|node| self.compile(node, reluctant)),
            ),
            Node::OneOf(ref first, ref second) => {
                self.c_alternation(first, second, reluctant)
            }
            Node::Repeat(ref rep) => self.c_repetition(rep, reluctant),
            Node::CapturingGroup(ref cap) => self.c_capture(cap, reluctant),
        }
    }

    fn c_empty(&self) -> Result<ThompsonRef, Error> {
        let id = self.add_empty()?;
        Ok(ThompsonRef { start: id, end: id })
    }

    fn c_set(
        &self,
        set: CharRangeSet,
        reluctant: bool,
    ) -> Result<ThompsonRef, Error> {
        let start = self.add_empty()?;
        let end = self.add_empty()?;
        self.add_transition(start, Transition {
            target: end,
            set: Some(set),
            reluctant,
            group: None,
        });
        Ok(ThompsonRef { start, end })
    }

    /// A chain of single character transitions. The empty string compiles
    /// to a single state.
    fn c_text(
        &self,
        text: &str,
        reluctant: bool,
    ) -> Result<ThompsonRef, Error> {
        let start = self.add_empty()?;
        let mut end = start;
        for ch in text.chars() {
            let next = self.add_empty()?;
            self.add_transition(end, Transition {
                target: next,
                set: Some(CharRangeSet::single(ch)),
                reluctant,
                group: None,
            });
            end = next;
        }
        Ok(ThompsonRef { start, end })
    }

    fn c_concat<I>(&self, mut it: I) -> Result<ThompsonRef, Error>
    where
        I: Iterator<Item = Result<ThompsonRef, Error>>,
    {
        let ThompsonRef { start, mut end } = match it.next() {
            Some(result) => result?,
            None => return self.c_empty(),
        };
        for result in it {
            let compiled = result?;
            self.patch(end, compiled.start);
            end = compiled.end;
        }
        Ok(ThompsonRef { start, end })
    }

    fn c_alternation(
        &self,
        first: &Node,
        second: &Node,
        reluctant: bool,
    ) -> Result<ThompsonRef, Error> {
        let union = self.add_empty()?;
        let first = self.compile(first, reluctant)?;
        let second = self.compile(second, reluctant)?;
        let end = self.add_empty()?;
        self.patch(union, first.start);
        self.patch(union, second.start);
        self.patch(first.end, end);
        self.patch(second.end, end);
        Ok(ThompsonRef { start: union, end })
    }

    /// Unrolls the mandatory copies of the repeated node, followed by either
    /// a loop (unbounded) or a chain of optional copies that may each bypass
    /// the rest of the chain (bounded).
    fn c_repetition(
        &self,
        rep: &Repetition,
        reluctant: bool,
    ) -> Result<ThompsonRef, Error> {
        if let Some(max) = rep.max {
            if max < rep.min {
                return Err(Error::invalid_repetition(rep.min, max));
            }
        }
        let optional_reluctant = reluctant || rep.reluctant;
        let prefix = self.c_exactly(&rep.node, rep.min, reluctant)?;
        match rep.max {
            None => {
                let lp = self.add_empty()?;
                let body = self.compile(&rep.node, optional_reluctant)?;
                self.patch(prefix.end, lp);
                self.patch(lp, body.start);
                self.patch(body.end, lp);
                Ok(ThompsonRef { start: prefix.start, end: lp })
            }
            Some(max) => {
                let exit = self.add_empty()?;
                let mut end = prefix.end;
                for _ in rep.min..max {
                    let body = self.compile(&rep.node, optional_reluctant)?;
                    self.patch(end, body.start);
                    self.patch(end, exit);
                    end = body.end;
                }
                self.patch(end, exit);
                Ok(ThompsonRef { start: prefix.start, end: exit })
            }
        }
    }

    fn c_exactly(
        &self,
        node: &Node,
        n: u32,
        reluctant: bool,
    ) -> Result<ThompsonRef, Error> {
        self.c_concat((0..n).map(|_| self.compile(node, reluctant)))
    }

    fn c_capture(
        &self,
        cap: &Capture,
        reluctant: bool,
    ) -> Result<ThompsonRef, Error> {
        let start = self.add_empty()?;
        let body = self.compile(&cap.node, reluctant)?;
        let end = self.add_empty()?;
        self.add_transition(start, Transition {
            target: body.start,
            set: None,
            reluctant: false,
            group: Some(GroupMarker::Start(cap.group.clone())),
        });
        self.add_transition(body.end, Transition {
            target: end,
            set: None,
            reluctant: false,
            group: Some(GroupMarker::End(cap.group.clone())),
        });
        Ok(ThompsonRef { start, end })
    }

    /// Add an unmarked epsilon transition from `from` to `to`.
    fn patch(&self, from: StateID, to: StateID) {
        self.add_transition(from, Transition {
            target: to,
            set: None,
            reluctant: false,
            group: None,
        });
    }

    fn add_transition(&self, from: StateID, transition: Transition) {
        self.states.borrow_mut()[from].transitions.push(transition);
    }

    fn add_empty(&self) -> Result<StateID, Error> {
        self.add_state(State::default())
    }

    /// Add the accepting state for the given pattern. Accepting states loop
    /// on end of input, so that a matcher sitting in one still accepts after
    /// `end()`.
    fn add_accept(&self, pid: PatternID) -> Result<StateID, Error> {
        let id = self.add_state(State {
            domain: Some(pid),
            transitions: vec![],
        })?;
        self.add_transition(id, Transition {
            target: id,
            set: Some(CharRangeSet::eoi()),
            reluctant: false,
            group: None,
        });
        Ok(id)
    }

    fn add_state(&self, state: State) -> Result<StateID, Error> {
        let mut states = self.states.borrow_mut();
        let limit = self.config.get_state_limit();
        if states.len() >= limit {
            return Err(Error::too_many_states(states.len() + 1, limit));
        }
        let id = StateID::new_unchecked(states.len());
        states.push(state);
        Ok(id)
    }
}

impl Default for Compiler {
    fn default() -> Compiler {
        Compiler::new()
    }
}
