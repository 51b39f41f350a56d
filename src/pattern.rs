/*!
The runtime interface: compiled patterns and incremental matchers.

A [`Pattern`] is an immutable, cheaply cloneable handle to a generated
[`Program`]. Every [`Matcher`] created from it owns its own position in the
program (a state, a domain and an index) and nothing else, so any number of
matchers may run over the same pattern concurrently, and forking a matcher
is a plain copy.

Matching is always anchored: a matcher begins in the start state, and every
fed character must continue a match of some pattern from there.
*/

use alloc::{sync::Arc, vec::Vec};

use crate::{
    ast::{self, Node},
    dfa::{self, DFA},
    error::BuildError,
    nfa,
    program::{self, accel, Action, DomainUpdate, Program},
    util::{
        id::{PatternID, StateID},
        EOI,
    },
};

/// The configuration used for building a [`Pattern`].
///
/// A configuration is applied to a [`Builder`] with [`Builder::configure`].
/// Options that aren't set keep the builder's current value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    state_limit: Option<Option<usize>>,
    reject_ambiguous: Option<bool>,
    accelerate: Option<bool>,
}

impl Config {
    /// Return a new default pattern configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Set the maximum number of DFA states. `None` disables the limit.
    ///
    /// This bounds the work done by subset construction on pathological
    /// patterns. When the limit is exceeded, building fails with a DFA error.
    /// The default limit is `10,000`.
    pub fn state_limit(mut self, limit: Option<usize>) -> Config {
        self.state_limit = Some(limit);
        self
    }

    /// When enabled, building fails if some input is matched by more than
    /// one pattern. The error carries the first such input that was found.
    ///
    /// When disabled (the default), the pattern given first wins.
    pub fn reject_ambiguous(mut self, yes: bool) -> Config {
        self.reject_ambiguous = Some(yes);
        self
    }

    /// Whether states that loop on themselves on almost every character
    /// should skip ahead with a vectorized search. This is enabled by
    /// default and never changes what is matched.
    pub fn accelerate(mut self, yes: bool) -> Config {
        self.accelerate = Some(yes);
        self
    }

    /// Returns the DFA state limit, as set by `state_limit`.
    pub fn get_state_limit(&self) -> Option<usize> {
        match self.state_limit {
            Some(limit) => limit,
            None => dfa::Config::new().get_state_limit(),
        }
    }

    /// Returns whether ambiguous patterns are rejected.
    pub fn get_reject_ambiguous(&self) -> bool {
        self.reject_ambiguous.unwrap_or(false)
    }

    /// Returns whether acceleration is enabled.
    pub fn get_accelerate(&self) -> bool {
        self.accelerate.unwrap_or(true)
    }

    pub(crate) fn overwrite(self, o: Config) -> Config {
        Config {
            state_limit: o.state_limit.or(self.state_limit),
            reject_ambiguous: o.reject_ambiguous.or(self.reject_ambiguous),
            accelerate: o.accelerate.or(self.accelerate),
        }
    }
}

/// A builder for compiling one or more patterns into a [`Pattern`].
///
/// # Example
///
/// ```
/// use regex_dispatch::{Builder, Config, PatternID};
///
/// let pattern = Builder::new()
///     .configure(Config::new().reject_ambiguous(true))
///     .build_many(&["[0-9]+", "[a-z]+"])?;
/// assert_eq!(Some(PatternID::must(1)), pattern.which("abc"));
///
/// let err = Builder::new()
///     .configure(Config::new().reject_ambiguous(true))
///     .build_many(&["[0-9]+", "[0-9a-f]+"])
///     .unwrap_err();
/// assert!(err.to_string().contains("all match"));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    config: Config,
    parser: ast::Parser,
    nfa: nfa::Compiler,
}

impl Builder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Builder {
        Builder {
            config: Config::default(),
            parser: ast::Parser::new(),
            nfa: nfa::Compiler::new(),
        }
    }

    /// Build a pattern from the given pattern syntax.
    pub fn build(&self, pattern: &str) -> Result<Pattern, BuildError> {
        self.build_many(&[pattern])
    }

    /// Build a single pattern matching any of the given patterns. Pattern
    /// `i` is reported with domain `PatternID(i)`.
    pub fn build_many<P: AsRef<str>>(
        &self,
        patterns: &[P],
    ) -> Result<Pattern, BuildError> {
        let mut nodes = Vec::with_capacity(patterns.len());
        for p in patterns.iter() {
            let node =
                self.parser.parse(p.as_ref()).map_err(BuildError::syntax)?;
            nodes.push(node);
        }
        self.build_from_nodes(&nodes)
    }

    /// Build a pattern from syntax trees that were built directly, for
    /// example by a routing layer assembling patterns from path segments.
    pub fn build_from_nodes(
        &self,
        nodes: &[Node],
    ) -> Result<Pattern, BuildError> {
        let nfa = self.nfa.build(nodes).map_err(BuildError::nfa)?;
        debug!(
            "compiled {} patterns into {} NFA states",
            nfa.pattern_len(),
            nfa.len()
        );
        let dfa = dfa::Config::new()
            .state_limit(self.config.get_state_limit())
            .run(&nfa)
            .map_err(BuildError::dfa)?;
        self.build_from_dfa(&dfa)
    }

    /// Build a pattern from expressions parsed by `regex-syntax`.
    ///
    /// The expressions must be parsed with Unicode mode or UTF-8 mode
    /// enabled, and must not use word boundaries or line anchors. The start
    /// and end text anchors (`\A` or `^`, and `\z` or `$`) are supported.
    #[cfg(feature = "syntax")]
    pub fn build_from_hir(
        &self,
        exprs: &[regex_syntax::hir::Hir],
    ) -> Result<Pattern, BuildError> {
        let nodes = exprs
            .iter()
            .map(Node::from_hir)
            .collect::<Result<Vec<Node>, BuildError>>()?;
        self.build_from_nodes(&nodes)
    }

    /// Generate a pattern from an already built DFA.
    pub fn build_from_dfa(&self, dfa: &DFA) -> Result<Pattern, BuildError> {
        if self.config.get_reject_ambiguous() {
            if let Some(a) = dfa::find_ambiguities(dfa).into_iter().next() {
                return Err(BuildError::ambiguous(a));
            }
        }
        let program = program::generate(dfa, self.config.get_accelerate());
        Ok(Pattern(Arc::new(program)))
    }

    /// Apply the given pattern configuration options to this builder.
    pub fn configure(&mut self, config: Config) -> &mut Builder {
        self.config = self.config.overwrite(config);
        self
    }

    /// Set the NFA configuration for this builder.
    pub fn nfa(&mut self, config: nfa::Config) -> &mut Builder {
        self.nfa.configure(config);
        self
    }

    /// Set the nesting limit of the pattern parser.
    pub fn nest_limit(&mut self, limit: u32) -> &mut Builder {
        self.parser.nest_limit(limit);
        self
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

/// A compiled set of patterns.
///
/// Cloning a pattern is cheap: the generated program is shared.
///
/// # Example
///
/// ```
/// use regex_dispatch::Pattern;
///
/// let pattern = Pattern::new("b(?:a+)r")?;
/// let mut m = pattern.matcher();
/// m.feed("baaar", 0, 5, false).end();
/// assert!(m.is_valid());
/// assert_eq!(0, m.domain().unwrap().as_usize());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Pattern(Arc<Program>);

impl Pattern {
    /// Compile a single pattern with the default configuration.
    pub fn new(pattern: &str) -> Result<Pattern, BuildError> {
        Builder::new().build(pattern)
    }

    /// Compile several patterns with the default configuration.
    pub fn new_many<P: AsRef<str>>(
        patterns: &[P],
    ) -> Result<Pattern, BuildError> {
        Builder::new().build_many(patterns)
    }

    /// Create a new matcher positioned at the start state.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher {
            program: &self.0,
            state: Some(Program::START),
            domain: None,
            index: 0,
        }
    }

    /// Returns true if some pattern matches all of `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.which(text).is_some()
    }

    /// Returns the pattern that matches all of `text`, if any. When more
    /// than one does, the one given first is returned.
    pub fn which(&self, text: &str) -> Option<PatternID> {
        let mut m = self.matcher();
        m.feed(text, 0, text.len(), false).end();
        if m.is_valid() {
            m.domain()
        } else {
            None
        }
    }

    /// Returns the number of patterns compiled into this pattern.
    pub fn pattern_len(&self) -> usize {
        self.0.pattern_len()
    }

    /// Returns the generated program.
    pub fn program(&self) -> &Program {
        &self.0
    }
}

/// An incremental matcher over a [`Pattern`].
///
/// A matcher consumes text one character at a time and tracks three things:
///
/// * its current state, which is `None` once the text can no longer match;
/// * its domain, the pattern matched by the most recent accepting state,
///   which survives a failure so that callers can fall back to the longest
///   match seen;
/// * its index, the byte offset of the first character it did not consume.
///
/// `Clone` (or [`Matcher::fork`]) produces an independent copy.
///
/// # Example
///
/// Matching path segments one at a time, and backtracking with `fork`:
///
/// ```
/// use regex_dispatch::{Pattern, PatternID};
///
/// let pattern = Pattern::new_many(&["/users", "/users/[0-9]+"])?;
/// let path = "/users/42";
/// let mut m = pattern.matcher();
/// m.feed(path, 0, 6, false);
/// let mut checkpoint = m.fork();
/// assert_eq!(Some(PatternID::must(0)), checkpoint.end().domain());
///
/// m.feed(path, 6, path.len(), false).end();
/// assert_eq!(Some(PatternID::must(1)), m.domain());
/// assert_eq!(path.len(), m.index());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Matcher<'p> {
    program: &'p Program,
    state: Option<StateID>,
    domain: Option<PatternID>,
    index: usize,
}

impl<'p> Matcher<'p> {
    /// Consume the characters of `text[from..to]`.
    ///
    /// Feeding stops early in two cases:
    ///
    /// * the next character has no transition: the matcher becomes invalid
    ///   and its index points at that character;
    /// * `reluctant_stop` is true, the current state accepts and the next
    ///   character would continue a reluctant repetition only: the matcher
    ///   stays valid and its index points at that character.
    ///
    /// Feeding an invalid matcher does nothing except setting its index to
    /// `from`.
    ///
    /// # Panics
    ///
    /// This panics if `from..to` is not a valid range of character
    /// boundaries in `text`.
    pub fn feed(
        &mut self,
        text: &str,
        from: usize,
        to: usize,
        reluctant_stop: bool,
    ) -> &mut Matcher<'p> {
        let text = &text[..to];
        assert!(text.is_char_boundary(from), "invalid start offset {}", from);
        self.index = from;
        let mut sid = match self.state {
            None => return self,
            Some(sid) => sid,
        };
        let mut at = from;
        while at < to {
            let code = self.program.state(sid);
            if let Some(accel) = code.accel() {
                at = accel::find_fwd(accel.needles(), text.as_bytes(), at)
                    .unwrap_or(to);
                if at >= to {
                    break;
                }
            }
            let ch = match text[at..].chars().next() {
                None => break,
                Some(ch) => ch,
            };
            match self.program.dispatch(sid, ch as i32) {
                Action::Fail => {
                    self.state = None;
                    self.index = at;
                    return self;
                }
                Action::Goto { next, domain, reluctant } => {
                    if reluctant && reluctant_stop && code.is_terminal() {
                        break;
                    }
                    self.update_domain(domain);
                    sid = next;
                    at += ch.len_utf8();
                }
            }
        }
        self.state = Some(sid);
        self.index = at;
        self
    }

    /// Apply the end of input transition of the current state, if the
    /// matcher is still valid. This finalizes the domain: afterwards, a
    /// valid matcher with a domain has matched all of the fed text.
    pub fn end(&mut self) -> &mut Matcher<'p> {
        let sid = match self.state {
            None => return self,
            Some(sid) => sid,
        };
        match self.program.dispatch(sid, EOI) {
            Action::Fail => self.state = None,
            Action::Goto { next, domain, .. } => {
                self.update_domain(domain);
                self.state = Some(next);
            }
        }
        self
    }

    /// Returns true if the fed text can still be part of a match.
    pub fn is_valid(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the most recently matched pattern, if any.
    pub fn domain(&self) -> Option<PatternID> {
        self.domain
    }

    /// Returns the current state, or `None` if the matcher is invalid.
    pub fn state(&self) -> Option<StateID> {
        self.state
    }

    /// Returns the byte offset at which the last call to `feed` stopped.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move back to the start state and forget the domain. The index is
    /// left as it is.
    pub fn restart(&mut self) -> &mut Matcher<'p> {
        self.state = Some(Program::START);
        self.domain = None;
        self
    }

    /// Returns an independent copy of this matcher.
    pub fn fork(&self) -> Matcher<'p> {
        self.clone()
    }

    fn update_domain(&mut self, update: DomainUpdate) {
        match update {
            DomainUpdate::Keep => {}
            DomainUpdate::Set(pid) => self.domain = Some(pid),
            DomainUpdate::Clear => self.domain = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(pattern: &Pattern, text: &str) -> Option<usize> {
        pattern.which(text).map(|p| p.as_usize())
    }

    #[test]
    fn feed_and_end() {
        let p = Pattern::new("abc").unwrap();
        let mut m = p.matcher();
        m.feed("abc", 0, 3, false);
        assert!(m.is_valid());
        assert_eq!(3, m.index());
        assert_eq!(Some(PatternID::must(0)), m.domain());
        m.end();
        assert!(m.is_valid());
        assert_eq!(Some(PatternID::must(0)), m.domain());
    }

    #[test]
    fn failure_keeps_domain() {
        let p = Pattern::new("abc").unwrap();
        let mut m = p.matcher();
        m.feed("abcd", 0, 4, false);
        assert!(!m.is_valid());
        assert_eq!(3, m.index());
        assert_eq!(Some(PatternID::must(0)), m.domain());
        assert_eq!(None, m.state());
        // Feeding an invalid matcher only moves the index.
        m.feed("xyz", 1, 3, false);
        assert!(!m.is_valid());
        assert_eq!(1, m.index());
    }

    #[test]
    fn substrings() {
        let p = Pattern::new("[0-9]+").unwrap();
        let mut m = p.matcher();
        m.feed("id=123;", 3, 6, false).end();
        assert!(m.is_valid());
        assert_eq!(6, m.index());
        assert_eq!(Some(PatternID::must(0)), m.domain());
    }

    #[test]
    fn multi_byte_characters() {
        let p = Pattern::new("é+ü").unwrap();
        assert!(p.is_match("ééü"));
        let mut m = p.matcher();
        m.feed("ééx", 0, 5, false);
        assert!(!m.is_valid());
        assert_eq!(4, m.index());
    }

    #[test]
    fn end_of_input_anchor() {
        let p = Pattern::new_many(&["ab$", "abc"]).unwrap();
        assert_eq!(Some(0), domain(&p, "ab"));
        assert_eq!(Some(1), domain(&p, "abc"));
        let mut m = p.matcher();
        m.feed("ab", 0, 2, false);
        assert_eq!(None, m.domain());
        m.end();
        assert_eq!(Some(PatternID::must(0)), m.domain());
    }

    #[test]
    fn reluctant_stop() {
        let lazy = Pattern::new("a+?").unwrap();
        let greedy = Pattern::new("a+").unwrap();

        let mut m = lazy.matcher();
        m.feed("aaa", 0, 3, true);
        assert!(m.is_valid());
        assert_eq!(1, m.index());
        assert_eq!(Some(PatternID::must(0)), m.domain());

        let mut m = greedy.matcher();
        m.feed("aaa", 0, 3, true);
        assert_eq!(3, m.index());

        // Without the stop, reluctance changes nothing.
        let mut m = lazy.matcher();
        m.feed("aaa", 0, 3, false).end();
        assert_eq!(3, m.index());
        assert_eq!(Some(PatternID::must(0)), m.domain());
    }

    #[test]
    fn restart_and_fork() {
        let p = Pattern::new("[a-z]+").unwrap();
        let mut m = p.matcher();
        m.feed("ab1", 0, 3, false);
        assert!(!m.is_valid());
        m.restart();
        assert!(m.is_valid());
        assert_eq!(None, m.domain());
        assert_eq!(Some(Program::START), m.state());

        m.feed("ab", 0, 2, false);
        let mut fork = m.fork();
        fork.feed("cd1", 0, 3, false);
        assert!(!fork.is_valid());
        assert!(m.is_valid());
        assert_eq!(2, m.index());
    }

    #[test]
    fn acceleration_agrees() {
        let patterns = &["/[^/]*/x", r#""[^"\\]*""#, "<[^>]*>?"];
        let texts = &[
            "/abc/x",
            "/abc/y",
            "/abc",
            r#""hello""#,
            r#""hel\lo""#,
            "<tag>",
            "<tag",
            "",
        ];
        for &accelerate in &[true, false] {
            let p = Builder::new()
                .configure(Config::new().accelerate(accelerate))
                .build_many(patterns)
                .unwrap();
            assert_eq!(Some(0), domain(&p, "/abc/x"));
            assert_eq!(Some(1), domain(&p, r#""hello""#));
            assert_eq!(Some(2), domain(&p, "<tag>"));
            assert_eq!(Some(2), domain(&p, "<tag"));
            assert_eq!(None, domain(&p, "/abc/y"));
        }
        let fast = Pattern::new_many(patterns).unwrap();
        let slow = Builder::new()
            .configure(Config::new().accelerate(false))
            .build_many(patterns)
            .unwrap();
        for text in texts {
            for end in 0..=text.len() {
                let (mut a, mut b) = (fast.matcher(), slow.matcher());
                a.feed(text, 0, end, false);
                b.feed(text, 0, end, false);
                assert_eq!(
                    (a.is_valid(), a.domain(), a.index()),
                    (b.is_valid(), b.domain(), b.index()),
                    "text {:?} up to {}",
                    text,
                    end
                );
            }
        }
    }

    #[test]
    fn config() {
        let c = Config::new();
        assert_eq!(Some(10_000), c.get_state_limit());
        assert!(!c.get_reject_ambiguous());
        assert!(c.get_accelerate());
        let c = c.overwrite(Config::new().state_limit(None));
        assert_eq!(None, c.get_state_limit());
        let c = c.overwrite(Config::new().accelerate(false));
        assert_eq!(None, c.get_state_limit());
        assert!(!c.get_accelerate());
    }

    #[test]
    fn matchers_are_send() {
        fn assert_send<T: Send + Sync>() {}
        assert_send::<Pattern>();
        assert_send::<Matcher<'static>>();
    }
}
