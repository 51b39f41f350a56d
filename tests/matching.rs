use std::error::Error;

use quickcheck::{quickcheck, TestResult};
use regex_dispatch::{
    ast::Node, dfa, nfa, Builder, BuildErrorKind, Config, Pattern, PatternID,
};

fn literal(text: &str) -> Pattern {
    Builder::new().build_from_nodes(&[Node::text(text)]).unwrap()
}

quickcheck! {
    fn literal_round_trip(text: String) -> TestResult {
        if text.chars().count() > 40 {
            return TestResult::discard();
        }
        let pattern = literal(&text);
        if pattern.which(&text) != Some(PatternID::must(0)) {
            return TestResult::failed();
        }
        // No proper prefix matches.
        for (i, _) in text.char_indices() {
            if pattern.is_match(&text[..i]) {
                return TestResult::failed();
            }
        }
        // Nor does any string differing in one character.
        let chars: Vec<char> = text.chars().collect();
        for i in 0..chars.len() {
            let mut changed = chars.clone();
            changed[i] = if chars[i] == 'a' { 'b' } else { 'a' };
            let changed: String = changed.into_iter().collect();
            if pattern.is_match(&changed) {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }
}

#[test]
fn alternation() -> Result<(), Box<dyn Error>> {
    let node = Node::one_of(Node::text("bar"), Node::text("baz"));
    let pattern = Builder::new().build_from_nodes(&[node])?;
    assert!(pattern.is_match("bar"));
    assert!(pattern.is_match("baz"));
    for text in &["", "b", "ba", "barz", "bax", "bazbar"] {
        assert!(!pattern.is_match(text), "{:?}", text);
    }
    Ok(())
}

#[test]
fn unbounded_repetition() -> Result<(), Box<dyn Error>> {
    let node = Node::concat(vec![
        Node::text("b"),
        Node::repeat(Node::text("a"), 1, None, false),
        Node::text("r"),
    ]);
    let pattern = Builder::new().build_from_nodes(&[node])?;
    assert!(pattern.is_match("bar"));
    assert!(pattern.is_match("baaaaaar"));
    assert!(!pattern.is_match("br"));
    assert!(!pattern.is_match("baaz"));
    Ok(())
}

#[test]
fn bounded_repetition() -> Result<(), Box<dyn Error>> {
    let pattern = Pattern::new("x(?:ab){2,3}y")?;
    assert!(!pattern.is_match("xaby"));
    assert!(pattern.is_match("xababy"));
    assert!(pattern.is_match("xabababy"));
    assert!(!pattern.is_match("xababababy"));
    Ok(())
}

#[test]
fn greedy_and_reluctant() -> Result<(), Box<dyn Error>> {
    let greedy = Pattern::new("a+")?;
    let lazy = Pattern::new("a+?")?;

    let mut m = greedy.matcher();
    m.feed("aaa", 0, 3, true);
    assert_eq!((true, 3), (m.is_valid(), m.index()));

    let mut m = lazy.matcher();
    m.feed("aaa", 0, 3, true);
    assert_eq!((true, 1), (m.is_valid(), m.index()));
    assert_eq!(Some(PatternID::must(0)), m.domain());
    // Continuing from where the reluctant match stopped.
    m.feed("aaa", m.index(), 3, false).end();
    assert_eq!(3, m.index());
    assert_eq!(Some(PatternID::must(0)), m.domain());

    // Reluctance only stops feeding in accepting states.
    let pattern = Pattern::new("a*?b")?;
    let mut m = pattern.matcher();
    m.feed("aab", 0, 3, true).end();
    assert_eq!(Some(PatternID::must(0)), m.domain());
    Ok(())
}

#[test]
fn end_of_input() -> Result<(), Box<dyn Error>> {
    let pattern = Pattern::new_many(&["ab$", "ab(?:c|$)d?"])?;
    assert_eq!(Some(PatternID::must(0)), pattern.which("ab"));
    assert_eq!(Some(PatternID::must(1)), pattern.which("abc"));
    assert_eq!(Some(PatternID::must(1)), pattern.which("abcd"));
    assert_eq!(None, pattern.which("abd"));

    // Accepting states loop on end of input, so ending twice is harmless.
    let mut m = pattern.matcher();
    m.feed("ab", 0, 2, false).end();
    assert!(m.is_valid());
    m.end();
    assert!(m.is_valid());
    assert_eq!(Some(PatternID::must(0)), m.domain());
    Ok(())
}

#[test]
fn fork_independence() -> Result<(), Box<dyn Error>> {
    let pattern = Pattern::new("[a-z]+[0-9]*")?;
    let mut m = pattern.matcher();
    m.feed("abc1", 0, 2, false);
    let before = (m.state(), m.domain(), m.index());

    let mut fork = m.fork();
    fork.feed("abc1", 2, 4, false).end();
    assert_eq!(Some(PatternID::must(0)), fork.domain());
    fork.feed("!", 0, 1, false);
    assert!(!fork.is_valid());

    assert_eq!(before, (m.state(), m.domain(), m.index()));
    Ok(())
}

#[test]
fn idempotence() -> Result<(), Box<dyn Error>> {
    let pattern = Pattern::new_many(&["[a-z]+", "[a-z]+[0-9]", "x+"])?;
    let text = "xyz9x";
    let trajectory = || {
        let mut m = pattern.matcher();
        let mut steps = vec![];
        for (i, ch) in text.char_indices() {
            m.feed(text, i, i + ch.len_utf8(), false);
            steps.push((m.state(), m.domain()));
        }
        steps
    };
    let first = trajectory();
    assert_eq!(first, trajectory());
    assert_eq!(first, trajectory());
    Ok(())
}

#[test]
fn state_limit() -> Result<(), Box<dyn Error>> {
    let result = Builder::new()
        .configure(Config::new().state_limit(Some(100)))
        .build("[ab]*a[ab]{12}");
    let err = match result {
        Ok(_) => panic!("expected the state limit to be exceeded"),
        Err(err) => err,
    };
    match err.kind() {
        BuildErrorKind::DFA(err) => assert!(matches!(
            err.kind(),
            dfa::ErrorKind::TooManyStates { limit: 100 }
        )),
        kind => panic!("unexpected error: {:?}", kind),
    }

    let pattern = Builder::new()
        .configure(Config::new().state_limit(None))
        .build("[ab]*a[ab]{12}")?;
    assert!(pattern.is_match(&format!("ba{}", "b".repeat(12))));
    assert!(!pattern.is_match(&format!("ab{}", "b".repeat(12))));
    Ok(())
}

#[test]
fn nfa_size_limit() -> Result<(), Box<dyn Error>> {
    // Counted repetitions are unrolled, so this needs a billion NFA states.
    let err = Pattern::new("(?:(?:a{1000}){1000}){1000}").unwrap_err();
    match err.kind() {
        BuildErrorKind::NFA(err) => assert!(matches!(
            err.kind(),
            nfa::ErrorKind::TooManyStates { limit: 100_000, .. }
        )),
        kind => panic!("unexpected error: {:?}", kind),
    }

    let pattern = Pattern::new("(?:a{100}){50}")?;
    assert!(pattern.is_match(&"a".repeat(5_000)));
    assert!(!pattern.is_match(&"a".repeat(4_999)));

    let result = Builder::new()
        .nfa(nfa::Config::new().state_limit(100))
        .build("a{200}");
    assert!(matches!(
        result.map_err(|err| err.kind().clone()),
        Err(BuildErrorKind::NFA(_))
    ));
    Ok(())
}

#[test]
fn syntax_errors() -> Result<(), Box<dyn Error>> {
    for &(pattern, position) in &[("a(b", 1), ("ab)", 2), ("[a-", 0)] {
        let err = Pattern::new(pattern).unwrap_err();
        assert_eq!(Some(position), err.syntax_position(), "{:?}", pattern);
    }
    Ok(())
}

#[test]
fn from_regex_syntax() -> Result<(), Box<dyn Error>> {
    let exprs = vec![
        regex_syntax::Parser::new().parse(r"foo[0-9]+\z")?,
        regex_syntax::Parser::new().parse(r"\Afoo(?:bar)*?")?,
    ];
    let pattern = Builder::new().build_from_hir(&exprs)?;
    assert_eq!(Some(PatternID::must(0)), pattern.which("foo123"));
    assert_eq!(Some(PatternID::must(1)), pattern.which("foobarbar"));
    assert_eq!(None, pattern.which("foo12x"));

    let hir = regex_syntax::Parser::new().parse(r"\bfoo")?;
    let err = Builder::new().build_from_hir(&[hir]).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::Unsupported(_)));
    Ok(())
}
