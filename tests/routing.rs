use std::error::Error;

use regex_dispatch::{
    ast::{Node, Parser},
    util::range_set::CharRangeSet,
    Builder, Pattern, PatternID,
};

/// A path parameter matching one segment: at least one character, none of
/// which is a slash.
fn segment() -> Node {
    let mut set = CharRangeSet::all_chars();
    set.clear('/' as i32, '/' as i32 + 1);
    Node::one_or_more(Node::char_set(set))
}

/// Build a pattern for a route like `/users/{}/posts`, where every `{}` is
/// a segment parameter.
fn route(template: &str) -> Node {
    let mut nodes = vec![];
    for (i, part) in template.split("{}").enumerate() {
        if i > 0 {
            nodes.push(segment());
        }
        nodes.push(Node::text(part));
    }
    Node::concat(nodes)
}

/// Find the longest prefix of `path` that ends at a segment boundary and
/// matches a route, checking every segment boundary with a forked matcher.
fn longest_route(
    pattern: &Pattern,
    path: &str,
) -> Option<(PatternID, usize)> {
    let mut m = pattern.matcher();
    let mut best = None;
    let mut at = 0;
    while at < path.len() {
        let next =
            path[at + 1..].find('/').map_or(path.len(), |i| at + 1 + i);
        m.feed(path, at, next, false);
        if !m.is_valid() {
            break;
        }
        if let Some(pid) = m.fork().end().domain() {
            best = Some((pid, next));
        }
        at = next;
    }
    best
}

fn routes() -> Result<Pattern, Box<dyn Error>> {
    let nodes = vec![
        route("/"),
        route("/users"),
        route("/users/{}"),
        route("/users/{}/posts"),
        route("/users/{}/posts/{}"),
        route("/static/{}.css"),
    ];
    Ok(Builder::new().build_from_nodes(&nodes)?)
}

#[test]
fn exact_routes() -> Result<(), Box<dyn Error>> {
    let pattern = routes()?;
    let which = |path: &str| pattern.which(path).map(|p| p.as_usize());
    assert_eq!(Some(0), which("/"));
    assert_eq!(Some(1), which("/users"));
    assert_eq!(Some(2), which("/users/42"));
    assert_eq!(Some(3), which("/users/42/posts"));
    assert_eq!(Some(4), which("/users/42/posts/7"));
    assert_eq!(Some(5), which("/static/site.css"));
    assert_eq!(None, which("/users/"));
    assert_eq!(None, which("/users/42/comments"));
    assert_eq!(None, which("/static/site.js"));
    Ok(())
}

#[test]
fn longest_prefix() -> Result<(), Box<dyn Error>> {
    let pattern = routes()?;
    let longest = |path: &str| {
        longest_route(&pattern, path).map(|(p, end)| (p.as_usize(), end))
    };
    assert_eq!(Some((3, 15)), longest("/users/42/posts"));
    assert_eq!(Some((2, 9)), longest("/users/42/comments"));
    assert_eq!(Some((1, 6)), longest("/users"));
    assert_eq!(Some((4, 20)), longest("/users/abc/posts/xyz/extra"));
    assert_eq!(None, longest("/nothing/here"));
    Ok(())
}

#[test]
fn reluctant_parameter() -> Result<(), Box<dyn Error>> {
    // With reluctant stops, feeding ends as soon as the suffix matched and
    // only the parameter itself could go on.
    let lazy = Builder::new()
        .build_from_nodes(&[Parser::new().parse(r"[^/]+?\.css")?])?;
    let greedy = Builder::new()
        .build_from_nodes(&[Parser::new().parse(r"[^/]+\.css")?])?;
    let text = "main.cssx";

    let mut m = lazy.matcher();
    m.feed(text, 0, text.len(), true);
    assert!(m.is_valid());
    assert_eq!(8, m.index());
    assert_eq!(Some(PatternID::must(0)), m.domain());

    let mut m = greedy.matcher();
    m.feed(text, 0, text.len(), true);
    assert!(m.is_valid());
    assert_eq!(9, m.index());
    assert_eq!(None, m.domain());
    Ok(())
}
