/*!
This crate compiles sets of regular expressions into deterministic finite
automata and generates table driven code that matches them incrementally,
one character at a time.

The pipeline has four stages, each of which is exposed as its own module:

* [`ast`] defines the syntax tree of a pattern and a recursive descent parser
  for it. Syntax trees may also be built directly, or translated from
  `regex-syntax` expressions when the `syntax` feature is enabled.
* [`nfa`] compiles one or more syntax trees into a Thompson NFA. Each pattern
  accepts with its own *domain*, which is its index in the pattern set.
* [`dfa`] determinizes the NFA by subset construction. A DFA state records
  every domain that accepts in it, and [`dfa::find_ambiguities`] reports the
  states where more than one does, along with an input reaching them.
* [`program`] reorders the DFA's states and generates dispatch code for each
  of them: an exact lookup table for single characters and a binary search
  over the boundaries of character ranges.

A [`Pattern`] wraps a generated program, and a [`Matcher`] runs it. Matchers
support feeding arbitrary substrings of text, finishing with an end of input
step, restarting and forking. These are the building blocks of a path router
that splits a path into segments with longest match and backtracking.

# Example

```
use regex_dispatch::{Pattern, PatternID};

let pattern = Pattern::new_many(&["/users/[0-9]+", "/users/[a-z]+"])?;
assert_eq!(Some(PatternID::must(0)), pattern.which("/users/42"));
assert_eq!(Some(PatternID::must(1)), pattern.which("/users/me"));
assert_eq!(None, pattern.which("/users/"));

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Incremental matching

A matcher remembers the last pattern it matched even after the input stops
matching, so the longest match can be found in a single pass:

```
use regex_dispatch::{Pattern, PatternID};

let pattern = Pattern::new_many(&["[a-z]+", "[a-z]+/"])?;
let text = "abc/def";
let mut m = pattern.matcher();
m.feed(text, 0, text.len(), false);
assert!(!m.is_valid());
// The longest match is "abc/", which ends where matching failed.
assert_eq!(Some(PatternID::must(1)), m.domain());
assert_eq!(4, m.index());

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Crate features

* **std** - Enables `std::error::Error` implementations and lets `memchr` use
  the standard library. Without it, this crate only requires `alloc`.
* **syntax** - Enables [`Builder::build_from_hir`] and
  [`ast::Node::from_hir`], which translate `regex-syntax` expressions.
* **logging** - Emits `log` messages summarizing each compilation stage.
*/

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use crate::{
    error::{BuildError, BuildErrorKind},
    pattern::{Builder, Config, Matcher, Pattern},
    util::id::{PatternID, StateID},
};

#[macro_use]
mod macros;

pub mod ast;
pub mod dfa;
mod error;
pub mod nfa;
mod pattern;
pub mod program;
pub mod util;
