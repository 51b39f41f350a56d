/*!
A map from disjoint point ranges to values.

A [`CharRangeMap`] generalizes [`CharRangeSet`](super::range_set::CharRangeSet)
from booleans to arbitrary values. It is the representation of a DFA state's
transition table: each maximal run of points that leads to the same
transition is stored exactly once.

The map always partitions the entire domain `[EOI, END)` into runs. A run
either maps to a value or is *absent*. Absent is distinct from every value.
Adjacent runs never have equal values, which makes iteration yield maximal
runs and makes the run boundaries exactly the *toggle points* used to build
binary search dispatch code.
*/

use core::fmt;

use alloc::{vec, vec::Vec};

use crate::util::{
    check_range,
    range_set::{CharRange, CharRangeSet},
    DebugPoint, END, EOI,
};

#[derive(Clone, Eq, Hash, PartialEq)]
struct Entry<V> {
    /// The first point of this run. The run extends up to the start of the
    /// next entry, or to `END` for the last entry.
    start: i32,
    value: Option<V>,
}

/// A maximal run of points sharing the same value (or sharing absence).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Run<'a, V> {
    /// The range of points covered by this run.
    pub range: CharRange,
    /// The value mapped to every point in `range`, if any.
    pub value: Option<&'a V>,
}

/// A map from point ranges to values of type `V`, with maximal runs.
///
/// # Example
///
/// ```
/// use regex_dispatch::util::range_map::CharRangeMap;
///
/// let mut map = CharRangeMap::new();
/// map.fill(0, 10, "low");
/// map.fill(5, 20, "high");
/// assert_eq!(Some(&"low"), map.get(4));
/// assert_eq!(Some(&"high"), map.get(5));
/// assert_eq!(None, map.get(20));
/// assert_eq!(vec![0, 5, 20], map.toggle_points());
/// ```
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct CharRangeMap<V> {
    /// Never empty. The first entry always starts at EOI.
    entries: Vec<Entry<V>>,
}

impl<V: Clone + Eq> CharRangeMap<V> {
    /// Create a new map in which every point is absent.
    pub fn new() -> CharRangeMap<V> {
        CharRangeMap { entries: vec![Entry { start: EOI, value: None }] }
    }

    /// Returns the value mapped to the given point, if any.
    pub fn get(&self, point: i32) -> Option<&V> {
        if point < EOI || point >= END {
            return None;
        }
        let i = self.entries.partition_point(|e| e.start <= point) - 1;
        self.entries[i].value.as_ref()
    }

    /// Returns true if no point has a value.
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1 && self.entries[0].value.is_none()
    }

    /// Map every point in `[start, end)` to `value`, overwriting whatever was
    /// there before.
    ///
    /// # Panics
    ///
    /// This panics if the range is inverted or outside of `[EOI, END]`.
    pub fn fill(&mut self, start: i32, end: i32, value: V) {
        self.assign(start, end, Some(value));
    }

    /// Map every point in the given set to `value`.
    pub fn fill_set(&mut self, set: &CharRangeSet, value: V) {
        for r in set.ranges() {
            self.assign(r.start(), r.end(), Some(value.clone()));
        }
    }

    /// Make every point in `[start, end)` absent.
    pub fn clear(&mut self, start: i32, end: i32) {
        self.assign(start, end, None);
    }

    /// Returns every maximal run, including absent ones, in ascending order.
    /// The runs cover the entire domain.
    pub fn runs(&self) -> impl Iterator<Item = Run<'_, V>> + '_ {
        self.entries.iter().enumerate().map(move |(i, e)| {
            let end =
                self.entries.get(i + 1).map_or(END, |next| next.start);
            Run {
                range: CharRange::new(e.start, end),
                value: e.value.as_ref(),
            }
        })
    }

    /// Returns every maximal run that maps to a value, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (CharRange, &V)> + '_ {
        self.runs().filter_map(|run| run.value.map(|v| (run.range, v)))
    }

    /// Returns the number of maximal runs, including absent ones.
    pub fn run_len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the points at which the mapped value changes, in ascending
    /// order. A point `p` is a toggle point if `get(p - 1) != get(p)`.
    pub fn toggle_points(&self) -> Vec<i32> {
        self.entries[1..].iter().map(|e| e.start).collect()
    }

    /// Build a new map by applying `f` to every value. Runs that end up with
    /// equal values are merged.
    pub fn map<W: Clone + Eq, F: FnMut(&V) -> Option<W>>(
        &self,
        mut f: F,
    ) -> CharRangeMap<W> {
        let mut mapped =
            CharRangeMap { entries: Vec::with_capacity(self.entries.len()) };
        for e in self.entries.iter() {
            let value = e.value.as_ref().and_then(&mut f);
            match mapped.entries.last() {
                Some(last) if last.value == value => {}
                _ => mapped.entries.push(Entry { start: e.start, value }),
            }
        }
        mapped
    }

    fn assign(&mut self, start: i32, end: i32, value: Option<V>) {
        check_range(start, end);
        if start == end {
            return;
        }
        let i = self.split(start);
        let j = self.split(end);
        self.entries.splice(i..j, core::iter::once(Entry { start, value }));
        // Coalesce with the following run first so that 'i' stays valid.
        if i + 1 < self.entries.len()
            && self.entries[i + 1].value == self.entries[i].value
        {
            self.entries.remove(i + 1);
        }
        if i > 0 && self.entries[i - 1].value == self.entries[i].value {
            self.entries.remove(i);
        }
    }

    /// Ensure that a run starts at `point` and return the index of that run.
    /// If `point == END`, this returns the number of entries.
    fn split(&mut self, point: i32) -> usize {
        if point == END {
            return self.entries.len();
        }
        let i = self.entries.partition_point(|e| e.start <= point) - 1;
        if self.entries[i].start == point {
            return i;
        }
        let value = self.entries[i].value.clone();
        self.entries.insert(i + 1, Entry { start: point, value });
        i + 1
    }
}

impl<V: Clone + Eq> Default for CharRangeMap<V> {
    fn default() -> CharRangeMap<V> {
        CharRangeMap::new()
    }
}

impl<V: Clone + Eq + fmt::Debug> fmt::Debug for CharRangeMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut map = f.debug_map();
        for (range, value) in self.iter() {
            if range.len() == 1 {
                map.entry(&DebugPoint(range.start()), value);
            } else {
                map.entry(&range, value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    const N: i32 = 40;

    fn model_range(a: u8, b: u8) -> (i32, i32) {
        let a = (a as i32 % (N + 2)) - 1;
        let b = (b as i32 % (N + 2)) - 1;
        (a.min(b), a.max(b))
    }

    quickcheck! {
        fn prop_fill_matches_array(ops: Vec<(u8, u8, u8)>) -> bool {
            let mut map = CharRangeMap::new();
            let mut model: Vec<Option<u8>> = vec![None; (N + 1) as usize];
            for &(v, a, b) in &ops {
                let (start, end) = model_range(a, b);
                // A fifth of the operations clear instead of fill.
                let value = if v % 5 == 4 { None } else { Some(v % 4) };
                match value {
                    None => map.clear(start, end),
                    Some(v) => map.fill(start, end, v),
                }
                let (lo, hi) = ((start + 1) as usize, (end + 1) as usize);
                model[lo..hi].iter_mut().for_each(|x| *x = value);
            }
            let agrees = (EOI..N)
                .all(|p| map.get(p).copied() == model[(p + 1) as usize]);
            let runs: Vec<Run<u8>> = map.runs().collect();
            let maximal = runs.windows(2).all(|w| w[0].value != w[1].value);
            let covering = runs.first().map(|r| r.range.start()) == Some(EOI)
                && runs.last().map(|r| r.range.end()) == Some(END)
                && runs
                    .windows(2)
                    .all(|w| w[0].range.end() == w[1].range.start());
            agrees && maximal && covering && map.get(N).is_none()
        }
    }

    #[test]
    fn fill_splits_covering_run_in_three() {
        let mut map = CharRangeMap::new();
        map.fill(0, 30, 'a');
        map.fill(10, 20, 'b');
        let got: Vec<(CharRange, char)> =
            map.iter().map(|(r, v)| (r, *v)).collect();
        assert_eq!(
            vec![
                (CharRange::new(0, 10), 'a'),
                (CharRange::new(10, 20), 'b'),
                (CharRange::new(20, 30), 'a'),
            ],
            got
        );
    }

    #[test]
    fn fill_coalesces_with_equal_neighbors() {
        let mut map = CharRangeMap::new();
        map.fill(0, 10, 1);
        map.fill(20, 30, 1);
        map.fill(10, 20, 1);
        assert_eq!(1, map.iter().count());
        assert_eq!(vec![0, 30], map.toggle_points());
    }

    #[test]
    fn clear_restores_absence() {
        let mut map = CharRangeMap::new();
        map.fill(EOI, END, 7);
        map.clear(EOI, END);
        assert!(map.is_empty());
        assert_eq!(1, map.run_len());
    }

    #[test]
    fn map_merges_runs() {
        let mut map = CharRangeMap::new();
        map.fill(0, 10, 1);
        map.fill(10, 20, 2);
        map.fill(20, 30, 3);
        let parity = map.map(|v| Some(v % 2));
        assert_eq!(vec![0, 10, 20, 30], parity.toggle_points());
        let all = map.map(|_| Some(()));
        assert_eq!(vec![0, 30], all.toggle_points());
        let none = map.map(|_| None::<()>);
        assert!(none.is_empty());
    }

    #[test]
    fn fill_set() {
        let mut set = CharRangeSet::char_range('0', '9');
        set.set(EOI, EOI + 1);
        let mut map = CharRangeMap::new();
        map.fill_set(&set, "digit");
        assert_eq!(Some(&"digit"), map.get(EOI));
        assert_eq!(Some(&"digit"), map.get('5' as i32));
        assert_eq!(None, map.get('a' as i32));
    }
}
