/*!
An interval set over the point domain.

A [`CharRangeSet`] is used to label NFA transitions and to represent
character classes in the AST. It is stored as a sorted sequence of disjoint
half open ranges. Adjacent ranges are always merged, so any two sets
containing the same points have identical representations and can be
compared or hashed directly.
*/

use core::fmt;

use alloc::vec::Vec;

use crate::util::{check_range, point_char, DebugPoint, END, EOI};

/// The surrogate code points `[U+D800, U+E000)`.
const SURROGATES: (i32, i32) = (0xD800, 0xE000);

/// A half open range `[start, end)` of points.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct CharRange {
    start: i32,
    end: i32,
}

impl CharRange {
    /// Create a new half open range.
    ///
    /// # Panics
    ///
    /// This panics if `start > end` or if either bound lies outside the
    /// domain `[EOI, END]`.
    pub fn new(start: i32, end: i32) -> CharRange {
        check_range(start, end);
        CharRange { start, end }
    }

    /// The first point in this range.
    #[inline]
    pub fn start(&self) -> i32 {
        self.start
    }

    /// One past the last point in this range.
    #[inline]
    pub fn end(&self) -> i32 {
        self.end
    }

    /// The number of points in this range.
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, point: i32) -> bool {
        self.start <= point && point < self.end
    }
}

impl fmt::Debug for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.len() == 1 {
            write!(f, "{:?}", DebugPoint(self.start))
        } else {
            write!(
                f,
                "{:?}-{:?}",
                DebugPoint(self.start),
                DebugPoint(self.end - 1)
            )
        }
    }
}

/// A set of points represented as sorted, disjoint and maximal ranges.
///
/// Every mutating operation accepts a half open range `[start, end)` where
/// `EOI <= start <= end <= END`. An empty range is always a no-op. Ranges
/// that violate these bounds are caller bugs and cause a panic.
///
/// # Example
///
/// ```
/// use regex_dispatch::util::range_set::CharRangeSet;
///
/// let mut set = CharRangeSet::new();
/// set.set('a' as i32, 'z' as i32 + 1);
/// set.clear('m' as i32, 'n' as i32);
/// assert!(set.contains('a' as i32));
/// assert!(!set.contains('m' as i32));
/// assert_eq!(2, set.ranges().len());
/// ```
#[derive(Clone, Default, Eq, Hash, PartialEq)]
pub struct CharRangeSet {
    ranges: Vec<CharRange>,
}

impl CharRangeSet {
    /// Create a new empty set.
    pub fn new() -> CharRangeSet {
        CharRangeSet::default()
    }

    /// Create a set containing every code point, but not `EOI`.
    pub fn all_chars() -> CharRangeSet {
        CharRangeSet::from_range(0, END)
    }

    /// Create a set containing only the end-of-input point.
    pub fn eoi() -> CharRangeSet {
        CharRangeSet::from_range(EOI, EOI + 1)
    }

    /// Create a set containing exactly one character.
    pub fn single(ch: char) -> CharRangeSet {
        let point = ch as i32;
        CharRangeSet::from_range(point, point + 1)
    }

    /// Create a set containing the closed range of characters `[start,
    /// end]`. The bounds are swapped if they are out of order.
    pub fn char_range(start: char, end: char) -> CharRangeSet {
        let (start, end) =
            if start <= end { (start, end) } else { (end, start) };
        CharRangeSet::from_range(start as i32, end as i32 + 1)
    }

    /// Create a set containing the half open range `[start, end)`.
    pub fn from_range(start: i32, end: i32) -> CharRangeSet {
        let mut set = CharRangeSet::new();
        set.set(start, end);
        set
    }

    /// Returns true if this set contains no points.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the maximal ranges in this set in ascending order.
    pub fn ranges(&self) -> &[CharRange] {
        &self.ranges
    }

    /// Returns the total number of points in this set.
    pub fn point_len(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    /// If this set contains exactly one point, return it.
    pub fn as_single_point(&self) -> Option<i32> {
        match self.ranges.as_slice() {
            [r] if r.len() == 1 => Some(r.start),
            _ => None,
        }
    }

    /// If this set contains exactly one character, return it.
    pub fn as_single_char(&self) -> Option<char> {
        self.as_single_point().and_then(point_char)
    }

    /// Returns true if this set contains the given point.
    pub fn contains(&self, point: i32) -> bool {
        let i = self.ranges.partition_point(|r| r.end <= point);
        i < self.ranges.len() && self.ranges[i].start <= point
    }

    /// Add every point in `[start, end)` to this set.
    pub fn set(&mut self, start: i32, end: i32) -> &mut CharRangeSet {
        check_range(start, end);
        if start == end {
            return self;
        }
        // Every range that overlaps or touches [start, end) gets absorbed.
        let lo = self.ranges.partition_point(|r| r.end < start);
        let hi = self.ranges.partition_point(|r| r.start <= end);
        let mut merged = CharRange { start, end };
        if lo < hi {
            merged.start = merged.start.min(self.ranges[lo].start);
            merged.end = merged.end.max(self.ranges[hi - 1].end);
        }
        self.ranges.splice(lo..hi, core::iter::once(merged));
        self
    }

    /// Remove every point in `[start, end)` from this set.
    pub fn clear(&mut self, start: i32, end: i32) -> &mut CharRangeSet {
        check_range(start, end);
        if start == end {
            return self;
        }
        let lo = self.ranges.partition_point(|r| r.end <= start);
        let hi = self.ranges.partition_point(|r| r.start < end);
        if lo >= hi {
            return self;
        }
        let (first, last) = (self.ranges[lo], self.ranges[hi - 1]);
        let mut remnants = Vec::with_capacity(2);
        if first.start < start {
            remnants.push(CharRange { start: first.start, end: start });
        }
        if last.end > end {
            remnants.push(CharRange { start: end, end: last.end });
        }
        self.ranges.splice(lo..hi, remnants);
        self
    }

    /// Flip the presence of every point in `[start, end)`. Points outside of
    /// the range are untouched.
    pub fn invert(&mut self, start: i32, end: i32) -> &mut CharRangeSet {
        check_range(start, end);
        if start == end {
            return self;
        }
        let gaps = self.gaps(start, end);
        self.clear(start, end);
        for gap in gaps {
            self.set(gap.start, gap.end);
        }
        self
    }

    /// Add every point in `other` to this set.
    pub fn unite(&mut self, other: &CharRangeSet) -> &mut CharRangeSet {
        for r in other.ranges.iter() {
            self.set(r.start, r.end);
        }
        self
    }

    /// Remove every point from this set that is not in `other`.
    pub fn intersect(&mut self, other: &CharRangeSet) -> &mut CharRangeSet {
        let mut result: Vec<CharRange> = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let (a, b) = (self.ranges[i], other.ranges[j]);
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start < end {
                result.push(CharRange { start, end });
            }
            if a.end <= b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        self.ranges = result;
        self
    }

    /// Settle membership of the surrogate code points, which can never occur
    /// in a `&str`, from their neighbors: the whole surrogate block is in
    /// the set if both `U+D7FF` and `U+E000` are, and out of it otherwise.
    ///
    /// Afterwards no range of this set starts or ends inside the block, so
    /// every range boundary is a `char`.
    pub fn canonicalize_surrogates(&mut self) -> &mut CharRangeSet {
        let (start, end) = SURROGATES;
        if self.contains(start - 1) && self.contains(end) {
            self.set(start, end)
        } else {
            self.clear(start, end)
        }
    }

    /// Returns the sorted points strictly inside the domain at which
    /// membership changes.
    pub fn toggle_points(&self) -> Vec<i32> {
        let mut points = Vec::with_capacity(2 * self.ranges.len());
        for r in self.ranges.iter() {
            if r.start > EOI {
                points.push(r.start);
            }
            if r.end < END {
                points.push(r.end);
            }
        }
        points
    }

    /// Returns the ranges within `[start, end)` that are not in this set.
    fn gaps(&self, start: i32, end: i32) -> Vec<CharRange> {
        let mut gaps = Vec::new();
        let mut cursor = start;
        let lo = self.ranges.partition_point(|r| r.end <= start);
        for r in self.ranges[lo..].iter().take_while(|r| r.start < end) {
            if r.start > cursor {
                gaps.push(CharRange { start: cursor, end: r.start });
            }
            cursor = cursor.max(r.end);
        }
        if cursor < end {
            gaps.push(CharRange { start: cursor, end });
        }
        gaps
    }
}

impl fmt::Debug for CharRangeSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, r) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", r)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    // The differential tests model the domain [-1, 40) with a bool array.
    const N: i32 = 40;

    fn model_range(a: u8, b: u8) -> (i32, i32) {
        let a = (a as i32 % (N + 2)) - 1;
        let b = (b as i32 % (N + 2)) - 1;
        (a.min(b), a.max(b))
    }

    fn apply(ops: &[(u8, u8, u8)]) -> (CharRangeSet, Vec<bool>) {
        let mut set = CharRangeSet::new();
        let mut model = vec![false; (N + 1) as usize];
        for &(kind, a, b) in ops {
            let (start, end) = model_range(a, b);
            let slots = &mut model[(start + 1) as usize..(end + 1) as usize];
            match kind % 3 {
                0 => {
                    set.set(start, end);
                    slots.iter_mut().for_each(|x| *x = true);
                }
                1 => {
                    set.clear(start, end);
                    slots.iter_mut().for_each(|x| *x = false);
                }
                _ => {
                    set.invert(start, end);
                    slots.iter_mut().for_each(|x| *x = !*x);
                }
            }
        }
        (set, model)
    }

    fn is_canonical(set: &CharRangeSet) -> bool {
        set.ranges().iter().all(|r| !r.is_empty())
            && set.ranges().windows(2).all(|w| w[0].end() < w[1].start())
    }

    fn agrees(set: &CharRangeSet, model: &[bool]) -> bool {
        (EOI..N).all(|p| set.contains(p) == model[(p + 1) as usize])
            && !set.contains(N)
    }

    quickcheck! {
        fn prop_matches_bool_array(ops: Vec<(u8, u8, u8)>) -> bool {
            let (set, model) = apply(&ops);
            is_canonical(&set) && agrees(&set, &model)
        }

        fn prop_unite_intersect(
            ops1: Vec<(u8, u8, u8)>,
            ops2: Vec<(u8, u8, u8)>
        ) -> bool {
            let (set1, model1) = apply(&ops1);
            let (set2, model2) = apply(&ops2);

            let mut union = set1.clone();
            union.unite(&set2);
            let union_model: Vec<bool> =
                model1.iter().zip(&model2).map(|(a, b)| *a || *b).collect();

            let mut inter = set1.clone();
            inter.intersect(&set2);
            let inter_model: Vec<bool> =
                model1.iter().zip(&model2).map(|(a, b)| *a && *b).collect();

            is_canonical(&union)
                && agrees(&union, &union_model)
                && is_canonical(&inter)
                && agrees(&inter, &inter_model)
        }

        fn prop_double_invert_is_identity(ops: Vec<(u8, u8, u8)>) -> bool {
            let (set, _) = apply(&ops);
            let mut twice = set.clone();
            twice.invert(EOI, END).invert(EOI, END);
            twice == set
        }
    }

    #[test]
    fn adjacent_ranges_merge() {
        let mut set = CharRangeSet::new();
        set.set(1, 3).set(5, 7).set(3, 5);
        assert_eq!(vec![CharRange::new(1, 7)], set.ranges().to_vec());
    }

    #[test]
    fn set_is_idempotent() {
        let mut set = CharRangeSet::new();
        set.set(10, 20);
        let before = set.clone();
        set.set(10, 20).set(12, 15);
        assert_eq!(before, set);
    }

    #[test]
    fn clear_splits_range() {
        let mut set = CharRangeSet::from_range(0, 10);
        set.clear(3, 6);
        assert_eq!(
            vec![CharRange::new(0, 3), CharRange::new(6, 10)],
            set.ranges().to_vec()
        );
    }

    #[test]
    fn invert_within_bounds() {
        let mut set = CharRangeSet::from_range(2, 4);
        set.invert(0, 6);
        assert_eq!(
            vec![CharRange::new(0, 2), CharRange::new(4, 6)],
            set.ranges().to_vec()
        );
    }

    #[test]
    fn empty_range_is_noop() {
        let mut set = CharRangeSet::from_range(2, 4);
        set.set(9, 9).clear(3, 3).invert(0, 0);
        assert_eq!(vec![CharRange::new(2, 4)], set.ranges().to_vec());
    }

    #[test]
    fn eoi_is_a_point() {
        let set = CharRangeSet::eoi();
        assert!(set.contains(EOI));
        assert!(!set.contains(0));
        assert!(!CharRangeSet::all_chars().contains(EOI));
        assert_eq!(vec![0], set.toggle_points());
    }

    #[test]
    fn single_points() {
        assert_eq!(Some('x'), CharRangeSet::single('x').as_single_char());
        assert_eq!(None, CharRangeSet::char_range('a', 'b').as_single_char());
        assert_eq!(2, CharRangeSet::char_range('b', 'a').point_len());
    }

    #[test]
    fn surrogates_follow_neighbors() {
        let mut set = CharRangeSet::all_chars();
        set.clear(0xE000, 0xE001).canonicalize_surrogates();
        assert_eq!(
            vec![CharRange::new(0, 0xD800), CharRange::new(0xE001, END)],
            set.ranges().to_vec()
        );

        let mut set = CharRangeSet::char_range('a', '\u{D7FF}');
        set.set(0xE000, 0xE002).canonicalize_surrogates();
        assert_eq!(
            vec![CharRange::new('a' as i32, 0xE002)],
            set.ranges().to_vec()
        );

        let mut set = CharRangeSet::from_range(0xD900, 0xDA00);
        set.canonicalize_surrogates();
        assert!(set.is_empty());
    }

    #[test]
    fn debug_format() {
        let mut set = CharRangeSet::char_range('a', 'z');
        set.set(EOI, EOI + 1).set('_' as i32, '_' as i32 + 1);
        assert_eq!("[EOI, _, a-z]", format!("{:?}", set));
    }

    #[test]
    #[should_panic]
    fn inverted_bounds_panic() {
        CharRangeSet::new().set(4, 2);
    }
}
