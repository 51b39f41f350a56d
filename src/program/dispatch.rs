/*!
Per-state dispatch code.

The dispatch code for a state maps every point to an [`Action`]. It is
generated from the state's transition map in two parts:

* an *exact* table of single points that have a run of their own, searched
  first;
* a balanced binary search *tree* over the boundaries of the remaining runs.
  Each [`Inst::Split`] compares the point against a pivot boundary and
  continues with the instruction right after it (below the pivot) or at its
  `high` index (at or above the pivot).

Points in the exact table are folded into a neighbouring run before building
the tree, so the tree only branches on runs that span more than one point.
*/

use core::fmt;

use alloc::{boxed::Box, vec, vec::Vec};

use crate::{
    program::Action,
    util::{range_map::CharRangeMap, DebugPoint, EOI},
};

/// A single instruction of a dispatch tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Inst {
    /// Continue with the next instruction if the point is less than `pivot`
    /// and with the instruction at index `high` otherwise.
    Split {
        /// The first point of the upper half.
        pivot: i32,
        /// The index of the first instruction of the upper half.
        high: u32,
    },
    /// Stop with the given action.
    Leaf(Action),
}

/// The generated dispatch code of one state.
#[derive(Clone, Eq, PartialEq)]
pub struct Dispatch {
    exact: Box<[(i32, Action)]>,
    tree: Box<[Inst]>,
}

impl Dispatch {
    /// Generate dispatch code for the given map. Absent runs fail.
    pub(crate) fn new(map: &CharRangeMap<Action>) -> Dispatch {
        let mut exact = vec![];
        // The start of each run the tree distinguishes, with its action.
        let mut segments: Vec<(i32, Action)> = vec![];
        for run in map.runs() {
            let action = run.value.copied().unwrap_or(Action::Fail);
            if run.range.len() == 1 && action != Action::Fail {
                exact.push((run.range.start(), action));
                continue;
            }
            match segments.last() {
                Some(&(_, last)) if last == action => {}
                _ => segments.push((run.range.start(), action)),
            }
        }
        match segments.first_mut() {
            // The first segment also covers exact points before it.
            Some(first) => first.0 = EOI,
            None => segments.push((EOI, Action::Fail)),
        }

        let mut tree = Vec::with_capacity(2 * segments.len() - 1);
        build_tree(&segments, &mut tree);
        Dispatch {
            exact: exact.into_boxed_slice(),
            tree: tree.into_boxed_slice(),
        }
    }

    /// Returns the action taken on the given point.
    #[inline]
    pub fn lookup(&self, point: i32) -> Action {
        if let Ok(i) = self.exact.binary_search_by_key(&point, |&(p, _)| p) {
            return self.exact[i].1;
        }
        let mut i = 0;
        loop {
            match self.tree[i] {
                Inst::Leaf(action) => return action,
                Inst::Split { pivot, high } => {
                    if point < pivot {
                        i += 1;
                    } else {
                        i = high as usize;
                    }
                }
            }
        }
    }

    /// The points looked up exactly, in ascending order, with their actions.
    pub fn exact(&self) -> &[(i32, Action)] {
        &self.exact
    }

    /// The binary search tree. Its root is the first instruction.
    pub fn tree(&self) -> &[Inst] {
        &self.tree
    }

    pub(crate) fn memory_usage(&self) -> usize {
        use core::mem::size_of;

        self.exact.len() * size_of::<(i32, Action)>()
            + self.tree.len() * size_of::<Inst>()
    }
}

/// Append the tree for the given non-empty segments to `tree`, in pre-order.
fn build_tree(segments: &[(i32, Action)], tree: &mut Vec<Inst>) {
    if segments.len() == 1 {
        tree.push(Inst::Leaf(segments[0].1));
        return;
    }
    let mid = segments.len() / 2;
    let split = tree.len();
    tree.push(Inst::Split { pivot: segments[mid].0, high: 0 });
    build_tree(&segments[..mid], tree);
    let high = tree.len() as u32;
    if let Inst::Split { high: ref mut h, .. } = tree[split] {
        *h = high;
    }
    build_tree(&segments[mid..], tree);
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &(point, action) in self.exact.iter() {
            writeln!(f, "  == {:?} => {:?}", DebugPoint(point), action)?;
        }
        for (i, inst) in self.tree.iter().enumerate() {
            match *inst {
                Inst::Split { pivot, high } => writeln!(
                    f,
                    "  {:04}: < {:?} else {:04}",
                    i,
                    DebugPoint(pivot),
                    high
                )?,
                Inst::Leaf(action) => {
                    writeln!(f, "  {:04}: {:?}", i, action)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        program::DomainUpdate,
        util::{id::StateID, END},
    };

    fn goto(next: usize) -> Action {
        Action::Goto {
            next: StateID::must(next),
            domain: DomainUpdate::Keep,
            reluctant: false,
        }
    }

    fn check_all(map: &CharRangeMap<Action>, dispatch: &Dispatch) {
        let mut points: Vec<i32> = (EOI..0x300).collect();
        points.extend(&[0xD7FF, 0xE000, 0xFFFF, 0x10000, END - 1]);
        for p in points {
            let expected = map.get(p).copied().unwrap_or(Action::Fail);
            assert_eq!(expected, dispatch.lookup(p), "point {:?}", p);
        }
    }

    #[test]
    fn empty() {
        let dispatch = Dispatch::new(&CharRangeMap::new());
        assert!(dispatch.exact().is_empty());
        assert_eq!(&[Inst::Leaf(Action::Fail)], dispatch.tree());
        assert_eq!(Action::Fail, dispatch.lookup(EOI));
        assert_eq!(Action::Fail, dispatch.lookup('a' as i32));
    }

    #[test]
    fn singletons_are_exact() {
        let mut map = CharRangeMap::new();
        map.fill('a' as i32, 'a' as i32 + 1, goto(1));
        map.fill('0' as i32, '9' as i32 + 1, goto(2));
        let dispatch = Dispatch::new(&map);
        assert_eq!(&[('a' as i32, goto(1))], dispatch.exact());
        // The run after the digits absorbs 'a' and merges with the rest.
        assert_eq!(
            &[
                Inst::Split { pivot: '0' as i32, high: 2 },
                Inst::Leaf(Action::Fail),
                Inst::Split { pivot: ':' as i32, high: 4 },
                Inst::Leaf(goto(2)),
                Inst::Leaf(Action::Fail),
            ],
            dispatch.tree()
        );
        check_all(&map, &dispatch);
    }

    #[test]
    fn leading_singleton() {
        let mut map = CharRangeMap::new();
        map.fill(EOI, 0, goto(1));
        map.fill(0, END, goto(2));
        let dispatch = Dispatch::new(&map);
        assert_eq!(&[(EOI, goto(1))], dispatch.exact());
        assert_eq!(&[Inst::Leaf(goto(2))], dispatch.tree());
        check_all(&map, &dispatch);
    }

    #[test]
    fn many_runs() {
        let mut map = CharRangeMap::new();
        for i in 0..40 {
            let start = 0x20 + 7 * i;
            map.fill(start, start + 1 + (i % 5), goto(i as usize % 3));
        }
        map.fill(0x1000, 0x2000, goto(7));
        let dispatch = Dispatch::new(&map);
        check_all(&map, &dispatch);
        assert_eq!(Action::Fail, dispatch.lookup(END - 1));

        // The tree is balanced.
        fn depth(tree: &[Inst], i: usize) -> usize {
            match tree[i] {
                Inst::Leaf(_) => 0,
                Inst::Split { high, .. } => {
                    1 + depth(tree, i + 1).max(depth(tree, high as usize))
                }
            }
        }
        let leaves = dispatch
            .tree()
            .iter()
            .filter(|inst| matches!(inst, Inst::Leaf(_)))
            .count();
        let bound = (leaves as f64).log2().ceil() as usize;
        assert!(depth(dispatch.tree(), 0) <= bound);
    }
}
