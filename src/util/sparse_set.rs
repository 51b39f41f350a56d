use alloc::{vec, vec::Vec};

use crate::util::id::StateID;

/// A set of NFA state IDs with constant time insertion, membership testing
/// and clearing.
///
/// Determinization computes one epsilon closure per DFA state and per
/// distinct input range, so the set is cleared and refilled constantly. The
/// sparse representation makes that cheap. Iteration yields elements in
/// insertion order.
///
/// See: https://research.swtch.com/sparse
#[derive(Clone)]
pub(crate) struct SparseSet {
    /// The number of elements currently in this set.
    len: usize,
    /// The members of this set, in insertion order. Only the first `len`
    /// entries are meaningful.
    dense: Vec<StateID>,
    /// Maps a state ID to its position in `dense`. An ID is a member if and
    /// only if `sparse[id] < len && dense[sparse[id]] == id`.
    sparse: Vec<StateID>,
}

impl SparseSet {
    /// Create a new set that can hold the IDs `0..capacity`.
    ///
    /// This panics if the capacity exceeds `StateID::LIMIT`.
    pub(crate) fn new(capacity: usize) -> SparseSet {
        assert!(
            capacity <= StateID::LIMIT,
            "sparse set capacity cannot exceed {:?}",
            StateID::LIMIT
        );
        SparseSet {
            len: 0,
            dense: vec![StateID::ZERO; capacity],
            sparse: vec![StateID::ZERO; capacity],
        }
    }

    /// Insert the given ID and return true if it was not already present.
    ///
    /// This panics if the ID is not less than the capacity of this set.
    #[inline(always)]
    pub(crate) fn insert(&mut self, id: StateID) -> bool {
        if self.contains(id) {
            return false;
        }
        // OK since len < capacity <= StateID::LIMIT, which is implied by
        // 'id' being a valid index into 'sparse' and not being present.
        let slot = StateID::new_unchecked(self.len);
        self.dense[slot] = id;
        self.sparse[id] = slot;
        self.len += 1;
        true
    }

    #[inline]
    pub(crate) fn contains(&self, id: StateID) -> bool {
        let slot = self.sparse[id];
        slot.as_usize() < self.len && self.dense[slot] == id
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = StateID> + '_ {
        self.dense[..self.len].iter().copied()
    }
}

impl core::fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
