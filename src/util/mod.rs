/*!
Data structures and identifiers shared by every stage of compilation.

The most important types here are [`CharRangeSet`](range_set::CharRangeSet)
and [`CharRangeMap`](range_map::CharRangeMap). Both partition the *point
domain* `[EOI, END)`: every Unicode code point plus the special end-of-input
point [`EOI`] (`-1`). Treating end of input as a point means that `$`-style
anchoring composes with ordinary character transitions.
*/

pub mod id;
pub mod range_map;
pub mod range_set;

pub(crate) mod sparse_set;

/// The end-of-input sentinel point. It sorts before every code point.
pub const EOI: i32 = -1;

/// The largest Unicode code point.
pub const MAX_POINT: i32 = 0x10FFFF;

/// One past the largest point in the domain. Ranges are half open, so this
/// is the largest permissible range end.
pub const END: i32 = MAX_POINT + 1;

/// Checks that `[start, end)` is a well formed range within the point domain.
///
/// Malformed ranges are caller bugs, so this panics.
#[inline]
pub(crate) fn check_range(start: i32, end: i32) {
    assert!(
        EOI <= start && start <= end && end <= END,
        "invalid point range [{}, {}): must satisfy {} <= start <= end <= {}",
        start,
        end,
        EOI,
        END,
    );
}

/// Returns the character for the given point, if it is a Unicode scalar
/// value.
#[inline]
pub(crate) fn point_char(point: i32) -> Option<char> {
    if point < 0 {
        return None;
    }
    core::char::from_u32(point as u32)
}

/// A type that wraps a single point and formats it in a readable way:
/// printable ASCII as itself, everything else escaped and end of input as
/// `EOI`.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct DebugPoint(pub i32);

impl core::fmt::Debug for DebugPoint {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.0 == EOI {
            return write!(f, "EOI");
        }
        match point_char(self.0) {
            Some(ch) if ch.is_ascii_graphic() => {
                if ch == '\\' || ch == '\'' {
                    write!(f, "\\{}", ch)
                } else {
                    write!(f, "{}", ch)
                }
            }
            Some(ch) if ch == ' ' => write!(f, "' '"),
            Some(ch) => write!(f, "\\u{{{:X}}}", ch as u32),
            None => write!(f, "\\u{{{:X}}}", self.0),
        }
    }
}
