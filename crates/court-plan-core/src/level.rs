// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::fmt::Display;

/// A playing-strength rating.
///
/// Two flavours exist at the call sites: the *raw* level stored on a player
/// (kept for display and audit) and the *normalized* level produced by
/// [`Level::with_bonus`], which is what every comparison in the engine reads.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    #[inline]
    pub const fn new(value: u8) -> Self {
        Level(value)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns this level raised by a compensation bonus.
    #[inline]
    pub const fn with_bonus(self, bonus: u8) -> Self {
        Level(self.0.saturating_add(bonus))
    }

    /// Absolute distance between two levels.
    #[inline]
    pub const fn gap(self, other: Level) -> LevelGap {
        LevelGap(self.0.abs_diff(other.0))
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level({})", self.0)
    }
}

impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Level(value)
    }
}

/// Absolute distance between two [`Level`]s.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LevelGap(u8);

impl LevelGap {
    #[inline]
    pub const fn new(value: u8) -> Self {
        LevelGap(value)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Display for LevelGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LevelGap({})", self.0)
    }
}

/// Widest pairwise gap over a set of levels; `None` for an empty set.
pub fn spread<I: IntoIterator<Item = Level>>(levels: I) -> Option<LevelGap> {
    let mut it = levels.into_iter();
    let first = it.next()?;
    let (lo, hi) = it.fold((first, first), |(lo, hi), l| (lo.min(l), hi.max(l)));
    Some(lo.gap(hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_value_and_display() {
        let l = Level::new(6);
        assert_eq!(l.value(), 6);
        assert_eq!(format!("{}", l), "Level(6)");
    }

    #[test]
    fn test_level_with_bonus() {
        assert_eq!(Level::new(6).with_bonus(1), Level::new(7));
        assert_eq!(Level::new(u8::MAX).with_bonus(1), Level::new(u8::MAX));
    }

    #[test]
    fn test_level_gap_is_symmetric() {
        let a = Level::new(3);
        let b = Level::new(5);
        assert_eq!(a.gap(b), LevelGap::new(2));
        assert_eq!(b.gap(a), LevelGap::new(2));
        assert!(a.gap(a).is_zero());
    }

    #[test]
    fn test_spread() {
        let levels = [4, 6, 5, 4].map(Level::new);
        assert_eq!(spread(levels), Some(LevelGap::new(2)));
        assert_eq!(spread([Level::new(7)]), Some(LevelGap::new(0)));
        assert_eq!(spread([]), None);
    }
}
