use std::fmt;

/// Closed integer range `[a, b]`. Any interval with `a > b` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub a: i32,
    pub b: i32,
}

impl Interval {
    /// The canonical empty interval
    pub const INVALID: Interval = Interval { a: -1, b: -2 };

    pub const fn of(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    pub const fn is_empty(&self) -> bool {
        self.b < self.a
    }

    /// Number of elements; zero for an empty interval
    pub fn length(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (i64::from(self.b) - i64::from(self.a) + 1) as usize
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.a <= value && value <= self.b
    }

    /// Does this start completely before other? Disjoint
    pub fn starts_before_disjoint(&self, other: &Interval) -> bool {
        self.a < other.a && self.b < other.a
    }

    /// Does this start at or before other? Nondisjoint
    pub fn starts_before_non_disjoint(&self, other: &Interval) -> bool {
        self.a <= other.a && self.b >= other.a
    }

    pub fn starts_after(&self, other: &Interval) -> bool {
        self.a > other.a
    }

    /// Does this start completely after other? Disjoint
    pub fn starts_after_disjoint(&self, other: &Interval) -> bool {
        self.a > other.b
    }

    /// Does this start after other? Nondisjoint
    pub fn starts_after_non_disjoint(&self, other: &Interval) -> bool {
        self.a > other.a && self.a <= other.b
    }

    pub fn disjoint(&self, other: &Interval) -> bool {
        self.starts_before_disjoint(other) || self.starts_after_disjoint(other)
    }

    /// Are the two intervals touching without overlapping?
    pub fn adjacent(&self, other: &Interval) -> bool {
        i64::from(self.a) == i64::from(other.b) + 1 || i64::from(self.b) == i64::from(other.a) - 1
    }

    pub fn properly_contains(&self, other: &Interval) -> bool {
        other.a >= self.a && other.b <= self.b
    }

    /// Smallest interval covering both
    pub fn union(&self, other: &Interval) -> Interval {
        Interval::of(self.a.min(other.a), self.b.max(other.b))
    }

    pub fn intersection(&self, other: &Interval) -> Interval {
        Interval::of(self.a.max(other.a), self.b.min(other.b))
    }

    /// The part of this interval not covered by `other`, when `other` overlaps
    /// only one end. Returns `None` when `other` is properly contained (the
    /// result would be two pieces) or does not overlap at all.
    pub fn difference_not_properly_contained(&self, other: &Interval) -> Option<Interval> {
        if other.starts_before_non_disjoint(self) {
            Some(Interval::of(self.a.max(other.b.saturating_add(1)), self.b))
        } else if other.starts_after_non_disjoint(self) {
            Some(Interval::of(self.a, other.a - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_emptiness() {
        assert_eq!(Interval::of(3, 7).length(), 5);
        assert_eq!(Interval::of(4, 4).length(), 1);
        assert!(Interval::INVALID.is_empty());
        assert_eq!(Interval::INVALID.length(), 0);
        assert_eq!(Interval::of(i32::MIN, i32::MAX).length(), 1usize << 32);
    }

    #[test]
    fn test_relations() {
        let low = Interval::of(1, 3);
        let high = Interval::of(4, 6);
        let overlapping = Interval::of(3, 5);

        assert!(low.starts_before_disjoint(&high));
        assert!(high.starts_after_disjoint(&low));
        assert!(low.adjacent(&high));
        assert!(high.adjacent(&low));
        assert!(low.disjoint(&high));
        assert!(!low.disjoint(&overlapping));
        assert!(low.starts_before_non_disjoint(&overlapping));
        assert!(overlapping.starts_after_non_disjoint(&low));
        assert!(Interval::of(0, 10).properly_contains(&overlapping));
        assert!(overlapping.properly_contains(&overlapping));
    }

    #[test]
    fn test_union_and_intersection() {
        let a = Interval::of(1, 5);
        let b = Interval::of(3, 9);
        assert_eq!(a.union(&b), Interval::of(1, 9));
        assert_eq!(a.intersection(&b), Interval::of(3, 5));
        assert!(Interval::of(1, 2).intersection(&Interval::of(5, 6)).is_empty());
    }

    #[test]
    fn test_difference_not_properly_contained() {
        let base = Interval::of(5, 10);
        assert_eq!(
            base.difference_not_properly_contained(&Interval::of(1, 7)),
            Some(Interval::of(8, 10))
        );
        assert_eq!(
            base.difference_not_properly_contained(&Interval::of(8, 20)),
            Some(Interval::of(5, 7))
        );
        assert_eq!(
            base.difference_not_properly_contained(&Interval::of(6, 8)),
            None
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Interval::of(2, 8).to_string(), "2..8");
    }
}
