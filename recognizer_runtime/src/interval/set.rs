//! Sets of integers stored as sorted, disjoint, non-adjacent closed intervals.
//!
//! Used for token-type sets: follow sets, expected tokens in error messages,
//! and token filters. Every mutating operation checks the read-only flag
//! first and reports `IntervalSetError::ReadOnly` instead of modifying a
//! shared set.

use super::closed::Interval;
use super::error::IntervalSetError;
use crate::tokens::{Vocabulary, TOKEN_EOF, TOKEN_EPSILON};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
    read_only: bool,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set containing the single element `value`
    pub fn of(value: i32) -> Self {
        Self::of_range(value, value)
    }

    /// Set containing `a..=b`; empty when `a > b`
    pub fn of_range(a: i32, b: i32) -> Self {
        let mut set = Self::new();
        set.insert_interval(Interval::of(a, b));
        set
    }

    pub fn from_intervals<I: IntoIterator<Item = Interval>>(intervals: I) -> Self {
        let mut set = Self::new();
        for interval in intervals {
            set.insert_interval(interval);
        }
        set
    }

    pub fn from_elements<I: IntoIterator<Item = i32>>(elements: I) -> Self {
        Self::from_intervals(elements.into_iter().map(|v| Interval::of(v, v)))
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Freeze or unfreeze the set. A frozen set cannot be thawed.
    pub fn set_read_only(&mut self, read_only: bool) -> Result<(), IntervalSetError> {
        if self.read_only && !read_only {
            return Err(IntervalSetError::ReadOnly);
        }
        self.read_only = read_only;
        Ok(())
    }

    fn check_writable(&self) -> Result<(), IntervalSetError> {
        if self.read_only {
            Err(IntervalSetError::ReadOnly)
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) -> Result<(), IntervalSetError> {
        self.check_writable()?;
        self.intervals.clear();
        Ok(())
    }

    pub fn add(&mut self, value: i32) -> Result<(), IntervalSetError> {
        self.add_interval(Interval::of(value, value))
    }

    pub fn add_range(&mut self, a: i32, b: i32) -> Result<(), IntervalSetError> {
        self.add_interval(Interval::of(a, b))
    }

    pub fn add_interval(&mut self, addition: Interval) -> Result<(), IntervalSetError> {
        self.check_writable()?;
        self.insert_interval(addition);
        Ok(())
    }

    pub fn add_all(&mut self, other: &IntervalSet) -> Result<(), IntervalSetError> {
        self.check_writable()?;
        for interval in &other.intervals {
            self.insert_interval(*interval);
        }
        Ok(())
    }

    // Keeps the list sorted, disjoint and non-adjacent by merging `addition`
    // into the first interval it touches and absorbing any followers.
    fn insert_interval(&mut self, addition: Interval) {
        if addition.is_empty() {
            return;
        }

        for i in 0..self.intervals.len() {
            let existing = self.intervals[i];
            if addition == existing {
                return;
            }

            if addition.adjacent(&existing) || !addition.disjoint(&existing) {
                let mut bigger = addition.union(&existing);
                self.intervals[i] = bigger;

                while i + 1 < self.intervals.len() {
                    let next = self.intervals[i + 1];
                    if !bigger.adjacent(&next) && bigger.disjoint(&next) {
                        break;
                    }
                    self.intervals.remove(i + 1);
                    bigger = bigger.union(&next);
                    self.intervals[i] = bigger;
                }
                return;
            }

            if addition.starts_before_disjoint(&existing) {
                self.intervals.insert(i, addition);
                return;
            }
        }

        self.intervals.push(addition);
    }

    pub fn remove(&mut self, value: i32) -> Result<(), IntervalSetError> {
        self.check_writable()?;

        for i in 0..self.intervals.len() {
            let Interval { a, b } = self.intervals[i];
            if value < a {
                break;
            }
            if value == a && value == b {
                self.intervals.remove(i);
                break;
            }
            if value == a {
                self.intervals[i].a += 1;
                break;
            }
            if value == b {
                self.intervals[i].b -= 1;
                break;
            }
            if value > a && value < b {
                self.intervals[i].b = value - 1;
                self.intervals.insert(i + 1, Interval::of(value + 1, b));
                break;
            }
        }
        Ok(())
    }

    pub fn contains(&self, value: i32) -> bool {
        let idx = self.intervals.partition_point(|interval| interval.b < value);
        self.intervals
            .get(idx)
            .map(|interval| interval.a <= value)
            .unwrap_or(false)
    }

    /// Union of the two sets
    pub fn or(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = IntervalSet::from_intervals(self.intervals.iter().copied());
        for interval in &other.intervals {
            result.insert_interval(*interval);
        }
        result
    }

    /// Intersection; `None` when `other` is absent
    pub fn and(&self, other: Option<&IntervalSet>) -> Option<IntervalSet> {
        let other = other?;
        let mine = &self.intervals;
        let theirs = &other.intervals;
        let mut intersection = IntervalSet::new();
        let (mut i, mut j) = (0, 0);

        while i < mine.len() && j < theirs.len() {
            let m = mine[i];
            let t = theirs[j];

            if m.starts_before_disjoint(&t) {
                i += 1;
            } else if t.starts_before_disjoint(&m) {
                j += 1;
            } else if m.properly_contains(&t) {
                intersection.insert_interval(t);
                j += 1;
            } else if t.properly_contains(&m) {
                intersection.insert_interval(m);
                i += 1;
            } else if !m.disjoint(&t) {
                intersection.insert_interval(m.intersection(&t));
                if m.starts_after_non_disjoint(&t) {
                    j += 1;
                } else if t.starts_after_non_disjoint(&m) {
                    i += 1;
                }
            }
        }

        Some(intersection)
    }

    /// Elements of this set not in `other`
    pub fn subtract(&self, other: Option<&IntervalSet>) -> IntervalSet {
        Self::subtract_sets(Some(self), other)
    }

    /// `left - right`. An absent or empty `left` yields an empty set; an
    /// absent `right` yields a copy of `left`.
    pub fn subtract_sets(left: Option<&IntervalSet>, right: Option<&IntervalSet>) -> IntervalSet {
        let left = match left {
            Some(left) if !left.is_nil() => left,
            _ => return IntervalSet::new(),
        };

        let mut result = IntervalSet::from_intervals(left.intervals.iter().copied());
        let right = match right {
            Some(right) if !right.is_nil() => right,
            _ => return result,
        };

        let mut result_i = 0;
        let mut right_i = 0;
        while result_i < result.intervals.len() && right_i < right.intervals.len() {
            let current = result.intervals[result_i];
            let cut = right.intervals[right_i];

            if cut.b < current.a {
                right_i += 1;
                continue;
            }
            if cut.a > current.b {
                result_i += 1;
                continue;
            }

            let before = (cut.a > current.a).then(|| Interval::of(current.a, cut.a - 1));
            let after = (cut.b < current.b).then(|| Interval::of(cut.b + 1, current.b));

            match (before, after) {
                (Some(before), Some(after)) => {
                    result.intervals[result_i] = before;
                    result.intervals.insert(result_i + 1, after);
                    result_i += 1;
                    right_i += 1;
                }
                (Some(before), None) => {
                    result.intervals[result_i] = before;
                    result_i += 1;
                }
                (None, Some(after)) => {
                    result.intervals[result_i] = after;
                    right_i += 1;
                }
                (None, None) => {
                    result.intervals.remove(result_i);
                }
            }
        }

        result
    }

    /// Elements of `vocabulary` not in this set; `None` when the vocabulary
    /// is absent or empty
    pub fn complement(&self, vocabulary: Option<&IntervalSet>) -> Option<IntervalSet> {
        match vocabulary {
            Some(vocabulary) if !vocabulary.is_nil() => Some(vocabulary.subtract(Some(self))),
            _ => None,
        }
    }

    pub fn complement_range(&self, min: i32, max: i32) -> Option<IntervalSet> {
        self.complement(Some(&IntervalSet::of_range(min, max)))
    }

    pub fn is_nil(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        match self.intervals.as_slice() {
            [only] => only.length(),
            intervals => intervals.iter().map(Interval::length).sum(),
        }
    }

    pub fn min_element(&self) -> Option<i32> {
        self.intervals.first().map(|interval| interval.a)
    }

    pub fn max_element(&self) -> Option<i32> {
        self.intervals.last().map(|interval| interval.b)
    }

    /// The element of a one-element set
    pub fn single_element(&self) -> Option<i32> {
        match self.intervals.as_slice() {
            [only] if only.a == only.b => Some(only.a),
            _ => None,
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals.iter().flat_map(|interval| interval.a..=interval.b)
    }

    pub fn to_vec(&self) -> Vec<i32> {
        self.iter().collect()
    }

    fn element_name(vocabulary: &dyn Vocabulary, value: i32) -> String {
        match value {
            TOKEN_EOF => "<EOF>".to_string(),
            TOKEN_EPSILON => "<EPSILON>".to_string(),
            _ => vocabulary.display_name(value).into_owned(),
        }
    }

    /// Render with token names, e.g. `{ID, '+'}`
    pub fn to_string_with_vocabulary(&self, vocabulary: &dyn Vocabulary) -> String {
        if self.is_nil() {
            return "{}".to_string();
        }

        let names: Vec<String> = self
            .intervals
            .iter()
            .flat_map(|interval| interval.a..=interval.b)
            .map(|value| Self::element_name(vocabulary, value))
            .collect();

        if self.size() > 1 {
            format!("{{{}}}", names.join(", "))
        } else {
            names.join(", ")
        }
    }
}

impl PartialEq for IntervalSet {
    fn eq(&self, other: &Self) -> bool {
        self.intervals == other.intervals
    }
}

impl Eq for IntervalSet {}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            return write!(f, "{{}}");
        }

        let braces = self.size() > 1;
        if braces {
            write!(f, "{{")?;
        }
        for (i, interval) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if interval.a == interval.b {
                if interval.a == TOKEN_EOF {
                    write!(f, "<EOF>")?;
                } else {
                    write!(f, "{}", interval.a)?;
                }
            } else {
                write!(f, "{}..{}", interval.a, interval.b)?;
            }
        }
        if braces {
            write!(f, "}}")?;
        }
        Ok(())
    }
}
