use proptest::prelude::*;
use recognizer_runtime::interval::{IntervalSet, IntervalSetError};
use std::collections::BTreeSet;

fn ranges() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((-5i32..60, 0i32..8).prop_map(|(a, len)| (a, a + len)), 0..12)
}

fn build(ranges: &[(i32, i32)]) -> (IntervalSet, BTreeSet<i32>) {
    let mut set = IntervalSet::new();
    let mut model = BTreeSet::new();
    for &(a, b) in ranges {
        set.add_range(a, b).unwrap();
        model.extend(a..=b);
    }
    (set, model)
}

fn assert_canonical(set: &IntervalSet) -> Result<(), TestCaseError> {
    for interval in set.intervals() {
        prop_assert!(interval.a <= interval.b);
    }
    for pair in set.intervals().windows(2) {
        // Sorted, disjoint and never touching
        prop_assert!(pair[1].a > pair[0].b + 1);
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_add_keeps_canonical_form(spec in ranges()) {
        let (set, model) = build(&spec);
        assert_canonical(&set)?;
        prop_assert_eq!(set.to_vec(), model.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(set.size(), model.len());
        prop_assert_eq!(set.min_element(), model.first().copied());
        prop_assert_eq!(set.max_element(), model.last().copied());
        for value in -8..72 {
            prop_assert_eq!(set.contains(value), model.contains(&value));
        }
    }

    #[test]
    fn prop_remove_matches_model(spec in ranges(), removals in prop::collection::vec(-5i32..70, 0..10)) {
        let (mut set, mut model) = build(&spec);
        for value in removals {
            set.remove(value).unwrap();
            model.remove(&value);
        }
        assert_canonical(&set)?;
        prop_assert_eq!(set.to_vec(), model.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_union_matches_model(left in ranges(), right in ranges()) {
        let (a, model_a) = build(&left);
        let (b, model_b) = build(&right);
        let union = a.or(&b);
        assert_canonical(&union)?;
        prop_assert_eq!(union.to_vec(), model_a.union(&model_b).copied().collect::<Vec<_>>());
    }

    #[test]
    fn prop_subtract_and_intersect_partition(left in ranges(), right in ranges()) {
        let (a, model_a) = build(&left);
        let (b, model_b) = build(&right);

        let difference = a.subtract(Some(&b));
        let intersection = a.and(Some(&b)).unwrap();
        assert_canonical(&difference)?;
        assert_canonical(&intersection)?;

        prop_assert_eq!(
            difference.to_vec(),
            model_a.difference(&model_b).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            intersection.to_vec(),
            model_a.intersection(&model_b).copied().collect::<Vec<_>>()
        );
        prop_assert!(difference.and(Some(&intersection)).unwrap().is_nil());
        prop_assert_eq!(difference.or(&intersection), a);
    }

    #[test]
    fn prop_complement_within_range(spec in ranges()) {
        let (set, model) = build(&spec);
        let complement = set.complement_range(0, 50).unwrap();
        let expected: Vec<i32> = (0..=50).filter(|value| !model.contains(value)).collect();
        prop_assert_eq!(complement.to_vec(), expected);
    }
}

#[test]
fn test_read_only_set_rejects_every_mutation() {
    let mut set = IntervalSet::of_range(1, 3);
    set.set_read_only(true).unwrap();

    assert_eq!(set.add(9), Err(IntervalSetError::ReadOnly));
    assert_eq!(set.add_range(4, 6), Err(IntervalSetError::ReadOnly));
    assert_eq!(set.add_all(&IntervalSet::of(7)), Err(IntervalSetError::ReadOnly));
    assert_eq!(set.remove(2), Err(IntervalSetError::ReadOnly));
    assert_eq!(set.clear(), Err(IntervalSetError::ReadOnly));
    assert_eq!(set.set_read_only(false), Err(IntervalSetError::ReadOnly));
    assert_eq!(set, IntervalSet::of_range(1, 3));

    // Derived sets are writable
    let mut union = set.or(&IntervalSet::of(5));
    assert!(!union.is_read_only());
    assert!(union.add(6).is_ok());
}
