use course_schedule::week_selector::{
    clear, select, select_all, select_even, select_first_half, select_odd, select_second_half,
    toggle,
};
use course_schedule::{WeekPattern, WeekSet};

#[test]
fn twenty_week_semester_patterns() {
    assert_eq!(select_all(20).to_vec(), (1..=20).collect::<Vec<_>>());
    assert_eq!(
        select_odd(20).to_vec(),
        vec![1, 3, 5, 7, 9, 11, 13, 15, 17, 19]
    );
    assert_eq!(
        select_even(20).to_vec(),
        vec![2, 4, 6, 8, 10, 12, 14, 16, 18, 20]
    );
    assert_eq!(select_first_half(20).to_vec(), (1..=10).collect::<Vec<_>>());
    assert_eq!(select_second_half(20).to_vec(), (11..=20).collect::<Vec<_>>());
}

#[test]
fn odd_and_even_sizes_follow_semester_length() {
    for n in 0..=40u32 {
        assert_eq!(select_odd(n).len(), n.div_ceil(2) as usize, "odd n={n}");
        assert_eq!(select_even(n).len(), (n / 2) as usize, "even n={n}");
        assert!(select_odd(n).is_disjoint(&select_even(n)));
        assert_eq!(select_odd(n).union(&select_even(n)), select_all(n));
    }
}

#[test]
fn halves_partition_even_semesters() {
    for n in (2..=64u32).step_by(2) {
        let first = select_first_half(n);
        let second = select_second_half(n);
        assert!(first.is_disjoint(&second), "n={n}");
        assert_eq!(first.union(&second), select_all(n), "n={n}");
        assert_eq!(first.len(), second.len());
    }
}

#[test]
fn odd_length_semester_gives_extra_week_to_second_half() {
    assert_eq!(select_first_half(9).to_vec(), vec![1, 2, 3, 4]);
    assert_eq!(select_second_half(9).to_vec(), vec![5, 6, 7, 8, 9]);
}

#[test]
fn every_pattern_stays_within_semester() {
    for n in 0..=64u32 {
        for pattern in WeekPattern::ALL {
            assert!(select(pattern, n).fits_within(n), "{pattern} n={n}");
        }
    }
}

#[test]
fn toggle_twice_restores_the_set() {
    let sets = [
        WeekSet::new(),
        select_odd(20),
        WeekSet::from_weeks([1, 5, 20]).unwrap(),
    ];
    for set in sets {
        for week in [1, 2, 5, 19, 20, 64] {
            let once = toggle(&set, week).unwrap();
            assert_ne!(once.contains(week), set.contains(week));
            let mut sorted = once.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(once.to_vec(), sorted);
            assert_eq!(toggle(&once, week).unwrap(), set);
        }
    }
}

#[test]
fn toggle_rejects_week_zero() {
    assert!(toggle(&select_all(20), 0).is_err());
}

#[test]
fn clear_is_empty() {
    assert!(clear().is_empty());
    assert_eq!(clear().to_vec(), Vec::<u32>::new());
}
