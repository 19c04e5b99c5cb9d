//! Batch week selection.
//!
//! Every function here is a pure function of the semester length `n`. Lengths
//! above [`MAX_SEMESTER_WEEKS`] are clamped, and every result is a subset of
//! `1..=n`.

use crate::week_set::{MAX_SEMESTER_WEEKS, WeekSet, WeekSetError, mask_up_to};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Bit i holds week i + 1, so even bit positions are odd weeks.
const ODD_WEEK_BITS: u64 = 0x5555_5555_5555_5555;
const EVEN_WEEK_BITS: u64 = 0xAAAA_AAAA_AAAA_AAAA;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekPattern {
    All,
    Odd,
    Even,
    FirstHalf,
    SecondHalf,
}

impl WeekPattern {
    pub const ALL: [WeekPattern; 5] = [
        WeekPattern::All,
        WeekPattern::Odd,
        WeekPattern::Even,
        WeekPattern::FirstHalf,
        WeekPattern::SecondHalf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekPattern::All => "all",
            WeekPattern::Odd => "odd",
            WeekPattern::Even => "even",
            WeekPattern::FirstHalf => "first-half",
            WeekPattern::SecondHalf => "second-half",
        }
    }
}

impl fmt::Display for WeekPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekPattern {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all" => Ok(WeekPattern::All),
            "odd" => Ok(WeekPattern::Odd),
            "even" => Ok(WeekPattern::Even),
            "first-half" => Ok(WeekPattern::FirstHalf),
            "second-half" => Ok(WeekPattern::SecondHalf),
            other => Err(format!("unknown week pattern '{other}'")),
        }
    }
}

fn clamp(n: u32) -> u32 {
    n.min(MAX_SEMESTER_WEEKS)
}

/// Weeks `1..=n`.
///
/// # Limits
///
/// `n` is capped at [`MAX_SEMESTER_WEEKS`]; weeks beyond 64 are never
/// selected.
pub fn select_all(n: u32) -> WeekSet {
    WeekSet::from_bits(mask_up_to(clamp(n)))
}

/// Odd weeks up to `n`, `ceil(n / 2)` of them.
///
/// # Limits
///
/// `n` is capped at [`MAX_SEMESTER_WEEKS`]; weeks beyond 64 are never
/// selected.
pub fn select_odd(n: u32) -> WeekSet {
    WeekSet::from_bits(mask_up_to(clamp(n)) & ODD_WEEK_BITS)
}

/// Even weeks up to `n`, `floor(n / 2)` of them.
///
/// # Limits
///
/// `n` is capped at [`MAX_SEMESTER_WEEKS`]; weeks beyond 64 are never
/// selected.
pub fn select_even(n: u32) -> WeekSet {
    WeekSet::from_bits(mask_up_to(clamp(n)) & EVEN_WEEK_BITS)
}

/// Weeks `1..=n / 2`.
///
/// # Limits
///
/// `n` is capped at [`MAX_SEMESTER_WEEKS`]; weeks beyond 64 are never
/// selected.
pub fn select_first_half(n: u32) -> WeekSet {
    WeekSet::from_bits(mask_up_to(clamp(n) / 2))
}

/// Weeks `n / 2 + 1..=n`. Disjoint from [`select_first_half`] for the same
/// `n`, and together they cover [`select_all`].
///
/// # Limits
///
/// `n` is capped at [`MAX_SEMESTER_WEEKS`]; weeks beyond 64 are never
/// selected.
pub fn select_second_half(n: u32) -> WeekSet {
    let n = clamp(n);
    WeekSet::from_bits(mask_up_to(n) & !mask_up_to(n / 2))
}

/// Dispatches to the selector named by `pattern`.
///
/// # Limits
///
/// `n` is capped at [`MAX_SEMESTER_WEEKS`]; weeks beyond 64 are never
/// selected.
pub fn select(pattern: WeekPattern, n: u32) -> WeekSet {
    match pattern {
        WeekPattern::All => select_all(n),
        WeekPattern::Odd => select_odd(n),
        WeekPattern::Even => select_even(n),
        WeekPattern::FirstHalf => select_first_half(n),
        WeekPattern::SecondHalf => select_second_half(n),
    }
}

/// Adds `week` if absent, removes it otherwise.
pub fn toggle(set: &WeekSet, week: u32) -> Result<WeekSet, WeekSetError> {
    let mut next = *set;
    if !next.remove(week) {
        next.insert(week)?;
    }
    Ok(next)
}

pub fn clear() -> WeekSet {
    WeekSet::new()
}

/// The first named pattern that produces exactly `set` for a semester of `n`
/// weeks. Empty sets never match.
pub fn detect_pattern(set: &WeekSet, n: u32) -> Option<WeekPattern> {
    if set.is_empty() {
        return None;
    }
    WeekPattern::ALL
        .into_iter()
        .find(|pattern| select(*pattern, n) == *set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_names_round_trip_through_from_str() {
        for pattern in WeekPattern::ALL {
            assert_eq!(pattern.as_str().parse::<WeekPattern>(), Ok(pattern));
        }
        assert_eq!("FIRST_HALF".parse::<WeekPattern>(), Ok(WeekPattern::FirstHalf));
        assert!("weekly".parse::<WeekPattern>().is_err());
    }

    #[test]
    fn zero_length_semester_selects_nothing() {
        for pattern in WeekPattern::ALL {
            assert!(select(pattern, 0).is_empty());
        }
    }

    #[test]
    fn lengths_above_the_limit_are_clamped() {
        assert_eq!(select_all(100).len(), MAX_SEMESTER_WEEKS as usize);
        assert_eq!(select_odd(100).last(), Some(63));
        assert_eq!(select_even(100).last(), Some(64));
    }

    #[test]
    fn detect_pattern_prefers_first_matching_name() {
        assert_eq!(detect_pattern(&select_all(20), 20), Some(WeekPattern::All));
        assert_eq!(detect_pattern(&select_even(20), 20), Some(WeekPattern::Even));
        assert_eq!(
            detect_pattern(&select_second_half(20), 20),
            Some(WeekPattern::SecondHalf)
        );
        // With a single week, `all` and `odd` coincide.
        assert_eq!(detect_pattern(&select_odd(1), 1), Some(WeekPattern::All));
        assert_eq!(detect_pattern(&WeekSet::from_weeks([2, 3]).unwrap(), 20), None);
        assert_eq!(detect_pattern(&clear(), 20), None);
    }
}
