use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest semester a `WeekSet` can describe (one bit per week).
pub const MAX_SEMESTER_WEEKS: u32 = 64;

/// Semester length used when nothing else is configured.
pub const DEFAULT_SEMESTER_WEEKS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeekSetError {
    #[error("week {0} is outside the supported range 1..=64")]
    OutOfRange(u32),
    #[error("invalid week list '{0}'")]
    Parse(String),
}

/// The weeks of a semester during which a schedule entry meets.
///
/// Week `w` is stored in bit `w - 1`, so iteration is always ascending and
/// duplicates cannot exist. Serialises as an ascending list of week numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<u32>", try_from = "Vec<u32>")]
pub struct WeekSet(u64);

/// Bit mask covering weeks `1..=n`.
pub(crate) const fn mask_up_to(n: u32) -> u64 {
    if n >= MAX_SEMESTER_WEEKS {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

fn bit(week: u32) -> Result<u64, WeekSetError> {
    if week == 0 || week > MAX_SEMESTER_WEEKS {
        return Err(WeekSetError::OutOfRange(week));
    }
    Ok(1u64 << (week - 1))
}

impl WeekSet {
    pub const fn new() -> Self {
        Self(0)
    }

    pub(crate) const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub fn from_weeks<I>(weeks: I) -> Result<Self, WeekSetError>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut set = Self::new();
        for week in weeks {
            set.0 |= bit(week)?;
        }
        Ok(set)
    }

    /// Inclusive range of weeks. An inverted range yields an empty set.
    pub fn range(first: u32, last: u32) -> Result<Self, WeekSetError> {
        if first > last {
            return Ok(Self::new());
        }
        bit(first)?;
        bit(last)?;
        Ok(Self(mask_up_to(last) & !mask_up_to(first - 1)))
    }

    pub fn contains(&self, week: u32) -> bool {
        bit(week).map(|b| self.0 & b != 0).unwrap_or(false)
    }

    /// Returns `true` if the week was not already present.
    pub fn insert(&mut self, week: u32) -> Result<bool, WeekSetError> {
        let b = bit(week)?;
        let added = self.0 & b == 0;
        self.0 |= b;
        Ok(added)
    }

    /// Returns `true` if the week was present.
    pub fn remove(&mut self, week: u32) -> bool {
        match bit(week) {
            Ok(b) => {
                let present = self.0 & b != 0;
                self.0 &= !b;
                present
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn first(&self) -> Option<u32> {
        (self.0 != 0).then(|| self.0.trailing_zeros() + 1)
    }

    pub fn last(&self) -> Option<u32> {
        (self.0 != 0).then(|| MAX_SEMESTER_WEEKS - self.0.leading_zeros())
    }

    /// Whether every week lies in `1..=semester_weeks`.
    pub fn fits_within(&self, semester_weeks: u32) -> bool {
        self.0 & !mask_up_to(semester_weeks) == 0
    }

    pub fn iter(&self) -> Weeks {
        Weeks { bits: self.0 }
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.0 & other.0 == 0
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Consecutive runs as inclusive `(first, last)` pairs.
    pub fn runs(&self) -> Vec<(u32, u32)> {
        let mut runs: Vec<(u32, u32)> = Vec::new();
        for week in self.iter() {
            match runs.last_mut() {
                Some((_, last)) if *last + 1 == week => *last = week,
                _ => runs.push((week, week)),
            }
        }
        runs
    }
}

/// Ascending iterator over the weeks of a [`WeekSet`].
#[derive(Debug, Clone)]
pub struct Weeks {
    bits: u64,
}

impl Iterator for Weeks {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.bits == 0 {
            return None;
        }
        let week = self.bits.trailing_zeros() + 1;
        self.bits &= self.bits - 1;
        Some(week)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Weeks {}

impl IntoIterator for WeekSet {
    type Item = u32;
    type IntoIter = Weeks;

    fn into_iter(self) -> Weeks {
        self.iter()
    }
}

impl IntoIterator for &WeekSet {
    type Item = u32;
    type IntoIter = Weeks;

    fn into_iter(self) -> Weeks {
        self.iter()
    }
}

impl From<WeekSet> for Vec<u32> {
    fn from(set: WeekSet) -> Self {
        set.to_vec()
    }
}

impl TryFrom<Vec<u32>> for WeekSet {
    type Error = WeekSetError;

    fn try_from(weeks: Vec<u32>) -> Result<Self, Self::Error> {
        Self::from_weeks(weeks)
    }
}

/// Compact range notation, e.g. `1-10,12,15-20`.
impl fmt::Display for WeekSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .runs()
            .into_iter()
            .map(|(first, last)| {
                if first == last {
                    first.to_string()
                } else {
                    format!("{first}-{last}")
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&parts)
    }
}

impl FromStr for WeekSet {
    type Err = WeekSetError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut set = Self::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let parse = |s: &str| {
                s.trim()
                    .parse::<u32>()
                    .map_err(|_| WeekSetError::Parse(input.to_string()))
            };
            let run = match part.split_once('-') {
                Some((first, last)) => {
                    let (first, last) = (parse(first)?, parse(last)?);
                    if first > last {
                        return Err(WeekSetError::Parse(input.to_string()));
                    }
                    Self::range(first, last)?
                }
                None => Self::from_weeks([parse(part)?])?,
            };
            set = set.union(&run);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_weeks_sorted_and_unique() {
        let mut set = WeekSet::new();
        assert!(set.insert(7).unwrap());
        assert!(set.insert(2).unwrap());
        assert!(!set.insert(7).unwrap());
        assert_eq!(set.to_vec(), vec![2, 7]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn out_of_range_weeks_are_rejected() {
        assert_eq!(WeekSet::from_weeks([0]), Err(WeekSetError::OutOfRange(0)));
        assert_eq!(WeekSet::from_weeks([65]), Err(WeekSetError::OutOfRange(65)));
        assert!(!WeekSet::from_weeks([64]).unwrap().is_empty());
        assert!(!WeekSet::new().contains(0));
    }

    #[test]
    fn first_and_last_follow_bit_positions() {
        let set = WeekSet::from_weeks([3, 9, 64]).unwrap();
        assert_eq!(set.first(), Some(3));
        assert_eq!(set.last(), Some(64));
        assert_eq!(WeekSet::new().first(), None);
    }

    #[test]
    fn range_and_fits_within() {
        let set = WeekSet::range(11, 20).unwrap();
        assert_eq!(set.to_vec(), (11..=20).collect::<Vec<_>>());
        assert!(set.fits_within(20));
        assert!(!set.fits_within(19));
        assert!(WeekSet::range(5, 4).unwrap().is_empty());
    }

    #[test]
    fn display_and_parse_use_compact_ranges() {
        let set: WeekSet = "1-3, 5,8-9".parse().unwrap();
        assert_eq!(set.to_vec(), vec![1, 2, 3, 5, 8, 9]);
        assert_eq!(set.to_string(), "1-3,5,8-9");
        assert_eq!("".parse::<WeekSet>().unwrap(), WeekSet::new());
        assert!("4-2".parse::<WeekSet>().is_err());
        assert!("x".parse::<WeekSet>().is_err());
    }

    #[test]
    fn serde_uses_ascending_list() {
        let set = WeekSet::from_weeks([4, 1, 2]).unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1,2,4]");
        let back: WeekSet = serde_json::from_str("[2,2,9]").unwrap();
        assert_eq!(back.to_vec(), vec![2, 9]);
        assert!(serde_json::from_str::<WeekSet>("[0]").is_err());
    }

    #[test]
    fn set_algebra() {
        let a = WeekSet::range(1, 10).unwrap();
        let b = WeekSet::range(8, 12).unwrap();
        assert_eq!(a.intersection(&b).to_vec(), vec![8, 9, 10]);
        assert_eq!(a.difference(&b).len(), 7);
        assert_eq!(a.union(&b).len(), 12);
        assert!(!a.is_disjoint(&b));
        assert!(WeekSet::range(2, 3).unwrap().is_subset(&a));
    }
}
