use std::fmt;
use std::str::FromStr;

use log::{debug, trace, warn};

use crate::error::ConfigError;

/// Denominations of the reference postage machine.
pub const DEFAULT_DENOMINATIONS: [i64; 7] = [90, 30, 24, 10, 6, 2, 1];

/// Facilitates dispensing stamps for a postage stamp machine.
///
/// The denomination list is validated once on construction and never changes
/// afterwards, so a dispenser can be shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampDispenser {
    // strictly descending, last element is 1
    denominations: Vec<i64>,
}

/// The stamps handed out for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispensed {
    /// Total number of stamps.
    pub units: i64,
    /// `(denomination, count)` pairs, largest denomination first. Zero counts are omitted.
    pub stamps: Vec<(i64, i64)>,
}

impl Dispensed {
    /// The value covered by the stamps.
    pub fn total(&self) -> i64 {
        self.stamps.iter().map(|(value, count)| value * count).sum()
    }
}

impl fmt::Display for Dispensed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stamps.is_empty() {
            return write!(f, "nothing");
        }
        for (i, (value, count)) in self.stamps.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}x{}", value, count)?;
        }
        Ok(())
    }
}

fn validate(denominations: &[i64]) -> Result<(), ConfigError> {
    let Some(&last) = denominations.last() else {
        return Err(ConfigError::Empty);
    };

    for (i, pair) in denominations.windows(2).enumerate() {
        if pair[1] >= pair[0] {
            return Err(ConfigError::NotDescending {
                index: i + 1,
                previous: pair[0],
                value: pair[1],
            });
        }
    }

    if last != 1 {
        return Err(ConfigError::MissingUnit { last });
    }
    Ok(())
}

impl StampDispenser {
    /// Creates a dispenser from a copy of `denominations`.
    ///
    /// The list must be non-empty, strictly descending and end with a 1.
    pub fn new(denominations: &[i64]) -> Result<Self, ConfigError> {
        Self::try_from(denominations.to_vec())
    }

    pub fn denominations(&self) -> &[i64] {
        &self.denominations
    }

    /// Returns the minimum number of stamps needed to fill `request`, or `-1`
    /// when the request is negative.
    ///
    /// The search restarts a greedy pass from every denomination but the
    /// last and keeps the cheapest one. This is O(D²) in the number of
    /// denominations and, for systems that are not canonical, it can miss the
    /// true optimum: with `[7, 5, 1]` a request of 17 yields 5 rather than
    /// `7 + 5 + 5`.
    pub fn min_units(&self, request: i64) -> i64 {
        match request {
            r if r < 0 => -1,
            0 => 0,
            r => self.best_pass(r).1,
        }
    }

    /// Like [`min_units`](Self::min_units) but returns the stamps themselves.
    /// `None` signals a negative request.
    pub fn dispense(&self, request: i64) -> Option<Dispensed> {
        if request < 0 {
            return None;
        }
        if request == 0 {
            return Some(Dispensed {
                units: 0,
                stamps: Vec::new(),
            });
        }

        let (start, units) = self.best_pass(request);
        let mut stamps = Vec::new();
        self.pass(start, request, |value, count| stamps.push((value, count)));
        Some(Dispensed { units, stamps })
    }

    /// Index of the winning pass and its stamp count. Ties go to the earlier pass.
    fn best_pass(&self, request: i64) -> (usize, i64) {
        // A pass starting on the trailing 1 is only run when it is the sole denomination.
        let passes = self.denominations.len().saturating_sub(1).max(1);

        let mut best = (0, i64::MAX);
        for start in 0..passes {
            let units = self.pass(start, request, |_, _| {});
            debug!(
                "pass from {} covers {} with {} stamps",
                self.denominations[start], request, units
            );
            if units < best.1 {
                best = (start, units);
            }
        }
        best
    }

    /// One greedy sweep from `denominations[start]` down to the 1 stamp. Every
    /// denomination taken is reported to `take`.
    fn pass(&self, start: usize, request: i64, mut take: impl FnMut(i64, i64)) -> i64 {
        let mut units = 0;
        let mut remaining = request;

        for &value in &self.denominations[start..] {
            if remaining == 0 {
                break;
            }
            if remaining < value {
                continue;
            }

            let count = remaining / value;
            units += count;
            remaining %= value;
            take(value, count);
            trace!("took {}x{}, {} left", value, count, remaining);

            // only the 1 stamp can finish it
            if remaining == 1 {
                units += 1;
                remaining = 0;
                take(1, 1);
                break;
            }
        }

        debug_assert_eq!(remaining, 0);
        units
    }
}

impl TryFrom<Vec<i64>> for StampDispenser {
    type Error = ConfigError;

    fn try_from(denominations: Vec<i64>) -> Result<Self, Self::Error> {
        if let Err(err) = validate(&denominations) {
            warn!("rejected denominations {:?}: {}", denominations, err);
            return Err(err);
        }
        Ok(StampDispenser { denominations })
    }
}

/// Parses a comma or whitespace separated list such as `90,30,24,10,6,2,1`.
impl FromStr for StampDispenser {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let denominations = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| ConfigError::InvalidDenomination {
                        input: token.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::try_from(denominations)
    }
}

impl Default for StampDispenser {
    fn default() -> Self {
        StampDispenser {
            denominations: DEFAULT_DENOMINATIONS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example() {
        let dispenser = StampDispenser::new(&[90, 30, 24, 10, 6, 2, 1]).unwrap();
        assert_eq!(dispenser.min_units(18), 3);

        // wrong input
        assert_eq!(dispenser.min_units(-10), -1);
        assert_eq!(dispenser.min_units(-1), -1);
        assert_eq!(dispenser.min_units(0), 0);

        assert_eq!(dispenser.min_units(1), 1);
        assert_eq!(dispenser.min_units(2), 1);
        assert_eq!(dispenser.min_units(5), 3);
        assert_eq!(dispenser.min_units(34), 2);
        assert_eq!(dispenser.min_units(72), 3);
    }

    #[test]
    fn test_default_matches_reference_machine() {
        assert_eq!(StampDispenser::default().denominations(), &DEFAULT_DENOMINATIONS);
        assert_eq!(
            StampDispenser::default(),
            StampDispenser::new(&DEFAULT_DENOMINATIONS).unwrap()
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(StampDispenser::new(&[]), Err(ConfigError::Empty));
    }

    #[test]
    fn test_rejects_unsorted() {
        assert_eq!(
            StampDispenser::new(&[10, 30, 1]),
            Err(ConfigError::NotDescending {
                index: 1,
                previous: 10,
                value: 30
            })
        );
        // equal neighbours are not strictly descending
        assert_eq!(
            StampDispenser::new(&[10, 6, 6, 1]),
            Err(ConfigError::NotDescending {
                index: 2,
                previous: 6,
                value: 6
            })
        );
    }

    #[test]
    fn test_rejects_missing_unit() {
        assert_eq!(
            StampDispenser::new(&[10, 6, 2]),
            Err(ConfigError::MissingUnit { last: 2 })
        );
        assert_eq!(
            StampDispenser::new(&[3, 0]),
            Err(ConfigError::MissingUnit { last: 0 })
        );
    }

    #[test]
    fn test_copies_input() {
        let mut input = vec![5, 2, 1];
        let dispenser = StampDispenser::new(&input).unwrap();
        input[0] = 100;
        assert_eq!(dispenser.denominations(), &[5, 2, 1]);
    }

    #[test]
    fn test_from_str() {
        let dispenser: StampDispenser = "90,30,24, 10 6,2,1".parse().unwrap();
        assert_eq!(dispenser, StampDispenser::default());

        assert_eq!(
            "10,x,1".parse::<StampDispenser>(),
            Err(ConfigError::InvalidDenomination {
                input: "x".to_string()
            })
        );
        assert_eq!(" , ".parse::<StampDispenser>(), Err(ConfigError::Empty));
    }

    #[test]
    fn test_unit_only() {
        let dispenser = StampDispenser::new(&[1]).unwrap();
        assert_eq!(dispenser.min_units(0), 0);
        assert_eq!(dispenser.min_units(7), 7);
        assert_eq!(dispenser.min_units(-3), -1);
    }

    #[test]
    fn test_greedy_restart_is_not_exhaustive() {
        // 7 + 5 + 5 would take 3; every greedy pass needs 5
        let dispenser = StampDispenser::new(&[7, 5, 1]).unwrap();
        assert_eq!(dispenser.min_units(17), 5);

        // restarting below 25 finds 10 + 10 + 10
        let dispenser = StampDispenser::new(&[25, 10, 1]).unwrap();
        assert_eq!(dispenser.min_units(30), 3);
    }

    #[test]
    fn test_dispense_breakdown() {
        let dispenser = StampDispenser::default();

        let dispensed = dispenser.dispense(34).unwrap();
        assert_eq!(dispensed.stamps, vec![(24, 1), (10, 1)]);
        assert_eq!(dispensed.units, 2);

        // short-circuit on a remainder of 1
        let dispensed = dispenser.dispense(5).unwrap();
        assert_eq!(dispensed.stamps, vec![(2, 2), (1, 1)]);
        assert_eq!(dispensed.to_string(), "2x2 + 1x1");

        assert_eq!(dispenser.dispense(-1), None);
        let nothing = dispenser.dispense(0).unwrap();
        assert_eq!(nothing.units, 0);
        assert_eq!(nothing.to_string(), "nothing");
    }

    #[test]
    fn test_dispense_agrees_with_min_units() {
        let systems: [&[i64]; 4] = [&DEFAULT_DENOMINATIONS, &[7, 5, 1], &[25, 10, 5, 1], &[1]];
        for denominations in systems {
            let dispenser = StampDispenser::new(denominations).unwrap();
            for request in 0..500 {
                let dispensed = dispenser.dispense(request).unwrap();
                assert_eq!(dispensed.total(), request, "{:?} {}", denominations, request);
                assert_eq!(
                    dispensed.units,
                    dispensed.stamps.iter().map(|(_, count)| count).sum::<i64>()
                );
                assert_eq!(dispensed.units, dispenser.min_units(request));
            }
        }
    }

    #[test]
    fn test_idempotent_across_threads() {
        let dispenser = StampDispenser::default();
        let expected: Vec<i64> = (0..200).map(|r| dispenser.min_units(r)).collect();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let actual: Vec<i64> = (0..200).map(|r| dispenser.min_units(r)).collect();
                    assert_eq!(actual, expected);
                });
            }
        });
    }
}
