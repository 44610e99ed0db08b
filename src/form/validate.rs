//! Advisory client-side validation of a candidate configuration.
//!
//! Pure: produces a [`Verdict`] and nothing else. Annotating the form with the
//! verdict is the controller's job.

use std::collections::BTreeMap;
use std::fmt;

use crate::form::draft::{parse_number, parse_or_zero, Draft};
use crate::form::schema::NumericField;

pub const NOT_A_NON_NEGATIVE_NUMBER: &str = "must be a non-negative number";
pub const MIN_SPEED_ABOVE_RATE_LIMIT: &str = "minimum speed cannot exceed the rate limit";

/// Field-level validation result. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    errors: BTreeMap<NumericField, &'static str>,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: NumericField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn errors(&self) -> impl Iterator<Item = (NumericField, &'static str)> + '_ {
        self.errors.iter().map(|(f, m)| (*f, *m))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return f.write_str("valid");
        }
        let parts: Vec<String> = self
            .errors()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validate editable numeric fields, then the rate-limit / minimum-speed
/// relation. Read-only, enum and set fields are never rejected.
pub fn validate(candidate: &Draft) -> Verdict {
    let mut errors = BTreeMap::new();

    for field in NumericField::ALL.into_iter().filter(NumericField::is_editable) {
        let raw = candidate.input(field);
        if raw.trim().is_empty() {
            continue;
        }
        match parse_number(raw) {
            Some(v) if v >= 0.0 => {}
            _ => {
                errors.insert(field, NOT_A_NON_NEGATIVE_NUMBER);
            }
        }
    }

    let rate = parse_or_zero(candidate.input(NumericField::SpeedtestRateLimitMb));
    let min = parse_or_zero(candidate.input(NumericField::MinSpeed));
    if rate > 0.0 && min > rate {
        for field in [NumericField::MinSpeed, NumericField::SpeedtestRateLimitMb] {
            errors.entry(field).or_insert(MIN_SPEED_ABOVE_RATE_LIMIT);
        }
    }

    Verdict { errors }
}
