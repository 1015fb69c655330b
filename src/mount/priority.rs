//! Mount priorities.
//!
//! A priority places a module's rules in a band of the target's rule stream.
//! Bands are ordered by priority value, so everything mounted at
//! [`Priority::HIGH`] follows everything at [`Priority::NORMAL`], which follows
//! everything at [`Priority::LOW`], regardless of mount-call order. Any finite
//! value in `0..=2` is accepted for finer-grained bands.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::mount::MountError;

/// A validated mount priority.
#[derive(Debug, Clone, Copy)]
pub struct Priority(f64);

impl Priority {
    /// The lowest tier (0).
    pub const LOW: Priority = Priority(0.0);
    /// The default tier (1).
    pub const NORMAL: Priority = Priority(1.0);
    /// The highest tier (2).
    pub const HIGH: Priority = Priority(2.0);

    /// Validate a numeric priority.
    pub fn new(value: f64) -> Result<Self, MountError> {
        if !(Self::LOW.0..=Self::HIGH.0).contains(&value) {
            return Err(MountError::InvalidPriority(value.to_string()));
        }
        // Collapse -0.0 so equal priorities always share a tier.
        Ok(Priority(value + 0.0))
    }

    /// The numeric value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::NORMAL
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            p if p == Priority::LOW => f.write_str("low"),
            p if p == Priority::NORMAL => f.write_str("normal"),
            p if p == Priority::HIGH => f.write_str("high"),
            Priority(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for Priority {
    type Err = MountError;

    /// Accepts `low`, `normal`, `high` or a number in `0..=2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Priority::LOW),
            "normal" => Ok(Priority::NORMAL),
            "high" => Ok(Priority::HIGH),
            other => other
                .parse::<f64>()
                .map_err(|_| MountError::InvalidPriority(s.to_string()))
                .and_then(Priority::new),
        }
    }
}

impl TryFrom<f64> for Priority {
    type Error = MountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Priority::new(value)
    }
}

/// Anything a mount call accepts as a priority.
///
/// Validation happens before the mount is attempted.
pub trait IntoPriority {
    fn into_priority(self) -> Result<Priority, MountError>;
}

impl IntoPriority for Priority {
    fn into_priority(self) -> Result<Priority, MountError> {
        Ok(self)
    }
}

impl IntoPriority for f64 {
    fn into_priority(self) -> Result<Priority, MountError> {
        Priority::new(self)
    }
}

impl IntoPriority for i32 {
    fn into_priority(self) -> Result<Priority, MountError> {
        Priority::new(f64::from(self))
    }
}

impl IntoPriority for &str {
    fn into_priority(self) -> Result<Priority, MountError> {
        self.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_tiers_are_ordered() {
        assert!(Priority::LOW < Priority::NORMAL);
        assert!(Priority::NORMAL < Priority::HIGH);
        assert_eq!(Priority::default(), Priority::NORMAL);
    }

    #[test]
    fn accepts_values_in_range() {
        assert_eq!(Priority::new(0.0).unwrap(), Priority::LOW);
        assert_eq!(Priority::new(1.5).unwrap().value(), 1.5);
        assert_eq!(Priority::new(2.0).unwrap(), Priority::HIGH);
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        assert_eq!(
            Priority::new(2.5),
            Err(MountError::InvalidPriority("2.5".into()))
        );
        assert!(Priority::new(-0.1).is_err());
        assert!(Priority::new(f64::NAN).is_err());
        assert!(Priority::new(f64::INFINITY).is_err());
    }

    #[test]
    fn negative_zero_is_low() {
        let p = Priority::new(-0.0).unwrap();
        assert_eq!(p, Priority::LOW);
        assert_eq!(p.value().to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::LOW);
        assert_eq!(" high ".parse::<Priority>().unwrap(), Priority::HIGH);
        assert_eq!("0.5".parse::<Priority>().unwrap().value(), 0.5);
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(MountError::InvalidPriority("urgent".into()))
        );
        assert!("3".parse::<Priority>().is_err());
    }

    #[test]
    fn into_priority_conversions() {
        assert_eq!(2_i32.into_priority().unwrap(), Priority::HIGH);
        assert_eq!(0.25_f64.into_priority().unwrap().value(), 0.25);
        assert_eq!("normal".into_priority().unwrap(), Priority::NORMAL);
        assert!(7_i32.into_priority().is_err());
    }

    #[test]
    fn display_uses_names_for_tiers() {
        assert_eq!(Priority::HIGH.to_string(), "high");
        assert_eq!(Priority::new(0.5).unwrap().to_string(), "0.5");
    }
}
