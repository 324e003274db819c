//! Presentation timestamps carried in frame properties

use super::Rational;
use std::fmt;

/// A timestamp in a media stream, in time base units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub value: i64,
}

impl Timestamp {
    /// Create a new timestamp
    pub fn new(value: i64) -> Self {
        Timestamp { value }
    }

    /// No timestamp / unknown timestamp
    pub fn none() -> Self {
        Timestamp { value: i64::MIN }
    }

    /// Check if timestamp is valid
    pub fn is_valid(&self) -> bool {
        self.value != i64::MIN
    }

    /// Convert timestamp to seconds
    pub fn to_seconds(&self, time_base: Rational) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        self.value as f64 * time_base.to_f64()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::none()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "NOPTS")
        }
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_none() {
        let ts = Timestamp::default();
        assert!(!ts.is_valid());
        assert_eq!(ts.to_string(), "NOPTS");
    }

    #[test]
    fn test_timestamp_to_seconds() {
        let ts = Timestamp::new(50);
        assert_eq!(ts.to_seconds(Rational::new(1, 25)), 2.0);
    }
}
