//! Rational numbers for frame rates and frame durations

use std::fmt;

/// A rational number represented as numerator/denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    /// Create a new rational number, reduced to lowest terms
    pub fn new(num: i64, den: i64) -> Self {
        let mut r = Rational { num, den };
        r.reduce();
        r
    }

    /// Convert to floating point
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        self.num as f64 / self.den as f64
    }

    /// Invert the rational number (frame rate <-> frame duration)
    pub fn invert(self) -> Self {
        Rational::new(self.den, self.num)
    }

    /// A zero denominator marks an unknown rate
    pub fn is_known(&self) -> bool {
        self.den != 0 && self.num != 0
    }

    fn reduce(&mut self) {
        if self.den == 0 {
            return;
        }

        let gcd = gcd(self.num.abs(), self.den.abs());
        if gcd > 1 {
            self.num /= gcd;
            self.den /= gcd;
        }

        if self.den < 0 {
            self.num = -self.num;
            self.den = -self.den;
        }
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

impl Default for Rational {
    fn default() -> Self {
        Rational { num: 0, den: 1 }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_reduction() {
        let r = Rational::new(60000, 2002);
        assert_eq!(r, Rational::new(30000, 1001));
    }

    #[test]
    fn test_rational_invert() {
        let fps = Rational::new(25, 1);
        assert_eq!(fps.invert(), Rational::new(1, 25));
        assert!(fps.is_known());
        assert!(!Rational::default().is_known());
    }

    #[test]
    fn test_negative_denominator() {
        let r = Rational::new(1, -2);
        assert_eq!(r.num, -1);
        assert_eq!(r.den, 2);
    }
}
