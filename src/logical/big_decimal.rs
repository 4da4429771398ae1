//! Arbitrary precision decimal numbers.
//!
//! A [`BigDecimal`] is an unscaled [`BigInt`] together with a scale: the
//! value is `unscaled * 10^-scale`. Equality and hashing are structural
//! (`2.0` and `2.00` differ), while [`BigDecimal::cmp_numeric`] orders by
//! numeric value. Parsing and rounding go through the `bigdecimal` crate;
//! this type keeps the 32-bit scale carried on the wire.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::error::GenericError;
use crate::logical::RoundingMode;

/// Decimal number with an explicit scale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal {
    unscaled: BigInt,
    scale: i32,
}

fn scale_out_of_range(scale: i64) -> GenericError {
    GenericError::PrecisionViolation(format!("Decimal scale {} is out of range", scale))
}

impl BigDecimal {
    /// Build a decimal from its unscaled value and scale.
    pub fn new(unscaled: impl Into<BigInt>, scale: i32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale,
        }
    }

    /// The unscaled integer.
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// Number of digits right of the decimal point (negative for
    /// multiples of powers of ten).
    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Number of decimal digits in the unscaled value; zero has precision 1.
    pub fn precision(&self) -> u32 {
        if self.unscaled.is_zero() {
            return 1;
        }
        u32::try_from(self.arithmetic().digits()).unwrap_or(u32::MAX)
    }

    /// Whether the value is negative.
    pub fn is_negative(&self) -> bool {
        self.unscaled.is_negative()
    }

    fn arithmetic(&self) -> bigdecimal::BigDecimal {
        bigdecimal::BigDecimal::new(self.unscaled.clone(), i64::from(self.scale))
    }

    fn from_arithmetic(value: bigdecimal::BigDecimal) -> Result<Self, GenericError> {
        let (unscaled, scale) = value.into_bigint_and_exponent();
        let scale = i32::try_from(scale).map_err(|_| scale_out_of_range(scale))?;
        Ok(Self::new(unscaled, scale))
    }

    /// Exponent of the leading digit: `1.5E+3` gives 3, `0.05` gives -2.
    fn leading_exponent(&self) -> i64 {
        i64::from(self.precision()) - 1 - i64::from(self.scale)
    }

    /// Rescale to `new_scale`, rounding with `mode` when digits are dropped.
    ///
    /// Increasing the scale is always exact. `RoundingMode::Unnecessary`
    /// fails if any non-zero digit would be discarded.
    pub fn set_scale(&self, new_scale: i32, mode: RoundingMode) -> Result<Self, GenericError> {
        if self.unscaled.is_zero() || new_scale == self.scale {
            return Ok(Self::new(self.unscaled.clone(), new_scale));
        }
        let target = i64::from(new_scale);
        if new_scale > self.scale {
            return Self::from_arithmetic(self.arithmetic().with_scale(target));
        }

        // When every digit is dropped the magnitude is below half a unit of
        // the target scale, so a one-digit stand-in rounds the same way.
        let dropped = i64::from(self.scale) - target;
        let source = if dropped > i64::from(self.precision()) {
            bigdecimal::BigDecimal::new(self.unscaled.signum(), target + 2)
        } else {
            self.arithmetic()
        };

        match mode.arithmetic() {
            Some(arith) => Self::from_arithmetic(source.with_scale_round(target, arith)),
            None => {
                let down = source.with_scale_round(target, bigdecimal::RoundingMode::Down);
                if down != source.with_scale_round(target, bigdecimal::RoundingMode::Up) {
                    return Err(GenericError::PrecisionViolation(format!(
                        "Rounding necessary to rescale {} to scale {}",
                        self, new_scale
                    )));
                }
                Self::from_arithmetic(down)
            }
        }
    }

    /// Round to at most `precision` significant digits.
    pub fn round_to_precision(&self, precision: u32, mode: RoundingMode) -> Result<Self, GenericError> {
        let mut current = self.clone();
        // A carry (999 -> 1000) can add a digit, so loop until it fits.
        while current.precision() > precision {
            let excess = i64::from(current.precision() - precision);
            let target = i64::from(current.scale) - excess;
            let target = i32::try_from(target).map_err(|_| scale_out_of_range(target))?;
            current = current.set_scale(target, mode)?;
        }
        Ok(current)
    }

    /// Parse `text`, rounding to `precision` significant digits with
    /// half-even rounding.
    pub fn parse_with_precision(text: &str, precision: u32) -> Result<Self, GenericError> {
        let exact: BigDecimal = text.parse()?;
        exact.round_to_precision(precision, RoundingMode::HalfEven)
    }

    /// Compare by numeric value, ignoring representation.
    ///
    /// Sign first, then the position of the leading digit; the digits are
    /// only aligned when both lead at the same position.
    pub fn cmp_numeric(&self, other: &Self) -> Ordering {
        let by_sign = self.unscaled.sign().cmp(&other.unscaled.sign());
        if by_sign != Ordering::Equal || self.unscaled.is_zero() {
            return by_sign;
        }
        let by_magnitude = self.leading_exponent().cmp(&other.leading_exponent());
        match by_magnitude {
            Ordering::Equal => self.arithmetic().cmp(&other.arithmetic()),
            _ if self.is_negative() => by_magnitude.reverse(),
            _ => by_magnitude,
        }
    }

    /// Render without exponent notation.
    pub fn to_plain_string(&self) -> String {
        let digits = self.unscaled.magnitude().to_string();
        let sign = if self.unscaled.is_negative() { "-" } else { "" };
        if self.scale <= 0 {
            if self.unscaled.is_zero() {
                return "0".to_string();
            }
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            return format!("{}{}{}", sign, digits, zeros);
        }
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            format!("{}{}.{}", sign, int_part, frac_part)
        } else {
            format!("{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl FromStr for BigDecimal {
    type Err = GenericError;

    /// Accepts an optional sign, digits with an optional decimal point and
    /// an optional `e`/`E` exponent.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parsed = bigdecimal::BigDecimal::from_str(text)
            .map_err(|e| GenericError::MalformedEncoding(format!("Invalid decimal: '{}' ({})", text, e)))?;
        Self::from_arithmetic(parsed)
    }
}

impl fmt::Display for BigDecimal {
    /// Plain notation when the scale is non-negative and the value is not
    /// tiny, scientific notation otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_string();
        let adjusted = -(self.scale as i64) + (digits.len() as i64 - 1);
        if self.scale >= 0 && adjusted >= -6 {
            return f.write_str(&self.to_plain_string());
        }
        if self.unscaled.is_negative() {
            f.write_str("-")?;
        }
        let (first, rest) = digits.split_at(1);
        f.write_str(first)?;
        if !rest.is_empty() {
            write!(f, ".{}", rest)?;
        }
        if adjusted != 0 {
            f.write_str("E")?;
            if adjusted > 0 {
                f.write_str("+")?;
            }
            write!(f, "{}", adjusted)?;
        }
        Ok(())
    }
}

impl From<i64> for BigDecimal {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> BigDecimal {
        text.parse().unwrap()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(dec("1.255"), BigDecimal::new(1255, 3));
        assert_eq!(dec("-0.05"), BigDecimal::new(-5, 2));
        assert_eq!(dec("+12"), BigDecimal::new(12, 0));
        assert_eq!(dec("1.5E3"), BigDecimal::new(15, -2));
        assert_eq!(dec("25e-3"), BigDecimal::new(25, 3));
        assert_eq!(dec(".5"), BigDecimal::new(5, 1));
        assert!("abc".parse::<BigDecimal>().is_err());
        assert!("1.2.3".parse::<BigDecimal>().is_err());
        assert!("".parse::<BigDecimal>().is_err());
        assert!("-".parse::<BigDecimal>().is_err());
    }

    #[test]
    fn test_precision() {
        assert_eq!(dec("0").precision(), 1);
        assert_eq!(dec("123.45").precision(), 5);
        assert_eq!(dec("-0.001").precision(), 1);
    }

    #[test]
    fn test_set_scale_modes() {
        let value = dec("1.255");
        assert_eq!(value.set_scale(2, RoundingMode::HalfUp).unwrap(), dec("1.26"));
        assert_eq!(value.set_scale(2, RoundingMode::HalfDown).unwrap(), dec("1.25"));
        assert_eq!(value.set_scale(2, RoundingMode::HalfEven).unwrap(), dec("1.26"));
        assert_eq!(value.set_scale(2, RoundingMode::Down).unwrap(), dec("1.25"));
        assert_eq!(value.set_scale(2, RoundingMode::Up).unwrap(), dec("1.26"));
        assert!(value.set_scale(2, RoundingMode::Unnecessary).is_err());

        let negative = dec("-1.245");
        assert_eq!(negative.set_scale(2, RoundingMode::HalfEven).unwrap(), dec("-1.24"));
        assert_eq!(negative.set_scale(2, RoundingMode::Ceiling).unwrap(), dec("-1.24"));
        assert_eq!(negative.set_scale(2, RoundingMode::Floor).unwrap(), dec("-1.25"));
        assert_eq!(negative.set_scale(2, RoundingMode::HalfUp).unwrap(), dec("-1.25"));
    }

    #[test]
    fn test_set_scale_grows_exactly() {
        assert_eq!(
            dec("1.5").set_scale(3, RoundingMode::Unnecessary).unwrap(),
            BigDecimal::new(1500, 3)
        );
        assert_eq!(
            dec("1.500").set_scale(1, RoundingMode::Unnecessary).unwrap(),
            dec("1.5")
        );
    }

    #[test]
    fn test_parse_with_precision_rounds_half_even() {
        assert_eq!(BigDecimal::parse_with_precision("123.45", 4).unwrap(), dec("123.4"));
        assert_eq!(BigDecimal::parse_with_precision("123.55", 4).unwrap(), dec("123.6"));
        assert_eq!(
            BigDecimal::parse_with_precision("999.96", 4).unwrap(),
            BigDecimal::new(1000, 0)
        );
    }

    #[test]
    fn test_numeric_vs_structural_equality() {
        assert_ne!(dec("2.0"), dec("2.00"));
        assert_eq!(dec("2.0").cmp_numeric(&dec("2.00")), Ordering::Equal);
        assert_eq!(dec("-1").cmp_numeric(&dec("0.5")), Ordering::Less);
        assert_eq!(dec("1E+2").cmp_numeric(&dec("99.9")), Ordering::Greater);
    }

    #[test]
    fn test_compare_far_apart_scales() {
        let huge = BigDecimal::new(1, i32::MIN);
        let tiny = BigDecimal::new(5, i32::MAX);
        assert_eq!(huge.cmp_numeric(&BigDecimal::new(1, 2)), Ordering::Greater);
        assert_eq!(BigDecimal::new(-1, i32::MIN).cmp_numeric(&BigDecimal::new(-1, 2)), Ordering::Less);
        assert_eq!(tiny.cmp_numeric(&huge), Ordering::Less);
        assert_eq!(tiny.cmp_numeric(&BigDecimal::new(0, 0)), Ordering::Greater);
        assert_eq!(BigDecimal::new(0, i32::MIN).cmp_numeric(&BigDecimal::new(0, 3)), Ordering::Equal);
        assert_eq!(dec("10.0").cmp_numeric(&dec("1E+1")), Ordering::Equal);
        assert_eq!(dec("-10.5").cmp_numeric(&dec("-10.4")), Ordering::Less);
    }

    #[test]
    fn test_set_scale_drops_every_digit() {
        let tiny = BigDecimal::new(5, i32::MAX);
        assert_eq!(tiny.set_scale(2, RoundingMode::HalfUp).unwrap(), BigDecimal::new(0, 2));
        assert_eq!(tiny.set_scale(2, RoundingMode::Up).unwrap(), BigDecimal::new(1, 2));
        assert_eq!(tiny.set_scale(2, RoundingMode::Ceiling).unwrap(), BigDecimal::new(1, 2));

        let negative = BigDecimal::new(-987, i32::MAX);
        assert_eq!(negative.set_scale(0, RoundingMode::Floor).unwrap(), BigDecimal::new(-1, 0));
        assert_eq!(negative.set_scale(0, RoundingMode::Ceiling).unwrap(), BigDecimal::new(0, 0));
        assert_eq!(negative.set_scale(0, RoundingMode::HalfEven).unwrap(), BigDecimal::new(0, 0));
        assert!(negative.set_scale(0, RoundingMode::Unnecessary).is_err());

        // One digit past the last one still rounds from the real digits.
        assert_eq!(dec("0.05").set_scale(0, RoundingMode::HalfUp).unwrap(), BigDecimal::new(0, 0));
        assert_eq!(dec("0.5").set_scale(0, RoundingMode::HalfUp).unwrap(), BigDecimal::new(1, 0));
    }

    #[test]
    fn test_round_to_precision_scale_overflow() {
        let value = BigDecimal::new(12_345, i32::MIN);
        assert!(matches!(
            value.round_to_precision(2, RoundingMode::HalfEven),
            Err(GenericError::PrecisionViolation(_))
        ));
    }

    #[test]
    fn test_rendering() {
        assert_eq!(dec("-0.005").to_plain_string(), "-0.005");
        assert_eq!(dec("1.5E3").to_plain_string(), "1500");
        assert_eq!(dec("1.5E3").to_string(), "1.5E+3");
        assert_eq!(dec("123.45").to_string(), "123.45");
        assert_eq!(BigDecimal::new(1, 10).to_string(), "1E-10");
        assert_eq!(BigDecimal::new(0, 0).to_string(), "0");
    }
}
