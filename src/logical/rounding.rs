//! Rounding modes for decimal rescaling.

use std::fmt;
use std::str::FromStr;

use crate::error::GenericError;

/// How digits are discarded when a decimal is rescaled to fewer fraction
/// digits. Names follow the spelling used in schema attributes
/// (`"HALF_UP"`, `"UNNECESSARY"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Towards zero.
    Down,
    /// Towards positive infinity.
    Ceiling,
    /// Towards negative infinity.
    Floor,
    /// Nearest neighbour, ties away from zero.
    HalfUp,
    /// Nearest neighbour, ties towards zero.
    HalfDown,
    /// Nearest neighbour, ties to the even neighbour.
    HalfEven,
    /// Rounding is an error.
    Unnecessary,
}

impl RoundingMode {
    /// Attribute spelling of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingMode::Up => "UP",
            RoundingMode::Down => "DOWN",
            RoundingMode::Ceiling => "CEILING",
            RoundingMode::Floor => "FLOOR",
            RoundingMode::HalfUp => "HALF_UP",
            RoundingMode::HalfDown => "HALF_DOWN",
            RoundingMode::HalfEven => "HALF_EVEN",
            RoundingMode::Unnecessary => "UNNECESSARY",
        }
    }

    /// Parse an optional mode where `"none"` or an empty string means unset.
    pub fn parse_optional(name: &str) -> Result<Option<Self>, GenericError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            Ok(None)
        } else {
            trimmed.parse().map(Some)
        }
    }

    /// The arithmetic mode behind this one. `Unnecessary` has none: it only
    /// decides whether rounding is allowed at all.
    pub(crate) fn arithmetic(&self) -> Option<bigdecimal::RoundingMode> {
        use bigdecimal::RoundingMode as Arith;
        match self {
            RoundingMode::Up => Some(Arith::Up),
            RoundingMode::Down => Some(Arith::Down),
            RoundingMode::Ceiling => Some(Arith::Ceiling),
            RoundingMode::Floor => Some(Arith::Floor),
            RoundingMode::HalfUp => Some(Arith::HalfUp),
            RoundingMode::HalfDown => Some(Arith::HalfDown),
            RoundingMode::HalfEven => Some(Arith::HalfEven),
            RoundingMode::Unnecessary => None,
        }
    }
}

impl FromStr for RoundingMode {
    type Err = GenericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(RoundingMode::Up),
            "DOWN" => Ok(RoundingMode::Down),
            "CEILING" => Ok(RoundingMode::Ceiling),
            "FLOOR" => Ok(RoundingMode::Floor),
            "HALF_UP" => Ok(RoundingMode::HalfUp),
            "HALF_DOWN" => Ok(RoundingMode::HalfDown),
            "HALF_EVEN" => Ok(RoundingMode::HalfEven),
            "UNNECESSARY" => Ok(RoundingMode::Unnecessary),
            other => Err(GenericError::Configuration(format!(
                "Unknown rounding mode '{}'. Supported modes: UP, DOWN, CEILING, FLOOR, HALF_UP, HALF_DOWN, HALF_EVEN, UNNECESSARY",
                other
            ))),
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for mode in [
            RoundingMode::Up,
            RoundingMode::Down,
            RoundingMode::Ceiling,
            RoundingMode::Floor,
            RoundingMode::HalfUp,
            RoundingMode::HalfDown,
            RoundingMode::HalfEven,
            RoundingMode::Unnecessary,
        ] {
            assert_eq!(mode.as_str().parse::<RoundingMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(RoundingMode::parse_optional("none").unwrap(), None);
        assert_eq!(RoundingMode::parse_optional("").unwrap(), None);
        assert_eq!(
            RoundingMode::parse_optional("HALF_UP").unwrap(),
            Some(RoundingMode::HalfUp)
        );
        assert!(RoundingMode::parse_optional("half_up").is_err());
    }
}
