//! Physical units and value metadata.
//!
//! A measurement value carries an SI-like dimension record so that tables
//! can be printed with meaningful units. Only the dimensions this engine
//! produces are tracked: length (rendered `px`) and intensity (rendered
//! `adu`). The engine itself needs nothing beyond composition, equality and
//! a printable form.

use std::fmt;
use std::ops::{Div, Mul};

/// Dimension record for a measurement value.
///
/// Units compose through multiplication, division and integer powers:
///
/// ```
/// use measure_rs::units::Units;
///
/// let area = Units::PIXEL.powi(2);
/// let density = Units::INTENSITY / area;
/// assert_eq!(density.to_string(), "adu·px^-2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Units {
    length: i32,
    intensity: i32,
}

impl Units {
    /// Dimensionless.
    pub const NONE: Units = Units {
        length: 0,
        intensity: 0,
    };

    /// Length in pixels.
    pub const PIXEL: Units = Units {
        length: 1,
        intensity: 0,
    };

    /// Intensity in arbitrary detector units.
    pub const INTENSITY: Units = Units {
        length: 0,
        intensity: 1,
    };

    /// Raise to an integer power, e.g. an area is `Units::PIXEL.powi(2)`.
    pub fn powi(self, exp: i32) -> Units {
        Units {
            length: self.length * exp,
            intensity: self.intensity * exp,
        }
    }

    /// True if dimensionless.
    pub fn is_none(&self) -> bool {
        *self == Units::NONE
    }
}

impl Mul for Units {
    type Output = Units;

    fn mul(self, rhs: Units) -> Units {
        Units {
            length: self.length + rhs.length,
            intensity: self.intensity + rhs.intensity,
        }
    }
}

impl Div for Units {
    type Output = Units;

    fn div(self, rhs: Units) -> Units {
        Units {
            length: self.length - rhs.length,
            intensity: self.intensity - rhs.intensity,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (symbol, exp) in [("adu", self.intensity), ("px", self.length)] {
            match exp {
                0 => {}
                1 => parts.push(symbol.to_string()),
                _ => parts.push(format!("{symbol}^{exp}")),
            }
        }
        write!(f, "{}", parts.join("\u{b7}"))
    }
}

/// Describes one scalar value column: a short name plus its units.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDesc {
    /// Short identifier for the value, e.g. `"x"` or `"Size"`.
    pub name: String,
    /// Units of the value.
    pub units: Units,
}

impl ValueDesc {
    /// Create a value descriptor.
    pub fn new(name: impl Into<String>, units: Units) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }

    /// Create a dimensionless value descriptor.
    pub fn dimensionless(name: impl Into<String>) -> Self {
        Self::new(name, Units::NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition() {
        let area = Units::PIXEL * Units::PIXEL;
        assert_eq!(area, Units::PIXEL.powi(2));
        assert_eq!(area / Units::PIXEL, Units::PIXEL);
        assert_eq!(Units::PIXEL / Units::PIXEL, Units::NONE);
    }

    #[test]
    fn display() {
        assert_eq!(Units::NONE.to_string(), "");
        assert_eq!(Units::PIXEL.to_string(), "px");
        assert_eq!(Units::PIXEL.powi(3).to_string(), "px^3");
        assert_eq!(Units::INTENSITY.to_string(), "adu");
        assert_eq!((Units::INTENSITY * Units::PIXEL).to_string(), "adu\u{b7}px");
        assert_eq!(
            (Units::INTENSITY / Units::PIXEL.powi(2)).to_string(),
            "adu\u{b7}px^-2"
        );
    }

    #[test]
    fn value_desc() {
        let v = ValueDesc::new("Size", Units::PIXEL.powi(2));
        assert_eq!(v.name, "Size");
        assert!(!v.units.is_none());
        assert!(ValueDesc::dimensionless("P2A").units.is_none());
    }
}
