//! Angle and length value types, and the length units understood by the
//! IGES writer.

use std::fmt;
use std::str::FromStr;

use crate::error::IgesError;

/// A plane angle, stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Angle {
    rad: f64,
}

impl Angle {
    /// Creates an angle from radians.
    #[must_use]
    pub fn from_rad(rad: f64) -> Self {
        Self { rad }
    }

    /// Creates an angle from degrees.
    #[must_use]
    pub fn from_deg(deg: f64) -> Self {
        Self { rad: deg.to_radians() }
    }

    /// Returns the angle in radians.
    #[must_use]
    pub fn rad(&self) -> f64 {
        self.rad
    }

    /// Returns the angle in degrees.
    #[must_use]
    pub fn deg(&self) -> f64 {
        self.rad.to_degrees()
    }
}

/// A length, stored in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Length {
    meters: f64,
}

impl Length {
    /// Creates a length expressed in `unit`.
    #[must_use]
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self {
            meters: value * unit.meters_per_unit(),
        }
    }

    /// Creates a length from meters.
    #[must_use]
    pub fn from_meters(meters: f64) -> Self {
        Self { meters }
    }

    /// Returns the length in meters.
    #[must_use]
    pub fn meters(&self) -> f64 {
        self.meters
    }

    /// Returns the length expressed in `unit`.
    #[must_use]
    pub fn to_unit(&self, unit: LengthUnit) -> f64 {
        self.meters / unit.meters_per_unit()
    }
}

/// Model-space length units with an IGES unit flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Inches,
    Millimeters,
    Feet,
    Miles,
    Meters,
    Kilometers,
    Mils,
    Microns,
    Centimeters,
    Microinches,
}

impl LengthUnit {
    /// IGES global parameter 14 (units flag).
    #[must_use]
    pub fn iges_code(self) -> u8 {
        match self {
            Self::Inches => 1,
            Self::Millimeters => 2,
            Self::Feet => 4,
            Self::Miles => 5,
            Self::Meters => 6,
            Self::Kilometers => 7,
            Self::Mils => 8,
            Self::Microns => 9,
            Self::Centimeters => 10,
            Self::Microinches => 11,
        }
    }

    /// IGES global parameter 15 (units name).
    #[must_use]
    pub fn iges_name(self) -> &'static str {
        match self {
            Self::Inches => "INCH",
            Self::Millimeters => "MM",
            Self::Feet => "FT",
            Self::Miles => "MI",
            Self::Meters => "M",
            Self::Kilometers => "KM",
            Self::Mils => "MIL",
            Self::Microns => "UM",
            Self::Centimeters => "CM",
            Self::Microinches => "UIN",
        }
    }

    /// Conversion factor to meters.
    #[must_use]
    pub fn meters_per_unit(self) -> f64 {
        match self {
            Self::Inches => 0.0254,
            Self::Millimeters => 1e-3,
            Self::Feet => 0.3048,
            Self::Miles => 1609.344,
            Self::Meters => 1.0,
            Self::Kilometers => 1e3,
            Self::Mils => 2.54e-5,
            Self::Microns => 1e-6,
            Self::Centimeters => 1e-2,
            Self::Microinches => 2.54e-8,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = IgesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inches" | "inch" | "in" => Ok(Self::Inches),
            "millimeters" | "millimetres" | "mm" => Ok(Self::Millimeters),
            "feet" | "foot" | "ft" => Ok(Self::Feet),
            "miles" | "mile" | "mi" => Ok(Self::Miles),
            "meters" | "metres" | "m" => Ok(Self::Meters),
            "kilometers" | "kilometres" | "km" => Ok(Self::Kilometers),
            "mils" | "mil" => Ok(Self::Mils),
            "microns" | "micrometers" | "um" => Ok(Self::Microns),
            "centimeters" | "centimetres" | "cm" => Ok(Self::Centimeters),
            "microinches" | "uin" => Ok(Self::Microinches),
            _ => Err(IgesError::UnsupportedUnit(s.to_string())),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.iges_name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    #[test]
    fn angle_conversions() {
        let a = Angle::from_deg(180.0);
        assert!((a.rad() - std::f64::consts::PI).abs() < TOLERANCE);
        assert!((Angle::from_rad(std::f64::consts::FRAC_PI_2).deg() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn length_conversions() {
        let l = Length::new(254.0, LengthUnit::Millimeters);
        assert!((l.meters() - 0.254).abs() < TOLERANCE);
        assert!((l.to_unit(LengthUnit::Inches) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn unit_strings_map_to_codes() {
        assert_eq!("meters".parse::<LengthUnit>().unwrap().iges_code(), 6);
        assert_eq!("Millimeters".parse::<LengthUnit>().unwrap().iges_code(), 2);
        assert_eq!("inches".parse::<LengthUnit>().unwrap().iges_code(), 1);
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let err = "furlongs".parse::<LengthUnit>().unwrap_err();
        assert!(matches!(err, IgesError::UnsupportedUnit(ref u) if u == "furlongs"));
    }
}
