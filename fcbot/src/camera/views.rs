//! Predefined camera views.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Elevation of the isometric view: `atan(1 / sqrt(2))` in degrees.
pub const ISOMETRIC_ELEVATION: f64 = 35.264_389_682_754_654;

/// A named, predefined camera view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedView {
    /// Looking down the -Z axis.
    Top,
    /// Looking up the +Z axis.
    Bottom,
    /// Looking along +Y.
    Front,
    /// Looking along -Y.
    Rear,
    /// Looking along +X.
    Left,
    /// Looking along -X.
    Right,
    /// Front-right-top, all three axes equally foreshortened.
    Isometric,
    /// Front-right-top, X and Y equally foreshortened.
    Dimetric,
    /// Front-right-top, every axis foreshortened differently.
    Trimetric,
    /// Same orientation as `Isometric`; `axometric` is accepted as an alias.
    Axonometric,
}

impl NamedView {
    /// Every named view.
    pub const ALL: [Self; 10] = [
        Self::Top,
        Self::Bottom,
        Self::Front,
        Self::Rear,
        Self::Left,
        Self::Right,
        Self::Isometric,
        Self::Dimetric,
        Self::Trimetric,
        Self::Axonometric,
    ];

    /// Returns `(azimuth, elevation)` in degrees.
    ///
    /// Azimuth 0 looks along +Y (front) and grows counter-clockwise seen
    /// from above; elevation 90 looks straight down.
    #[must_use]
    pub fn angles(self) -> (f64, f64) {
        match self {
            Self::Top => (0.0, 90.0),
            Self::Bottom => (0.0, -90.0),
            Self::Front => (0.0, 0.0),
            Self::Rear => (180.0, 0.0),
            Self::Left => (-90.0, 0.0),
            Self::Right => (90.0, 0.0),
            Self::Isometric | Self::Axonometric => (45.0, ISOMETRIC_ELEVATION),
            Self::Dimetric => (45.0, 20.705),
            Self::Trimetric => (30.0, 25.0),
        }
    }
}

impl FromStr for NamedView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "front" => Ok(Self::Front),
            "rear" => Ok(Self::Rear),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "isometric" => Ok(Self::Isometric),
            "dimetric" => Ok(Self::Dimetric),
            "trimetric" => Ok(Self::Trimetric),
            "axonometric" | "axometric" => Ok(Self::Axonometric),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for NamedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Front => "front",
            Self::Rear => "rear",
            Self::Left => "left",
            Self::Right => "right",
            Self::Isometric => "isometric",
            Self::Dimetric => "dimetric",
            Self::Trimetric => "trimetric",
            Self::Axonometric => "axonometric",
        };
        write!(f, "{name}")
    }
}
