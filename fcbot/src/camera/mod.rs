//! Camera resolution for screenshot steps.
//!
//! The reference camera looks along -Z with +Y up, in a world where +Z is
//! vertical. Orientations are unit quaternions applied to that reference.
//!
//! Named views are looked up in a fixed azimuth/elevation table and turned
//! into `Rz(azimuth) * Rx(90 - elevation)`, so `top` is the identity and
//! `front` looks along +Y.
//!
//! Explicit views compose yaw, pitch and roll (degrees) as intrinsic
//! rotations in this order:
//!
//! 1. yaw about the camera's vertical axis (+Y),
//! 2. pitch about the resulting right axis (+X),
//! 3. roll about the resulting forward axis (-Z),
//!
//! i.e. `R = Ry(yaw) * Rx(pitch) * R-z(roll)`. The rotations do not commute;
//! the order is part of the configuration format.

mod views;

use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::CameraError;

pub use views::{NamedView, ISOMETRIC_ELEVATION};

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Parallel projection (default).
    #[default]
    Orthographic,
    /// Perspective projection.
    Perspective,
}

impl FromStr for Projection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "orthographic" => Ok(Self::Orthographic),
            "perspective" => Ok(Self::Perspective),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orthographic => write!(f, "Orthographic"),
            Self::Perspective => write!(f, "Perspective"),
        }
    }
}

/// Screenshot background.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Transparent background (default).
    #[default]
    Transparent,
    /// A named colour (`white`) or hex colour (`#336699`).
    Color(String),
}

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z]+|#[0-9A-Fa-f]{6}(?:[0-9A-Fa-f]{2})?)$")
            .unwrap_or_else(|e| unreachable!("static colour pattern is valid: {e}"))
    })
}

impl FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("transparent") {
            Ok(Self::Transparent)
        } else if color_pattern().is_match(s) {
            Ok(Self::Color(s.to_string()))
        } else {
            Err(s.to_string())
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transparent => write!(f, "Transparent"),
            Self::Color(color) => write!(f, "{color}"),
        }
    }
}

/// Yaw, pitch and roll in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    /// Rotation about the vertical axis.
    pub yaw: f64,
    /// Rotation about the right axis.
    pub pitch: f64,
    /// Rotation about the forward axis.
    pub roll: f64,
}

impl Orientation {
    /// Creates an orientation from degrees.
    #[must_use]
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Composes the rotation applied to the reference camera.
    #[must_use]
    pub fn to_quaternion(self) -> UnitQuaternion<f64> {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw.to_radians());
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        // About -Z, the forward axis.
        let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -self.roll.to_radians());
        yaw * pitch * roll
    }
}

/// Which way the camera looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewSpec {
    /// A predefined view; the engine fits the scene into it.
    Named(NamedView),
    /// A camera placed at `position` with the given orientation.
    Explicit {
        /// Camera position in document coordinates.
        position: Point3<f64>,
        /// Camera orientation.
        orientation: Orientation,
    },
}

/// Camera settings of a screenshot step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    /// View direction.
    pub view: ViewSpec,
    /// Projection mode.
    pub projection: Projection,
    /// Requested `(width, height)` in pixels, validated on resolution.
    pub resolution: (i64, i64),
    /// Image background.
    pub background: Background,
}

/// A concrete camera handed to the screenshot exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraTransform {
    /// Rotation applied to the reference camera.
    pub orientation: UnitQuaternion<f64>,
    /// Camera position; `None` lets the engine fit the scene.
    pub position: Option<Point3<f64>>,
    /// Projection mode.
    pub projection: Projection,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Image background.
    pub background: Background,
}

impl CameraTransform {
    /// Direction the camera looks in.
    #[must_use]
    pub fn forward(&self) -> Vector3<f64> {
        self.orientation * -Vector3::z()
    }

    /// The camera's up direction.
    #[must_use]
    pub fn up(&self) -> Vector3<f64> {
        self.orientation * Vector3::y()
    }

    /// Orientation as a rotation matrix.
    #[must_use]
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        *self.orientation.to_rotation_matrix().matrix()
    }

    /// Orientation as `[x, y, z, w]`, the order the engine expects.
    #[must_use]
    pub fn quaternion_xyzw(&self) -> [f64; 4] {
        let q = self.orientation.quaternion();
        [q.i, q.j, q.k, q.w]
    }

    /// Returns true if the engine should fit the scene into the view.
    #[must_use]
    pub fn fit_all(&self) -> bool {
        self.position.is_none()
    }
}

/// Orientation of a named view.
#[must_use]
pub fn named_orientation(view: NamedView) -> UnitQuaternion<f64> {
    let (azimuth, elevation) = view.angles();
    let turn = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), azimuth.to_radians());
    let tilt = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), (90.0 - elevation).to_radians());
    turn * tilt
}

/// Converts camera settings into a concrete transform.
///
/// # Errors
///
/// Returns [`CameraError::InvalidResolution`] if width or height is not a
/// positive pixel count.
pub fn resolve_camera(spec: &CameraSpec) -> Result<CameraTransform, CameraError> {
    let (width, height) = spec.resolution;
    let invalid = || CameraError::InvalidResolution { width, height };
    let w = u32::try_from(width).ok().filter(|w| *w > 0).ok_or_else(invalid)?;
    let h = u32::try_from(height).ok().filter(|h| *h > 0).ok_or_else(invalid)?;

    let (orientation, position) = match &spec.view {
        ViewSpec::Named(view) => (named_orientation(*view), None),
        ViewSpec::Explicit { position, orientation } => {
            (orientation.to_quaternion(), Some(*position))
        }
    };

    Ok(CameraTransform {
        orientation,
        position,
        projection: spec.projection,
        width: w,
        height: h,
        background: spec.background.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    const EPS: f64 = 1e-12;

    fn explicit(yaw: f64, pitch: f64, roll: f64) -> CameraSpec {
        CameraSpec {
            view: ViewSpec::Explicit {
                position: Point3::new(10.0, -20.0, 30.0),
                orientation: Orientation::new(yaw, pitch, roll),
            },
            projection: Projection::Perspective,
            resolution: (800, 600),
            background: Background::Transparent,
        }
    }

    fn named(view: NamedView) -> CameraTransform {
        let spec = CameraSpec {
            view: ViewSpec::Named(view),
            projection: Projection::Orthographic,
            resolution: (640, 480),
            background: Background::Color("white".to_string()),
        };
        resolve_camera(&spec).unwrap()
    }

    fn assert_vec(actual: Vector3<f64>, expected: [f64; 3]) {
        assert_relative_eq!(actual, Vector3::from(expected), epsilon = EPS);
    }

    #[test]
    fn test_zero_angles_is_identity() {
        let camera = resolve_camera(&explicit(0.0, 0.0, 0.0)).unwrap();

        assert_relative_eq!(camera.orientation, UnitQuaternion::identity(), epsilon = EPS);
        assert_relative_eq!(camera.rotation_matrix(), Matrix3::identity(), epsilon = EPS);
        assert_vec(camera.forward(), [0.0, 0.0, -1.0]);
        assert_vec(camera.up(), [0.0, 1.0, 0.0]);
        assert_eq!(camera.position, Some(Point3::new(10.0, -20.0, 30.0)));
        assert!(!camera.fit_all());
    }

    #[test]
    fn test_yaw_90_golden() {
        let camera = resolve_camera(&explicit(90.0, 0.0, 0.0)).unwrap();
        let q = camera.orientation.quaternion();

        assert_relative_eq!(q.w, FRAC_1_SQRT_2, epsilon = EPS);
        assert_relative_eq!(q.i, 0.0, epsilon = EPS);
        assert_relative_eq!(q.j, FRAC_1_SQRT_2, epsilon = EPS);
        assert_relative_eq!(q.k, 0.0, epsilon = EPS);

        #[rustfmt::skip]
        let expected = Matrix3::new(
             0.0, 0.0, 1.0,
             0.0, 1.0, 0.0,
            -1.0, 0.0, 0.0,
        );
        assert_relative_eq!(camera.rotation_matrix(), expected, epsilon = EPS);
        assert_vec(camera.forward(), [-1.0, 0.0, 0.0]);
        assert_vec(camera.up(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_pitch_90_looks_up() {
        let camera = resolve_camera(&explicit(0.0, 90.0, 0.0)).unwrap();
        assert_vec(camera.forward(), [0.0, 1.0, 0.0]);
        assert_vec(camera.up(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_roll_90_turns_up_vector() {
        let camera = resolve_camera(&explicit(0.0, 0.0, 90.0)).unwrap();
        assert_vec(camera.forward(), [0.0, 0.0, -1.0]);
        assert_vec(camera.up(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_composition_order_is_yaw_pitch_roll() {
        let camera = resolve_camera(&explicit(90.0, 90.0, 0.0)).unwrap();
        let q = camera.orientation.quaternion();

        assert_relative_eq!(q.w, 0.5, epsilon = EPS);
        assert_relative_eq!(q.i, 0.5, epsilon = EPS);
        assert_relative_eq!(q.j, 0.5, epsilon = EPS);
        assert_relative_eq!(q.k, -0.5, epsilon = EPS);
        assert_vec(camera.forward(), [0.0, 1.0, 0.0]);
        assert_vec(camera.up(), [1.0, 0.0, 0.0]);

        // Reversed order gives a different camera.
        let reversed = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 90f64.to_radians())
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 90f64.to_radians());
        assert!((reversed.angle_to(&camera.orientation)).abs() > 1e-6);
    }

    #[test]
    fn test_named_view_table() {
        let top = named(NamedView::Top);
        assert_relative_eq!(top.orientation, UnitQuaternion::identity(), epsilon = EPS);
        assert!(top.fit_all());

        let front = named(NamedView::Front);
        assert_vec(front.forward(), [0.0, 1.0, 0.0]);
        assert_vec(front.up(), [0.0, 0.0, 1.0]);

        assert_vec(named(NamedView::Rear).forward(), [0.0, -1.0, 0.0]);
        assert_vec(named(NamedView::Right).forward(), [-1.0, 0.0, 0.0]);
        assert_vec(named(NamedView::Left).forward(), [1.0, 0.0, 0.0]);
        assert_vec(named(NamedView::Bottom).forward(), [0.0, 0.0, 1.0]);

        let s = 1.0 / 3.0_f64.sqrt();
        let iso = named(NamedView::Isometric);
        assert_vec(iso.forward(), [-s, s, -s]);
        assert_relative_eq!(iso.up().z, (2.0_f64 / 3.0).sqrt(), epsilon = EPS);
        assert_relative_eq!(
            named(NamedView::Axonometric).orientation,
            iso.orientation,
            epsilon = EPS
        );
    }

    #[test]
    fn test_projection_passes_through() {
        let camera = named(NamedView::Front);
        assert_eq!(camera.projection, Projection::Orthographic);
        assert_eq!(camera.background, Background::Color("white".to_string()));
        assert_eq!((camera.width, camera.height), (640, 480));
    }

    #[test]
    fn test_invalid_resolution() {
        for resolution in [(0, 600), (800, 0), (-1, 600), (800, -5)] {
            let mut spec = explicit(0.0, 0.0, 0.0);
            spec.resolution = resolution;
            assert_eq!(
                resolve_camera(&spec),
                Err(CameraError::InvalidResolution {
                    width: resolution.0,
                    height: resolution.1,
                })
            );
        }
    }

    #[test]
    fn test_quaternion_xyzw_order() {
        let camera = resolve_camera(&explicit(90.0, 0.0, 0.0)).unwrap();
        let [x, y, z, w] = camera.quaternion_xyzw();
        assert_relative_eq!(x, 0.0, epsilon = EPS);
        assert_relative_eq!(y, FRAC_1_SQRT_2, epsilon = EPS);
        assert_relative_eq!(z, 0.0, epsilon = EPS);
        assert_relative_eq!(w, FRAC_1_SQRT_2, epsilon = EPS);
    }

    #[test]
    fn test_background_parse() {
        assert_eq!("transparent".parse::<Background>(), Ok(Background::Transparent));
        assert_eq!(
            "#336699".parse::<Background>(),
            Ok(Background::Color("#336699".to_string()))
        );
        assert_eq!(
            "White".parse::<Background>(),
            Ok(Background::Color("White".to_string()))
        );
        assert!("#12".parse::<Background>().is_err());
        assert!("light blue".parse::<Background>().is_err());
    }
}
