use std::f64::consts::PI;

use super::Vec3;

/// Direction on the unit sphere expressed as polar/azimuth angles (radians).
///
/// Conventions:
/// - `polar` is measured from +Y, so `0` looks straight up and `PI` straight down.
/// - `azimuth` is measured around +Y, with `0` facing -Z and positive values turning toward +X.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spherical {
    pub polar: f64,
    pub azimuth: f64,
}

impl Spherical {
    pub fn new(polar: f64, azimuth: f64) -> Self {
        Self { polar, azimuth }
    }

    /// Horizon, facing -Z.
    pub fn forward() -> Self {
        Self::new(PI / 2.0, 0.0)
    }

    pub fn to_direction(self) -> Vec3 {
        let (sp, cp) = self.polar.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        Vec3::new(sp * sa, cp, -sp * ca)
    }

    pub fn from_direction(dir: Vec3) -> Option<Self> {
        let d = dir.normalized()?;
        let polar = d.y.clamp(-1.0, 1.0).acos();
        let azimuth = d.x.atan2(-d.z);
        Some(Self::new(polar, azimuth))
    }
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(a: f64) -> f64 {
    let mut w = a % (2.0 * PI);
    if w <= -PI {
        w += 2.0 * PI;
    } else if w > PI {
        w -= 2.0 * PI;
    }
    w
}
