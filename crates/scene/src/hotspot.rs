use catalog::{Hotspot, HotspotId};
use foundation::math::Vec3;
use foundation::{Color, Frame};

pub const MARKER_DEFAULT_COLOR: Color = Color::hex(0x047857);
pub const MARKER_HIGHLIGHT_COLOR: Color = Color::hex(0xeab308);

pub const RING_INNER_RADIUS: f64 = 0.8;
pub const RING_OUTER_RADIUS: f64 = 1.2;
pub const DISC_RADIUS: f64 = 0.5;

/// Ring spin per reference frame (radians).
pub const MARKER_SPIN_PER_FRAME: f64 = 0.01;

/// Presentation condition of a marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkerVisual {
    Default,
    Hovered,
    Active,
}

impl MarkerVisual {
    /// Active wins over hovered.
    pub fn resolve(active: bool, hovered: bool) -> Self {
        if active {
            Self::Active
        } else if hovered {
            Self::Hovered
        } else {
            Self::Default
        }
    }

    pub fn appearance(self) -> MarkerAppearance {
        match self {
            Self::Default => MarkerAppearance {
                color: MARKER_DEFAULT_COLOR,
                ring_opacity: 0.8,
                disc_opacity: 0.6,
            },
            Self::Hovered | Self::Active => MarkerAppearance {
                color: MARKER_HIGHLIGHT_COLOR,
                ring_opacity: 1.0,
                disc_opacity: 0.8,
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerAppearance {
    pub color: Color,
    pub ring_opacity: f32,
    pub disc_opacity: f32,
}

/// Which piece of the marker a hit landed on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkerPart {
    Disc,
    Ring,
}

/// A hotspot marker: an outer ring plus a centre disc, lying in the local XY plane.
///
/// The ring spins about its own axis. Both shapes are rotationally symmetric, so the spin
/// never changes which points are hit.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotMarker {
    pub hotspot: HotspotId,
    pub position: Vec3,
    spin: f64,
}

impl HotspotMarker {
    pub fn new(hotspot: &Hotspot) -> Self {
        Self {
            hotspot: hotspot.id.clone(),
            position: Vec3::from_array(hotspot.position),
            spin: 0.0,
        }
    }

    pub fn spin(&self) -> f64 {
        self.spin
    }

    pub fn tick(&mut self, frame: &Frame) {
        self.spin = (self.spin + frame.scaled(MARKER_SPIN_PER_FRAME)) % std::f64::consts::TAU;
    }

    /// Classifies a point at `radius` from the marker centre (in the marker plane).
    pub fn part_at(&self, radius: f64) -> Option<MarkerPart> {
        if radius <= DISC_RADIUS {
            Some(MarkerPart::Disc)
        } else if (RING_INNER_RADIUS..=RING_OUTER_RADIUS).contains(&radius) {
            Some(MarkerPart::Ring)
        } else {
            None
        }
    }
}
