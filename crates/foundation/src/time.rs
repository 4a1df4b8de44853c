/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Time(pub f64); // seconds

/// Reference frame rate that per-frame animation rates are expressed against.
pub const REFERENCE_FPS: f64 = 60.0;

/// Render-loop frame metadata.
///
/// Animations advance from `dt_s` so their speed does not depend on the actual frame rate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }

    /// Converts a "per reference frame" rate into the increment for this frame.
    pub fn scaled(&self, per_reference_frame: f64) -> f64 {
        per_reference_frame * self.dt_s * REFERENCE_FPS
    }
}
