pub mod camera;
pub mod hotspot;
pub mod panorama;
pub mod picking;
pub mod selection;
pub mod viewer;

pub use camera::OrbitCamera;
pub use hotspot::{HotspotMarker, MarkerVisual};
pub use panorama::{PanoramaSphere, PanoramaState};
pub use selection::{HotspotSelection, SelectionChange};
pub use viewer::*;
