use assets::{LoadOutcome, LoadTicket, Sampling, Texture};
use tracing::{debug, error, info};

pub const PANORAMA_RADIUS: f64 = 500.0;
pub const PANORAMA_WIDTH_SEGMENTS: u32 = 60;
pub const PANORAMA_HEIGHT_SEGMENTS: u32 = 40;

/// Which faces of a mesh are rasterized.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// UV sphere description handed to the renderer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereGeometry {
    pub radius: f64,
    pub width_segments: u32,
    pub height_segments: u32,
    pub scale: [f64; 3],
    pub side: Side,
}

impl SphereGeometry {
    /// Inside-out sphere: back faces rendered, mirrored on x so the image reads correctly
    /// from the centre.
    pub fn panorama() -> Self {
        Self {
            radius: PANORAMA_RADIUS,
            width_segments: PANORAMA_WIDTH_SEGMENTS,
            height_segments: PANORAMA_HEIGHT_SEGMENTS,
            scale: [-1.0, 1.0, 1.0],
            side: Side::Back,
        }
    }

    pub fn faces_inward(&self) -> bool {
        self.side == Side::Back
    }

    pub fn vertex_count(&self) -> u32 {
        (self.width_segments + 1) * (self.height_segments + 1)
    }

    /// Pole rows collapse to single triangles.
    pub fn triangle_count(&self) -> u32 {
        2 * self.width_segments * self.height_segments.saturating_sub(1)
    }

}

#[derive(Debug, Clone, PartialEq)]
pub enum PanoramaState {
    /// Renders as a flat, untextured sphere. Initial state and the state after a failed load.
    Untextured,
    Textured(Texture),
}

/// Full-surround image on the inside of a sphere around the camera.
#[derive(Debug, Clone)]
pub struct PanoramaSphere {
    url: String,
    geometry: SphereGeometry,
    state: PanoramaState,
    generation: u64,
    in_flight: bool,
}

impl PanoramaSphere {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            geometry: SphereGeometry::panorama(),
            state: PanoramaState::Untextured,
            generation: 0,
            in_flight: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn geometry(&self) -> &SphereGeometry {
        &self.geometry
    }

    pub fn sampling(&self) -> Sampling {
        Sampling::panorama()
    }

    pub fn state(&self) -> &PanoramaState {
        &self.state
    }

    pub fn texture(&self) -> Option<&Texture> {
        match &self.state {
            PanoramaState::Textured(t) => Some(t),
            PanoramaState::Untextured => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Switches to a new image. The sphere goes back to untextured until the new load lands.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        if url == self.url {
            return;
        }
        self.url = url;
        self.state = PanoramaState::Untextured;
        self.generation += 1;
        self.in_flight = false;
    }

    /// Issues a load for the current URL. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.in_flight = true;
        LoadTicket::new(self.url.clone(), self.generation)
    }

    /// Applies a finished load. Returns `false` if the outcome was stale and ignored.
    ///
    /// Failures are logged and leave the sphere untextured; they never propagate.
    pub fn finish_load(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.ticket.generation != self.generation || outcome.ticket.url != self.url {
            debug!(
                "dropping stale panorama load for {} (generation {})",
                outcome.ticket.url, outcome.ticket.generation
            );
            return false;
        }
        self.in_flight = false;
        match outcome.result {
            Ok(texture) => {
                info!(
                    "panorama loaded: {} ({}x{})",
                    self.url, texture.width, texture.height
                );
                self.state = PanoramaState::Textured(texture);
            }
            Err(err) => {
                error!("Error loading panorama {}: {err}", self.url);
                self.state = PanoramaState::Untextured;
            }
        }
        true
    }
}
