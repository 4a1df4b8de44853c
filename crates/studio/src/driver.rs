use std::sync::Arc;
use std::time::Duration;

use assets::{DEFAULT_TEXTURE_TIMEOUT, TextureLoader};

use crate::category::{GarmentCategory, MeshVariant};
use crate::garment::{GarmentCamera, GarmentModel};
use crate::relay::{DEFAULT_RELAY_TIMEOUT, RelayClient, generate_with_timeout};
use crate::session::{Completion, StudioSession, SubmitError};

/// One studio page: session, garment and camera, plus the collaborators used to
/// generate and load textures.
pub struct Studio {
    session: StudioSession,
    garment: GarmentModel,
    camera: GarmentCamera,
    relay: Arc<dyn RelayClient>,
    textures: Arc<dyn TextureLoader>,
    relay_timeout: Duration,
    texture_timeout: Duration,
}

impl Studio {
    pub fn new(relay: Arc<dyn RelayClient>, textures: Arc<dyn TextureLoader>) -> Self {
        let session = StudioSession::new();
        Self {
            garment: GarmentModel::new(session.category()),
            session,
            camera: GarmentCamera::default(),
            relay,
            textures,
            relay_timeout: DEFAULT_RELAY_TIMEOUT,
            texture_timeout: DEFAULT_TEXTURE_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, relay: Duration, texture: Duration) -> Self {
        self.relay_timeout = relay;
        self.texture_timeout = texture;
        self
    }

    pub fn session(&self) -> &StudioSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut StudioSession {
        &mut self.session
    }

    pub fn garment(&self) -> &GarmentModel {
        &self.garment
    }

    pub fn garment_mut(&mut self) -> &mut GarmentModel {
        &mut self.garment
    }

    pub fn camera(&self) -> &GarmentCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut GarmentCamera {
        &mut self.camera
    }

    /// Returns the mesh variant to load when the category change needs a new mesh.
    pub fn set_category(&mut self, category: GarmentCategory) -> Option<MeshVariant> {
        self.session.set_category(category);
        self.garment.set_category(category)
    }

    /// Runs one generation end to end: relay round trip, then texture load and binding.
    ///
    /// Blank prompts and submissions during a generation are rejected before any request
    /// is sent. Relay failures come back as [`Completion::Failed`]; texture failures only
    /// leave the garment default-coloured.
    pub async fn generate(&mut self, prompt: &str) -> Result<Completion, SubmitError> {
        let submission = self.session.submit(prompt)?;
        let outcome = generate_with_timeout(
            self.relay.as_ref(),
            &submission.relay_request,
            self.relay_timeout,
        )
        .await;
        let completion = self.session.complete(submission.seq, outcome);
        if let Completion::Ready(result) = &completion {
            self.bind_texture(result.image_url.clone()).await;
        }
        Ok(completion)
    }

    /// Loads `url` and binds it to the garment. Returns whether the load was applied.
    pub async fn bind_texture(&mut self, url: String) -> bool {
        let Some(ticket) = self.garment.set_texture_url(Some(url)) else {
            return false;
        };
        let outcome = ticket
            .fetch(self.textures.as_ref(), self.texture_timeout)
            .await;
        self.garment.finish_texture(outcome)
    }
}
