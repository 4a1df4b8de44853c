//! Garment model: mesh variant per category, per-instance material table and texture binding.

use std::collections::BTreeMap;

use assets::{LoadOutcome, LoadTicket, Sampling, Texture};
use foundation::{Color, Frame};
use tracing::{debug, error, info};

use crate::category::{GarmentCategory, MeshVariant};

/// Surface colour when no texture is bound.
pub const DEFAULT_SURFACE_COLOR: Color = Color::hex(0xf5f5f5);

/// Idle rotation about y per reference frame (radians).
pub const GARMENT_SPIN_PER_FRAME: f64 = 0.005;

/// Identity of one paintable mesh instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshInstanceId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub map: Option<Texture>,
    pub sampling: Sampling,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: DEFAULT_SURFACE_COLOR,
            map: None,
            sampling: Sampling::tiled(),
        }
    }
}

impl Material {
    fn bind(&mut self, texture: Option<&Texture>) {
        match texture {
            Some(t) => {
                self.map = Some(t.clone());
                self.color = Color::WHITE;
                self.sampling = Sampling::tiled();
            }
            None => {
                self.map = None;
                self.color = DEFAULT_SURFACE_COLOR;
            }
        }
    }
}

/// Materials owned per mesh instance, so no two surfaces share mutable state.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    entries: BTreeMap<MeshInstanceId, Material>,
}

impl MaterialTable {
    pub fn get(&self, id: MeshInstanceId) -> Option<&Material> {
        self.entries.get(&id)
    }

    /// Returns the instance's own material, creating it on first use.
    pub fn ensure(&mut self, id: MeshInstanceId) -> &mut Material {
        self.entries.entry(id).or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub id: MeshInstanceId,
    pub name: String,
}

/// A loaded variant and its paintable surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarmentMesh {
    pub variant: MeshVariant,
    pub surfaces: Vec<Surface>,
}

/// Texture state of the garment.
#[derive(Debug, Clone, Default)]
struct TextureSlot {
    url: Option<String>,
    decoded: Option<Texture>,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct GarmentModel {
    category: GarmentCategory,
    mesh: Option<GarmentMesh>,
    materials: MaterialTable,
    texture: TextureSlot,
    next_instance: u64,
    rotation_y: f64,
}

impl GarmentModel {
    pub fn new(category: GarmentCategory) -> Self {
        Self {
            category,
            mesh: None,
            materials: MaterialTable::default(),
            texture: TextureSlot::default(),
            next_instance: 0,
            rotation_y: 0.0,
        }
    }

    pub fn category(&self) -> GarmentCategory {
        self.category
    }

    pub fn variant(&self) -> MeshVariant {
        self.category.variant()
    }

    pub fn mesh(&self) -> Option<&GarmentMesh> {
        self.mesh.as_ref()
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn material(&self, id: MeshInstanceId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn rotation_y(&self) -> f64 {
        self.rotation_y
    }

    /// Switches category. Returns the variant the host must load when the mesh changes;
    /// `None` when the current mesh already serves the new category.
    pub fn set_category(&mut self, category: GarmentCategory) -> Option<MeshVariant> {
        let before = self.variant();
        self.category = category;
        if category.variant() == before {
            return None;
        }
        self.mesh = None;
        self.materials.clear();
        Some(category.variant())
    }

    /// Installs a freshly loaded mesh and paints it with the current texture state.
    ///
    /// Each surface gets a new instance id. A mesh for a variant other than the wanted one
    /// is discarded and `false` is returned.
    pub fn attach_mesh<I, S>(&mut self, variant: MeshVariant, surfaces: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if variant != self.variant() {
            debug!("dropping {variant:?} mesh, {:?} is wanted", self.variant());
            return false;
        }
        let surfaces = surfaces
            .into_iter()
            .map(|name| {
                self.next_instance += 1;
                Surface {
                    id: MeshInstanceId(self.next_instance),
                    name: name.into(),
                }
            })
            .collect();
        self.mesh = Some(GarmentMesh { variant, surfaces });
        self.materials.clear();
        self.apply_materials();
        true
    }

    /// URL of the texture the garment should show.
    pub fn texture_url(&self) -> Option<&str> {
        self.texture.url.as_deref()
    }

    /// URL of the texture actually bound (decoded) right now.
    pub fn texture_source(&self) -> Option<&str> {
        self.texture.decoded.as_ref().map(|t| t.source_url.as_str())
    }

    /// Points the garment at a new texture. Surfaces fall back to the default colour until
    /// the returned ticket's load is applied. Setting the current URL again is a no-op.
    pub fn set_texture_url(&mut self, url: Option<String>) -> Option<LoadTicket> {
        if url == self.texture.url {
            return None;
        }
        self.texture.generation += 1;
        self.texture.url = url;
        self.texture.decoded = None;
        self.apply_materials();
        let url = self.texture.url.clone()?;
        Some(LoadTicket::new(url, self.texture.generation))
    }

    /// Applies a texture load. Stale loads are ignored and `false` is returned.
    ///
    /// A failed decode is logged and leaves the default colour.
    pub fn finish_texture(&mut self, outcome: LoadOutcome) -> bool {
        let current = self.texture.url.as_deref() == Some(outcome.ticket.url.as_str());
        if !current || outcome.ticket.generation != self.texture.generation {
            debug!("dropping stale garment texture {}", outcome.ticket.url);
            return false;
        }
        match outcome.result {
            Ok(texture) => {
                info!("garment texture loaded: {}", texture.source_url);
                self.texture.decoded = Some(texture);
            }
            Err(err) => {
                error!("Error loading texture {}: {err}", outcome.ticket.url);
                self.texture.decoded = None;
            }
        }
        self.apply_materials();
        true
    }

    /// Visits every surface once and binds the current texture or the default colour.
    fn apply_materials(&mut self) {
        let Some(mesh) = &self.mesh else {
            return;
        };
        for surface in &mesh.surfaces {
            self.materials
                .ensure(surface.id)
                .bind(self.texture.decoded.as_ref());
        }
    }

    pub fn tick(&mut self, frame: &Frame) {
        self.rotation_y = (self.rotation_y + frame.scaled(GARMENT_SPIN_PER_FRAME))
            % std::f64::consts::TAU;
    }
}

pub const GARMENT_CAMERA_DEFAULT_DISTANCE: f64 = 5.0;
pub const GARMENT_CAMERA_MIN_DISTANCE: f64 = 2.0;
pub const GARMENT_CAMERA_MAX_DISTANCE: f64 = 10.0;

/// Orbit camera around the garment; only the distance is scripted.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GarmentCamera {
    pub distance: f64,
    pub target: [f64; 3],
}

impl Default for GarmentCamera {
    fn default() -> Self {
        Self {
            distance: GARMENT_CAMERA_DEFAULT_DISTANCE,
            target: [0.0; 3],
        }
    }
}

impl GarmentCamera {
    pub fn zoom_in(&mut self) {
        self.distance = (self.distance * 0.8).max(GARMENT_CAMERA_MIN_DISTANCE);
    }

    pub fn zoom_out(&mut self) {
        self.distance = (self.distance * 1.2).min(GARMENT_CAMERA_MAX_DISTANCE);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
