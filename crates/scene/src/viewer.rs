//! Panorama viewer: sphere, orbit camera, hotspot markers and the info panel.
//!
//! The viewer is a plain owned value. Input handlers mutate it through `&mut self`, and the
//! panorama load is issued as a [`LoadTicket`] whose outcome is applied back through
//! [`PanoramaViewer::finish_panorama_load`].

use std::time::Duration;

use assets::{LoadOutcome, LoadTicket, TextureLoader};
use catalog::{Destination, HotspotId};
use foundation::Frame;
use tracing::debug;

use crate::camera::OrbitCamera;
use crate::hotspot::{HotspotMarker, MarkerVisual};
use crate::panorama::PanoramaSphere;
use crate::picking::{MarkerHit, PickOptions, pick_marker};
use crate::selection::{HotspotSelection, SelectionChange};

pub const INSTRUCTIONS: &str = "Drag to explore • Click hotspots for details";

/// Pointer shape the host should show.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cursor {
    Auto,
    Pointer,
}

/// Content of the details panel for the active hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoPanel<'a> {
    pub hotspot: &'a HotspotId,
    pub title: &'a str,
    pub description: &'a str,
    pub image_url: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct PanoramaViewer {
    destination: Destination,
    panorama: PanoramaSphere,
    camera: OrbitCamera,
    markers: Vec<HotspotMarker>,
    selection: HotspotSelection,
    hovered: Option<HotspotId>,
    panel_open: bool,
}

impl PanoramaViewer {
    pub fn new(destination: &Destination) -> Self {
        Self::with_camera(destination, OrbitCamera::new())
    }

    pub fn with_camera(destination: &Destination, camera: OrbitCamera) -> Self {
        Self {
            panorama: PanoramaSphere::new(destination.panorama_url.clone()),
            markers: destination.hotspots.iter().map(HotspotMarker::new).collect(),
            destination: destination.clone(),
            camera,
            selection: HotspotSelection::new(),
            hovered: None,
            panel_open: true,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn panorama(&self) -> &PanoramaSphere {
        &self.panorama
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn markers(&self) -> &[HotspotMarker] {
        &self.markers
    }

    pub fn selection(&self) -> &HotspotSelection {
        &self.selection
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.camera.set_canvas_size(width, height);
    }

    pub fn begin_panorama_load(&mut self) -> LoadTicket {
        self.panorama.begin_load()
    }

    pub fn finish_panorama_load(&mut self, outcome: LoadOutcome) -> bool {
        self.panorama.finish_load(outcome)
    }

    /// Issues, awaits and applies a panorama load in one step.
    pub async fn load_panorama(&mut self, loader: &dyn TextureLoader, timeout: Duration) -> bool {
        let ticket = self.begin_panorama_load();
        let outcome = ticket.fetch(loader, timeout).await;
        self.finish_panorama_load(outcome)
    }

    pub fn pick(&self, pos_px: [f64; 2]) -> Option<MarkerHit> {
        let ray = self.camera.ray_through(pos_px)?;
        pick_marker(&self.markers, ray, PickOptions::default())
    }

    pub fn pointer_down(&mut self, pos_px: [f64; 2], button: i32) {
        self.camera.on_pointer_down(pos_px, button);
    }

    /// Drags the view while a button is held; otherwise refreshes hover.
    pub fn pointer_move(&mut self, pos_px: [f64; 2]) {
        if self.camera.is_dragging() {
            self.camera.on_pointer_move(pos_px);
            return;
        }
        self.hovered = self.pick(pos_px).map(|hit| hit.hotspot);
    }

    /// Ends a press. A click (as opposed to a drag) is forwarded to [`Self::click`].
    pub fn pointer_up(&mut self, pos_px: [f64; 2]) -> SelectionChange {
        if self.camera.on_pointer_up(pos_px) {
            self.click(pos_px)
        } else {
            SelectionChange::Unchanged
        }
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = None;
    }

    /// Selects the marker under `pos_px`. Clicks on empty space are ignored.
    pub fn click(&mut self, pos_px: [f64; 2]) -> SelectionChange {
        let Some(hit) = self.pick(pos_px) else {
            return SelectionChange::Unchanged;
        };
        let change = self.selection.select(hit.hotspot);
        if change.changed() {
            debug!("hotspot selection: {change:?}");
        }
        change
    }

    /// Selects a hotspot by id, as a click on its marker would.
    pub fn select(&mut self, id: &HotspotId) -> Option<SelectionChange> {
        self.destination.hotspot(id)?;
        Some(self.selection.select(id.clone()))
    }

    pub fn dismiss(&mut self) -> SelectionChange {
        self.selection.dismiss()
    }

    pub fn wheel(&mut self, delta: f64) {
        self.camera.on_wheel(delta);
    }

    pub fn tick(&mut self, frame: &Frame) {
        for marker in &mut self.markers {
            marker.tick(frame);
        }
    }

    /// Turns the camera toward a hotspot's marker. Returns `false` for unknown ids.
    pub fn look_at_hotspot(&mut self, id: &HotspotId) -> bool {
        let Some(marker) = self.markers.iter().find(|m| &m.hotspot == id) else {
            return false;
        };
        self.camera.look_at(marker.position);
        true
    }

    pub fn screen_center(&self) -> [f64; 2] {
        self.camera.screen_center()
    }

    pub fn hovered(&self) -> Option<&HotspotId> {
        self.hovered.as_ref()
    }

    pub fn cursor(&self) -> Cursor {
        if self.hovered.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Auto
        }
    }

    pub fn marker_visual(&self, id: &HotspotId) -> MarkerVisual {
        MarkerVisual::resolve(
            self.selection.is_active(id),
            self.hovered.as_ref() == Some(id),
        )
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    /// Flips the panel visibility and returns the new state.
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        self.panel_open
    }

    pub fn panel_toggle_label(&self) -> &'static str {
        if self.panel_open {
            "Hide Info"
        } else {
            "Show Info"
        }
    }

    /// Details for the active hotspot, looked up from the destination's data by id.
    /// `None` while idle or while the panel is hidden.
    pub fn info_panel(&self) -> Option<InfoPanel<'_>> {
        if !self.panel_open {
            return None;
        }
        let id = self.selection.active()?;
        let hotspot = self.destination.hotspot(id)?;
        Some(InfoPanel {
            hotspot: &hotspot.id,
            title: &hotspot.title,
            description: &hotspot.description,
            image_url: hotspot.image_url.as_deref(),
        })
    }

    /// Instruction banner, shown only while no hotspot is active.
    pub fn instructions(&self) -> Option<&'static str> {
        self.selection.is_idle().then_some(INSTRUCTIONS)
    }
}
