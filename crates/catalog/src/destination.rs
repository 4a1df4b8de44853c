use serde::{Deserialize, Serialize};

/// Hotspot identifier, unique within its owning destination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotspotId(pub String);

impl HotspotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HotspotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HotspotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A clickable point of interest inside a destination's panorama.
///
/// `position` is expressed in the panorama sphere's local space (viewer at the origin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: HotspotId,
    pub position: [f64; 3],
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub history: String,
    pub panorama_url: String,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_embed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learn_more_url: Option<String>,
}

impl Destination {
    pub fn hotspot(&self, id: &HotspotId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| &h.id == id)
    }

    /// Summary card, using the panorama as the card image.
    pub fn card(&self) -> DestinationCard {
        DestinationCard {
            id: self.id.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            image_url: self.panorama_url.clone(),
        }
    }
}

/// Row of the remote `destination_card` table, as served by the card list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationCard {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: String,
    pub image_url: String,
}
