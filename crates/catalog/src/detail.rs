use serde::Serialize;

use crate::{Destination, Hotspot};

/// Exploration tips shown next to every tour.
pub const EXPLORATION_TIPS: [&str; 3] = [
    "Drag to look around the 360° view",
    "Click on glowing hotspots for cultural stories",
    "Use mouse wheel or pinch to zoom",
];

/// Presentation-neutral projection of a destination for its detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationDetail {
    pub id: String,
    pub name: String,
    pub location: String,
    pub about_heading: String,
    pub description: String,
    pub history: String,
    pub panorama_url: String,
    pub hotspots: Vec<Hotspot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_embed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learn_more_url: Option<String>,
    pub tips: Vec<String>,
}

impl From<&Destination> for DestinationDetail {
    fn from(d: &Destination) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            location: d.location.clone(),
            about_heading: format!("About {}", d.name),
            description: d.description.clone(),
            history: d.history.clone(),
            panorama_url: d.panorama_url.clone(),
            hotspots: d.hotspots.clone(),
            map_embed: d.map_embed.clone(),
            map_title: d.map_embed.as_ref().map(|_| format!("Map of {}", d.name)),
            learn_more_url: d.learn_more_url.clone(),
            tips: EXPLORATION_TIPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DestinationDetail {
    /// Plain-text rendering used by the CLI.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.name);
        out.push('\n');
        out.push_str(&self.location);
        out.push_str("\n\n");

        out.push_str(&self.about_heading);
        out.push('\n');
        out.push_str(&self.description);
        out.push('\n');
        out.push_str(&self.history);
        out.push_str("\n\n");

        out.push_str(&format!("Hotspots ({})\n", self.hotspots.len()));
        for h in &self.hotspots {
            let [x, y, z] = h.position;
            out.push_str(&format!("  [{}] {} @ ({x}, {y}, {z})\n", h.id, h.title));
            out.push_str(&format!("      {}\n", h.description));
            if let Some(img) = &h.image_url {
                out.push_str(&format!("      image: {img}\n"));
            }
        }

        if let Some(url) = &self.learn_more_url {
            out.push_str(&format!("\nLearn More: {url}\n"));
        }
        if let (Some(title), Some(url)) = (&self.map_title, &self.map_embed) {
            out.push_str(&format!("\n{title}: {url}\n"));
        }

        out.push_str("\nTips for Exploration\n");
        for tip in &self.tips {
            out.push_str(&format!("  • {tip}\n"));
        }
        out
    }
}
