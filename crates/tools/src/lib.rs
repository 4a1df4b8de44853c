//! Command implementations behind the `cultureverse` binary.

use catalog::{CatalogError, DestinationCard, DestinationCatalog, HotspotId};
use scene::{PanoramaViewer, SelectionChange};
use studio::{Completion, SubmitError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("destination {destination} has no hotspot {hotspot}")]
    UnknownHotspot { destination: String, hotspot: String },
    #[error("hotspot {0} could not be clicked from the centre of the view")]
    NotClickable(String),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("{0}")]
    Generation(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn render_cards(cards: &[DestinationCard]) -> String {
    let width = cards.iter().map(|c| c.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for c in cards {
        out.push_str(&format!(
            "{:<width$}  {} ({})\n",
            c.id, c.name, c.location
        ));
    }
    out
}

/// Result of driving a headless viewer through a click script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourReport {
    pub steps: Vec<String>,
    pub panel: Option<String>,
    pub instructions: Option<String>,
}

impl TourReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(step);
            out.push('\n');
        }
        match (&self.panel, &self.instructions) {
            (Some(panel), _) => {
                out.push('\n');
                out.push_str(panel);
            }
            (None, Some(hint)) => {
                out.push('\n');
                out.push_str(hint);
                out.push('\n');
            }
            (None, None) => {}
        }
        out
    }
}

/// Clicks each hotspot in turn (turning the camera toward it first), then optionally
/// dismisses the panel.
pub fn run_tour(
    catalog: &DestinationCatalog,
    slug: &str,
    clicks: &[String],
    dismiss: bool,
) -> Result<TourReport, ToolError> {
    let destination = catalog.get(slug)?;
    let mut viewer = PanoramaViewer::new(destination);
    viewer.set_canvas_size(1280.0, 720.0);

    let mut steps = Vec::new();
    for raw in clicks {
        let id = HotspotId::new(raw.as_str());
        if !viewer.look_at_hotspot(&id) {
            return Err(ToolError::UnknownHotspot {
                destination: slug.to_string(),
                hotspot: raw.clone(),
            });
        }
        let change = viewer.click(viewer.screen_center());
        steps.push(describe_change(&change, raw));
        if !viewer.selection().is_active(&id) {
            return Err(ToolError::NotClickable(raw.clone()));
        }
    }
    if dismiss {
        steps.push(describe_change(&viewer.dismiss(), ""));
    }

    let panel = viewer.info_panel().map(|p| {
        let mut text = format!("{}\n{}\n", p.title, p.description);
        if let Some(img) = p.image_url {
            text.push_str(&format!("image: {img}\n"));
        }
        text
    });
    Ok(TourReport {
        steps,
        panel,
        instructions: viewer.instructions().map(str::to_string),
    })
}

fn describe_change(change: &SelectionChange, clicked: &str) -> String {
    match change {
        SelectionChange::Unchanged if clicked.is_empty() => "nothing to dismiss".to_string(),
        SelectionChange::Unchanged => format!("{clicked} already active"),
        SelectionChange::Activated(id) => format!("activated {id}"),
        SelectionChange::Switched { from, to } => format!("switched {from} -> {to}"),
        SelectionChange::Dismissed(id) => format!("dismissed {id}"),
    }
}

pub fn describe_completion(completion: &Completion) -> Result<String, ToolError> {
    match completion {
        Completion::Ready(result) => Ok(format!(
            "hosted: {}\nhost id: {}\nmime: {}",
            result.image_url, result.host_id, result.mime_type
        )),
        Completion::Failed(notice) => Err(ToolError::Generation(notice.message().to_string())),
        Completion::Stale => Err(ToolError::Generation("completion was superseded".to_string())),
    }
}
