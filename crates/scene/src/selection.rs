use catalog::HotspotId;

/// Which hotspot, if any, the viewer is showing details for.
///
/// At most one hotspot is active at a time. Leaving `Active` only happens through
/// [`HotspotSelection::dismiss`]; clicks that miss every marker do not change state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HotspotSelection {
    #[default]
    Idle,
    Active(HotspotId),
}

/// What a selection operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Activated(HotspotId),
    Switched { from: HotspotId, to: HotspotId },
    Dismissed(HotspotId),
}

impl SelectionChange {
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl HotspotSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&HotspotId> {
        match self {
            Self::Idle => None,
            Self::Active(id) => Some(id),
        }
    }

    pub fn is_active(&self, id: &HotspotId) -> bool {
        self.active() == Some(id)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Makes `id` the active hotspot. Switching replaces the previous one directly.
    pub fn select(&mut self, id: HotspotId) -> SelectionChange {
        match std::mem::take(self) {
            Self::Idle => {
                *self = Self::Active(id.clone());
                SelectionChange::Activated(id)
            }
            Self::Active(prev) if prev == id => {
                *self = Self::Active(prev);
                SelectionChange::Unchanged
            }
            Self::Active(prev) => {
                *self = Self::Active(id.clone());
                SelectionChange::Switched { from: prev, to: id }
            }
        }
    }

    pub fn dismiss(&mut self) -> SelectionChange {
        match std::mem::take(self) {
            Self::Idle => SelectionChange::Unchanged,
            Self::Active(prev) => SelectionChange::Dismissed(prev),
        }
    }
}
