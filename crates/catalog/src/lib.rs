//! Static destination data for the panorama tours.
//!
//! Destinations are immutable once loaded. The built-in table is embedded at compile time
//! and validated on load (unique slugs, unique hotspot ids per destination).

use std::collections::BTreeMap;

pub mod destination;
pub mod detail;

pub use destination::*;
pub use detail::*;

const BUILTIN_DESTINATIONS: &str = include_str!("../data/destinations.json");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("destination not found: {0}")]
    NotFound(String),
    #[error("duplicate destination id: {0}")]
    DuplicateDestination(String),
    #[error("duplicate hotspot id {hotspot} in destination {destination}")]
    DuplicateHotspot { destination: String, hotspot: String },
    #[error("catalog data corrupt: {0}")]
    Corrupt(String),
}

/// Keyed, read-only table of destinations.
///
/// Ordering contract: `list`/`cards` preserve the order of the source table.
#[derive(Debug, Clone, Default)]
pub struct DestinationCatalog {
    order: Vec<String>,
    by_slug: BTreeMap<String, Destination>,
}

impl DestinationCatalog {
    /// The table shipped with the application.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_DESTINATIONS)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let destinations: Vec<Destination> =
            serde_json::from_str(raw).map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        Self::from_destinations(destinations)
    }

    pub fn from_destinations(destinations: Vec<Destination>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for destination in destinations {
            let mut seen = std::collections::BTreeSet::new();
            for hotspot in &destination.hotspots {
                if !seen.insert(hotspot.id.as_str()) {
                    return Err(CatalogError::DuplicateHotspot {
                        destination: destination.id.clone(),
                        hotspot: hotspot.id.to_string(),
                    });
                }
            }
            if catalog.by_slug.contains_key(&destination.id) {
                return Err(CatalogError::DuplicateDestination(destination.id));
            }
            catalog.order.push(destination.id.clone());
            catalog.by_slug.insert(destination.id.clone(), destination);
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Looks a destination up by slug. Unknown slugs are `NotFound`, never a panic.
    pub fn get(&self, slug: &str) -> Result<&Destination, CatalogError> {
        self.by_slug
            .get(slug)
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))
    }

    pub fn detail(&self, slug: &str) -> Result<DestinationDetail, CatalogError> {
        self.get(slug).map(DestinationDetail::from)
    }

    pub fn list(&self) -> impl Iterator<Item = &Destination> + '_ {
        self.order.iter().filter_map(|slug| self.by_slug.get(slug))
    }

    pub fn cards(&self) -> Vec<DestinationCard> {
        self.list().map(Destination::card).collect()
    }
}
