use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Garment the generated pattern is meant for.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentCategory {
    #[default]
    Shirt,
    Kebaya,
    Dress,
}

impl GarmentCategory {
    pub const ALL: [Self; 3] = [Self::Shirt, Self::Kebaya, Self::Dress];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shirt => "shirt",
            Self::Kebaya => "kebaya",
            Self::Dress => "dress",
        }
    }

    /// Label shown in the category picker.
    pub fn label(self) -> &'static str {
        match self {
            Self::Shirt => "Shirt (Kemeja)",
            Self::Kebaya => "Kebaya",
            Self::Dress => "Dress",
        }
    }

    /// Dresses have no dedicated model and reuse the shirt mesh.
    pub fn variant(self) -> MeshVariant {
        match self {
            Self::Kebaya => MeshVariant::Kebaya,
            Self::Shirt | Self::Dress => MeshVariant::Kemeja,
        }
    }
}

impl fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown garment category: {0} (expected shirt, kebaya or dress)")]
pub struct UnknownCategory(pub String);

impl FromStr for GarmentCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shirt" | "kemeja" => Ok(Self::Shirt),
            "kebaya" => Ok(Self::Kebaya),
            "dress" => Ok(Self::Dress),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Physical garment model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MeshVariant {
    Kemeja,
    Kebaya,
}

impl MeshVariant {
    pub fn asset_path(self) -> &'static str {
        match self {
            Self::Kemeja => "/models/kemeja.glb",
            Self::Kebaya => "/models/kebaya.glb",
        }
    }
}
