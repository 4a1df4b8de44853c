//! Texture loading for panorama and garment surfaces.
//!
//! Image bytes come from a [`TextureLoader`] (HTTP or in-memory) and are
//! decoded into RGBA8 pixels. Loaders are object-safe so viewers can hold
//! `Arc<dyn TextureLoader>` without knowing where images come from.

pub mod loader;
pub mod texture;

pub use loader::*;
pub use texture::*;
