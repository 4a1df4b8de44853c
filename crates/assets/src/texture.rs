use std::sync::Arc;

/// How a texture repeats outside `[0, 1]` UV space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Wrap {
    #[default]
    Clamp,
    Repeat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    Linear,
    Nearest,
}

/// Sampling parameters attached to a bound texture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sampling {
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub repeat: [f32; 2],
    pub min_filter: Filter,
    pub mag_filter: Filter,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            wrap_s: Wrap::Clamp,
            wrap_t: Wrap::Clamp,
            repeat: [1.0, 1.0],
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
        }
    }
}

impl Sampling {
    /// Linear-filtered, clamped. Used for panoramas.
    pub fn panorama() -> Self {
        Self::default()
    }

    /// Repeat-wrapped 1x1 tiling. Used for textile patterns.
    pub fn tiled() -> Self {
        Self {
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
            ..Self::default()
        }
    }
}

/// Decoded RGBA8 image. Pixel storage is shared, so clones are cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub source_url: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

impl Texture {
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureError {
    #[error("invalid texture url: {0}")]
    InvalidUrl(String),
    #[error("texture fetch failed: {0}")]
    Fetch(String),
    #[error("texture fetch returned HTTP {0}")]
    Status(u16),
    #[error("texture fetch timed out after {0} ms")]
    Timeout(u64),
    #[error("texture decode failed: {0}")]
    Decode(String),
    #[error("texture not found: {0}")]
    NotFound(String),
}

/// Decodes PNG/JPEG/WebP bytes into an RGBA8 texture.
pub fn decode_texture(source_url: &str, bytes: &[u8]) -> Result<Texture, TextureError> {
    let img = image::load_from_memory(bytes).map_err(|e| TextureError::Decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Decode("image has zero size".to_string()));
    }
    Ok(Texture {
        source_url: source_url.to_string(),
        width,
        height,
        rgba: Arc::from(rgba.into_raw()),
    })
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("png encode");
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_into_rgba() {
        let bytes = png_bytes(4, 2);
        let tex = decode_texture("mem://a.png", &bytes).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.rgba.len(), 4 * 2 * 4);
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
        assert_eq!(tex.aspect(), 2.0);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_texture("mem://x", b"definitely not an image").unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }

    #[test]
    fn tiled_sampling_repeats() {
        let s = Sampling::tiled();
        assert_eq!(s.wrap_s, Wrap::Repeat);
        assert_eq!(s.wrap_t, Wrap::Repeat);
        assert_eq!(s.repeat, [1.0, 1.0]);
        assert_eq!(Sampling::panorama().wrap_s, Wrap::Clamp);
    }
}
