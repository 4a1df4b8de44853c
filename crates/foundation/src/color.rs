/// sRGB colour stored as 0xRRGGBB.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Self = Self(0xffffff);

    pub const fn hex(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn displays_as_css_hex() {
        assert_eq!(Color::hex(0x047857).to_string(), "#047857");
        assert_eq!(Color::hex(0xfff5_f5f5).to_string(), "#f5f5f5");
        assert_eq!(Color::WHITE.to_string(), "#ffffff");
    }
}
