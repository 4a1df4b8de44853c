use crate::category::GarmentCategory;

/// True when the prompt has no content after trimming.
pub fn is_blank(prompt: &str) -> bool {
    prompt.trim().is_empty()
}

/// Builds the full generation prompt sent to the relay.
///
/// Deterministic in `(prompt, category)`. The user's text is embedded as typed.
pub fn expand_prompt(prompt: &str, category: GarmentCategory) -> String {
    format!(
        "Generate a seamless, tileable Indonesian batik pattern texture for a {category}. {prompt}.

IMPORTANT: Create a seamless texture that can be tiled/repeated without visible seams. The pattern should:
- Be suitable for 3D texture mapping
- Have seamless edges that connect perfectly when tiled
- Be a flat, 2D pattern view (not perspective or 3D rendered)
- Feature traditional Indonesian batik motifs and colors
- Be high contrast and detailed enough for textile printing
- Work well when repeated in a grid pattern"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n "));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn expansion_embeds_text_and_constraints() {
        let p = expand_prompt("blue ocean batik", GarmentCategory::Kebaya);
        assert!(p.contains("blue ocean batik"));
        assert!(p.contains("for a kebaya"));
        assert!(p.contains("seamless"));
        assert!(p.contains("tileable"));
        assert!(p.contains("flat, 2D"));
        assert_eq!(p, expand_prompt("blue ocean batik", GarmentCategory::Kebaya));
        assert_ne!(p, expand_prompt("blue ocean batik", GarmentCategory::Shirt));
    }
}
