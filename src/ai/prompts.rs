//! Instruction text sent alongside the image

/// Instruction asking the model to reverse-engineer a recreation prompt
pub const REVERSE_PROMPT_INSTRUCTION: &str = r#"Analyze this image in extreme detail to reverse-engineer a text-to-image generation prompt.

Your goal is to provide a prompt that I could put into Midjourney, DALL-E 3, or Stable Diffusion to recreate this exact image.

Pay attention to:
1. Subject Matter (what is happening, who are the characters/objects).
2. Art Style (e.g., 3D render, infographic, oil painting, photorealistic, cinematic).
3. Composition, Lighting, and Color Palette.
4. Text overlays or diagrams (describe their placement and content).
5. Specific details (e.g., "brain evolution", "fish to human", glowing effects).

Return the response in JSON format."#;

/// Field descriptions carried in the response schema
pub const PROMPT_FIELD_DESCRIPTION: &str = "The highly detailed text-to-image prompt.";
pub const ELEMENTS_FIELD_DESCRIPTION: &str = "Key visual elements identified in the image.";
pub const STYLE_FIELD_DESCRIPTION: &str = "A concise description of the artistic style.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_covers_required_topics() {
        let text = REVERSE_PROMPT_INSTRUCTION.to_lowercase();
        for topic in [
            "subject matter",
            "art style",
            "composition",
            "lighting",
            "color",
            "text overlays",
            "specific details",
            "json",
        ] {
            assert!(text.contains(topic), "missing topic: {}", topic);
        }
    }
}
