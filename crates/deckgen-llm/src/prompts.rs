//! Prompt construction for collaborator calls
//!
//! Prompts are assembled here rather than inside the backends so every
//! provider sends the same instructions. All three builders are pure string
//! functions over the request types.

use deckgen_utils::types::ContentBody;

/// Prompt for drafting a content slide from its outline topic.
pub fn content_prompt(deck_title: &str, topic: &str) -> String {
    format!(
        "You are a presentation creator. Your task is to generate the content for a \
         single slide of a presentation titled \"{deck_title}\". The topic for this \
         specific slide is \"{topic}\". Generate a title, an optional subtitle, and \
         the body content as a list of bullet points. Ensure the content is \
         professional, clear, and concise."
    )
}

/// Prompt for refining existing content against a user instruction.
///
/// The current content is spelled out in full so the collaborator edits what
/// the user is actually looking at, not a regeneration from the topic.
pub fn refine_prompt(current: &ContentBody, instruction: &str) -> String {
    let subtitle = current.subtitle.as_deref().unwrap_or("N/A");
    let bullets = current
        .bullets
        .iter()
        .map(|b| format!("- {b}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a presentation editor. A user wants to refine the content of a slide.\n\
         \n\
         Original Content:\n\
         Title: {title}\n\
         Subtitle: {subtitle}\n\
         Body:\n\
         {bullets}\n\
         \n\
         User's Request: \"{instruction}\"\n\
         \n\
         Based on the user's request, generate the refined slide content. Adhere to \
         the original JSON structure with a title, an optional subtitle, and a body \
         with bullet points.",
        title = current.title,
    )
}

/// Prompt for rendering a slide illustration from generated content.
///
/// The no-text rule is stated first and hardest; image models reliably ruin
/// slide illustrations by baking captions into them.
pub fn image_prompt(content: &ContentBody) -> String {
    let summary = content.bullets.join(", ");

    format!(
        "Generate a purely visual, professional, and minimalistic vector illustration \
         for a presentation slide. The slide's topic is \"{title}: {summary}\".\n\
         Key requirements:\n\
         - **Strictly no text**: This is the most important rule. Do not include any \
         words, letters, numbers, or any form of typography in the generated image. \
         The image must be entirely pictorial.\n\
         - Style: Modern, clean, abstract, and conceptual.\n\
         - Color Palette: Use a harmonious blend of blues, greens, and earthy tones.\n\
         - Content: The image must be purely symbolic and represent the core idea of \
         the slide without being literal.\n\
         - Composition: Simple, elegant, and free of clutter.",
        title = content.title,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> ContentBody {
        ContentBody {
            title: "Our Approach".to_string(),
            subtitle: Some("First principles".to_string()),
            bullets: vec![
                "Soil health before yield".to_string(),
                "Native crop selection".to_string(),
            ],
        }
    }

    #[test]
    fn test_content_prompt_embeds_deck_and_topic() {
        let prompt = content_prompt("Bhoomi Naturals Presentation", "Why choose us");

        assert!(prompt.contains("titled \"Bhoomi Naturals Presentation\""));
        assert!(prompt.contains("slide is \"Why choose us\""));
        assert!(prompt.contains("bullet points"));
    }

    #[test]
    fn test_refine_prompt_lists_existing_bullets() {
        let prompt = refine_prompt(&body(), "make it punchier");

        assert!(prompt.contains("Title: Our Approach"));
        assert!(prompt.contains("Subtitle: First principles"));
        assert!(prompt.contains("- Soil health before yield"));
        assert!(prompt.contains("- Native crop selection"));
        assert!(prompt.contains("User's Request: \"make it punchier\""));
    }

    #[test]
    fn test_refine_prompt_marks_missing_subtitle() {
        let mut content = body();
        content.subtitle = None;

        let prompt = refine_prompt(&content, "shorten");
        assert!(prompt.contains("Subtitle: N/A"));
    }

    #[test]
    fn test_image_prompt_joins_bullets_into_topic() {
        let prompt = image_prompt(&body());

        assert!(prompt.contains(
            "\"Our Approach: Soil health before yield, Native crop selection\""
        ));
        assert!(prompt.contains("Strictly no text"));
    }
}
