//! Persona (knowledge) text injected around user prompts.

/// Placeholder inside persona text that is replaced by the author's name.
pub const USER_NAME_PLACEHOLDER: &str = "{{user_name}}";

/// Name substituted for the placeholder when the author is unknown.
const ANONYMOUS_USER: &str = "User";

/// Fixed instruction for image analysis requests.
pub const IMAGE_ANALYSIS_INSTRUCTION: &str = "You are an AI assistant that can analyze images. \
Describe the contents of the image sent by the user in detail.";

/// Caption used when an image arrives without one.
pub const DEFAULT_IMAGE_CAPTION: &str = "Please describe what is in this image.";

/// Static personality/knowledge text loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    text: String,
}

impl Persona {
    /// Creates a persona, or `None` if the text is blank.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self { text })
        }
    }

    /// Raw persona text, placeholders untouched.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Persona text with the author placeholder substituted.
    pub fn render(&self, author_name: Option<&str>) -> String {
        let name = author_name
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_USER);
        self.text.replace(USER_NAME_PLACEHOLDER, name)
    }

    /// Wraps a chat question in the personality preamble.
    pub fn wrap_question(&self, question: &str, author_name: Option<&str>) -> String {
        format!(
            "Use this personality to answer:\n\"\"\"\n{}\n\"\"\"\n\nUser's Question: {}",
            self.render(author_name),
            question
        )
    }

    /// Wraps an image caption in the analysis instruction and personality.
    pub fn wrap_image_question(&self, caption: &str, author_name: Option<&str>) -> String {
        format!(
            "Main Instruction:\n{}\n\nGeneral Personality:\n\"\"\"\n{}\n\"\"\"\n\nUser's Question about the image:\n{}",
            IMAGE_ANALYSIS_INSTRUCTION,
            self.render(author_name),
            caption
        )
    }
}

/// Builds the prompt for an image query.
///
/// Without a persona the caption alone is sent; a blank caption falls back
/// to [`DEFAULT_IMAGE_CAPTION`].
pub fn image_prompt(caption: &str, persona: Option<&Persona>, author_name: Option<&str>) -> String {
    let caption = match caption.trim() {
        "" => DEFAULT_IMAGE_CAPTION,
        c => c,
    };
    match persona {
        Some(p) => p.wrap_image_question(caption, author_name),
        None => caption.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_persona_is_none() {
        assert!(Persona::new("  \n\t").is_none());
        assert!(Persona::new("Be friendly").is_some());
    }

    #[test]
    fn render_substitutes_author_name() {
        let persona = Persona::new("Greet {{user_name}} warmly. Always call them {{user_name}}.").unwrap();
        assert_eq!(
            persona.render(Some("Ayu")),
            "Greet Ayu warmly. Always call them Ayu."
        );
    }

    #[test]
    fn render_without_author_uses_generic_name() {
        let persona = Persona::new("Greet {{user_name}}.").unwrap();
        assert_eq!(persona.render(None), "Greet User.");
        assert_eq!(persona.render(Some("")), "Greet User.");
    }

    #[test]
    fn wrap_question_uses_fixed_preamble() {
        let persona = Persona::new("You are a barista.").unwrap();
        assert_eq!(
            persona.wrap_question("U2: What's on the menu?", Some("U2")),
            "Use this personality to answer:\n\"\"\"\nYou are a barista.\n\"\"\"\n\nUser's Question: U2: What's on the menu?"
        );
    }

    #[test]
    fn image_prompt_without_persona_is_caption() {
        assert_eq!(image_prompt("What breed is this?", None, None), "What breed is this?");
    }

    #[test]
    fn image_prompt_defaults_blank_caption() {
        assert_eq!(image_prompt("   ", None, None), DEFAULT_IMAGE_CAPTION);
    }

    #[test]
    fn image_prompt_with_persona_wraps_instruction() {
        let persona = Persona::new("You are a florist.").unwrap();
        let prompt = image_prompt("", Some(&persona), None);

        assert!(prompt.starts_with("Main Instruction:\n"));
        assert!(prompt.contains(IMAGE_ANALYSIS_INSTRUCTION));
        assert!(prompt.contains("\"\"\"\nYou are a florist.\n\"\"\""));
        assert!(prompt.ends_with(&format!("User's Question about the image:\n{}", DEFAULT_IMAGE_CAPTION)));
    }
}
