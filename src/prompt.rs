//! Roadmap prompt construction.

pub const DEFAULT_LANGUAGE: &str = "Russian";

/// Instruction asking the model for a single-file HTML learning roadmap.
#[derive(Debug, Clone)]
pub struct RoadmapPrompt {
    pub topic: String,
    /// Free-form clarification of what the learner wants.
    pub refinement: String,
    /// Language of the generated page.
    pub language: String,
}

impl RoadmapPrompt {
    pub fn new(topic: impl Into<String>, refinement: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            refinement: refinement.into(),
            language: DEFAULT_LANGUAGE.into(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Create a detailed learning roadmap in HTML format for the topic: '{topic}'. \
             Clarification: '{refinement}'. \
             Explanations must be thorough, with examples, and the page must link to many \
             existing resources such as courses, articles and videos.\n\
             \n\
             REQUIREMENTS:\n\
             The result must be ONE HTML file with the following structure.\n\
             1. At the top: a visual roadmap in the style of roadmap.sh, drawn as a tree of \
             clickable topic names. Every topic is an anchor link to its section below \
             (for example <a href=\"#topic1\">).\n\
             2. Below: one content section per topic with a unique id matching its anchor \
             (for example <div id=\"topic1\">), containing an extensive explanation of the \
             topic and many useful links to read and watch.\n\
             3. Use smooth scrolling via CSS (html {{ scroll-behavior: smooth; }}).\n\
             4. All content and UI must be in a modern, clean style and written in {language}.\n\
             5. Write without mistakes.\n\
             Return only the HTML code, without ```html or any other wrapping.",
            topic = self.topic,
            refinement = self.refinement,
            language = self.language,
        )
    }
}

/// Removes a surrounding Markdown code fence, if the model added one anyway.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };

    // Drop the info string ("html") on the opening line.
    match body.split_once('\n') {
        Some((_, content)) => content.trim_end_matches(['\r', '\n']),
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_mentions_topic_refinement_and_language() {
        let prompt = RoadmapPrompt::new("Rust", "async networking");

        let text = prompt.render();

        assert!(text.contains("'Rust'"));
        assert!(text.contains("'async networking'"));
        assert!(text.contains("written in Russian"));
        assert!(text.contains("html { scroll-behavior: smooth; }"));
        assert!(text.contains("href=\"#topic1\""));
    }

    #[test]
    fn strips_fenced_html() {
        assert_eq!(
            strip_code_fences("```html\n<html></html>\n```"),
            "<html></html>"
        );
    }

    #[test]
    fn strips_fenced_html_with_crlf_line_endings() {
        assert_eq!(
            strip_code_fences("```html\r\n<html>\r\n</html>\r\n```\r\n"),
            "<html>\r\n</html>"
        );
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences(" <html></html>\n"), " <html></html>\n");
        assert_eq!(strip_code_fences("```unterminated"), "```unterminated");
    }
}
