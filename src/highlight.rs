//! Server-side syntax highlighting for fenced code blocks.

use anyhow::{anyhow, Result};
use syntect::{
    highlighting::{Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::SyntaxSet,
};

const THEME_NAME: &str = "base16-ocean.light";

pub struct SyntaxHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntaxHighlighter {
    /// Load the bundled syntax definitions and theme.
    ///
    /// # Errors
    /// Fails if the default theme set does not contain `base16-ocean.light`.
    pub fn new() -> Result<Self> {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(THEME_NAME)
            .ok_or_else(|| anyhow!("default theme set should include \"{THEME_NAME}\""))?;

        Ok(Self { syntaxes, theme })
    }

    /// Render `text` as a styled `<pre>` block.
    ///
    /// Unknown or missing languages are rendered as plain text.
    ///
    /// # Errors
    /// Returns an error if `syntect` fails while highlighting.
    pub fn highlight(&self, text: &str, language: Option<&str>) -> Result<String> {
        let syntax = language
            .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        highlighted_html_for_string(text, &self.syntaxes, syntax, &self.theme).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_language_gets_token_spans() {
        let highlighter = SyntaxHighlighter::new().unwrap();
        let html = highlighter
            .highlight("fn main() {}\n", Some("rust"))
            .unwrap();
        assert!(html.starts_with("<pre"), "{}", html);
        assert!(html.contains("<span style="), "{}", html);
        assert!(html.contains("main"), "{}", html);
    }

    #[test]
    fn test_extension_token_resolves() {
        let highlighter = SyntaxHighlighter::new().unwrap();
        assert!(highlighter.highlight("x = 1\n", Some("py")).is_ok());
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let highlighter = SyntaxHighlighter::new().unwrap();
        let html = highlighter
            .highlight("a < b\n", Some("klingon"))
            .unwrap();
        assert!(html.contains("a &lt; b"), "{}", html);
    }

    #[test]
    fn test_no_language_is_plain_text() {
        let highlighter = SyntaxHighlighter::new().unwrap();
        assert!(highlighter.highlight("plain\n", None).is_ok());
    }
}
