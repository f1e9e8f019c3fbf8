//! Markdown to HTML conversion for post bodies.
//!
//! Rendering is a pure function of the source text. The [`MarkdownRenderer`] trait lets the
//! publish workflow take any renderer; [`CommonMarkRenderer`] is the one the application uses.

use pulldown_cmark::{html, Options, Parser};
use tracing::debug;

pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, source: &str) -> String;
}

/// CommonMark with the GitHub-style extensions WordPress themes style out of the box.
#[derive(Debug, Clone, Copy)]
pub struct CommonMarkRenderer {
    options: Options,
}

impl CommonMarkRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_TASKLISTS,
        }
    }

    /// Plain CommonMark, no extensions.
    pub fn strict() -> Self {
        Self {
            options: Options::empty(),
        }
    }
}

impl Default for CommonMarkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, source: &str) -> String {
        let parser = Parser::new_ext(source, self.options);
        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, parser);

        let trimmed_len = output.trim_end_matches('\n').len();
        output.truncate(trimmed_len);
        debug!(
            "Rendered {} bytes of markdown into {} bytes of HTML",
            source.len(),
            output.len()
        );
        output
    }
}
