//! Markdown-to-markup rendering for bot answers.

use pulldown_cmark::{html, Parser};

/// Render a markdown answer to HTML markup.
///
/// The query service replies in markdown; the conversation stores the
/// rendered markup with the markup flag set so the front end can display
/// it directly.
pub fn render_markdown(input: &str) -> String {
    let parser = Parser::new(input);
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}
