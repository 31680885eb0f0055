//! Terminal rendering of markdown output.
//!
//! Headings are colored with their hash marks kept, fenced code blocks are
//! printed untouched, and everything else goes through termimad's inline
//! styling. With color disabled the markdown is printed as is.

use anyhow::Result;
use termimad::{MadSkin, crossterm::style::Color};

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::DarkGrey);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Formats markdown for the terminal.
    pub fn format(&self, markdown: &str) -> String {
        if !self.rich_enabled {
            return markdown.to_string();
        }

        let mut out = String::with_capacity(markdown.len());
        let mut in_fence = false;
        for line in markdown.lines() {
            if line.starts_with("```") {
                in_fence = !in_fence;
                out.push_str(line);
            } else if in_fence {
                out.push_str(line);
            } else if line.starts_with('#') {
                out.push_str(&format!("\x1b[34m{line}\x1b[0m"));
            } else {
                out.push_str(&self.skin.inline(line).to_string());
            }
            out.push('\n');
        }
        out
    }

    /// Render markdown text to stdout
    pub fn render(&self, markdown: &str) -> Result<()> {
        print!("{}", self.format(markdown));
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_is_unchanged() {
        let renderer = TerminalRenderer::new(false);
        let markdown = "# Incidents\n\n- **flood-1** (flood-1.json)\n";
        assert_eq!(renderer.format(markdown), markdown);
    }

    #[test]
    fn test_rich_headings_keep_hashes() {
        let renderer = TerminalRenderer::new(true);
        let out = renderer.format("# Response Plan\n");
        assert!(out.contains("\x1b[34m# Response Plan\x1b[0m"));
    }

    #[test]
    fn test_rich_leaves_code_fences_alone() {
        let renderer = TerminalRenderer::new(true);
        let out = renderer.format("```json\n{\n  \"summary\": \"**x**\"\n}\n```\n");
        assert!(out.contains("  \"summary\": \"**x**\""));
    }

    #[test]
    fn test_default_is_rich() {
        assert!(TerminalRenderer::default().rich_enabled);
    }
}
