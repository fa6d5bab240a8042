//! Writing rendered pages: raw HTML, plain text, or coloured for a terminal.

use std::{io::Cursor, path::Path};

use anyhow::Context as _;
use clap::ValueEnum;
use html2text::render::text_renderer::RichAnnotation;
use termion::{color, style};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// The HTML fragments, one container per line.
    #[default]
    Html,
    /// Plain text preview.
    Text,
    /// Text preview with terminal colours.
    Color,
}

/// ANSI sequences around one annotated text run.
fn colour_run(annotations: &[RichAnnotation], s: &str) -> String {
    let mut start = String::new();
    let mut finish = Vec::new();
    let explicit = annotations.iter().any(|a| matches!(a, RichAnnotation::Colour(_)));
    for annotation in annotations {
        let (on, off) = match annotation {
            RichAnnotation::Link(_) => (style::Underline.to_string(), style::Reset.to_string()),
            RichAnnotation::Emphasis => (style::Bold.to_string(), style::Reset.to_string()),
            RichAnnotation::Strong if !explicit => (
                color::Fg(color::LightYellow).to_string(),
                color::Fg(color::Reset).to_string(),
            ),
            RichAnnotation::Code | RichAnnotation::Preformat(_) if !explicit => (
                color::Fg(color::Blue).to_string(),
                color::Fg(color::Reset).to_string(),
            ),
            RichAnnotation::Colour(c) => (
                color::Fg(color::Rgb(c.r, c.g, c.b)).to_string(),
                color::Fg(color::Reset).to_string(),
            ),
            RichAnnotation::BgColour(c) => (
                color::Bg(color::Rgb(c.r, c.g, c.b)).to_string(),
                color::Bg(color::Reset).to_string(),
            ),
            _ => continue,
        };
        start.push_str(&on);
        finish.push(off);
    }
    start.push_str(s);
    for off in finish.into_iter().rev() {
        start.push_str(&off);
    }
    start
}

impl Format {
    pub fn format(self, html: &str, width: usize) -> anyhow::Result<String> {
        let text = match self {
            Format::Html => html.to_string(),
            Format::Text => html2text::config::plain()
                .string_from_read(Cursor::new(html), width)
                .context("failed to render text preview")?,
            Format::Color => html2text::config::rich()
                .use_doc_css()
                .max_wrap_width(width)
                .coloured(Cursor::new(html), width, colour_run)
                .context("failed to render coloured preview")?,
        };
        Ok(text)
    }
}

/// Prints to stdout, or replaces `path` in one step so readers never see a
/// half-written page.
pub async fn emit(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        print!("{content}");
        return Ok(());
    };
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, content)
        .await
        .with_context(|| format!("failed to write {}", Path::new(&tmp).display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<table id="t"><thead><tr><th>Rune</th></tr></thead><tbody><tr><td>Ber</td></tr></tbody></table>"#;

    #[test]
    fn html_passes_through() {
        assert_eq!(Format::Html.format(PAGE, 80).unwrap(), PAGE);
    }

    #[test]
    fn text_preview_drops_markup() {
        let text = Format::Text.format(PAGE, 80).unwrap();
        assert!(text.contains("Ber"));
        assert!(!text.contains("<td>"));
    }

    #[test]
    fn colour_runs_are_closed_in_reverse() {
        let out = colour_run(&[RichAnnotation::Emphasis, RichAnnotation::Strong], "x");
        assert_eq!(
            out,
            format!(
                "{}{}x{}{}",
                style::Bold,
                color::Fg(color::LightYellow),
                color::Fg(color::Reset),
                style::Reset
            )
        );
    }

    #[tokio::test]
    async fn file_output_replaces_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.html");
        tokio::fs::write(&path, "old").await.unwrap();
        emit("<p>new</p>", Some(&path)).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "<p>new</p>");
        assert!(!dir.path().join("status.html.tmp").exists());
    }
}
