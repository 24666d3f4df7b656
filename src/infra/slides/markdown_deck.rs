// Writes a slide deck as Marp-flavoured Markdown: a front-matter block,
// `---` between slides and a per-slide footer with the slide number.

use std::fmt::Write;

use crate::core::slides::SlideDeck;

/// Keeps a single line of document text from being read as Markdown
/// structure.
fn escape_line(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut escaped = String::with_capacity(flat.len());
    for c in flat.chars() {
        if matches!(c, '*' | '_' | '`' | '<' | '>' | '[' | ']' | '#') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn render_markdown(deck: &SlideDeck) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "---");
    let _ = writeln!(out, "marp: true");
    let _ = writeln!(out, "title: \"{}\"", deck.title.replace('"', "'"));
    let _ = writeln!(out, "---");

    for (index, (number, slide)) in deck.numbered().enumerate() {
        if index > 0 {
            let _ = writeln!(out, "\n---");
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "<!-- _footer: \"{}\" -->", number);
        let _ = writeln!(out);
        let _ = writeln!(out, "# {}", escape_line(&slide.title));

        if !slide.bullets.is_empty() {
            let _ = writeln!(out);
        }
        for bullet in &slide.bullets {
            if bullet.highlight {
                let _ = writeln!(out, "- **{}**", escape_line(&bullet.text));
            } else {
                let _ = writeln!(out, "- {}", escape_line(&bullet.text));
            }
        }
    }

    out
}
