/// Paragraph role as far as slide planning is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    Heading1,
    Heading2,
    Body,
}

/// One paragraph of a source document, reduced to its plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParagraph {
    pub kind: ParagraphKind,
    pub text: String,
}

impl DocParagraph {
    pub fn new(kind: ParagraphKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self::new(ParagraphKind::Body, text)
    }
}

/// Maps a word-processor style id or display name to a paragraph kind.
/// Matching ignores case and spaces, so `Heading1`, `heading 1` and
/// `Título 1` are all level one. Portuguese Word stores the last one under
/// the style id `Ttulo1`.
pub fn kind_from_style(style: &str) -> ParagraphKind {
    let normalized: String = style
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();

    match normalized.as_str() {
        "heading1" | "título1" | "titulo1" | "ttulo1" => ParagraphKind::Heading1,
        "heading2" | "título2" | "titulo2" | "ttulo2" => ParagraphKind::Heading2,
        _ => ParagraphKind::Body,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bullet {
    pub text: String,
    /// Subheadings are kept inline but emphasised.
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub title: String,
    pub bullets: Vec<Bullet>,
}

impl Slide {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDeck {
    pub title: String,
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    /// Slides with their `n / total` footer.
    pub fn numbered(&self) -> impl Iterator<Item = (String, &Slide)> {
        let total = self.slides.len();
        self.slides
            .iter()
            .enumerate()
            .map(move |(i, slide)| (format!("{} / {}", i + 1, total), slide))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_style() {
        assert_eq!(kind_from_style("Heading1"), ParagraphKind::Heading1);
        assert_eq!(kind_from_style("heading 1"), ParagraphKind::Heading1);
        assert_eq!(kind_from_style("HEADING_1"), ParagraphKind::Heading1);
        assert_eq!(kind_from_style("Título 1"), ParagraphKind::Heading1);
        assert_eq!(kind_from_style("Ttulo1"), ParagraphKind::Heading1);
        assert_eq!(kind_from_style("Heading2"), ParagraphKind::Heading2);
        assert_eq!(kind_from_style("titulo 2"), ParagraphKind::Heading2);
        assert_eq!(kind_from_style("Heading3"), ParagraphKind::Body);
        assert_eq!(kind_from_style("Normal"), ParagraphKind::Body);
        assert_eq!(kind_from_style(""), ParagraphKind::Body);
    }

    #[test]
    fn test_numbering() {
        let deck = SlideDeck {
            title: "Deck".to_string(),
            slides: vec![Slide::new("a"), Slide::new("b")],
        };
        let footers: Vec<_> = deck.numbered().map(|(n, _)| n).collect();
        assert_eq!(footers, vec!["1 / 2", "2 / 2"]);
    }
}
