// Turns a flat list of document paragraphs into slides.
//
// Level-one headings start slides, level-two headings become highlighted
// bullets, everything else becomes a plain bullet. Long sections spill into
// continuation slides.

use super::slide_models::{Bullet, DocParagraph, ParagraphKind, Slide, SlideDeck};

pub const MAX_BULLETS_PER_SLIDE: usize = 15;

/// `"intro_to_rust"` -> `"Intro To Rust"`.
pub fn default_title_from_stem(stem: &str) -> String {
    stem.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

struct Planner {
    slides: Vec<Slide>,
    /// Title the current slide's continuations are named after.
    section_title: String,
    /// The current slide is the implicit first slide and has nothing yet.
    untouched_initial: bool,
}

impl Planner {
    fn new() -> Self {
        Self {
            slides: Vec::new(),
            section_title: String::new(),
            untouched_initial: false,
        }
    }

    fn start_slide(&mut self, title: &str) {
        self.slides.push(Slide::new(title));
        self.section_title = title.to_string();
        self.untouched_initial = false;
    }

    fn push_bullet(&mut self, default_title: &str, bullet: Bullet) {
        if self.slides.is_empty() {
            self.start_slide(default_title);
        }

        let full = self
            .slides
            .last()
            .map_or(false, |s| s.bullets.len() >= MAX_BULLETS_PER_SLIDE);
        if full {
            let title = format!("{} (continuation)", self.section_title);
            self.slides.push(Slide::new(title));
        }

        if let Some(slide) = self.slides.last_mut() {
            slide.bullets.push(bullet);
        }
        self.untouched_initial = false;
    }

    fn heading(&mut self, default_title: &str, text: &str) {
        if self.slides.is_empty() {
            self.start_slide(default_title);
            self.untouched_initial = true;
        }

        if self.untouched_initial {
            if let Some(slide) = self.slides.last_mut() {
                slide.title = text.to_string();
            }
            self.section_title = text.to_string();
            self.untouched_initial = false;
        } else {
            self.start_slide(text);
        }
    }
}

pub fn plan_deck(paragraphs: &[DocParagraph], default_title: &str) -> SlideDeck {
    let mut planner = Planner::new();

    for paragraph in paragraphs {
        let text = paragraph.text.trim();
        if text.is_empty() {
            continue;
        }

        match paragraph.kind {
            ParagraphKind::Heading1 => planner.heading(default_title, text),
            ParagraphKind::Heading2 => planner.push_bullet(
                default_title,
                Bullet {
                    text: text.to_string(),
                    highlight: true,
                },
            ),
            ParagraphKind::Body => planner.push_bullet(
                default_title,
                Bullet {
                    text: text.to_string(),
                    highlight: false,
                },
            ),
        }
    }

    if planner.slides.is_empty() {
        planner.start_slide(default_title);
    }

    SlideDeck {
        title: default_title.to_string(),
        slides: planner.slides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h1(text: &str) -> DocParagraph {
        DocParagraph::new(ParagraphKind::Heading1, text)
    }

    fn h2(text: &str) -> DocParagraph {
        DocParagraph::new(ParagraphKind::Heading2, text)
    }

    fn titles(deck: &SlideDeck) -> Vec<&str> {
        deck.slides.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_default_title_from_stem() {
        assert_eq!(default_title_from_stem("intro_to_rust"), "Intro To Rust");
        assert_eq!(default_title_from_stem("SAFETY_rules"), "Safety Rules");
        assert_eq!(default_title_from_stem("__x__"), "X");
    }

    #[test]
    fn test_empty_document_has_one_slide() {
        let deck = plan_deck(&[DocParagraph::body("  "), DocParagraph::body("")], "Deck");
        assert_eq!(titles(&deck), vec!["Deck"]);
        assert!(deck.slides[0].bullets.is_empty());
    }

    #[test]
    fn test_leading_heading_retitles_initial_slide() {
        let deck = plan_deck(&[h1("Intro"), DocParagraph::body("hello")], "Deck");
        assert_eq!(titles(&deck), vec!["Intro"]);
        assert_eq!(deck.slides[0].bullets.len(), 1);
    }

    #[test]
    fn test_body_before_heading_keeps_default_slide() {
        let deck = plan_deck(
            &[
                DocParagraph::body("preface"),
                h1("Part 1"),
                h2("Sub"),
                DocParagraph::body("text"),
                h1("Part 2"),
            ],
            "Deck",
        );

        assert_eq!(titles(&deck), vec!["Deck", "Part 1", "Part 2"]);
        assert_eq!(
            deck.slides[1].bullets,
            vec![
                Bullet {
                    text: "Sub".to_string(),
                    highlight: true
                },
                Bullet {
                    text: "text".to_string(),
                    highlight: false
                },
            ]
        );
        assert!(deck.slides[2].bullets.is_empty());
    }

    #[test]
    fn test_overflow_creates_continuation_slides() {
        let mut paragraphs = vec![h1("Rules")];
        for i in 0..(MAX_BULLETS_PER_SLIDE * 2 + 1) {
            paragraphs.push(DocParagraph::body(format!("rule {}", i)));
        }

        let deck = plan_deck(&paragraphs, "Deck");

        assert_eq!(
            titles(&deck),
            vec!["Rules", "Rules (continuation)", "Rules (continuation)"]
        );
        assert_eq!(deck.slides[0].bullets.len(), MAX_BULLETS_PER_SLIDE);
        assert_eq!(deck.slides[1].bullets.len(), MAX_BULLETS_PER_SLIDE);
        assert_eq!(deck.slides[2].bullets.len(), 1);
        assert_eq!(deck.slides[2].bullets[0].text, "rule 30");
    }

    #[test]
    fn test_exactly_max_bullets_fits_one_slide() {
        let paragraphs: Vec<_> = (0..MAX_BULLETS_PER_SLIDE)
            .map(|i| DocParagraph::body(format!("b{}", i)))
            .collect();
        let deck = plan_deck(&paragraphs, "Deck");
        assert_eq!(deck.slides.len(), 1);
    }
}
