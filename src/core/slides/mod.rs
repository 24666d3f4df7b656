pub mod slide_models;
pub mod slide_planner;

pub use slide_models::{kind_from_style, Bullet, DocParagraph, ParagraphKind, Slide, SlideDeck};
pub use slide_planner::{default_title_from_stem, plan_deck, MAX_BULLETS_PER_SLIDE};
