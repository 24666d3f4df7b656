pub mod docx_reader;
pub mod markdown_deck;
pub mod slide_export;

pub use slide_export::{
    convert_directory, convert_docx, default_output_for, write_deck, ConversionOutcome,
    SlidesError,
};
