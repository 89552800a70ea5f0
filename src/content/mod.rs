//! Content handling: sanitization, noise vocabulary and text helpers

mod noise;
mod sanitizer;
mod text;

pub use noise::{has_noise_class, is_region_noise, NOISE_CLASSES, SCRIPT_TAGS, STRUCTURAL_TAGS};
pub use sanitizer::{clean, MIN_CLEAN_CHARS};
pub use text::{
    collapse_whitespace, element_text, escape_text, paragraphs_from_lines, pruned_text,
    select_within, text_lines,
};
