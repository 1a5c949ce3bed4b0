//! Preview sizing hint.

pub const MAX_PREVIEW_FONT_SIZE: usize = 20;
pub const MIN_PREVIEW_FONT_SIZE: usize = 12;

/// Font size in points for previewing `latex`: one point smaller per ten
/// characters, kept within 12..=20.
pub fn preview_font_size(latex: &str) -> usize {
    let shrink = latex.chars().count() / 10;
    MAX_PREVIEW_FONT_SIZE
        .saturating_sub(shrink)
        .max(MIN_PREVIEW_FONT_SIZE)
}
