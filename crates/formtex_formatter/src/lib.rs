//! LaTeX rendering for parsed formulas.
//!
//! [`render`] turns a built statement into a [`LatexString`]: an
//! order-preserving [`LatexRenderer`] pass with optional color highlights,
//! followed by the text [`postprocess`] passes. Packages the highlights
//! depend on travel alongside the body instead of inside it.

pub mod color;
pub mod highlight;
pub mod latex;
pub mod latex_string;
pub mod postprocess;
pub mod sizing;

pub use color::{Color, InvalidColor, XCOLOR_PACKAGE};
pub use highlight::{HighlightConfig, HighlightError};
pub use latex::{render_number, render_symbol_name, LatexRenderer};
pub use latex_string::{strip_preamble, LatexString};
pub use postprocess::postprocess;
pub use sizing::preview_font_size;

use formtex_ast::{Context, Statement};

/// Render `statement` with `highlights` applied.
pub fn render(
    context: &Context,
    statement: &Statement,
    highlights: &HighlightConfig,
) -> LatexString {
    let raw = LatexRenderer::new(context)
        .with_highlights(highlights)
        .statement_to_latex(statement);
    LatexString::new(postprocess(&raw), highlights.packages())
}
