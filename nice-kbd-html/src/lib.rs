//! Static rendering of keyboard shortcuts
//!
//! The read-mode/export path: recognized combos in already rendered output are
//! rewritten into literal `<kbd>` markup. Two entry points:
//!
//! - [`StaticRenderer::render_text`] rewrites a single leaf text run;
//! - [`StaticRenderer::render_html`] parses an HTML fragment, rewrites every
//!   qualifying text run in place and serializes the fragment back.
//!
//! There is no selection here, so there is no editing mode: wrapper
//! delimiters are always stripped from the rendered key text.

pub mod dom;
pub mod error;
pub mod renderer;

pub use error::RenderError;
pub use renderer::{Segment, StaticRenderer};
