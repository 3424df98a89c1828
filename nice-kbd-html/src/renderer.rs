//! Leaf text run rendering

use crate::error::RenderError;
use nice_kbd_parser::kbd::decorations::{escape_markup, splice};
use nice_kbd_parser::kbd::{walk, Decoration, KbdConfig, KeyMatcher, PatternMode};

/// A piece of a rewritten text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Copied verbatim: text between combos and the separators inside them.
    Text(&'t str),
    /// Trimmed key text, rendered as a `<kbd>` element.
    Kbd(&'t str),
}

#[derive(Debug, Clone)]
pub struct StaticRenderer {
    config: KbdConfig,
    matcher: KeyMatcher,
}

impl StaticRenderer {
    pub fn new(config: KbdConfig) -> Result<Self, RenderError> {
        let matcher = KeyMatcher::build(&config, PatternMode::Static)?;
        Ok(Self { config, matcher })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.reading_view
    }

    pub fn class(&self) -> Option<&str> {
        self.config.style_class()
    }

    /// Split one text run into verbatim text and keys.
    pub fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        for combo in walk(text, &self.matcher) {
            if combo.from() > cursor {
                segments.push(Segment::Text(&text[cursor..combo.from()]));
            }
            for key in &combo.keys {
                if !key.separator.is_empty() {
                    segments.push(Segment::Text(key.separator));
                }
                segments.push(Segment::Kbd(key.trimmed_text));
            }
            cursor = combo.to();
        }
        if cursor < text.len() {
            segments.push(Segment::Text(&text[cursor..]));
        }
        segments
    }

    /// Render one leaf text run to markup. Text outside keys is escaped.
    ///
    /// The input is plain text, so with reading view off it is returned
    /// escaped but otherwise unchanged: the output is always markup.
    pub fn render_text(&self, text: &str) -> String {
        if !self.is_enabled() {
            return escape_markup(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for combo in walk(text, &self.matcher) {
            for decoration in splice(&combo, self.class()) {
                if let Decoration::SpliceMarkup { range, html } = decoration {
                    out.push_str(&escape_markup(&text[cursor..range.start]));
                    out.push_str(&html);
                    cursor = range.end;
                }
            }
        }
        out.push_str(&escape_markup(&text[cursor..]));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> StaticRenderer {
        StaticRenderer::new(KbdConfig::from_fields("⌘", "ctrl", "", "«,»")).unwrap()
    }

    #[test]
    fn splits_around_combos() {
        let renderer = renderer();
        assert_eq!(
            renderer.segments("Press Ctrl+C to copy"),
            vec![
                Segment::Text("Press "),
                Segment::Kbd("Ctrl"),
                Segment::Text("+"),
                Segment::Kbd("C"),
                Segment::Text(" to copy"),
            ]
        );
    }

    #[test]
    fn renders_a_leaf_run() {
        assert_eq!(
            renderer().render_text("Use ⌘+S to save"),
            "Use <kbd class=\"nice-kbd\">⌘</kbd>+<kbd class=\"nice-kbd\">S</kbd> to save"
        );
    }

    #[test]
    fn wrapper_is_stripped_not_hidden() {
        assert_eq!(
            renderer().render_text("«Page Up» + «*»"),
            "<kbd class=\"nice-kbd\">Page Up</kbd> + <kbd class=\"nice-kbd\">*</kbd>"
        );
    }

    #[test]
    fn blank_wrapped_span_is_left_as_text() {
        assert_eq!(renderer().render_text("« »"), "« »");
    }

    #[test]
    fn plain_text_is_escaped() {
        assert_eq!(renderer().render_text("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn unstyled_keys_have_no_class() {
        let config = KbdConfig {
            apply_styles: false,
            ..KbdConfig::from_fields("⌘", "", "", "")
        };
        let renderer = StaticRenderer::new(config).unwrap();
        assert_eq!(renderer.render_text("⌘K"), "<kbd>⌘K</kbd>");
    }

    #[test]
    fn disabled_renderer_only_escapes_text() {
        let config = KbdConfig {
            reading_view: false,
            ..KbdConfig::default()
        };
        let renderer = StaticRenderer::new(config).unwrap();
        assert_eq!(renderer.render_text("⌘K"), "⌘K");
        assert_eq!(renderer.render_text("⌘K & <b>"), "⌘K &amp; &lt;b&gt;");
    }
}
