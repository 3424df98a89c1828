//! Decoration Planner
//!
//! Turns a recognized key into abstract decoration instructions. The rules:
//!
//! - a key whose trimmed text holds a formatting character is replaced by a
//!   widget over its whole span, and only while the combo is at rest (while
//!   editing, the raw text stays visible and undecorated);
//! - every other key gets a non-destructive mark, in both modes;
//! - a marked key that is a wrapped span also gets its delimiters hidden,
//!   only at rest.
//!
//! The static path uses [`splice`] instead, which rewrites text directly.

use super::combos::{strip_prefix_ci, strip_suffix_ci, Combo, Key};
use super::config::{KbdConfig, FORMATTING_CHARACTERS};
use super::patterns::KeyMatcher;
use serde::Serialize;
use std::ops::Range;

/// Whether the user's selection currently touches a combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditingMode {
    AtRest,
    BeingEdited,
}

impl EditingMode {
    /// `BeingEdited` if any selection range overlaps `span`. Ends are
    /// inclusive, so a caret touching either edge counts.
    pub fn for_span(span: &Range<usize>, selections: &[Range<usize>]) -> Self {
        let touched = selections
            .iter()
            .any(|selection| selection.start <= span.end && selection.end >= span.start);
        if touched {
            EditingMode::BeingEdited
        } else {
            EditingMode::AtRest
        }
    }
}

/// Instruction emitted to the rendering collaborators. Ranges are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Decoration {
    Mark {
        range: Range<usize>,
        class: Option<String>,
    },
    ReplaceWithWidget {
        range: Range<usize>,
        text: String,
    },
    Hide {
        range: Range<usize>,
    },
    SpliceMarkup {
        range: Range<usize>,
        html: String,
    },
}

impl Decoration {
    pub fn range(&self) -> &Range<usize> {
        match self {
            Decoration::Mark { range, .. }
            | Decoration::ReplaceWithWidget { range, .. }
            | Decoration::Hide { range }
            | Decoration::SpliceMarkup { range, .. } => range,
        }
    }

    /// Ordering among instructions that share a start offset.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Decoration::ReplaceWithWidget { .. } | Decoration::SpliceMarkup { .. } => 0,
            Decoration::Mark { .. } => 1,
            Decoration::Hide { .. } => 2,
        }
    }
}

pub struct DecorationPlanner<'m> {
    matcher: &'m KeyMatcher,
    class: Option<String>,
}

impl<'m> DecorationPlanner<'m> {
    pub fn new(matcher: &'m KeyMatcher, config: &KbdConfig) -> Self {
        Self {
            matcher,
            class: config.style_class().map(str::to_string),
        }
    }

    pub fn plan(&self, key: &Key<'_>, mode: EditingMode) -> Vec<Decoration> {
        if contains_formatting(key.trimmed_text) {
            return match mode {
                EditingMode::AtRest => vec![Decoration::ReplaceWithWidget {
                    range: key.span.clone(),
                    text: unescape(key.trimmed_text),
                }],
                EditingMode::BeingEdited => Vec::new(),
            };
        }

        let mut decorations = vec![Decoration::Mark {
            range: key.span.clone(),
            class: self.class.clone(),
        }];
        if mode == EditingMode::AtRest && self.matcher.is_wrapped(key.whole_text) {
            decorations.extend(self.hide_delimiters(key));
        }
        decorations
    }

    /// Decorations for every key of a combo, in key order.
    pub fn plan_combo(&self, combo: &Combo<'_>, mode: EditingMode) -> Vec<Decoration> {
        combo
            .keys
            .iter()
            .flat_map(|key| self.plan(key, mode))
            .collect()
    }

    /// Hide the open delimiter with the padding after it, and the close
    /// delimiter with the padding before it.
    fn hide_delimiters(&self, key: &Key<'_>) -> Vec<Decoration> {
        let Some(pair) = self.matcher.wrapper() else {
            return Vec::new();
        };
        let text = key.whole_text;
        let start = key.span.start;
        let end = key.span.end;

        let mut hidden = Vec::with_capacity(2);
        if let Some(rest) = strip_prefix_ci(text, pair.open()) {
            let body = rest.trim_start();
            hidden.push(Decoration::Hide {
                range: start..start + (text.len() - body.len()),
            });
        }
        if let Some(rest) = strip_suffix_ci(text, pair.close()) {
            let body = rest.trim_end();
            hidden.push(Decoration::Hide {
                range: start + body.len()..end,
            });
        }
        hidden
    }
}

/// Literal markup substitutions for a combo on the static path: one
/// `<kbd>` per key; separators and surrounding text stay untouched.
pub fn splice(combo: &Combo<'_>, class: Option<&str>) -> Vec<Decoration> {
    combo
        .keys
        .iter()
        .map(|key| Decoration::SpliceMarkup {
            range: key.span.clone(),
            html: kbd_markup(key.trimmed_text, class),
        })
        .collect()
}

pub fn kbd_markup(text: &str, class: Option<&str>) -> String {
    match class {
        Some(class) => format!(
            "<kbd class=\"{}\">{}</kbd>",
            escape_markup(class),
            escape_markup(text)
        ),
        None => format!("<kbd>{}</kbd>", escape_markup(text)),
    }
}

/// Escape HTML special characters
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn contains_formatting(text: &str) -> bool {
    text.chars().any(|ch| FORMATTING_CHARACTERS.contains(&ch))
}

/// Drop backslash escapes: each backslash consumes exactly the next
/// character, which is kept literally. A trailing lone backslash is kept.
///
/// Best effort only: `\\*` and `\*` can unescape to look alike, so this is
/// not invertible for text with adjacent backslashes.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
