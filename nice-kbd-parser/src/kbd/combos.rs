//! Combo Walker
//!
//! Runs the whole-combo pattern left to right over a text and decomposes each
//! match into keys. Decomposition is two explicit, ordered passes:
//!
//! 1. the `initial` capture of the whole-combo match becomes key 0;
//! 2. the remainder of the match is rescanned with the additional-key pattern,
//!    each `separator additional-key` hit becoming the next key.
//!
//! Offsets are byte offsets. `walk_from` adds a base so a region's combos come
//! out in absolute document offsets.

use super::config::WrapperPair;
use super::patterns::KeyMatcher;
use log::trace;
use regex::CaptureMatches;
use serde::Serialize;
use std::ops::Range;

/// A maximal `initial (separator additional)*` match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combo<'t> {
    pub span: Range<usize>,
    pub text: &'t str,
    /// Never empty; the first entry is the initial key.
    pub keys: Vec<Key<'t>>,
}

impl<'t> Combo<'t> {
    pub fn from(&self) -> usize {
        self.span.start
    }

    pub fn to(&self) -> usize {
        self.span.end
    }

    pub fn initial_key(&self) -> &Key<'t> {
        &self.keys[0]
    }
}

/// One token of a combo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key<'t> {
    /// Raw matched text, wrapper delimiters included. All offsets refer to it.
    pub whole_text: &'t str,
    /// `whole_text` without wrapper delimiters and surrounding whitespace.
    pub trimmed_text: &'t str,
    /// Connector before this key; empty for the initial key.
    pub separator: &'t str,
    /// Start of `whole_text` relative to the combo start.
    pub offset: usize,
    pub span: Range<usize>,
}

/// Lazy sequence of combos over one text.
///
/// The regex cursor lives inside this value only; every call to [`walk`]
/// starts a fresh scan.
pub struct ComboWalker<'m, 't> {
    matcher: &'m KeyMatcher,
    matches: CaptureMatches<'m, 't>,
    base: usize,
    wrapper: Option<&'m WrapperPair>,
}

pub fn walk<'m, 't>(text: &'t str, matcher: &'m KeyMatcher) -> ComboWalker<'m, 't> {
    walk_from(text, 0, matcher)
}

/// Walk `text`, reporting spans shifted by `base`.
pub fn walk_from<'m, 't>(
    text: &'t str,
    base: usize,
    matcher: &'m KeyMatcher,
) -> ComboWalker<'m, 't> {
    ComboWalker {
        matcher,
        matches: matcher.whole_combo().captures_iter(text),
        base,
        wrapper: matcher.wrapper(),
    }
}

impl<'m, 't> Iterator for ComboWalker<'m, 't> {
    type Item = Combo<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let captures = self.matches.next()?;
        let whole = captures.get(0)?;
        let initial = captures.name("initial")?;
        let text = whole.as_str();
        let from = self.base + whole.start();

        let initial_len = initial.as_str().len();
        let mut keys = vec![self.key(initial.as_str(), "", 0, from)];

        let remainder = &text[initial_len..];
        for found in self.matcher.additional_key().captures_iter(remainder) {
            let (Some(local), Some(sep), Some(key)) =
                (found.get(0), found.name("sep"), found.name("key"))
            else {
                continue;
            };
            let offset = initial_len + local.start() + sep.as_str().len();
            debug_assert_eq!(offset + key.as_str().len(), initial_len + local.end());
            keys.push(self.key(key.as_str(), sep.as_str(), offset, from));
        }

        trace!(
            "combo {:?} at {}..{} with {} keys",
            text,
            from,
            from + text.len(),
            keys.len()
        );
        Some(Combo {
            span: from..from + text.len(),
            text,
            keys,
        })
    }
}

impl<'m, 't> ComboWalker<'m, 't> {
    fn key(
        &self,
        whole_text: &'t str,
        separator: &'t str,
        offset: usize,
        combo_from: usize,
    ) -> Key<'t> {
        let start = combo_from + offset;
        Key {
            whole_text,
            trimmed_text: trim_key(whole_text, self.wrapper),
            separator,
            offset,
            span: start..start + whole_text.len(),
        }
    }
}

/// Strip a leading wrapper-open and trailing wrapper-close (case-insensitive),
/// then surrounding whitespace.
pub fn trim_key<'t>(text: &'t str, wrapper: Option<&WrapperPair>) -> &'t str {
    let mut trimmed = text;
    if let Some(pair) = wrapper {
        if let Some(rest) = strip_prefix_ci(trimmed, pair.open()) {
            trimmed = rest;
        }
        if let Some(rest) = strip_suffix_ci(trimmed, pair.close()) {
            trimmed = rest;
        }
    }
    trimmed.trim()
}

pub(crate) fn strip_prefix_ci<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let mut rest = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = rest.next()?;
        if !chars_eq_ci(actual, expected) {
            return None;
        }
    }
    let consumed = rest.next().map(|(idx, _)| idx).unwrap_or(text.len());
    Some(&text[consumed..])
}

pub(crate) fn strip_suffix_ci<'t>(text: &'t str, suffix: &str) -> Option<&'t str> {
    let mut rest = text.char_indices().rev();
    let mut cut = text.len();
    for expected in suffix.chars().rev() {
        let (idx, actual) = rest.next()?;
        if !chars_eq_ci(actual, expected) {
            return None;
        }
        cut = idx;
    }
    Some(&text[..cut])
}

fn chars_eq_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
