//! Engine configuration
//!
//! [`KbdConfig`] is an immutable value passed explicitly into the pattern
//! builder. A settings change produces a new value and a new matcher; nothing
//! here is shared or mutated while a scan runs.

use log::warn;

/// Characters reserved by the host's rich-text emphasis layer.
///
/// Inside a key these must appear escaped (`\*`) while editing, and keys that
/// contain one are rendered as a whole widget instead of an inline mark.
pub const FORMATTING_CHARACTERS: &[char] = &['*', '_', '~', '=', '`'];

/// Unicode representations of modifier keys.
pub const DEFAULT_CHARACTERS: &str = "⌘⇧⇪⇥⎋⌃⌥␣⏎⌫⌦⇱⇲⇞⇟";
pub const DEFAULT_WORDS: &str = "ctrl";
pub const DEFAULT_ADDITIONAL_CHARACTERS: &str = "←↑→↓";
pub const DEFAULT_WRAPPER: &str = "«,»";
pub const DEFAULT_CLASS_NAME: &str = "nice-kbd";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KbdConfig {
    /// Any occurrence opens a combo.
    pub trigger_characters: Vec<char>,
    /// Case-insensitive, matched on word boundaries.
    pub trigger_words: Vec<String>,
    /// Allowed inside a key once it is open, but never open one.
    pub additional_characters: Vec<char>,
    /// `None` disables wrapped-key matching.
    pub wrapper: Option<WrapperPair>,
    pub class_name: String,
    pub apply_styles: bool,
    pub live_preview: bool,
    pub reading_view: bool,
}

impl KbdConfig {
    /// Build a configuration from the free-text settings fields.
    ///
    /// `words` is comma separated and `wrapper` is an `"open,close"` pair.
    /// Malformed fields degrade instead of failing: empty sets never match
    /// and an invalid wrapper pair disables wrapped keys.
    pub fn from_fields(characters: &str, words: &str, additional: &str, wrapper: &str) -> Self {
        let wrapper_pair = WrapperPair::parse(wrapper);
        if wrapper_pair.is_none() && !wrapper.trim().is_empty() {
            warn!("ignoring malformed wrapper pair {wrapper:?}, expected \"open,close\"");
        }

        Self {
            trigger_characters: char_set(characters),
            trigger_words: word_list(words),
            additional_characters: char_set(additional),
            wrapper: wrapper_pair,
            ..Self::default()
        }
    }

    /// The class applied to marks and rendered elements, if styling is on.
    pub fn style_class(&self) -> Option<&str> {
        if self.apply_styles && !self.class_name.is_empty() {
            Some(&self.class_name)
        } else {
            None
        }
    }
}

impl Default for KbdConfig {
    fn default() -> Self {
        Self {
            trigger_characters: char_set(DEFAULT_CHARACTERS),
            trigger_words: word_list(DEFAULT_WORDS),
            additional_characters: char_set(DEFAULT_ADDITIONAL_CHARACTERS),
            wrapper: WrapperPair::parse(DEFAULT_WRAPPER),
            class_name: DEFAULT_CLASS_NAME.to_string(),
            apply_styles: true,
            live_preview: true,
            reading_view: true,
        }
    }
}

/// Open/close delimiters of a wrapped key. Both sides are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperPair {
    open: String,
    close: String,
}

impl WrapperPair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Option<Self> {
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return None;
        }
        Some(Self { open, close })
    }

    /// Parse an `"open,close"` pair. Surrounding whitespace on each side is ignored.
    pub fn parse(pair: &str) -> Option<Self> {
        let (open, close) = pair.split_once(',')?;
        Self::new(open.trim(), close.trim())
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

/// Deduplicated characters in first-seen order. Whitespace is dropped: a
/// space trigger would turn every gap in the text into a key.
pub fn char_set(chars: &str) -> Vec<char> {
    let mut set = Vec::new();
    for ch in chars.chars().filter(|ch| !ch.is_whitespace()) {
        if !set.contains(&ch) {
            set.push(ch);
        }
    }
    set
}

/// Comma separated words, trimmed, empty entries dropped.
pub fn word_list(words: &str) -> Vec<String> {
    let mut list: Vec<String> = Vec::new();
    for word in words.split(',').map(str::trim).filter(|w| !w.is_empty()) {
        if !list.iter().any(|existing| existing.eq_ignore_ascii_case(word)) {
            list.push(word.to_string());
        }
    }
    list
}
