//! Pattern Builder
//!
//! Compiles a [`KbdConfig`] into the lexical grammar of a key combo:
//!
//! ```text
//! allowed-char   = trigger/additional char | \w | \<formatting-char>   (escape: live only)
//! wrapped-key    = OPEN ws* body ws* CLOSE                              (body: no newline)
//! initial-key    = wrapped-key | (trigger-char | trigger-word) allowed-char*
//! additional-key = wrapped-key | \w+ | allowed-char
//! separator      = \s* + \s*
//! whole-combo    = initial-key (separator additional-key)*
//! ```
//!
//! Every fragment taken from the configuration is escaped before it is
//! interpolated. Building is a pure function of the configuration and the
//! mode: the same inputs always produce the same pattern sources.

use super::config::{KbdConfig, WrapperPair, FORMATTING_CHARACTERS};
use log::debug;
use regex::Regex;
use thiserror::Error;

/// Matches nowhere. Used when a configuration leaves no way to open a key.
const NEVER: &str = r"\b\B";
const SEPARATOR: &str = r"\s*\+\s*";
/// Padding between a wrapper delimiter and the wrapped body.
const WRAPPER_PADDING: &str = r"[^\S\n]*";

/// Which text the matcher runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternMode {
    /// Raw source being edited; formatting characters must be escaped.
    LivePreview,
    /// Already rendered text; no escaping concept applies.
    Static,
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to compile the {name} pattern: {source}")]
    Compile {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Uncompiled pattern sources, one per grammar rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSources {
    pub wrapper: Option<WrapperPair>,
    pub allowed_char: String,
    pub wrapped_key: Option<String>,
    pub initial_key: String,
    pub additional_key: String,
    pub separator: String,
    pub whole_combo: String,
    pub additional_scan: String,
}

impl PatternSources {
    pub fn build(config: &KbdConfig, mode: PatternMode) -> Self {
        let allowed_char = allowed_char(config, mode);
        let wrapped_key = config.wrapper.as_ref().map(|pair| wrapped_key(pair, mode));

        let mut openers = Vec::new();
        if let Some(class) = char_class(&config.trigger_characters) {
            openers.push(class);
        }
        if !config.trigger_words.is_empty() {
            let words: Vec<String> = config
                .trigger_words
                .iter()
                .map(String::as_str)
                .map(trigger_word)
                .collect();
            openers.push(format!("(?:{})", words.join("|")));
        }

        let mut initial = Vec::new();
        if let Some(wrapped) = &wrapped_key {
            initial.push(wrapped.clone());
        }
        if !openers.is_empty() {
            initial.push(format!("(?:{}){}*", openers.join("|"), allowed_char));
        }
        let initial_key = if initial.is_empty() {
            NEVER.to_string()
        } else {
            format!("(?:{})", initial.join("|"))
        };

        let mut additional = Vec::new();
        if let Some(wrapped) = &wrapped_key {
            additional.push(wrapped.clone());
        }
        additional.push(r"\w+".to_string());
        additional.push(allowed_char.clone());
        let additional_key = format!("(?:{})", additional.join("|"));

        let separator = SEPARATOR.to_string();
        let whole_combo =
            format!("(?i)(?P<initial>{initial_key})(?:{separator}{additional_key})*");
        let additional_scan = format!("(?i)(?P<sep>{separator})(?P<key>{additional_key})");

        Self {
            wrapper: config.wrapper.clone(),
            allowed_char,
            wrapped_key,
            initial_key,
            additional_key,
            separator,
            whole_combo,
            additional_scan,
        }
    }

    pub fn compile(&self, mode: PatternMode) -> Result<KeyMatcher, PatternError> {
        let wrapped_key = self
            .wrapped_key
            .as_ref()
            .map(|source| compile("wrapped-key", &format!("(?i)^(?:{source})$")))
            .transpose()?;

        Ok(KeyMatcher {
            mode,
            wrapper: self.wrapper.clone(),
            initial_key: compile("initial-key", &format!("(?i){}", self.initial_key))?,
            wrapped_key,
            additional_key: compile("additional-key", &self.additional_scan)?,
            whole_combo: compile("whole-combo", &self.whole_combo)?,
        })
    }
}

fn compile(name: &'static str, source: &str) -> Result<Regex, PatternError> {
    Regex::new(source).map_err(|source| PatternError::Compile { name, source })
}

/// The compiled grammar. Cheap to share by reference across scans.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    mode: PatternMode,
    wrapper: Option<WrapperPair>,
    initial_key: Regex,
    wrapped_key: Option<Regex>,
    additional_key: Regex,
    whole_combo: Regex,
}

impl KeyMatcher {
    pub fn build(config: &KbdConfig, mode: PatternMode) -> Result<Self, PatternError> {
        debug!(
            "building {:?} key matcher: {} trigger chars, {} trigger words, wrapper {}",
            mode,
            config.trigger_characters.len(),
            config.trigger_words.len(),
            if config.wrapper.is_some() { "on" } else { "off" },
        );
        PatternSources::build(config, mode).compile(mode)
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    pub fn wrapper(&self) -> Option<&WrapperPair> {
        self.wrapper.as_ref()
    }

    pub fn initial_key(&self) -> &Regex {
        &self.initial_key
    }

    /// Anchored: matches a whole key text that is a wrapped span.
    pub fn wrapped_key(&self) -> Option<&Regex> {
        self.wrapped_key.as_ref()
    }

    /// `(?P<sep>separator)(?P<key>additional-key)`, for rescanning a combo tail.
    pub fn additional_key(&self) -> &Regex {
        &self.additional_key
    }

    /// The full combo pattern; the initial key is the `initial` group.
    pub fn whole_combo(&self) -> &Regex {
        &self.whole_combo
    }

    pub fn is_wrapped(&self, key_text: &str) -> bool {
        self.wrapped_key
            .as_ref()
            .is_some_and(|regex| regex.is_match(key_text))
    }
}

fn allowed_char(config: &KbdConfig, mode: PatternMode) -> String {
    let mut chars = config.trigger_characters.clone();
    for ch in &config.additional_characters {
        if !chars.contains(ch) {
            chars.push(*ch);
        }
    }

    let mut alternatives = Vec::new();
    if let Some(class) = char_class(&chars) {
        alternatives.push(class);
    }
    alternatives.push(r"\w".to_string());
    if mode == PatternMode::LivePreview {
        alternatives.push(format!(r"\\[{}]", escaped_chars(FORMATTING_CHARACTERS)));
    }
    format!("(?:{})", alternatives.join("|"))
}

/// An escaped trigger word, with `\b` on each edge that is a word character.
fn trigger_word(word: &str) -> String {
    let is_word = |ch: Option<char>| ch.is_some_and(|ch| ch.is_alphanumeric() || ch == '_');
    format!(
        "{}{}{}",
        if is_word(word.chars().next()) { r"\b" } else { "" },
        regex::escape(word),
        if is_word(word.chars().next_back()) { r"\b" } else { "" },
    )
}

/// The body never starts with whitespace, so a key always has visible text.
fn wrapped_key(pair: &WrapperPair, mode: PatternMode) -> String {
    let body = match mode {
        PatternMode::LivePreview => {
            let formatting = escaped_chars(FORMATTING_CHARACTERS);
            format!(r"(?:\\[^\n]|[^\s\\{formatting}])(?:\\[^\n]|[^\n\\{formatting}])*?")
        }
        PatternMode::Static => r"\S[^\n]*?".to_string(),
    };
    format!(
        "{open}{pad}{body}{pad}{close}",
        open = regex::escape(pair.open()),
        close = regex::escape(pair.close()),
        pad = WRAPPER_PADDING,
    )
}

/// `[...]` over the given characters, or `None` for an empty set.
fn char_class(chars: &[char]) -> Option<String> {
    if chars.is_empty() {
        None
    } else {
        Some(format!("[{}]", escaped_chars(chars)))
    }
}

fn escaped_chars(chars: &[char]) -> String {
    let mut buf = [0u8; 4];
    chars
        .iter()
        .map(|ch| regex::escape(ch.encode_utf8(&mut buf)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(characters: &str, words: &str, additional: &str, wrapper: &str) -> KbdConfig {
        KbdConfig::from_fields(characters, words, additional, wrapper)
    }

    #[test]
    fn building_is_deterministic() {
        let config = KbdConfig::default();
        assert_eq!(
            PatternSources::build(&config, PatternMode::LivePreview),
            PatternSources::build(&config, PatternMode::LivePreview)
        );
    }

    #[test]
    fn escape_alternative_only_in_live_mode() {
        let config = KbdConfig::default();
        let live = PatternSources::build(&config, PatternMode::LivePreview);
        let rendered = PatternSources::build(&config, PatternMode::Static);
        assert!(live.allowed_char.contains(r"\\["));
        assert!(!rendered.allowed_char.contains(r"\\["));
    }

    #[test]
    fn metacharacters_in_configuration_are_escaped() {
        let matcher = KeyMatcher::build(
            &config("^]-\\", "c++, a.b", "[", "(,)"),
            PatternMode::LivePreview,
        )
        .expect("escaped configuration compiles");
        assert!(matcher.whole_combo().is_match("^"));
        assert!(matcher.whole_combo().is_match("a.b"));
        assert!(!matcher.whole_combo().is_match("axb"));
        assert!(matcher.is_wrapped("(Esc)"));
    }

    #[test]
    fn empty_configuration_never_matches() {
        let matcher = KeyMatcher::build(&config("", "", "", ""), PatternMode::Static).unwrap();
        assert!(!matcher.whole_combo().is_match("⌘ + ctrl + «Esc»"));
    }

    #[test]
    fn trigger_words_respect_word_boundaries() {
        let matcher = KeyMatcher::build(&config("", "ctrl", "", ""), PatternMode::Static).unwrap();
        assert!(matcher.initial_key().is_match("CTRL"));
        assert!(!matcher.initial_key().is_match("ctrlx"));
        assert!(!matcher.initial_key().is_match("xctrl"));
    }

    #[test]
    fn additional_characters_cannot_open_a_key() {
        let matcher =
            KeyMatcher::build(&config("⌘", "", "←", ""), PatternMode::Static).unwrap();
        assert!(!matcher.whole_combo().is_match("←"));
        let found = matcher.whole_combo().find("⌘←").unwrap();
        assert_eq!(found.as_str(), "⌘←");
    }

    #[test]
    fn live_wrapped_body_requires_escaped_formatting() {
        let config = config("", "", "", "«,»");
        let live = KeyMatcher::build(&config, PatternMode::LivePreview).unwrap();
        let rendered = KeyMatcher::build(&config, PatternMode::Static).unwrap();
        assert!(!live.is_wrapped("«*»"));
        assert!(live.is_wrapped(r"«\*»"));
        assert!(rendered.is_wrapped("«*»"));
    }

    #[test]
    fn punctuation_edges_of_trigger_words_need_no_boundary() {
        let matcher =
            KeyMatcher::build(&config("", "c++, ctrl", "", ""), PatternMode::Static).unwrap();
        assert_eq!(matcher.whole_combo().find("use c++").unwrap().as_str(), "c++");
        assert_eq!(
            matcher.whole_combo().find("c++ + k now").unwrap().as_str(),
            "c++ + k"
        );
        assert!(!matcher.whole_combo().is_match("abc++"));
        assert_eq!(trigger_word("c++"), r"\bc\+\+");
        assert_eq!(trigger_word("ctrl"), r"\bctrl\b");
    }

    #[test]
    fn whitespace_only_wrapped_body_is_not_a_key() {
        let config = config("", "", "", "«,»");
        for mode in [PatternMode::LivePreview, PatternMode::Static] {
            let matcher = KeyMatcher::build(&config, mode).unwrap();
            assert!(!matcher.is_wrapped("« »"));
            assert!(!matcher.is_wrapped("«»"));
            assert!(!matcher.whole_combo().is_match("a « » b"));
            assert!(matcher.is_wrapped("« a »"));
        }
    }

    #[test]
    fn wrapped_body_excludes_newlines() {
        let matcher =
            KeyMatcher::build(&config("", "", "", "«,»"), PatternMode::Static).unwrap();
        assert!(!matcher.whole_combo().is_match("«Es\nc»"));
        assert!(matcher.is_wrapped("« Esc »"));
    }
}
