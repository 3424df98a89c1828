//! # nice-kbd
//!
//! Recognizes keyboard shortcut notation (`⌘ + Shift + A`, `Ctrl+C`, `«Esc»`)
//! inside freeform text and decides how every recognized key is decorated.
//!
//! File Layout
//!
//! src/kbd
//!   ├── config       The immutable configuration value every matcher is built from
//!   ├── patterns     Pattern Builder: configuration → compiled matcher
//!   ├── combos       Combo Walker: text → combos → keys, with offsets
//!   ├── decorations  Decoration Planner: key + editing mode → instructions
//!   └── scanning     Document Scan Orchestrator over a structural index
//!
//! The static (rendered output) path lives in the `nice-kbd-html` crate and
//! reuses patterns, combos and decorations from here.

pub mod kbd;
