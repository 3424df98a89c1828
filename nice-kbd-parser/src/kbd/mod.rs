//! Key-combo recognition and decoration planning.
//!
//! Data flows leaf to root:
//!
//! [`KbdConfig`] → [`KeyMatcher`] (patterns) → [`Combo`]s (combos) →
//! [`Decoration`]s (decorations), with [`DocumentScanner`] driving the walk
//! per structural region for the live editing path.

pub mod combos;
pub mod config;
pub mod decorations;
pub mod patterns;
pub mod scanning;

pub use combos::{walk, walk_from, Combo, ComboWalker, Key};
pub use config::{KbdConfig, WrapperPair, FORMATTING_CHARACTERS};
pub use decorations::{unescape, Decoration, DecorationPlanner, EditingMode};
pub use patterns::{KeyMatcher, PatternError, PatternMode, PatternSources};
pub use scanning::{
    scan, DecorationSet, DocumentScanner, RegionRole, SelectionProvider, StructuralIndex,
    SyntaxNode, SyntaxTree, SyntaxTreeFile, ViewMode,
};
