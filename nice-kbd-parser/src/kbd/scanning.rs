//! Document Scan Orchestrator
//!
//! Walks the host document's structural regions depth first and produces the
//! decoration set for live editing. Each region is classified into a
//! [`RegionRole`]:
//!
//! - `Skip`: formatting markers and containers whose text is reachable again
//!   through another region. Not scanned, not excluded; children are visited.
//! - `Exclude`: code, tags, comments, escapes, strikethrough. Any combo whose
//!   start falls inside is dropped; children are not visited.
//! - `Scan`: everything else, including unclassified regions and the
//!   document root, which has no dedicated node for plain inline text.
//!
//! Results are keyed by absolute combo start and filtered only after the
//! whole traversal, so a code span nested anywhere can still void a combo
//! that an outer region (typically the root) picked up.

mod tree;

pub use tree::{SyntaxNode, SyntaxTree, SyntaxTreeFile};

use super::combos::walk_from;
use super::config::KbdConfig;
use super::decorations::{Decoration, DecorationPlanner, EditingMode};
use super::patterns::{KeyMatcher, PatternError, PatternMode};
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

static EXCLUDE_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)code|tag|comment|escape|strikethrough").unwrap());

static SKIP_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)formatting|list|quote|header|table-sep").unwrap());

/// How the host is currently displaying the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    LivePreview,
    /// Raw source; decorations do not apply.
    Source,
}

/// Read-only view of the host's structural index.
pub trait StructuralIndex {
    type Region: Copy;

    fn view_mode(&self) -> ViewMode {
        ViewMode::LivePreview
    }

    fn root(&self) -> Self::Region;

    /// Children in document order.
    fn children(&self, region: Self::Region) -> Vec<Self::Region>;

    /// Syntax tag of the region; `None` when the index cannot classify it.
    fn classify(&self, region: Self::Region) -> Option<&str>;

    /// Absolute byte span of the region.
    fn span(&self, region: Self::Region) -> Range<usize>;

    fn text_of(&self, region: Self::Region) -> &str;
}

pub trait SelectionProvider {
    /// Absolute ranges; a caret is an empty range.
    fn selection_ranges(&self) -> Vec<Range<usize>>;
}

impl SelectionProvider for [Range<usize>] {
    fn selection_ranges(&self) -> Vec<Range<usize>> {
        self.to_vec()
    }
}

impl SelectionProvider for Vec<Range<usize>> {
    fn selection_ranges(&self) -> Vec<Range<usize>> {
        self.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRole {
    Skip,
    Exclude,
    Scan,
}

impl RegionRole {
    /// Exclusion wins over skipping; unclassified regions are scanned.
    pub fn of(tag: Option<&str>) -> Self {
        match tag {
            Some(tag) if EXCLUDE_TAGS.is_match(tag) => RegionRole::Exclude,
            Some(tag) if SKIP_TAGS.is_match(tag) => RegionRole::Skip,
            _ => RegionRole::Scan,
        }
    }
}

/// Sorted, non-overlapping-by-combo set of decorations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecorationSet(Vec<Decoration>);

impl DecorationSet {
    pub fn iter(&self) -> std::slice::Iter<'_, Decoration> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Decoration;
    type IntoIter = std::slice::Iter<'a, Decoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Decorations collected for one combo start.
struct Candidate {
    span: Range<usize>,
    decorations: Vec<Decoration>,
}

pub struct DocumentScanner<'m> {
    matcher: &'m KeyMatcher,
    planner: DecorationPlanner<'m>,
    enabled: bool,
}

impl<'m> DocumentScanner<'m> {
    /// `matcher` should be built in [`PatternMode::LivePreview`].
    pub fn new(matcher: &'m KeyMatcher, config: &KbdConfig) -> Self {
        debug_assert_eq!(matcher.mode(), PatternMode::LivePreview);
        Self {
            matcher,
            planner: DecorationPlanner::new(matcher, config),
            enabled: config.live_preview,
        }
    }

    pub fn scan<I, S>(&self, index: &I, selection: &S) -> DecorationSet
    where
        I: StructuralIndex,
        S: SelectionProvider + ?Sized,
    {
        if !self.enabled || index.view_mode() == ViewMode::Source {
            return DecorationSet::default();
        }

        let selections = selection.selection_ranges();
        let mut candidates: BTreeMap<usize, Candidate> = BTreeMap::new();
        let mut excluded: Vec<Range<usize>> = Vec::new();
        let mut visited = 0usize;

        let mut stack = vec![index.root()];
        while let Some(region) = stack.pop() {
            visited += 1;
            match RegionRole::of(index.classify(region)) {
                RegionRole::Exclude => {
                    excluded.push(index.span(region));
                    continue;
                }
                RegionRole::Skip => {}
                RegionRole::Scan => {
                    self.scan_region(index, region, &selections, &mut candidates);
                }
            }
            let mut children = index.children(region);
            children.reverse();
            stack.extend(children);
        }

        let found = candidates.len();
        let mut accepted_end = 0usize;
        let mut decorations = Vec::new();
        for (start, candidate) in candidates {
            if excluded.iter().any(|range| range.contains(&start)) {
                trace!("dropping combo at {start}: inside an excluded region");
                continue;
            }
            if start < accepted_end {
                trace!("dropping combo at {start}: overlaps an accepted combo");
                continue;
            }
            accepted_end = candidate.span.end;
            decorations.extend(candidate.decorations);
        }
        decorations.sort_by_key(|decoration| (decoration.range().start, decoration.rank()));

        debug!(
            "scanned {visited} regions: {found} combos found, {} excluded ranges, {} decorations",
            excluded.len(),
            decorations.len()
        );
        DecorationSet(decorations)
    }

    fn scan_region<I: StructuralIndex>(
        &self,
        index: &I,
        region: I::Region,
        selections: &[Range<usize>],
        candidates: &mut BTreeMap<usize, Candidate>,
    ) {
        let base = index.span(region).start;
        for combo in walk_from(index.text_of(region), base, self.matcher) {
            let mode = EditingMode::for_span(&combo.span, selections);
            let candidate = Candidate {
                span: combo.span.clone(),
                decorations: self.planner.plan_combo(&combo, mode),
            };
            // Longest combo wins at a shared start; first found on ties.
            match candidates.get(&combo.from()) {
                Some(existing) if existing.span.end >= candidate.span.end => {}
                _ => {
                    candidates.insert(combo.from(), candidate);
                }
            }
        }
    }
}

/// Build a live matcher from `config` and scan `index` once.
pub fn scan<I, S>(
    index: &I,
    config: &KbdConfig,
    selection: &S,
) -> Result<DecorationSet, PatternError>
where
    I: StructuralIndex,
    S: SelectionProvider + ?Sized,
{
    let matcher = KeyMatcher::build(config, PatternMode::LivePreview)?;
    Ok(DocumentScanner::new(&matcher, config).scan(index, selection))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_tags() {
        assert_eq!(RegionRole::of(Some("inline-code")), RegionRole::Exclude);
        assert_eq!(RegionRole::of(Some("hashtag_hashtag-end")), RegionRole::Exclude);
        assert_eq!(RegionRole::of(Some("comment")), RegionRole::Exclude);
        assert_eq!(RegionRole::of(Some("hmd-escape-backslash")), RegionRole::Exclude);
        assert_eq!(RegionRole::of(Some("strikethrough")), RegionRole::Exclude);
        assert_eq!(RegionRole::of(Some("formatting-list")), RegionRole::Skip);
        assert_eq!(RegionRole::of(Some("quote_quote-1")), RegionRole::Skip);
        assert_eq!(RegionRole::of(Some("header_header-2")), RegionRole::Skip);
        assert_eq!(RegionRole::of(Some("hmd-table-sep")), RegionRole::Skip);
        assert_eq!(RegionRole::of(Some("emphasis")), RegionRole::Scan);
        assert_eq!(RegionRole::of(None), RegionRole::Scan);
    }

    #[test]
    fn formatting_code_marker_is_excluded_not_skipped() {
        assert_eq!(
            RegionRole::of(Some("formatting_formatting-code_inline-code")),
            RegionRole::Exclude
        );
    }

    const NO_SELECTION: &[Range<usize>] = &[];

    #[test]
    fn source_mode_yields_nothing() {
        let tree = SyntaxTree::new("⌘S").with_view_mode(ViewMode::Source);
        let set = scan(&tree, &KbdConfig::default(), NO_SELECTION).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn scanner_requires_a_live_matcher() {
        let config = KbdConfig::default();
        let matcher = KeyMatcher::build(&config, PatternMode::Static).unwrap();
        let _ = DocumentScanner::new(&matcher, &config);
    }

    #[test]
    fn disabled_live_preview_yields_nothing() {
        let tree = SyntaxTree::new("⌘S");
        let config = KbdConfig {
            live_preview: false,
            ..KbdConfig::default()
        };
        assert!(scan(&tree, &config, NO_SELECTION).unwrap().is_empty());
    }
}
