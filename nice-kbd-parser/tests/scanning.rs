//! Live-editing scans over an in-memory syntax tree.

use nice_kbd_parser::kbd::{
    scan, Decoration, DecorationSet, KbdConfig, SyntaxNode, SyntaxTree, ViewMode,
};
use std::ops::Range;

const AT_REST: &[Range<usize>] = &[];

fn config() -> KbdConfig {
    KbdConfig::from_fields("⌘", "ctrl", "", "«,»")
}

/// One line per decoration: kind, range, covered source text, payload.
fn describe(set: &DecorationSet, source: &str) -> String {
    set.iter()
        .map(|decoration| {
            let range = decoration.range();
            let covered = &source[range.clone()];
            match decoration {
                Decoration::Mark { class, .. } => format!(
                    "mark {}..{} {} {}",
                    range.start,
                    range.end,
                    covered,
                    class.as_deref().unwrap_or("-")
                ),
                Decoration::ReplaceWithWidget { text, .. } => {
                    format!("widget {}..{} {} -> {}", range.start, range.end, covered, text)
                }
                Decoration::Hide { .. } => format!("hide {}..{} {}", range.start, range.end, covered),
                Decoration::SpliceMarkup { html, .. } => {
                    format!("splice {}..{} {}", range.start, range.end, html)
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn marks_every_key_of_a_plain_combo() {
    let source = "Press Ctrl+C to copy";
    let set = scan(&SyntaxTree::new(source), &config(), AT_REST).unwrap();
    insta::assert_snapshot!(describe(&set, source), @r###"
    mark 6..10 Ctrl nice-kbd
    mark 11..12 C nice-kbd
    "###);
}

#[test]
fn wrapper_delimiters_hidden_at_rest() {
    let source = "«Esc»";
    let set = scan(&SyntaxTree::new(source), &config(), AT_REST).unwrap();
    insta::assert_snapshot!(describe(&set, source), @r###"
    mark 0..7 «Esc» nice-kbd
    hide 0..2 «
    hide 5..7 »
    "###);
}

#[test]
fn wrapper_delimiters_visible_while_editing() {
    let source = "«Esc»";
    let caret = vec![3..3];
    let set = scan(&SyntaxTree::new(source), &config(), &caret).unwrap();
    assert_eq!(set.len(), 1);
    assert!(set
        .iter()
        .all(|decoration| !matches!(decoration, Decoration::Hide { .. })));
}

#[test]
fn formatting_key_is_widget_at_rest_and_bare_while_editing() {
    let source = r"Toggle «\*» bold";
    let tree = SyntaxTree::new(source);

    let at_rest = scan(&tree, &config(), AT_REST).unwrap();
    insta::assert_snapshot!(describe(&at_rest, source), @r###"widget 7..13 «\*» -> *"###);

    let editing = vec![8..10];
    assert!(scan(&tree, &config(), &editing).unwrap().is_empty());
}

#[test]
fn selection_only_affects_the_touched_combo() {
    let source = "«A» and «B»";
    let selection = vec![0..1];
    let set = scan(&SyntaxTree::new(source), &config(), &selection).unwrap();
    let hides: Vec<_> = set
        .iter()
        .filter(|decoration| matches!(decoration, Decoration::Hide { .. }))
        .map(|decoration| &source[decoration.range().clone()])
        .collect();
    assert_eq!(hides, vec!["«", "»"]);
    let second = "«A» and ".len();
    assert!(set
        .iter()
        .filter(|d| matches!(d, Decoration::Hide { .. }))
        .all(|d| d.range().start >= second));
}

#[test]
fn combo_inside_inline_code_is_dropped() {
    let source = "Use `⌘+S` or ⌘+O";
    let code_start = source.find('`').unwrap();
    let code_end = source.rfind('`').unwrap() + 1;
    let tree = SyntaxTree::new(source).with_node(
        SyntaxNode::new("paragraph", 0, source.len())
            .with_child(SyntaxNode::new("inline-code", code_start, code_end)),
    );

    let set = scan(&tree, &config(), AT_REST).unwrap();
    let marked: Vec<_> = set.iter().map(|d| &source[d.range().clone()]).collect();
    assert_eq!(marked, vec!["⌘", "O"]);
    assert!(set.iter().all(|d| d.range().start >= code_end));
}

#[test]
fn exclusion_wins_over_a_plain_region_at_the_same_offset() {
    let source = "ctrl+z";
    // Two overlapping views of the same text: one plain, one code.
    let tree = SyntaxTree::new(source)
        .with_node(SyntaxNode::new("emphasis", 0, source.len()))
        .with_node(SyntaxNode::new("hmd-codeblock", 0, source.len()));

    assert!(scan(&tree, &config(), AT_REST).unwrap().is_empty());
}

#[test]
fn excluded_region_in_a_later_sibling_still_applies() {
    let source = "see ⌘K";
    let start = source.find('⌘').unwrap();
    let tree = SyntaxTree::new(source)
        .with_node(SyntaxNode::new("comment", start, source.len()));
    assert!(scan(&tree, &config(), AT_REST).unwrap().is_empty());
}

#[test]
fn formatting_markers_are_skipped_not_excluded() {
    let source = "# ⌘ + K";
    let tree = SyntaxTree::new(source).with_node(
        SyntaxNode::new("header_header-1", 0, source.len())
            .with_child(SyntaxNode::new("formatting-header", 0, 2)),
    );

    let set = scan(&tree, &config(), AT_REST).unwrap();
    let marked: Vec<_> = set.iter().map(|d| &source[d.range().clone()]).collect();
    assert_eq!(marked, vec!["⌘", "K"]);
}

#[test]
fn combo_found_by_nested_and_root_regions_is_decorated_once() {
    let source = "Hit ⌘+S now";
    let tree = SyntaxTree::new(source).with_node(
        SyntaxNode::new("paragraph", 0, source.len())
            .with_child(SyntaxNode::new("strong", 4, 9)),
    );

    let set = scan(&tree, &config(), AT_REST).unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn longer_combo_wins_at_a_shared_start() {
    let source = "⌘ + K";
    // A narrower region only sees the initial key.
    let tree = SyntaxTree::new(source).with_node(SyntaxNode::new("em", 0, "⌘".len()));

    let set = scan(&tree, &config(), AT_REST).unwrap();
    let marked: Vec<_> = set.iter().map(|d| &source[d.range().clone()]).collect();
    assert_eq!(marked, vec!["⌘", "K"]);
}

#[test]
fn source_view_is_left_alone() {
    let tree = SyntaxTree::new("⌘S").with_view_mode(ViewMode::Source);
    assert!(scan(&tree, &config(), AT_REST).unwrap().is_empty());
}

#[test]
fn decorations_are_sorted_by_start() {
    let source = "«A» + «B» then ctrl+x";
    let set = scan(&SyntaxTree::new(source), &config(), AT_REST).unwrap();
    let starts: Vec<_> = set.iter().map(|d| d.range().start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}
