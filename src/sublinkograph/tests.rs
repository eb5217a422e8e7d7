// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use serde_json::json;

use super::{
    extract_range, BoardError, ExtractError, RangeSelection, SelectionChange, SubLinkographBoard,
    SubRange, MAX_SUBLINKOGRAPHS,
};
use crate::input::Modifiers;
use crate::layout::LinkographStyle;
use crate::model::fixtures::linkograph;
use crate::model::{Linkograph, LinkographNode};

fn ten_nodes() -> Linkograph {
    linkograph(10, &[(1, 3), (2, 4), (4, 6), (3, 5)])
}

fn range(low: usize, high: usize) -> SubRange {
    SubRange::new(low, high).expect("range")
}

#[test]
fn extraction_keeps_only_links_inside_the_range() {
    let extraction =
        extract_range(&ten_nodes(), 2, 5, &LinkographStyle::default()).expect("extract");
    let retained: Vec<_> = extraction
        .retained()
        .iter()
        .map(|link| (link.source(), link.target()))
        .collect();
    assert_eq!(retained, vec![(2, 4), (3, 5)]);

    let renumbered: Vec<_> = extraction
        .linkograph()
        .links()
        .map(|link| (link.source(), link.target()))
        .collect();
    assert_eq!(renumbered, vec![(0, 2), (1, 3)]);
    assert_eq!(extraction.linkograph().len(), 4);
}

#[test]
fn extraction_leaves_the_source_untouched() {
    let source = ten_nodes();
    let before = source.clone();
    extract_range(&source, 2, 5, &LinkographStyle::default()).expect("extract");
    assert_eq!(source, before);
}

#[test]
fn extraction_matches_an_independent_linkograph_of_the_same_range() {
    let source = ten_nodes();
    let extraction = extract_range(&source, 2, 5, &LinkographStyle::default()).expect("extract");

    let mut independent = Linkograph::new(
        (2..=5)
            .map(|idx| LinkographNode::new(vec![format!("L{idx}")]))
            .collect(),
    );
    independent.add_link(0, 2).expect("link");
    independent.add_link(1, 3).expect("link");

    assert_eq!(
        extraction.linkograph().forward_adjacency(),
        independent.forward_adjacency()
    );
}

#[test]
fn display_window_starts_at_the_low_node() {
    let style = LinkographStyle::default();
    let extraction = extract_range(&ten_nodes(), 2, 5, &style).expect("extract");
    let first = &extraction.layout().nodes()[0];
    assert_eq!(first.index(), 2);
    assert_eq!(first.center().y, style.top);
    assert_eq!(extraction.layout().links().len(), 2);
}

#[test]
fn single_node_range_has_no_links() {
    let extraction =
        extract_range(&ten_nodes(), 4, 4, &LinkographStyle::default()).expect("extract");
    assert!(extraction.retained().is_empty());
    assert_eq!(extraction.linkograph().len(), 1);
}

#[test]
fn reversed_and_out_of_bounds_ranges_are_rejected() {
    let style = LinkographStyle::default();
    assert_eq!(
        extract_range(&ten_nodes(), 5, 2, &style),
        Err(ExtractError::InvalidRange { low: 5, high: 2 })
    );
    assert_eq!(
        extract_range(&ten_nodes(), 2, 10, &style),
        Err(ExtractError::OutOfRange { index: 10, len: 10 })
    );
}

#[test]
fn selection_orders_the_two_clicks() {
    let mut selection = RangeSelection::default();
    assert_eq!(selection.click(Some(5)), SelectionChange::Anchored(5));
    assert_eq!(selection.click(Some(2)), SelectionChange::Selected(range(2, 5)));
    assert_eq!(selection.range(), Some(range(2, 5)));
}

#[test]
fn clicking_the_anchor_again_deselects() {
    let mut selection = RangeSelection::default();
    selection.click(Some(3));
    assert_eq!(selection.click(Some(3)), SelectionChange::Cleared);
    assert_eq!(selection, RangeSelection::Empty);
}

#[test]
fn shift_on_the_anchor_selects_one_node() {
    let mut selection = RangeSelection::default();
    selection.click(Some(3));
    assert_eq!(
        selection.click_with(Some(3), Modifiers::SHIFT),
        SelectionChange::Selected(range(3, 3))
    );
    assert_eq!(selection.range(), Some(range(3, 3)));

    // shift elsewhere behaves like a plain click
    selection.click_with(Some(1), Modifiers::SHIFT);
    assert_eq!(
        selection.click_with(Some(6), Modifiers::SHIFT),
        SelectionChange::Selected(range(1, 6))
    );
}

#[test]
fn click_after_complete_range_starts_over() {
    let mut selection = RangeSelection::default();
    selection.click(Some(1));
    selection.click(Some(4));
    assert_eq!(selection.click(Some(7)), SelectionChange::Anchored(7));
    assert_eq!(selection.range(), None);
}

#[test]
fn clicking_off_a_node_clears() {
    let mut selection = RangeSelection::default();
    selection.click(Some(1));
    selection.click(Some(4));
    assert_eq!(selection.click(None), SelectionChange::Cleared);
    assert_eq!(selection.range(), None);
}

#[test]
fn selected_pair_toggles_its_link() {
    let mut linko = ten_nodes();
    let mut selection = RangeSelection::default();
    assert_eq!(selection.toggle_link(&mut linko), None);

    selection.click(Some(0));
    selection.click(Some(9));
    assert_eq!(selection.toggle_link(&mut linko), Some(Ok(true)));
    assert!(linko.has_link(0, 9));
    assert_eq!(selection.toggle_link(&mut linko), Some(Ok(false)));
    assert_eq!(linko, ten_nodes());
}

#[test]
fn board_export_validates_in_order() {
    let style = LinkographStyle::default();
    let linko = ten_nodes();
    let mut board = SubLinkographBoard::new();

    assert_eq!(
        board.export("", "run.json", &linko, None, &style),
        Err(BoardError::EmptyName)
    );
    assert_eq!(
        board.export("first", "run.json", &linko, None, &style),
        Err(BoardError::NoSelection)
    );
    assert!(board.is_empty());
}

#[test]
fn ninth_export_is_rejected_without_state_change() {
    let style = LinkographStyle::default();
    let linko = ten_nodes();
    let mut board = SubLinkographBoard::new();
    for n in 0..MAX_SUBLINKOGRAPHS {
        let name = board.default_name();
        let slot = board
            .export(&name, "run.json", &linko, Some(range(n, 9)), &style)
            .expect("export");
        assert_eq!(slot, n);
    }
    let before = board.clone();

    assert_eq!(
        board.export("ninth", "run.json", &linko, Some(range(0, 1)), &style),
        Err(BoardError::Full {
            max: MAX_SUBLINKOGRAPHS
        })
    );
    assert_eq!(board, before);
    assert_eq!(board.column_width(), 1);
}

#[test]
fn removal_compacts_slots_and_widths() {
    let style = LinkographStyle::default();
    let linko = ten_nodes();
    let mut board = SubLinkographBoard::new();
    for name in ["a", "b", "c"] {
        board
            .export(name, "run.json", &linko, Some(range(2, 5)), &style)
            .expect("export");
    }
    assert_eq!(board.column_width(), 4);

    let removed = board.remove(0).expect("remove");
    assert_eq!(removed.name(), "a");
    let slots: Vec<_> = board
        .entries()
        .iter()
        .map(|entry| (entry.slot(), entry.name().to_owned()))
        .collect();
    assert_eq!(slots, vec![(0, "b".to_owned()), (1, "c".to_owned())]);
    assert_eq!(board.column_width(), 6);
    assert_eq!(board.default_name(), "sublinkograph2");

    assert_eq!(board.remove(5), Err(BoardError::SlotNotFound { slot: 5 }));
}

#[test]
fn stats_attach_to_matching_ranges_only() {
    let style = LinkographStyle::default();
    let linko = ten_nodes();
    let mut board = SubLinkographBoard::new();
    board
        .export("a", "run.json", &linko, Some(range(2, 5)), &style)
        .expect("export");
    board
        .export("b", "other.json", &linko, Some(range(2, 5)), &style)
        .expect("export");
    board
        .export("c", "run.json", &linko, Some(range(0, 5)), &style)
        .expect("export");

    let stats = json!({"entropy": 0.5});
    assert_eq!(board.attach_stats("run.json", 2, 5, &stats), 1);
    assert_eq!(board.entries()[0].stats(), Some(&stats));
    assert_eq!(board.entries()[1].stats(), None);
    assert_eq!(board.entries()[2].stats(), None);
}
