// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use super::abstraction::{AbstractionDocument, CommandEntry, Pattern};
use super::linkograph::{Link, Linkograph, LinkographNode};
use super::ontology::OntologyDocument;

fn entry(expression: &str, pattern_type: &str) -> CommandEntry {
    CommandEntry::new(Pattern::new(expression, pattern_type))
}

/// Three classes; `Navigate` has several entries so deletes exercise renumbering.
pub(crate) fn abstraction_shell() -> AbstractionDocument {
    let mut doc = AbstractionDocument::new();
    doc.insert_class(
        "Navigate",
        vec![
            entry("cd", "exact"),
            entry("ls", "exact"),
            entry("pushd", "exact"),
            entry("popd", "exact"),
        ],
    );
    doc.insert_class(
        "Edit",
        vec![entry("vi", "substring").with_arguments(Pattern::new(".*\\.rs", "regEx"))],
    );
    doc.insert_class("Build", vec![entry("make", "exact")]);
    doc
}

pub(crate) fn ontology_shell() -> OntologyDocument {
    let mut doc = OntologyDocument::new();
    doc.insert_node("Build");
    doc.insert_node("Edit");
    doc.insert_node("Navigate");
    doc.push_edge("Navigate", "Edit");
    doc.push_edge("Edit", "Build");
    doc.push_edge("Edit", "Edit");
    doc.push_edge("Build", "Navigate");
    doc
}

/// `len` nodes labelled `L0..`, with the given forward links.
pub(crate) fn linkograph(len: usize, links: &[(usize, usize)]) -> Linkograph {
    let nodes = (0..len)
        .map(|idx| LinkographNode::new(vec![format!("L{idx}")]))
        .collect();
    let links = links.iter().map(|&(s, t)| Link::new(s, t).expect("link"));
    Linkograph::from_parts(nodes, links).expect("linkograph")
}
