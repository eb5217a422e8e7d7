// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use linkshop::model::{
    AbstractionDocument, CommandEntry, Link, Linkograph, LinkographNode, OntologyDocument,
    Pattern,
};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("linkshop_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
}

impl Case {
    /// Node count of the linkograph and class count of the documents.
    pub fn size(self) -> usize {
        match self {
            Self::Small => 24,
            Self::Medium => 160,
        }
    }
}

const VERBS: [&str; 6] = ["cd", "ls", "vim", "make", "git", "cargo"];

/// `size` classes, each with three entries; every other entry carries an arguments pattern.
pub fn abstraction(case: Case) -> AbstractionDocument {
    let mut doc = AbstractionDocument::new();
    for class in 0..case.size() {
        let entries = (0..3)
            .map(|idx| {
                let verb = VERBS[(class + idx) % VERBS.len()];
                let entry = CommandEntry::new(Pattern::new(verb, "exact"));
                if idx % 2 == 0 {
                    entry.with_arguments(Pattern::new(format!("{class}.*"), "regEx"))
                } else {
                    entry
                }
            })
            .collect();
        doc.insert_class(format!("Class{class}"), entries);
    }
    doc
}

/// A ring of `size` nodes plus a chord every third node and a self-loop every fifth.
pub fn ontology(case: Case) -> OntologyDocument {
    let n = case.size();
    let mut doc = OntologyDocument::new();
    for idx in 0..n {
        doc.insert_node(format!("Class{idx}"));
    }
    for idx in 0..n {
        let source = format!("Class{idx}");
        doc.push_edge(source.clone(), format!("Class{}", (idx + 1) % n));
        if idx % 3 == 0 {
            doc.push_edge(source.clone(), format!("Class{}", (idx + n / 2) % n));
        }
        if idx % 5 == 0 {
            doc.push_edge(source.clone(), source);
        }
    }
    doc
}

/// `size` nodes; node `i` links forward to `i + 1`, `i + 3` and `i + 7` when in range.
pub fn linkograph(case: Case) -> Linkograph {
    let n = case.size();
    let nodes = (0..n)
        .map(|idx| {
            LinkographNode::new(vec![format!("Class{}", idx % 12)])
                .with_command(format!("{} file{idx}", VERBS[idx % VERBS.len()]))
        })
        .collect();
    let links = (0..n)
        .flat_map(|idx| [1, 3, 7].into_iter().map(move |step| (idx, idx + step)))
        .filter(|&(_, target)| target < n)
        .map(|(source, target)| Link::new(source, target).expect("forward link"));
    Linkograph::from_parts(nodes, links).expect("linkograph")
}

/// A commands file with `size` lines, in the stored `{ts, cmd}` form.
pub fn commands_json(case: Case) -> String {
    let records: Vec<serde_json::Value> = (0..case.size())
        .map(|idx| {
            serde_json::json!({
                "ts": format!("10:{:02}", idx % 60),
                "cmd": format!("{} {idx}-file", VERBS[idx % VERBS.len()]),
            })
        })
        .collect();
    serde_json::to_string_pretty(&records).expect("commands json")
}

pub fn checksum_linkograph(linkograph: &Linkograph) -> u64 {
    let mut acc = 0u64;
    for node in linkograph.nodes() {
        acc = acc.wrapping_mul(131).wrapping_add(node.labels.len() as u64);
    }
    for link in linkograph.links() {
        acc = acc.wrapping_mul(131).wrapping_add(link.source() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(link.target() as u64);
    }
    acc
}
