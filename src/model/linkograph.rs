// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single design move: the abstraction labels it was classified under plus the command
/// text it came from (when known).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkographNode {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl LinkographNode {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            command: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Label text shown for the node and used as the key of the forward-adjacency form.
    pub fn class_text(&self) -> String {
        self.labels.join(", ")
    }
}

/// A forward link from an earlier node to a strictly later node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[usize; 2]", try_from = "[usize; 2]")]
pub struct Link {
    source: usize,
    target: usize,
}

impl Link {
    pub fn new(source: usize, target: usize) -> Result<Self, LinkographError> {
        if source >= target {
            return Err(LinkographError::NotForward { source, target });
        }
        Ok(Self { source, target })
    }

    pub fn source(self) -> usize {
        self.source
    }

    pub fn target(self) -> usize {
        self.target
    }

    pub fn span(self) -> usize {
        self.target - self.source
    }
}

impl From<Link> for [usize; 2] {
    fn from(link: Link) -> Self {
        [link.source, link.target]
    }
}

impl TryFrom<[usize; 2]> for Link {
    type Error = LinkographError;

    fn try_from([source, target]: [usize; 2]) -> Result<Self, Self::Error> {
        Self::new(source, target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkographError {
    NotForward { source: usize, target: usize },
    OutOfRange { index: usize, len: usize },
    Legacy { reason: &'static str },
}

impl fmt::Display for LinkographError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotForward { source, target } => {
                write!(f, "link must point forward (source={source}, target={target})")
            }
            Self::OutOfRange { index, len } => {
                write!(f, "node index out of range (index={index}, len={len})")
            }
            Self::Legacy { reason } => write!(f, "malformed linkograph array: {reason}"),
        }
    }
}

impl std::error::Error for LinkographError {}

#[derive(Deserialize)]
struct LinkographRepr {
    nodes: Vec<LinkographNode>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Serialize)]
struct LinkographReprRef<'a> {
    nodes: &'a [LinkographNode],
    links: Vec<Link>,
}

/// Ordered nodes plus a set of forward links between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LinkographRepr")]
pub struct Linkograph {
    nodes: Vec<LinkographNode>,
    links: BTreeSet<Link>,
}

impl TryFrom<LinkographRepr> for Linkograph {
    type Error = LinkographError;

    fn try_from(repr: LinkographRepr) -> Result<Self, Self::Error> {
        Self::from_parts(repr.nodes, repr.links)
    }
}

impl Serialize for Linkograph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        LinkographReprRef {
            nodes: &self.nodes,
            links: self.links.iter().copied().collect(),
        }
        .serialize(serializer)
    }
}

impl Linkograph {
    pub fn new(nodes: Vec<LinkographNode>) -> Self {
        Self {
            nodes,
            links: BTreeSet::new(),
        }
    }

    pub fn from_parts(
        nodes: Vec<LinkographNode>,
        links: impl IntoIterator<Item = Link>,
    ) -> Result<Self, LinkographError> {
        let mut linkograph = Self::new(nodes);
        for link in links {
            linkograph.check_index(link.target)?;
            linkograph.links.insert(link);
        }
        Ok(linkograph)
    }

    pub fn nodes(&self) -> &[LinkographNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&LinkographNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut LinkographNode> {
        self.nodes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.links.iter().copied()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn has_link(&self, source: usize, target: usize) -> bool {
        Link::new(source, target).is_ok_and(|link| self.links.contains(&link))
    }

    /// Links leaving `index`, in target order.
    pub fn forelinks(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.links
            .range(Link { source: index, target: 0 }..)
            .take_while(move |link| link.source == index)
            .map(|link| link.target)
    }

    /// Links arriving at `index`, in source order.
    pub fn backlinks(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.links
            .iter()
            .filter(move |link| link.target == index)
            .map(|link| link.source)
    }

    pub fn max_span(&self) -> usize {
        self.links.iter().map(|link| link.span()).max().unwrap_or(0)
    }

    /// Adds the link; returns `false` if it was already present.
    pub fn add_link(&mut self, source: usize, target: usize) -> Result<bool, LinkographError> {
        let link = Link::new(source, target)?;
        self.check_index(target)?;
        Ok(self.links.insert(link))
    }

    pub fn remove_link(&mut self, source: usize, target: usize) -> bool {
        match Link::new(source, target) {
            Ok(link) => self.links.remove(&link),
            Err(_) => false,
        }
    }

    /// Adds the link if absent, removes it if present. Returns whether the link exists
    /// afterwards.
    pub fn toggle_link(&mut self, source: usize, target: usize) -> Result<bool, LinkographError> {
        let link = Link::new(source, target)?;
        self.check_index(target)?;
        if self.links.remove(&link) {
            Ok(false)
        } else {
            self.links.insert(link);
            Ok(true)
        }
    }

    /// Attaches command text to nodes in order; extra commands are ignored.
    pub fn attach_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (node, command) in self.nodes.iter_mut().zip(commands) {
            node.command = Some(command.into());
        }
    }

    /// Sorted union of every label used by a node.
    pub fn label_set(&self) -> Vec<String> {
        let labels: BTreeSet<&str> = self
            .nodes
            .iter()
            .flat_map(|node| node.labels.iter().map(String::as_str))
            .collect();
        labels.into_iter().map(str::to_owned).collect()
    }

    /// The stripped `[{class: [forward targets]}, ...]` form.
    pub fn forward_adjacency(&self) -> Vec<BTreeMap<String, Vec<usize>>> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let mut entry = BTreeMap::new();
                entry.insert(node.class_text(), self.forelinks(idx).collect());
                entry
            })
            .collect()
    }

    /// Writes the backend array form: `[labels, [labels, backlinks, forelinks], ...]`.
    pub fn to_legacy_value(&self) -> Value {
        let mut out = Vec::with_capacity(self.nodes.len() + 1);
        out.push(string_array(self.label_set().iter().map(String::as_str)));
        for (idx, node) in self.nodes.iter().enumerate() {
            out.push(Value::Array(vec![
                string_array(node.labels.iter().map(String::as_str)),
                index_array(self.backlinks(idx)),
                index_array(self.forelinks(idx)),
            ]));
        }
        Value::Array(out)
    }

    /// Reads the backend array form. A trailing per-node identifier is tolerated and ignored.
    pub fn from_legacy_value(value: &Value) -> Result<Self, LinkographError> {
        let Some(items) = value.as_array() else {
            return Err(LinkographError::Legacy { reason: "expected an array" });
        };
        let Some((header, rows)) = items.split_first() else {
            return Err(LinkographError::Legacy { reason: "missing label header" });
        };
        if !header.as_array().is_some_and(|labels| labels.iter().all(Value::is_string)) {
            return Err(LinkographError::Legacy { reason: "label header must be strings" });
        }

        let mut nodes = Vec::with_capacity(rows.len());
        let mut links = Vec::new();
        for (idx, row) in rows.iter().enumerate() {
            let Some(row) = row.as_array().filter(|row| row.len() >= 3) else {
                return Err(LinkographError::Legacy { reason: "node rows need three entries" });
            };
            let labels = row[0]
                .as_array()
                .ok_or(LinkographError::Legacy { reason: "node labels must be an array" })?
                .iter()
                .map(|label| {
                    label
                        .as_str()
                        .map(str::to_owned)
                        .ok_or(LinkographError::Legacy { reason: "node labels must be strings" })
                })
                .collect::<Result<Vec<_>, _>>()?;
            nodes.push(LinkographNode::new(labels));

            for back in read_indices(&row[1])? {
                links.push(Link::new(back, idx)?);
            }
            for fore in read_indices(&row[2])? {
                links.push(Link::new(idx, fore)?);
            }
        }

        Self::from_parts(nodes, links)
    }

    /// Copies nodes `low..=high` and the links fully inside that range, renumbered from zero.
    pub fn sub_range(&self, low: usize, high: usize) -> Result<Self, LinkographError> {
        if low > high {
            return Err(LinkographError::NotForward { source: low, target: high });
        }
        self.check_index(high)?;
        let nodes = self.nodes[low..=high].to_vec();
        let links = self
            .links
            .range(Link { source: low, target: 0 }..)
            .filter(|link| link.source <= high && link.target <= high)
            .map(|link| Link {
                source: link.source - low,
                target: link.target - low,
            })
            .collect();
        Ok(Self { nodes, links })
    }

    fn check_index(&self, index: usize) -> Result<(), LinkographError> {
        if index >= self.nodes.len() {
            return Err(LinkographError::OutOfRange {
                index,
                len: self.nodes.len(),
            });
        }
        Ok(())
    }
}

fn string_array<'a>(items: impl Iterator<Item = &'a str>) -> Value {
    Value::Array(items.map(|s| Value::String(s.to_owned())).collect())
}

fn index_array(items: impl Iterator<Item = usize>) -> Value {
    Value::Array(items.map(|idx| Value::from(idx as u64)).collect())
}

fn read_indices(value: &Value) -> Result<Vec<usize>, LinkographError> {
    let Some(items) = value.as_array() else {
        return Err(LinkographError::Legacy { reason: "link lists must be arrays" });
    };
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or(LinkographError::Legacy { reason: "link indices must be integers" })
        })
        .collect()
}

/// Convenience for building a JSON object with a single key; used by the forward-adjacency
/// consumers that speak raw JSON.
pub fn forward_adjacency_value(linkograph: &Linkograph) -> Value {
    Value::Array(
        linkograph
            .forward_adjacency()
            .into_iter()
            .map(|entry| {
                let map: Map<String, Value> = entry
                    .into_iter()
                    .map(|(class, targets)| (class, index_array(targets.into_iter())))
                    .collect();
                Value::Object(map)
            })
            .collect(),
    )
}
