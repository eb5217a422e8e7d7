// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use crate::model::{Linkograph, LinkographNode};

use super::ontology::Point;

/// Drawing parameters for a linkograph, in surface units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkographStyle {
    pub step: f64,
    pub dot_radius: f64,
    pub circle_width: f64,
    pub line_width: f64,
    pub left_offset: f64,
    pub label_dist: f64,
    pub label_base: f64,
    pub top: f64,
    pub char_width: f64,
}

impl Default for LinkographStyle {
    fn default() -> Self {
        Self {
            step: 10.0,
            dot_radius: 3.0,
            circle_width: 3.0,
            line_width: 2.0,
            left_offset: 2.0,
            label_dist: 10.0,
            label_base: 5.0,
            top: 10.0,
            char_width: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodePlacement {
    index: usize,
    center: Point,
    label_anchor: Point,
    label_width: f64,
}

impl NodePlacement {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn label_anchor(&self) -> Point {
        self.label_anchor
    }

    /// Estimated width of the `{i}: labels, command` text.
    pub fn label_width(&self) -> f64 {
        self.label_width
    }
}

/// A link is drawn as a dot below-left of both endpoints plus two half-edges meeting there.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPlacement {
    source: usize,
    target: usize,
    dot: Point,
    forward: Segment,
    backward: Segment,
}

impl LinkPlacement {
    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn dot(&self) -> Point {
        self.dot
    }

    pub fn forward(&self) -> Segment {
        self.forward
    }

    pub fn backward(&self) -> Segment {
        self.backward
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkographLayout {
    width: f64,
    height: f64,
    nodes: Vec<NodePlacement>,
    links: Vec<LinkPlacement>,
}

impl LinkographLayout {
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn nodes(&self) -> &[NodePlacement] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkPlacement] {
        &self.links
    }

    /// Keeps nodes `low..=high` and the links fully inside that range, moved so node `low`
    /// occupies the first row and the widest kept link reaches the left margin. Indices keep
    /// their original numbering.
    pub fn window(&self, low: usize, high: usize, style: &LinkographStyle) -> Self {
        let margin = style.left_offset * style.step;
        let kept_links: Vec<&LinkPlacement> = self
            .links
            .iter()
            .filter(|link| low <= link.source && link.target <= high)
            .collect();
        let low_center = self
            .nodes
            .iter()
            .find(|node| node.index == low)
            .map(|node| node.center);

        let shift_y = low_center.map_or(0.0, |center| center.y - style.top);
        // Widest link first; without links the low node itself goes to the margin.
        let widest = kept_links
            .iter()
            .fold(None::<&LinkPlacement>, |best, link| match best {
                Some(best) if best.target - best.source >= link.target - link.source => {
                    Some(best)
                }
                _ => Some(link),
            });
        let shift_x = match (widest, low_center) {
            (Some(link), _) => link.dot.x - margin,
            (None, Some(center)) => center.x - margin,
            (None, None) => 0.0,
        };
        let shift = |p: Point| Point::new(p.x - shift_x, p.y - shift_y);

        let nodes: Vec<_> = self
            .nodes
            .iter()
            .filter(|node| (low..=high).contains(&node.index))
            .map(|node| NodePlacement {
                index: node.index,
                center: shift(node.center),
                label_anchor: shift(node.label_anchor),
                label_width: node.label_width,
            })
            .collect();
        let links = kept_links
            .into_iter()
            .map(|link| LinkPlacement {
                source: link.source,
                target: link.target,
                dot: shift(link.dot),
                forward: Segment {
                    from: shift(link.forward.from),
                    to: shift(link.forward.to),
                },
                backward: Segment {
                    from: shift(link.backward.from),
                    to: shift(link.backward.to),
                },
            })
            .collect();

        let width = nodes
            .iter()
            .map(|node| node.label_anchor.x + node.label_width)
            .fold(0.0, f64::max)
            + style.label_dist;

        Self {
            width,
            height: 2.0 * nodes.len() as f64 * style.step,
            nodes,
            links,
        }
    }
}

/// Deterministic placement of every node and link.
///
/// Nodes sit on one vertical line, two steps apart; the line is pushed right far enough that
/// the widest link still fits to its left.
pub fn layout_linkograph(linkograph: &Linkograph, style: &LinkographStyle) -> LinkographLayout {
    let step = style.step;
    let link_width = linkograph.max_span() as f64;
    let x_start = (link_width + style.left_offset) * step;

    let nodes = linkograph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let y = row_y(index, style);
            NodePlacement {
                index,
                center: Point::new(x_start, y),
                label_anchor: Point::new(x_start + style.label_dist, y + style.label_base),
                label_width: label_chars(index, node) as f64 * style.char_width,
            }
        })
        .collect();

    let links = linkograph
        .links()
        .map(|link| {
            let y = row_y(link.source(), style);
            let d = link.span() as f64 * step;
            let dot = Point::new(x_start - d, y + d);
            LinkPlacement {
                source: link.source(),
                target: link.target(),
                dot,
                forward: Segment {
                    from: Point::new(x_start, y),
                    to: dot,
                },
                backward: Segment {
                    from: dot,
                    to: Point::new(x_start, y + 2.0 * d),
                },
            }
        })
        .collect();

    let label_chars = 2
        + linkograph
            .nodes()
            .iter()
            .map(|node| node.labels.join(" ").len())
            .max()
            .unwrap_or(0)
        + linkograph.len().to_string().len()
        + linkograph
            .nodes()
            .iter()
            .filter_map(|node| node.command.as_ref().map(String::len))
            .max()
            .unwrap_or(0);
    let total = link_width * step
        + label_chars as f64 * style.char_width
        + style.label_dist * 2.0
        + style.label_base;

    LinkographLayout {
        width: total + style.left_offset * step,
        height: 2.0 * linkograph.len() as f64 * step,
        nodes,
        links,
    }
}

fn label_chars(index: usize, node: &LinkographNode) -> usize {
    let labels: usize = node.labels.iter().map(String::len).sum::<usize>()
        + 2 * node.labels.len().saturating_sub(1);
    let command = node.command.as_ref().map_or(0, |command| command.len() + 2);
    index.to_string().len() + 2 + labels + command
}

fn row_y(index: usize, style: &LinkographStyle) -> f64 {
    style.top + 2.0 * style.step * index as f64
}
