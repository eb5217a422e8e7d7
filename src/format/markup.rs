// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use regex::{Regex, RegexBuilder};

use crate::layout::{layout_linkograph, LinkographStyle, Segment};
use crate::model::{Link, Linkograph, LinkographError, LinkographNode};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const LABEL_DELIMITER: &str = ", ";

/// Which parts of a node label are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupOptions {
    pub numbers: bool,
    pub labels: bool,
    pub commands: bool,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            numbers: true,
            labels: true,
            commands: true,
        }
    }
}

/// Renders a linkograph as SVG markup.
///
/// Element ids are `node{i}` for nodes, `{i}link{j}` for link dots and `{i}flink{j}` /
/// `{i}blink{j}` for the two half-edges of a link.
pub fn render_markup(
    linkograph: &Linkograph,
    style: &LinkographStyle,
    options: MarkupOptions,
) -> String {
    let layout = layout_linkograph(linkograph, style);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"{SVG_NAMESPACE}\" width=\"{}\" height=\"{}\">",
        layout.width(),
        layout.height()
    );

    let mut links_by_source: BTreeMap<usize, Vec<_>> = BTreeMap::new();
    for link in layout.links() {
        links_by_source.entry(link.source()).or_default().push(link);
    }

    for (node, placement) in linkograph.nodes().iter().zip(layout.nodes()) {
        let index = placement.index();
        let center = placement.center();
        write_circle(&mut out, style, center.x, center.y, &format!("node{index}"));
        for link in links_by_source.get(&index).into_iter().flatten() {
            let target = link.target();
            let dot = link.dot();
            write_circle(&mut out, style, dot.x, dot.y, &format!("{index}link{target}"));
            write_line(&mut out, style, link.forward(), &format!("{index}flink{target}"));
            write_line(&mut out, style, link.backward(), &format!("{index}blink{target}"));
        }
        if let Some(text) = label_text(index, node, options) {
            let anchor = placement.label_anchor();
            let _ = writeln!(
                out,
                "<text x=\"{}\" y=\"{}\" fill=\"black\">{}</text>",
                anchor.x,
                anchor.y,
                escape(&text)
            );
        }
    }

    out.push_str("</svg>\n");
    out
}

fn write_circle(out: &mut String, style: &LinkographStyle, x: f64, y: f64, id: &str) {
    let _ = writeln!(
        out,
        "<circle stroke=\"Black\" stroke-width=\"{}\" fill=\"black\"\n        cx=\"{x}\" cy=\"{y}\" r=\"{}\" id=\"{id}\" />",
        style.circle_width, style.dot_radius
    );
}

fn write_line(out: &mut String, style: &LinkographStyle, segment: Segment, id: &str) {
    let _ = writeln!(
        out,
        "<line stroke=\"black\" stroke-width=\"{}\"\n      x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" id=\"{id}\" />",
        style.line_width, segment.from.x, segment.from.y, segment.to.x, segment.to.y
    );
}

fn label_text(index: usize, node: &LinkographNode, options: MarkupOptions) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    if options.labels {
        parts.extend(node.labels.iter().map(String::as_str));
    }
    if options.commands {
        if let Some(command) = node.command.as_deref() {
            parts.push(command);
        }
    }
    if !options.numbers && parts.is_empty() {
        return None;
    }
    let mut text = String::new();
    if options.numbers {
        let _ = write!(text, "{index}: ");
    }
    text.push_str(&parts.join(LABEL_DELIMITER));
    Some(text)
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[derive(Debug)]
pub enum MarkupParseError {
    Regex(regex::Error),
    NoNodes,
    MissingNode { index: usize },
    MissingLabel { index: usize },
    Linkograph(LinkographError),
}

impl fmt::Display for MarkupParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex(err) => write!(f, "markup pattern error: {err}"),
            Self::NoNodes => f.write_str("markup contains no linkograph nodes"),
            Self::MissingNode { index } => write!(f, "markup is missing node{index}"),
            Self::MissingLabel { index } => write!(f, "markup is missing the label of node {index}"),
            Self::Linkograph(err) => write!(f, "markup describes an invalid linkograph: {err}"),
        }
    }
}

impl std::error::Error for MarkupParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Regex(err) => Some(err),
            Self::Linkograph(err) => Some(err),
            _ => None,
        }
    }
}

impl From<regex::Error> for MarkupParseError {
    fn from(err: regex::Error) -> Self {
        Self::Regex(err)
    }
}

impl From<LinkographError> for MarkupParseError {
    fn from(err: LinkographError) -> Self {
        Self::Linkograph(err)
    }
}

/// Reads linkographs back out of markup written by [`render_markup`] (or older tools using
/// the same element ids).
///
/// Links are taken from the `{i}flink{j}` segments. Labels come from `<text>` elements of the
/// form `i: label, label, command`; whether the last item is a command is up to the caller.
#[derive(Debug, Clone)]
pub struct MarkupReader {
    node: Regex,
    forelink: Regex,
    text: Regex,
}

impl MarkupReader {
    pub fn new() -> Result<Self, MarkupParseError> {
        Ok(Self {
            node: Regex::new(r#"<circle\b[^>]*\bid="node([0-9]+)""#)?,
            forelink: Regex::new(r#"<line\b[^>]*\bid="([0-9]+)flink([0-9]+)""#)?,
            text: RegexBuilder::new(r"<text\b[^>]*>([0-9]+): ?(.*?)</text>")
                .dot_matches_new_line(true)
                .build()?,
        })
    }

    /// Quick check used for file-type detection.
    pub fn looks_like_linkograph(&self, markup: &str) -> bool {
        markup.trim_start().starts_with("<svg") && self.node.is_match(markup)
    }

    pub fn read(&self, markup: &str, with_commands: bool) -> Result<Linkograph, MarkupParseError> {
        let mut node_count = 0;
        for caps in self.node.captures_iter(markup) {
            if let Ok(index) = caps[1].parse::<usize>() {
                node_count = node_count.max(index + 1);
            }
        }
        if node_count == 0 {
            return Err(MarkupParseError::NoNodes);
        }
        for index in 0..node_count {
            let id = format!("id=\"node{index}\"");
            if !markup.contains(&id) {
                return Err(MarkupParseError::MissingNode { index });
            }
        }

        let mut texts: BTreeMap<usize, String> = BTreeMap::new();
        for caps in self.text.captures_iter(markup) {
            if let Ok(index) = caps[1].parse::<usize>() {
                texts.insert(index, unescape(&caps[2]));
            }
        }

        let mut nodes = Vec::with_capacity(node_count);
        for index in 0..node_count {
            let text = texts
                .remove(&index)
                .ok_or(MarkupParseError::MissingLabel { index })?;
            nodes.push(split_label(&text, with_commands));
        }

        let mut links = Vec::new();
        for caps in self.forelink.captures_iter(markup) {
            let (Ok(source), Ok(target)) = (caps[1].parse::<usize>(), caps[2].parse::<usize>())
            else {
                continue;
            };
            links.push(Link::new(source, target)?);
        }

        Ok(Linkograph::from_parts(nodes, links)?)
    }
}

fn split_label(text: &str, with_commands: bool) -> LinkographNode {
    let mut parts: Vec<String> = if text.is_empty() {
        Vec::new()
    } else {
        text.split(LABEL_DELIMITER).map(str::to_owned).collect()
    };
    let command = if with_commands { parts.pop() } else { None };
    LinkographNode {
        labels: parts,
        command,
    }
}
