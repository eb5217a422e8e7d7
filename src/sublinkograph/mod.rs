// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Contiguous sub-ranges of a linkograph.
//!
//! An extraction never mutates its source. It keeps the links lying entirely inside the range
//! in their original numbering (for highlighting), a copy renumbered from zero (for analysis)
//! and a layout window whose first row is the low node (for display).

use std::fmt;

use crate::layout::{layout_linkograph, LinkographLayout, LinkographStyle};
use crate::model::{Link, Linkograph, LinkographError};

pub mod board;
pub mod selection;

pub use board::{
    BoardError, SubLinkograph, SubLinkographBoard, COLUMN_WIDTHS, MAX_SUBLINKOGRAPHS,
};
pub use selection::{RangeSelection, SelectionChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubRange {
    low: usize,
    high: usize,
}

impl SubRange {
    pub fn new(low: usize, high: usize) -> Result<Self, ExtractError> {
        if low > high {
            return Err(ExtractError::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(self) -> usize {
        self.low
    }

    pub fn high(self) -> usize {
        self.high
    }

    pub fn len(self) -> usize {
        self.high - self.low + 1
    }

    pub fn contains(self, index: usize) -> bool {
        (self.low..=self.high).contains(&index)
    }

    pub fn contains_link(self, link: Link) -> bool {
        self.low <= link.source() && link.target() <= self.high
    }
}

impl fmt::Display for SubRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    InvalidRange { low: usize, high: usize },
    OutOfRange { index: usize, len: usize },
    Linkograph(LinkographError),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { low, high } => {
                write!(f, "invalid range: start {low} is after stop {high}")
            }
            Self::OutOfRange { index, len } => {
                write!(f, "range end {index} is outside the linkograph (len={len})")
            }
            Self::Linkograph(err) => write!(f, "sub-range extraction failed: {err}"),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Linkograph(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LinkographError> for ExtractError {
    fn from(err: LinkographError) -> Self {
        Self::Linkograph(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    range: SubRange,
    retained: Vec<Link>,
    linkograph: Linkograph,
    layout: LinkographLayout,
}

impl Extraction {
    pub fn range(&self) -> SubRange {
        self.range
    }

    /// Links with `low <= source < target <= high`, numbered as in the source linkograph.
    pub fn retained(&self) -> &[Link] {
        &self.retained
    }

    /// The range as an independent linkograph, indices renumbered from zero.
    pub fn linkograph(&self) -> &Linkograph {
        &self.linkograph
    }

    /// Display geometry; node `low` sits on the first row.
    pub fn layout(&self) -> &LinkographLayout {
        &self.layout
    }
}

/// Extracts `[low, high]` (inclusive, 0-based) from `source`.
pub fn extract_range(
    source: &Linkograph,
    low: usize,
    high: usize,
    style: &LinkographStyle,
) -> Result<Extraction, ExtractError> {
    let range = SubRange::new(low, high)?;
    if high >= source.len() {
        return Err(ExtractError::OutOfRange {
            index: high,
            len: source.len(),
        });
    }

    let retained = source
        .links()
        .filter(|&link| range.contains_link(link))
        .collect();
    let linkograph = source.sub_range(low, high)?;
    let layout = layout_linkograph(source, style).window(low, high, style);

    Ok(Extraction {
        range,
        retained,
        linkograph,
        layout,
    })
}

#[cfg(test)]
mod tests;
