// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use crate::input::Modifiers;
use crate::model::{Linkograph, LinkographError};

use super::SubRange;

/// Two-click range selection on a linkograph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangeSelection {
    #[default]
    Empty,
    /// One node chosen, waiting for the other end.
    Anchor(usize),
    Range(SubRange),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Cleared,
    Anchored(usize),
    Selected(SubRange),
}

impl RangeSelection {
    /// A click on node `index`, or on anything else when `None`.
    ///
    /// Clicking the anchor again drops it. Once a range is complete the next node click
    /// starts over from a new anchor.
    pub fn click(&mut self, index: Option<usize>) -> SelectionChange {
        self.click_with(index, Modifiers::NONE)
    }

    /// Like [`RangeSelection::click`], but shift on the anchor selects that single node.
    pub fn click_with(&mut self, index: Option<usize>, modifiers: Modifiers) -> SelectionChange {
        let Some(index) = index else {
            *self = Self::Empty;
            return SelectionChange::Cleared;
        };
        match *self {
            Self::Anchor(anchor) if anchor == index && modifiers.shift => {
                let range = SubRange {
                    low: index,
                    high: index,
                };
                *self = Self::Range(range);
                SelectionChange::Selected(range)
            }
            Self::Anchor(anchor) if anchor == index => {
                *self = Self::Empty;
                SelectionChange::Cleared
            }
            Self::Anchor(anchor) => {
                let range = SubRange {
                    low: anchor.min(index),
                    high: anchor.max(index),
                };
                *self = Self::Range(range);
                SelectionChange::Selected(range)
            }
            Self::Empty | Self::Range(_) => {
                *self = Self::Anchor(index);
                SelectionChange::Anchored(index)
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::Empty;
    }

    pub fn range(&self) -> Option<SubRange> {
        match self {
            Self::Range(range) => Some(*range),
            _ => None,
        }
    }

    /// Adds or removes the link between the ends of the selected range. Returns whether the
    /// link exists afterwards, or `None` without a complete selection.
    pub fn toggle_link(&self, linkograph: &mut Linkograph) -> Option<Result<bool, LinkographError>> {
        self.range()
            .map(|range| linkograph.toggle_link(range.low(), range.high()))
    }
}
