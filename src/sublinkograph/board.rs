// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::fmt;

use serde_json::Value;

use crate::layout::LinkographStyle;
use crate::model::Linkograph;

use super::{extract_range, ExtractError, Extraction, SubRange};

pub const MAX_SUBLINKOGRAPHS: usize = 8;

/// Grid column width (out of 12) per displayed sub-linkograph, indexed by how many are shown.
pub const COLUMN_WIDTHS: [usize; 13] = [12, 12, 6, 4, 3, 2, 2, 1, 1, 1, 1, 1, 1];

const DEFAULT_NAME_PREFIX: &str = "sublinkograph";

#[derive(Debug, Clone, PartialEq)]
pub struct SubLinkograph {
    slot: usize,
    name: String,
    source: String,
    extraction: Extraction,
    stats: Option<Value>,
}

impl SubLinkograph {
    /// Display slot; always equal to the position on the board.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the linkograph file the range was taken from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn range(&self) -> SubRange {
        self.extraction.range()
    }

    pub fn extraction(&self) -> &Extraction {
        &self.extraction
    }

    pub fn stats(&self) -> Option<&Value> {
        self.stats.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    EmptyName,
    NoSelection,
    Full { max: usize },
    SlotNotFound { slot: usize },
    Extract(ExtractError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => f.write_str("the name of the sublinkograph cannot be empty"),
            Self::NoSelection => f.write_str("no sublinkograph is selected"),
            Self::Full { max } => write!(
                f,
                "the maximum number of sublinkographs has been reached ({max})"
            ),
            Self::SlotNotFound { slot } => write!(f, "no sublinkograph in slot {slot}"),
            Self::Extract(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Extract(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExtractError> for BoardError {
    fn from(err: ExtractError) -> Self {
        Self::Extract(err)
    }
}

/// The sub-linkographs currently on display, in slot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubLinkographBoard {
    entries: Vec<SubLinkograph>,
}

impl SubLinkographBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_SUBLINKOGRAPHS
    }

    pub fn entries(&self) -> &[SubLinkograph] {
        &self.entries
    }

    pub fn get(&self, slot: usize) -> Option<&SubLinkograph> {
        self.entries.get(slot)
    }

    /// Width every displayed sub-linkograph gets at the current count.
    pub fn column_width(&self) -> usize {
        COLUMN_WIDTHS[self.entries.len().min(COLUMN_WIDTHS.len() - 1)]
    }

    /// Name offered for the next export.
    pub fn default_name(&self) -> String {
        format!("{DEFAULT_NAME_PREFIX}{}", self.entries.len())
    }

    /// Extracts `selection` from `linkograph` into the next free slot.
    ///
    /// Checks run in order: name, selection, capacity. On any error the board is unchanged.
    pub fn export(
        &mut self,
        name: &str,
        source: &str,
        linkograph: &Linkograph,
        selection: Option<SubRange>,
        style: &LinkographStyle,
    ) -> Result<usize, BoardError> {
        if name.trim().is_empty() {
            return Err(BoardError::EmptyName);
        }
        let Some(range) = selection else {
            return Err(BoardError::NoSelection);
        };
        if self.is_full() {
            return Err(BoardError::Full {
                max: MAX_SUBLINKOGRAPHS,
            });
        }

        let extraction = extract_range(linkograph, range.low(), range.high(), style)?;
        let slot = self.entries.len();
        self.entries.push(SubLinkograph {
            slot,
            name: name.to_owned(),
            source: source.to_owned(),
            extraction,
            stats: None,
        });
        Ok(slot)
    }

    /// Removes a slot; later slots move down by one.
    pub fn remove(&mut self, slot: usize) -> Result<SubLinkograph, BoardError> {
        if slot >= self.entries.len() {
            return Err(BoardError::SlotNotFound { slot });
        }
        let removed = self.entries.remove(slot);
        for (index, entry) in self.entries.iter_mut().enumerate().skip(slot) {
            entry.slot = index;
        }
        Ok(removed)
    }

    /// Stores `stats` on every sub-linkograph taken from `source` over exactly `[low, high]`.
    /// Returns how many were updated.
    pub fn attach_stats(&mut self, source: &str, low: usize, high: usize, stats: &Value) -> usize {
        let mut updated = 0;
        for entry in &mut self.entries {
            let range = entry.range();
            if entry.source == source && range.low() == low && range.high() == high {
                entry.stats = Some(stats.clone());
                updated += 1;
            }
        }
        updated
    }
}
