// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Linkograph markup export and import.
//!
//! The typed [`crate::model::Linkograph`] is the source of truth. Markup is an optional
//! rendering; the reader exists for files saved by older tools that stored only the drawing.

pub mod markup;

pub use markup::{render_markup, MarkupOptions, MarkupParseError, MarkupReader};
