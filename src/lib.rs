// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! LinkShop: editors for linkographs, command ontologies and abstraction hierarchies.
//!
//! Each editor keeps an editable structure (tree, graph, linkograph) in sync with a plain
//! document. A relay forwards editor requests to an analysis [`backend::Backend`]; the
//! bundled [`backend::FolderBackend`] keeps files in a [`store::FileStore`].

pub mod backend;
pub mod format;
pub mod graph;
pub mod input;
pub mod layout;
pub mod model;
pub mod ops;
pub mod relay;
pub mod store;
pub mod sublinkograph;
pub mod tree;
pub mod workspace;
