// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Persistence for uploaded files on disk.
//!
//! The store keeps one collection directory per [`FileType`] and one JSON record per file.
//! It is used by the folder backend behind the relay.

pub mod file_store;

pub use file_store::{
    detect_file_type, FileRecord, FileStore, FileType, Saved, StoreError, WriteDurability,
};
