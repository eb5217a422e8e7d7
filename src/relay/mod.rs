// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! Relay between browser editors and a [`crate::backend::Backend`].
//!
//! A client connects over WebSocket and receives the file name lists. Each JSON request is
//! validated, forwarded to the backend and answered with one or more envelopes. Failures
//! become `{command, err}` envelopes and never close the connection.

pub mod error;
pub mod protocol;
pub mod server;
pub mod session;

pub use error::{RelayError, FILES_MISSING, FILE_MISSING, INVALID_RANGE};
pub use protocol::{ClientMessage, Command, FileLists, ServerMessage};
pub use server::{router, serve, RelayState};
pub use session::{parse_request, RelaySession};
