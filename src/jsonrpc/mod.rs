// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

/// Method routing and response construction.
mod dispatcher;
/// Line-oriented stream framing.
mod framer;
/// JSON-RPC 2.0 wire types and error codes.
mod types;

pub use dispatcher::{Dispatcher, Handler, HandlerError, HandlerResult};
pub use framer::{LineReader, LineWriter};
pub use types::*;
