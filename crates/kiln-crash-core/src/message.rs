// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Exception message parsing.
//!
//! Engine exception messages arrive as a single combined string,
//! conventionally `"ExceptionName: cause text"`. Splitting that string is
//! the only way to recover a structured name and cause; the engine does
//! not expose them separately.

use serde::{Deserialize, Serialize};

/// Name used when a message does not follow the `name: cause` convention.
pub const FALLBACK_NAME: &str = "Exception";

/// Cause used when a message does not follow the `name: cause` convention.
pub const FALLBACK_CAUSE: &str = "Engine Exception";

/// Structured fields recovered from a combined exception message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMessage {
	pub name: String,
	pub cause: String,
}

/// Split a combined exception message into name and cause.
///
/// The name is everything before the first `:`; the cause starts two
/// characters after it, skipping the conventional `": "` separator. A
/// message with no colon, or with a colon in the first position, yields
/// the fallback sentinels instead.
pub fn parse_message(message: &str) -> ParsedMessage {
	match message.find(':') {
		Some(p) if p > 0 => ParsedMessage {
			name: message[..p].to_string(),
			// The separator skip may run past the end of the message
			// ("X:") or land inside a multi-byte character; both yield
			// an empty cause rather than a panic.
			cause: message.get(p + 2..).unwrap_or("").to_string(),
		},
		_ => ParsedMessage {
			name: FALLBACK_NAME.to_string(),
			cause: FALLBACK_CAUSE.to_string(),
		},
	}
}
